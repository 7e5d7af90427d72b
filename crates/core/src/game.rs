//! Session facade: one seeded run of the arena, driven by player commands and scheduler ticks.
//! This module exists so frontends and harnesses have a single owner for the world, the RNG
//! stream, the turn scheduler and the gameplay log.
//! It does not render, read input devices or persist files.

mod commands;
mod hash;
mod snapshot;
#[cfg(test)]
mod tests;

use std::mem;

use tracing::info;

use crate::agent::DecisionOracle;
use crate::clock::{AnimationGate, Clock};
use crate::config::BalanceConfig;
use crate::grid::GroundItem;
use crate::quest::QuestLog;
use crate::rolls::SessionRng;
use crate::scenario::Scenario;
use crate::scheduler::{Phase, TickOutcome, TurnDeps, TurnScheduler};
use crate::shout::ShoutWorker;
use crate::types::{LogEvent, RunOutcome};
use crate::world::World;

pub use snapshot::{
    BehaviorSnapshot, ConditionSnapshot, EntitySnapshot, GameSnapshot, GridSnapshot,
    MonsterSnapshot, QuestSnapshot, StatsSnapshot,
};

pub struct Game {
    seed: u64,
    round: u64,
    rng: SessionRng,
    config: BalanceConfig,
    world: World,
    scheduler: TurnScheduler,
    quests: QuestLog,
    oracle: Option<Box<dyn DecisionOracle>>,
    shouts: Option<ShoutWorker>,
    inventory: Vec<GroundItem>,
    outcome: Option<RunOutcome>,
    log: Vec<LogEvent>,
    next_input_seq: u64,
}

impl Game {
    /// New run on the reference arena. Temperaments are drawn from the session stream, so the
    /// same seed always produces the same roster.
    pub fn new(seed: u64, config: BalanceConfig) -> Self {
        let mut rng = SessionRng::new(seed);
        let Scenario { world, quests } = Scenario::arena(&mut rng);
        Self::from_parts(rng, config, world, quests)
    }

    /// New run on a caller-built world with an empty quest log.
    pub fn with_world(seed: u64, config: BalanceConfig, world: World) -> Self {
        Self::from_parts(SessionRng::new(seed), config, world, QuestLog::default())
    }

    pub(crate) fn from_parts(
        rng: SessionRng,
        config: BalanceConfig,
        world: World,
        quests: QuestLog,
    ) -> Self {
        info!(seed = rng.seed(), monsters = world.monster_ids().len(), "run started");
        Self {
            seed: rng.seed(),
            round: 0,
            rng,
            config,
            world,
            scheduler: TurnScheduler::new(),
            quests,
            oracle: None,
            shouts: None,
            inventory: Vec::new(),
            outcome: None,
            log: Vec::new(),
            next_input_seq: 0,
        }
    }

    pub fn with_oracle(mut self, oracle: Box<dyn DecisionOracle>) -> Self {
        self.oracle = Some(oracle);
        self
    }

    pub fn with_shouts(mut self, shouts: ShoutWorker) -> Self {
        self.shouts = Some(shouts);
        self
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Completed monster phases.
    pub fn round(&self) -> u64 {
        self.round
    }

    pub fn config(&self) -> &BalanceConfig {
        &self.config
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub fn quests(&self) -> &QuestLog {
        &self.quests
    }

    pub fn quests_mut(&mut self) -> &mut QuestLog {
        &mut self.quests
    }

    pub fn phase(&self) -> Phase {
        self.scheduler.phase()
    }

    pub fn outcome(&self) -> Option<RunOutcome> {
        self.outcome
    }

    pub fn inventory(&self) -> &[GroundItem] {
        &self.inventory
    }

    pub fn log(&self) -> &[LogEvent] {
        &self.log
    }

    /// Hands the accumulated log to a frontend and starts a fresh one.
    pub fn take_log(&mut self) -> Vec<LogEvent> {
        mem::take(&mut self.log)
    }

    /// Collects finished shouts, then advances the monster phase by one cooperative step.
    /// A drained queue closes the round and brings back any due respawns.
    pub fn tick(&mut self, clock: &dyn Clock, animations: &mut dyn AnimationGate) -> TickOutcome {
        if let Some(shouts) = &self.shouts {
            for shout in shouts.drain_completed() {
                self.log.push(LogEvent::Shout { entity: shout.entity, text: shout.text });
            }
        }
        if self.outcome.is_some() {
            return TickOutcome::Idle;
        }

        let mut deps = TurnDeps {
            config: &self.config,
            clock,
            animations,
            rolls: &mut self.rng,
            oracle: self.oracle.as_deref(),
            shouts: self.shouts.as_ref(),
        };
        let outcome = self.scheduler.tick(&mut self.world, &mut deps, &mut self.log);
        match outcome {
            TickOutcome::PhaseEnded => {
                self.round += 1;
                for (entity, species) in self.world.process_respawns(self.round) {
                    self.log.push(LogEvent::Respawned { entity, species });
                }
            }
            TickOutcome::PlayerDefeated => {
                info!(round = self.round, "player defeated");
                self.outcome = Some(RunOutcome::Defeat);
            }
            _ => {}
        }
        outcome
    }
}

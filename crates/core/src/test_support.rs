//! Shared fixtures for unit tests across the scheduler and game modules.
//! It does not own production gameplay logic.

use crate::clock::{ManualClock, NoAnimations};
use crate::config::BalanceConfig;
use crate::grid::Grid;
use crate::personality::{Personality, Temperament};
use crate::rolls::ScriptedRolls;
use crate::scheduler::{TickOutcome, TurnDeps, TurnScheduler};
use crate::types::{EntityId, LogEvent, Pos, Species};
use crate::world::World;

/// Fearless, fully aggressive, never chatty.
pub(crate) fn brute() -> Personality {
    Personality::preset(Temperament::Balanced).with_aggression(1.0).with_flee_threshold(0.0)
}

pub(crate) fn world_from_rows(rows: &[&str], player: Pos) -> World {
    World::new(Grid::from_rows(rows), player)
}

pub(crate) fn add_monster(world: &mut World, species: Species, pos: Pos) -> EntityId {
    let id = world.spawn_monster(species, brute(), pos);
    world.monster_mut(id).dialogue_chance = 0.0;
    id
}

/// Headless collaborators for driving a scheduler by hand.
pub(crate) struct Harness {
    pub config: BalanceConfig,
    pub clock: ManualClock,
    pub animations: NoAnimations,
    pub rolls: ScriptedRolls,
}

impl Harness {
    pub(crate) fn new(rolls: ScriptedRolls) -> Self {
        Self {
            config: BalanceConfig::default(),
            clock: ManualClock::new(),
            animations: NoAnimations::default(),
            rolls,
        }
    }

    pub(crate) fn deps(&mut self) -> TurnDeps<'_> {
        TurnDeps {
            config: &self.config,
            clock: &self.clock,
            animations: &mut self.animations,
            rolls: &mut self.rolls,
            oracle: None,
            shouts: None,
        }
    }

    pub(crate) fn tick(
        &mut self,
        scheduler: &mut TurnScheduler,
        world: &mut World,
        log: &mut Vec<LogEvent>,
    ) -> TickOutcome {
        let mut deps = self.deps();
        scheduler.tick(world, &mut deps, log)
    }

    pub(crate) fn pace(&self) {
        self.clock.advance(self.config.pacing_delay());
    }

    /// Ticks with the clock stepping one pacing delay per tick until the phase leaves the
    /// monster queue. Returns every outcome, including the last.
    pub(crate) fn run_phase(
        &mut self,
        scheduler: &mut TurnScheduler,
        world: &mut World,
        log: &mut Vec<LogEvent>,
        max_ticks: usize,
    ) -> Vec<TickOutcome> {
        let mut outcomes = Vec::new();
        for _ in 0..max_ticks {
            let outcome = self.tick(scheduler, world, log);
            outcomes.push(outcome);
            if matches!(
                outcome,
                TickOutcome::PhaseEnded
                    | TickOutcome::PlayerDefeated
                    | TickOutcome::DialogueStarted(_)
                    | TickOutcome::Idle
            ) {
                break;
            }
            self.pace();
        }
        outcomes
    }
}

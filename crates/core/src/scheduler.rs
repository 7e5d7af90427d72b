//! Turn phases and the monster queue.
//! This module exists so player and monster actions stay strictly phase-separated and every
//! monster phase provably drains: each tick either waits on pacing, dequeues, or spends AP.
//! It does not choose actions; strategies do, and `dispatch` carries them out.

mod dispatch;

use std::collections::VecDeque;
use std::time::Duration;

use tracing::{debug, warn};

use crate::agent::dialogue::{can_converse, try_open_conversation};
use crate::agent::{DecisionContext, DecisionOracle, Reaction, Strategy, TurnContext};
use crate::clock::{AnimationGate, AnimationHandle, Clock};
use crate::config::BalanceConfig;
use crate::entity::Monster;
use crate::error::GameError;
use crate::grid::Grid;
use crate::rolls::RollSource;
use crate::shout::ShoutWorker;
use crate::spatial::euclidean;
use crate::types::{ActionTag, EntityId, LogEvent, PhaseKind, Pos};
use crate::world::World;

use dispatch::Dispatched;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SuspendReason {
    Dialogue,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Player,
    Monster,
    /// The monster phase is paused; the queue resumes after `resume_after`, which has already
    /// been dequeued.
    Suspended { reason: SuspendReason, resume_after: EntityId },
}

impl Phase {
    pub fn kind(self) -> PhaseKind {
        match self {
            Phase::Player => PhaseKind::Player,
            Phase::Monster => PhaseKind::Monster,
            Phase::Suspended { reason: SuspendReason::Dialogue, .. } => PhaseKind::Dialogue,
        }
    }
}

/// Collaborators one scheduler tick needs.
pub struct TurnDeps<'a> {
    pub config: &'a BalanceConfig,
    pub clock: &'a dyn Clock,
    pub animations: &'a mut dyn AnimationGate,
    pub rolls: &'a mut dyn RollSource,
    pub oracle: Option<&'a dyn DecisionOracle>,
    pub shouts: Option<&'a ShoutWorker>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    /// Not in the monster phase; nothing to do.
    Idle,
    /// Pacing delay or an attack animation is holding the queue.
    Waiting,
    /// The head was dead, gone or peaceful and left the queue without acting.
    Skipped(EntityId),
    Acted { entity: EntityId, action: ActionTag, spent: bool },
    DialogueStarted(EntityId),
    /// The queue drained and the player has the turn again.
    PhaseEnded,
    PlayerDefeated,
}

#[derive(Clone, Debug)]
pub struct TurnScheduler {
    phase: Phase,
    queue: VecDeque<EntityId>,
    /// Head whose conversation check already ran this phase.
    opened: Option<EntityId>,
    last_action_at: Option<Duration>,
    in_flight: Option<AnimationHandle>,
}

impl Default for TurnScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl TurnScheduler {
    pub fn new() -> Self {
        Self {
            phase: Phase::Player,
            queue: VecDeque::new(),
            opened: None,
            last_action_at: None,
            in_flight: None,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn queue(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.queue.iter().copied()
    }

    /// Player gives up the turn: every live monster is queued in roster order with a fresh AP
    /// pool, cooldowns tick down and per-turn behavior hooks run.
    pub fn end_turn(
        &mut self,
        world: &mut World,
        config: &BalanceConfig,
        log: &mut Vec<LogEvent>,
    ) -> Result<(), GameError> {
        if self.phase != Phase::Player {
            return Err(GameError::NotPlayerPhase);
        }
        let narrative_progress = world.narrative_progress();
        self.queue.clear();
        for id in world.monster_ids() {
            let Some((grid, position, monster)) = world.monster_on_grid(id) else {
                continue;
            };
            if !monster.stats.is_alive() {
                continue;
            }
            monster.stats.reset_ap();
            monster.shout_cooldown = monster.shout_cooldown.saturating_sub(1);
            monster.dialogue_cooldown = monster.dialogue_cooldown.saturating_sub(1);
            let ctx = TurnContext { grid, config, position, narrative_progress };
            match monster.behavior.on_turn_update(&ctx, &mut monster.stats) {
                Some(Reaction::Regrowth { healed }) => {
                    debug!(?id, healed, "grove regrowth");
                    log.push(LogEvent::GroveRegrowth { entity: id });
                }
                Some(Reaction::Pacified) => {
                    monster.hostile = false;
                    log.push(LogEvent::SpiritPacified { entity: id });
                }
                Some(Reaction::Rage { .. }) | None => {}
            }
            self.queue.push_back(id);
        }
        self.opened = None;
        self.phase = Phase::Monster;
        debug!(queued = self.queue.len(), "monster phase");
        log.push(LogEvent::PhaseChanged { phase: PhaseKind::Monster });
        Ok(())
    }

    /// Dialogue ended externally; the queue picks up with the monster after the speaker.
    pub fn conclude_dialogue(&mut self, log: &mut Vec<LogEvent>) -> Result<EntityId, GameError> {
        let Phase::Suspended { resume_after, .. } = self.phase else {
            return Err(GameError::NoDialoguePending);
        };
        self.phase = Phase::Monster;
        log.push(LogEvent::PhaseChanged { phase: PhaseKind::Monster });
        Ok(resume_after)
    }

    /// One cooperative step of the monster phase.
    pub fn tick(
        &mut self,
        world: &mut World,
        deps: &mut TurnDeps<'_>,
        log: &mut Vec<LogEvent>,
    ) -> TickOutcome {
        if self.phase != Phase::Monster {
            return TickOutcome::Idle;
        }
        if !world.player_stats().is_alive() {
            self.queue.clear();
            self.opened = None;
            self.phase = Phase::Player;
            return TickOutcome::PlayerDefeated;
        }
        let Some(&head) = self.queue.front() else {
            self.enter_player_phase(world, log);
            return TickOutcome::PhaseEnded;
        };

        let player_pos = world.player_pos();
        let Some((grid, position, monster)) = world.monster_on_grid(head) else {
            return self.skip(head);
        };
        if !monster.stats.is_alive() {
            return self.skip(head);
        }

        if self.opened != Some(head) {
            self.opened = Some(head);
            if try_open_conversation(
                &mut monster.dialogue_cooldown,
                monster.dialogue_chance,
                euclidean(position, player_pos),
                deps.config,
                deps.rolls,
            ) {
                return self.suspend_for_dialogue(head, log);
            }
        }

        if !monster.hostile {
            return self.skip(head);
        }

        let now = deps.clock.now();
        if let Some(last) = self.last_action_at
            && now.saturating_sub(last) < deps.config.pacing_delay()
        {
            return TickOutcome::Waiting;
        }
        if let Some(handle) = self.in_flight {
            if deps.animations.is_playing(handle) {
                return TickOutcome::Waiting;
            }
            self.in_flight = None;
        }

        let action = choose_action(head, grid, position, player_pos, monster, deps, log);
        let spent = match dispatch::dispatch(world, head, action, deps, log) {
            Dispatched::NoOp => false,
            Dispatched::Spent => true,
            Dispatched::Struck(handle) => {
                self.in_flight = Some(handle);
                true
            }
            Dispatched::Dialogue => {
                log.push(LogEvent::MonsterActed { entity: head, action });
                return self.suspend_for_dialogue(head, log);
            }
        };
        log.push(LogEvent::MonsterActed { entity: head, action });
        debug!(entity = ?head, ?action, spent, "monster acted");

        if spent {
            self.last_action_at = Some(now);
        }
        let exhausted = world
            .monster(head)
            .is_none_or(|monster| monster.stats.ap() < cheapest_action(deps.config));
        if !spent || exhausted {
            self.pop_head();
        }
        TickOutcome::Acted { entity: head, action, spent }
    }

    fn skip(&mut self, head: EntityId) -> TickOutcome {
        self.pop_head();
        TickOutcome::Skipped(head)
    }

    fn pop_head(&mut self) {
        self.queue.pop_front();
        self.opened = None;
    }

    fn suspend_for_dialogue(&mut self, head: EntityId, log: &mut Vec<LogEvent>) -> TickOutcome {
        self.pop_head();
        self.phase = Phase::Suspended { reason: SuspendReason::Dialogue, resume_after: head };
        debug!(entity = ?head, "monster phase suspended for dialogue");
        log.push(LogEvent::DialogueStarted { entity: head });
        log.push(LogEvent::PhaseChanged { phase: PhaseKind::Dialogue });
        TickOutcome::DialogueStarted(head)
    }

    fn enter_player_phase(&mut self, world: &mut World, log: &mut Vec<LogEvent>) {
        self.phase = Phase::Player;
        self.opened = None;
        self.last_action_at = None;
        self.in_flight = None;
        world.player_stats_mut().reset_ap();
        debug!("player phase");
        log.push(LogEvent::PhaseChanged { phase: PhaseKind::Player });
    }
}

fn cheapest_action(config: &BalanceConfig) -> u32 {
    config.move_cost.min(config.attack_cost)
}

/// Asks the oracle first for oracle-driven monsters and falls back to the monster's own
/// behavior on any oracle error. Flee transitions are logged here.
fn choose_action(
    id: EntityId,
    grid: &Grid,
    position: Pos,
    target: Pos,
    monster: &mut Monster,
    deps: &mut TurnDeps<'_>,
    log: &mut Vec<LogEvent>,
) -> ActionTag {
    let ctx = DecisionContext {
        grid,
        config: deps.config,
        personality: &monster.personality,
        position,
        target,
        hp_ratio: monster.stats.hp_ratio(),
        hostile: monster.hostile,
    };
    let was_fleeing = monster.resolve.is_fleeing();
    let range = euclidean(position, target);

    let oracle_choice = match deps.oracle {
        Some(oracle) if monster.oracle_driven => match oracle.decide(id, &ctx) {
            Ok(ActionTag::Talk) if !can_converse(monster.dialogue_cooldown, range, deps.config) => {
                debug!(entity = ?id, "oracle asked to talk out of range or on cooldown; using behavior");
                log.push(LogEvent::OracleFallback { entity: id });
                None
            }
            Ok(action) => Some(action),
            Err(err) => {
                warn!(entity = ?id, error = %err, "decision oracle failed; using behavior");
                log.push(LogEvent::OracleFallback { entity: id });
                None
            }
        },
        _ => None,
    };
    let action = match oracle_choice {
        Some(action) => action,
        None => monster.behavior.decide(&ctx, &mut monster.resolve, deps.rolls),
    };

    match (was_fleeing, monster.resolve.is_fleeing()) {
        (false, true) => log.push(LogEvent::FleeStarted { entity: id }),
        (true, false) => log.push(LogEvent::ResolveRecovered {
            entity: id,
            flee_threshold: monster.resolve.flee_threshold(),
        }),
        _ => {}
    }
    action
}

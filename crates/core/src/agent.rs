//! Per-monster decision strategies behind one interface.
//! This module exists so the scheduler can ask any monster for an action without knowing its
//! variant. Decisions are re-evaluated on every opportunity and never cached.
//! It does not execute actions; dispatch lives in the scheduler.

mod berserker;
pub mod dialogue;
mod drainer;
mod lure;
pub mod oracle;
mod standard;

use serde::{Deserialize, Serialize};

pub use berserker::Berserker;
pub use drainer::PassiveDrainer;
pub use lure::LureBound;
pub use oracle::{Completion, DecisionOracle, PromptOracle};
pub use standard::Standard;

use crate::combat::CombatStats;
use crate::config::BalanceConfig;
use crate::grid::Grid;
use crate::personality::{Personality, Resolve};
use crate::rolls::RollSource;
use crate::spatial::{euclidean, manhattan};
use crate::types::{ActionTag, Pos};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BehaviorKind {
    Standard,
    Berserker,
    LureBound,
    PassiveDrainer,
}

/// Read-only inputs for one decision.
pub struct DecisionContext<'a> {
    pub grid: &'a Grid,
    pub config: &'a BalanceConfig,
    pub personality: &'a Personality,
    pub position: Pos,
    pub target: Pos,
    pub hp_ratio: f32,
    pub hostile: bool,
}

impl DecisionContext<'_> {
    /// Orthogonal step count; 1 means adjacent.
    pub fn steps_to_target(&self) -> u32 {
        manhattan(self.position, self.target)
    }

    pub fn range_to_target(&self) -> f32 {
        euclidean(self.position, self.target)
    }
}

/// Inputs for the once-per-phase update each queued monster receives.
pub struct TurnContext<'a> {
    pub grid: &'a Grid,
    pub config: &'a BalanceConfig,
    pub position: Pos,
    pub narrative_progress: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Reaction {
    Rage { healed: i32 },
    Regrowth { healed: i32 },
    Pacified,
}

pub trait Strategy {
    fn decide(
        &mut self,
        ctx: &DecisionContext<'_>,
        resolve: &mut Resolve,
        rolls: &mut dyn RollSource,
    ) -> ActionTag;

    /// Called after the monster took `damage` and survived.
    fn on_damaged(
        &mut self,
        _damage: i32,
        _stats: &mut CombatStats,
        _config: &BalanceConfig,
        _rolls: &mut dyn RollSource,
    ) -> Option<Reaction> {
        None
    }

    fn on_turn_update(
        &mut self,
        _ctx: &TurnContext<'_>,
        _stats: &mut CombatStats,
    ) -> Option<Reaction> {
        None
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Behavior {
    Standard(Standard),
    Berserker(Berserker),
    LureBound(LureBound),
    PassiveDrainer(PassiveDrainer),
}

impl Behavior {
    pub fn new(kind: BehaviorKind) -> Self {
        match kind {
            BehaviorKind::Standard => Behavior::Standard(Standard),
            BehaviorKind::Berserker => Behavior::Berserker(Berserker::default()),
            BehaviorKind::LureBound => Behavior::LureBound(LureBound::default()),
            BehaviorKind::PassiveDrainer => Behavior::PassiveDrainer(PassiveDrainer::default()),
        }
    }

    pub fn kind(&self) -> BehaviorKind {
        match self {
            Behavior::Standard(_) => BehaviorKind::Standard,
            Behavior::Berserker(_) => BehaviorKind::Berserker,
            Behavior::LureBound(_) => BehaviorKind::LureBound,
            Behavior::PassiveDrainer(_) => BehaviorKind::PassiveDrainer,
        }
    }

    fn strategy(&mut self) -> &mut dyn Strategy {
        match self {
            Behavior::Standard(inner) => inner,
            Behavior::Berserker(inner) => inner,
            Behavior::LureBound(inner) => inner,
            Behavior::PassiveDrainer(inner) => inner,
        }
    }
}

impl Strategy for Behavior {
    fn decide(
        &mut self,
        ctx: &DecisionContext<'_>,
        resolve: &mut Resolve,
        rolls: &mut dyn RollSource,
    ) -> ActionTag {
        self.strategy().decide(ctx, resolve, rolls)
    }

    fn on_damaged(
        &mut self,
        damage: i32,
        stats: &mut CombatStats,
        config: &BalanceConfig,
        rolls: &mut dyn RollSource,
    ) -> Option<Reaction> {
        self.strategy().on_damaged(damage, stats, config, rolls)
    }

    fn on_turn_update(
        &mut self,
        ctx: &TurnContext<'_>,
        stats: &mut CombatStats,
    ) -> Option<Reaction> {
        self.strategy().on_turn_update(ctx, stats)
    }
}

/// Attack, approach and idle checks shared by every variant that fights.
fn engage(ctx: &DecisionContext<'_>, rolls: &mut dyn RollSource) -> ActionTag {
    let aggression = ctx.personality.aggression();
    if ctx.steps_to_target() == 1 && rolls.chance(aggression) {
        return ActionTag::Attack;
    }
    if ctx.range_to_target() <= ctx.config.aggro_range && rolls.chance(aggression) {
        return ActionTag::Approach;
    }
    idle(ctx, rolls)
}

fn idle(ctx: &DecisionContext<'_>, rolls: &mut dyn RollSource) -> ActionTag {
    if rolls.chance(ctx.config.wander_chance) { ActionTag::Wander } else { ActionTag::None }
}

use serde::{Deserialize, Serialize};

use super::standard::decide_with_flee;
use super::{DecisionContext, Reaction, Strategy, TurnContext};
use crate::combat::{CombatStats, Heal};
use crate::personality::Resolve;
use crate::rolls::RollSource;
use crate::spatial::{is_grove_edge, nearest_matching_tile};
use crate::types::ActionTag;

/// Tree-bound monster that keeps to its grove. It only becomes a regular fighter after being
/// provoked in conversation, which goes through `transform` rather than `decide`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LureBound {
    transformed: bool,
}

impl LureBound {
    pub fn restore(transformed: bool) -> Self {
        Self { transformed }
    }

    pub fn is_transformed(&self) -> bool {
        self.transformed
    }

    /// Multiplies HP, damage and armor once. Returns false when already transformed.
    pub fn transform(&mut self, stats: &mut CombatStats, multiplier: f32) -> bool {
        if self.transformed {
            return false;
        }
        self.transformed = true;
        stats.scale(multiplier, multiplier, multiplier);
        true
    }
}

impl Strategy for LureBound {
    fn decide(
        &mut self,
        ctx: &DecisionContext<'_>,
        resolve: &mut Resolve,
        rolls: &mut dyn RollSource,
    ) -> ActionTag {
        if self.transformed {
            return decide_with_flee(ctx, resolve, rolls);
        }
        if !is_grove_edge(ctx.grid, ctx.position) {
            if nearest_matching_tile(ctx.grid, ctx.position, is_grove_edge).is_some() {
                return ActionTag::SeekFeature;
            }
            return decide_with_flee(ctx, resolve, rolls);
        }
        // Rooted at the grove: strike at anything that comes close, never chase.
        if ctx.steps_to_target() == 1 && rolls.chance(ctx.personality.aggression()) {
            return ActionTag::Attack;
        }
        ActionTag::None
    }

    fn on_turn_update(&mut self, ctx: &TurnContext<'_>, stats: &mut CombatStats) -> Option<Reaction> {
        if !is_grove_edge(ctx.grid, ctx.position) || stats.hp() == stats.max_hp() {
            return None;
        }
        let healed = stats.heal(Heal::Full);
        (healed > 0).then_some(Reaction::Regrowth { healed })
    }
}

use serde::{Deserialize, Serialize};

use super::{DecisionContext, Reaction, Strategy, TurnContext};
use crate::combat::CombatStats;
use crate::personality::Resolve;
use crate::rolls::RollSource;
use crate::types::ActionTag;

/// A spirit that drifts into its target and drains on contact until the story calms it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PassiveDrainer {
    pacified: bool,
}

impl PassiveDrainer {
    pub fn restore(pacified: bool) -> Self {
        Self { pacified }
    }

    pub fn is_pacified(&self) -> bool {
        self.pacified
    }
}

impl Strategy for PassiveDrainer {
    fn decide(
        &mut self,
        ctx: &DecisionContext<'_>,
        _resolve: &mut Resolve,
        _rolls: &mut dyn RollSource,
    ) -> ActionTag {
        if self.pacified || !ctx.hostile { ActionTag::None } else { ActionTag::MoveTo }
    }

    fn on_turn_update(&mut self, ctx: &TurnContext<'_>, _stats: &mut CombatStats) -> Option<Reaction> {
        if self.pacified || ctx.narrative_progress < ctx.config.spirit_pacify_progress {
            return None;
        }
        self.pacified = true;
        Some(Reaction::Pacified)
    }
}

use serde::{Deserialize, Serialize};

use super::{DecisionContext, Strategy, engage};
use crate::personality::Resolve;
use crate::rolls::RollSource;
use crate::types::ActionTag;

/// Flee, then attack, then approach, then idle. First applicable check wins.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Standard;

impl Strategy for Standard {
    fn decide(
        &mut self,
        ctx: &DecisionContext<'_>,
        resolve: &mut Resolve,
        rolls: &mut dyn RollSource,
    ) -> ActionTag {
        decide_with_flee(ctx, resolve, rolls)
    }
}

pub(super) fn decide_with_flee(
    ctx: &DecisionContext<'_>,
    resolve: &mut Resolve,
    rolls: &mut dyn RollSource,
) -> ActionTag {
    let check = resolve.check(
        ctx.hp_ratio,
        ctx.config.flee_recovery_factor,
        ctx.config.flee_threshold_decay,
        rolls,
    );
    if check.is_fleeing() {
        return ActionTag::Flee;
    }
    engage(ctx, rolls)
}

//! The conversation-opening check, evaluated before a monster's action decision.

use crate::config::BalanceConfig;
use crate::rolls::RollSource;

/// Rolls for a monster opening a conversation. Requires the cooldown to be spent and the target
/// within conversation range; on success the cooldown restarts. A zero chance never rolls.
pub fn try_open_conversation(
    cooldown: &mut u32,
    chance: f32,
    range: f32,
    config: &BalanceConfig,
    rolls: &mut dyn RollSource,
) -> bool {
    if !can_converse(*cooldown, range, config) || chance <= 0.0 {
        return false;
    }
    if !rolls.chance(chance) {
        return false;
    }
    *cooldown = config.dialogue_cooldown;
    true
}

/// Cooldown spent and target within conversation range. Gates every conversation, rolled or
/// chosen by an oracle.
pub fn can_converse(cooldown: u32, range: f32, config: &BalanceConfig) -> bool {
    cooldown == 0 && range <= config.conversation_range
}

//! Balance tunables for combat, decisions and pacing.
//! This module exists so content knobs live in one TOML-loadable record instead of being
//! scattered as literals. It does not interpret the values; the systems that read them do.

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Upper bound on the damage band; rolls are capped at max damage anyway.
const MAX_DAMAGE_BAND: f32 = 2.0;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BalanceConfig {
    /// Lower bound of the damage roll multiplier around base damage.
    pub damage_band_low: f32,
    /// Upper bound of the damage roll multiplier, at most 2.0; the roll never exceeds max damage.
    pub damage_band_high: f32,
    pub crit_chance: f32,
    pub crit_multiplier: i32,
    pub move_cost: u32,
    pub attack_cost: u32,
    /// Euclidean tile distance within which a monster considers approaching.
    pub aggro_range: f32,
    /// Euclidean tile distance within which a monster may open a conversation.
    pub conversation_range: f32,
    pub flee_recovery_factor: f32,
    /// Multiplier applied to the flee threshold after a monster regains resolve.
    pub flee_threshold_decay: f32,
    pub wander_chance: f32,
    pub pacing_delay_ms: u64,
    pub dialogue_cooldown: u32,
    pub shout_cooldown: u32,
    pub berserker_rage_trigger: f32,
    pub berserker_buff_chance: f32,
    pub berserker_max_buffs: u32,
    pub lure_transform_multiplier: f32,
    pub spirit_pacify_progress: u32,
    /// Rounds before a slain monster returns at its spawn point; 0 disables respawns.
    pub respawn_after_rounds: u32,
}

impl Default for BalanceConfig {
    fn default() -> Self {
        Self {
            damage_band_low: 0.8,
            damage_band_high: 1.2,
            crit_chance: 0.10,
            crit_multiplier: 2,
            move_cost: 1,
            attack_cost: 2,
            aggro_range: 5.0,
            conversation_range: 7.0,
            flee_recovery_factor: 0.05,
            flee_threshold_decay: 0.9,
            wander_chance: 0.3,
            pacing_delay_ms: 200,
            dialogue_cooldown: 5,
            shout_cooldown: 3,
            berserker_rage_trigger: 0.5,
            berserker_buff_chance: 0.5,
            berserker_max_buffs: 3,
            lure_transform_multiplier: 1.5,
            spirit_pacify_progress: 3,
            respawn_after_rounds: 8,
        }
    }
}

impl BalanceConfig {
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: BalanceConfig = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let source = fs::read_to_string(path)?;
        Self::from_toml_str(&source)
    }

    pub fn pacing_delay(&self) -> Duration {
        Duration::from_millis(self.pacing_delay_ms)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.damage_band_low > 0.0 && self.damage_band_low <= self.damage_band_high) {
            return Err(invalid("damage_band_low", "must be positive and not above the high band"));
        }
        for (field, value) in [
            ("crit_chance", self.crit_chance),
            ("flee_recovery_factor", self.flee_recovery_factor),
            ("wander_chance", self.wander_chance),
            ("berserker_rage_trigger", self.berserker_rage_trigger),
            ("berserker_buff_chance", self.berserker_buff_chance),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(invalid(field, "must be a probability in [0, 1]"));
            }
        }
        if !(self.damage_band_high <= MAX_DAMAGE_BAND) {
            return Err(invalid("damage_band_high", "must not exceed 2.0"));
        }
        if !(self.flee_threshold_decay > 0.0 && self.flee_threshold_decay <= 1.0) {
            return Err(invalid("flee_threshold_decay", "must be in (0, 1]"));
        }
        if self.crit_multiplier < 1 {
            return Err(invalid("crit_multiplier", "must be at least 1"));
        }
        if self.move_cost == 0 || self.attack_cost == 0 {
            return Err(invalid("move_cost", "action costs must be non-zero"));
        }
        if self.aggro_range < 0.0 || self.conversation_range < 0.0 {
            return Err(invalid("aggro_range", "ranges must not be negative"));
        }
        if self.conversation_range < self.aggro_range {
            return Err(invalid("conversation_range", "must be at least the aggro range"));
        }
        if self.lure_transform_multiplier < 1.0 {
            return Err(invalid("lure_transform_multiplier", "must not weaken the monster"));
        }
        Ok(())
    }
}

fn invalid(field: &'static str, reason: &str) -> ConfigError {
    ConfigError::Invalid { field, reason: reason.to_string() }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        BalanceConfig::default().validate().expect("defaults validate");
    }

    #[test]
    fn partial_toml_keeps_remaining_defaults() {
        let config = BalanceConfig::from_toml_str("aggro_range = 6.0\npacing_delay_ms = 50\n")
            .expect("partial config parses");
        assert_eq!(config.aggro_range, 6.0);
        assert_eq!(config.pacing_delay(), Duration::from_millis(50));
        assert_eq!(config.attack_cost, BalanceConfig::default().attack_cost);
    }

    #[test]
    fn out_of_range_probability_is_rejected() {
        let err = BalanceConfig::from_toml_str("crit_chance = 1.5\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "crit_chance", .. }), "{err:?}");
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        let err = BalanceConfig::from_toml_str("aggro_range = \"far\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn shipped_balance_file_matches_defaults() {
        let shipped = BalanceConfig::from_toml_str(include_str!("../../../balance.toml"))
            .expect("balance.toml parses");
        assert_eq!(shipped, BalanceConfig::default());
    }

    #[test]
    fn conversation_range_must_cover_aggro_range() {
        let err = BalanceConfig::from_toml_str("aggro_range = 8.0\nconversation_range = 6.0\n")
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "conversation_range", .. }), "{err:?}");
        BalanceConfig::from_toml_str("aggro_range = 7.0\n").expect("equal ranges are fine");
    }

    #[test]
    fn damage_band_has_a_ceiling() {
        let err = BalanceConfig::from_toml_str("damage_band_high = 5.0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "damage_band_high", .. }), "{err:?}");
        BalanceConfig::from_toml_str("damage_band_high = 2.0\n").expect("ceiling is inclusive");
    }

    #[test]
    fn zero_action_cost_is_rejected() {
        let err = BalanceConfig::from_toml_str("move_cost = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));
    }
}

//! Combat-stat records and attack/defense math.
//! This module exists so HP and AP only change through checked operations and so damage
//! resolution is a pure function of its inputs plus an injected roll source.
//! It does not decide who attacks whom; the scheduler and player commands do.

use crate::config::BalanceConfig;
use crate::rolls::RollSource;

#[derive(Clone, Debug, PartialEq)]
pub struct CombatStats {
    max_hp: i32,
    hp: i32,
    armor: i32,
    base_damage: i32,
    max_damage: i32,
    max_ap: u32,
    ap: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DamageOutcome {
    Wounded { dealt: i32 },
    /// The HP-to-zero transition; reported exactly once per life.
    Killed { dealt: i32 },
    AlreadyDead,
}

impl DamageOutcome {
    pub fn dealt(self) -> i32 {
        match self {
            DamageOutcome::Wounded { dealt } | DamageOutcome::Killed { dealt } => dealt,
            DamageOutcome::AlreadyDead => 0,
        }
    }

    pub fn is_kill(self) -> bool {
        matches!(self, DamageOutcome::Killed { .. })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Heal {
    Amount(i32),
    Full,
}

impl CombatStats {
    pub fn new(max_hp: i32, armor: i32, base_damage: i32, max_damage: i32, max_ap: u32) -> Self {
        let max_hp = max_hp.max(1);
        let base_damage = base_damage.max(0);
        Self {
            max_hp,
            hp: max_hp,
            armor: armor.max(0),
            base_damage,
            max_damage: max_damage.max(base_damage),
            max_ap,
            ap: max_ap,
        }
    }

    /// Rebuilds a record from persisted values, clamping into the invariant ranges.
    pub fn restore(
        max_hp: i32,
        hp: i32,
        armor: i32,
        base_damage: i32,
        max_damage: i32,
        max_ap: u32,
        ap: u32,
    ) -> Self {
        let mut stats = Self::new(max_hp, armor, base_damage, max_damage, max_ap);
        stats.hp = hp.clamp(0, stats.max_hp);
        stats.ap = ap.min(stats.max_ap);
        stats
    }

    pub fn max_hp(&self) -> i32 {
        self.max_hp
    }

    pub fn hp(&self) -> i32 {
        self.hp
    }

    pub fn armor(&self) -> i32 {
        self.armor
    }

    pub fn base_damage(&self) -> i32 {
        self.base_damage
    }

    pub fn max_damage(&self) -> i32 {
        self.max_damage
    }

    pub fn max_ap(&self) -> u32 {
        self.max_ap
    }

    pub fn ap(&self) -> u32 {
        self.ap
    }

    pub fn is_alive(&self) -> bool {
        self.hp > 0
    }

    pub fn hp_ratio(&self) -> f32 {
        self.hp as f32 / self.max_hp as f32
    }

    pub fn take_damage(&mut self, amount: i32) -> DamageOutcome {
        if !self.is_alive() {
            return DamageOutcome::AlreadyDead;
        }
        let dealt = amount.max(0).min(self.hp);
        self.hp -= dealt;
        if self.hp == 0 { DamageOutcome::Killed { dealt } } else { DamageOutcome::Wounded { dealt } }
    }

    /// Restores HP up to the maximum and returns the amount actually healed.
    /// Dead records are not revived.
    pub fn heal(&mut self, heal: Heal) -> i32 {
        if !self.is_alive() {
            return 0;
        }
        let target = match heal {
            Heal::Amount(amount) => self.hp.saturating_add(amount.max(0)).min(self.max_hp),
            Heal::Full => self.max_hp,
        };
        let healed = target - self.hp;
        self.hp = target;
        healed
    }

    /// The single AP gate: spends `cost` only when the whole amount is available.
    pub fn spend_ap(&mut self, cost: u32) -> bool {
        if cost > self.ap {
            return false;
        }
        self.ap -= cost;
        true
    }

    pub fn reset_ap(&mut self) {
        self.ap = self.max_ap;
    }

    /// Multiplicative HP/damage/armor modifiers, used once at spawn and by transformations.
    /// Current HP keeps its ratio to the new maximum.
    pub fn scale(&mut self, hp_mult: f32, damage_mult: f32, armor_mult: f32) {
        let ratio = self.hp_ratio();
        self.max_hp = ((self.max_hp as f32 * hp_mult).round() as i32).max(1);
        self.hp = ((self.max_hp as f32 * ratio).round() as i32).clamp(0, self.max_hp);
        if ratio > 0.0 && self.hp == 0 {
            self.hp = 1;
        }
        self.base_damage = ((self.base_damage as f32 * damage_mult).round() as i32).max(0);
        self.max_damage =
            ((self.max_damage as f32 * damage_mult).round() as i32).max(self.base_damage);
        self.armor = ((self.armor as f32 * armor_mult).round() as i32).max(0);
    }

    /// Permanent flat increase to damage and armor.
    pub fn fortify(&mut self, damage: i32, armor: i32) {
        self.base_damage = (self.base_damage + damage).max(0);
        self.max_damage = (self.max_damage + damage).max(self.base_damage);
        self.armor = (self.armor + armor).max(0);
    }
}

/// Damage after armor with the minimum-one floor.
pub fn resolve_attack(roll: i32, armor: i32, ignore_armor: bool) -> i32 {
    let armor = if ignore_armor { 0 } else { armor.max(0) };
    (roll - armor).max(1)
}

/// Uniform draw in the configured band around base damage, capped at max damage.
pub fn roll_damage(stats: &CombatStats, config: &BalanceConfig, rolls: &mut dyn RollSource) -> i32 {
    let multiplier = rolls.band(config.damage_band_low, config.damage_band_high);
    ((stats.base_damage as f32 * multiplier).round() as i32).clamp(0, stats.max_damage)
}

pub fn roll_critical(config: &BalanceConfig, crit_scale: f32, rolls: &mut dyn RollSource) -> bool {
    rolls.chance((config.crit_chance * crit_scale).clamp(0.0, 1.0))
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StrikeOptions {
    /// Multiplier on the configured crit chance, from the attacker's personality.
    pub crit_scale: f32,
    pub ignore_armor: bool,
}

impl Default for StrikeOptions {
    fn default() -> Self {
        Self { crit_scale: 1.0, ignore_armor: false }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StrikeResult {
    pub critical: bool,
    pub outcome: DamageOutcome,
}

/// Full attack: damage roll, critical check (doubling before armor), armor and floor, then
/// application to the defender. A dead defender takes nothing and no rolls are spent.
pub fn strike(
    attacker: &CombatStats,
    defender: &mut CombatStats,
    options: StrikeOptions,
    config: &BalanceConfig,
    rolls: &mut dyn RollSource,
) -> StrikeResult {
    if !defender.is_alive() {
        return StrikeResult { critical: false, outcome: DamageOutcome::AlreadyDead };
    }
    let mut roll = roll_damage(attacker, config, rolls);
    let critical = roll_critical(config, options.crit_scale, rolls);
    if critical {
        roll *= config.crit_multiplier;
    }
    let damage = resolve_attack(roll, defender.armor, options.ignore_armor);
    StrikeResult { critical, outcome: defender.take_damage(damage) }
}

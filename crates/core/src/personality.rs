//! Monster temperaments and the mutable resolve state derived from them.

use serde::{Deserialize, Serialize};

use crate::rolls::RollSource;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Temperament {
    Balanced,
    Aggressive,
    Cowardly,
    Chatty,
    Stoic,
}

impl Temperament {
    pub const ALL: [Temperament; 5] = [
        Temperament::Balanced,
        Temperament::Aggressive,
        Temperament::Cowardly,
        Temperament::Chatty,
        Temperament::Stoic,
    ];

    /// Uniform pick used at spawn.
    pub fn roll(rolls: &mut dyn RollSource) -> Temperament {
        let idx = rolls.range_inclusive(0, Self::ALL.len() as i32 - 1) as usize;
        Self::ALL[idx]
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpawnModifiers {
    pub hp: f32,
    pub damage: f32,
    pub armor: f32,
}

impl SpawnModifiers {
    pub const NEUTRAL: SpawnModifiers = SpawnModifiers { hp: 1.0, damage: 1.0, armor: 1.0 };
}

/// Immutable personality profile. The flee threshold it starts with lives on in `Resolve`,
/// which is the only part allowed to change after spawn.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Personality {
    temperament: Temperament,
    aggression: f32,
    flee_threshold: f32,
    dialogue_propensity: f32,
    crit_scale: f32,
    modifiers: SpawnModifiers,
}

impl Personality {
    pub fn preset(temperament: Temperament) -> Self {
        let (aggression, flee_threshold, dialogue_propensity, crit_scale, modifiers) =
            match temperament {
                Temperament::Balanced => (0.7, 0.25, 1.0, 1.0, SpawnModifiers::NEUTRAL),
                Temperament::Aggressive => (
                    0.95,
                    0.1,
                    0.6,
                    1.5,
                    SpawnModifiers { hp: 1.0, damage: 1.2, armor: 0.9 },
                ),
                Temperament::Cowardly => (
                    0.45,
                    0.5,
                    1.0,
                    1.0,
                    SpawnModifiers { hp: 0.9, damage: 0.9, armor: 1.0 },
                ),
                Temperament::Chatty => (0.5, 0.3, 2.0, 1.0, SpawnModifiers::NEUTRAL),
                Temperament::Stoic => (
                    0.75,
                    0.15,
                    0.5,
                    1.0,
                    SpawnModifiers { hp: 1.2, damage: 1.0, armor: 1.2 },
                ),
            };
        Self { temperament, aggression, flee_threshold, dialogue_propensity, crit_scale, modifiers }
    }

    pub fn with_aggression(mut self, aggression: f32) -> Self {
        self.aggression = aggression.clamp(0.0, 1.0);
        self
    }

    pub fn with_flee_threshold(mut self, flee_threshold: f32) -> Self {
        self.flee_threshold = flee_threshold.clamp(0.0, 1.0);
        self
    }

    pub fn with_dialogue_propensity(mut self, propensity: f32) -> Self {
        self.dialogue_propensity = propensity.max(0.0);
        self
    }

    pub fn temperament(&self) -> Temperament {
        self.temperament
    }

    pub fn aggression(&self) -> f32 {
        self.aggression
    }

    /// Threshold at spawn; the live value is on `Resolve`.
    pub fn flee_threshold(&self) -> f32 {
        self.flee_threshold
    }

    pub fn dialogue_propensity(&self) -> f32 {
        self.dialogue_propensity
    }

    pub fn crit_scale(&self) -> f32 {
        self.crit_scale
    }

    pub fn modifiers(&self) -> SpawnModifiers {
        self.modifiers
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FleeCheck {
    /// Not fleeing and no new flee this turn.
    Steady,
    Started,
    StillFleeing,
    /// Fleeing ended this turn; the rest of the decision proceeds normally.
    Recovered,
}

impl FleeCheck {
    pub fn is_fleeing(self) -> bool {
        matches!(self, FleeCheck::Started | FleeCheck::StillFleeing)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Resolve {
    fleeing: bool,
    flee_threshold: f32,
}

impl Resolve {
    pub fn new(flee_threshold: f32) -> Self {
        Self { fleeing: false, flee_threshold: flee_threshold.clamp(0.0, 1.0) }
    }

    pub fn restore(fleeing: bool, flee_threshold: f32) -> Self {
        Self { fleeing, ..Self::new(flee_threshold) }
    }

    pub fn is_fleeing(&self) -> bool {
        self.fleeing
    }

    pub fn flee_threshold(&self) -> f32 {
        self.flee_threshold
    }

    pub fn panic(&mut self) {
        self.fleeing = true;
    }

    /// One flee evaluation. A fleeing monster first rolls to recover (threshold scaled by
    /// `recovery_factor`); success clears fleeing and decays the threshold. Otherwise a calm
    /// monster below its threshold rolls against that threshold to start fleeing.
    pub fn check(
        &mut self,
        hp_ratio: f32,
        recovery_factor: f32,
        decay: f32,
        rolls: &mut dyn RollSource,
    ) -> FleeCheck {
        if self.fleeing {
            if rolls.chance(self.flee_threshold * recovery_factor) {
                self.fleeing = false;
                self.flee_threshold *= decay;
                return FleeCheck::Recovered;
            }
            return FleeCheck::StillFleeing;
        }
        if hp_ratio < self.flee_threshold && rolls.chance(self.flee_threshold) {
            self.fleeing = true;
            return FleeCheck::Started;
        }
        FleeCheck::Steady
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rolls::ScriptedRolls;

    #[test]
    fn aggressive_preset_scales_crits() {
        assert_eq!(Personality::preset(Temperament::Aggressive).crit_scale(), 1.5);
        assert_eq!(Personality::preset(Temperament::Balanced).crit_scale(), 1.0);
    }

    #[test]
    fn temperament_roll_covers_every_preset() {
        let mut rolls = ScriptedRolls::new([0.0, 0.2, 0.4, 0.6, 0.99]);
        let picked: Vec<_> = (0..5).map(|_| Temperament::roll(&mut rolls)).collect();
        assert_eq!(picked, Temperament::ALL);
    }

    #[test]
    fn healthy_monster_never_rolls_to_flee() {
        let mut resolve = Resolve::new(0.3);
        let mut rolls = ScriptedRolls::constant(0.0);
        assert_eq!(resolve.check(0.9, 0.05, 0.9, &mut rolls), FleeCheck::Steady);
        assert_eq!(rolls.remaining(), 1, "no roll spent above the threshold");
    }

    #[test]
    fn recovery_lowers_threshold() {
        let mut resolve = Resolve::new(0.5);
        let mut rolls = ScriptedRolls::new([0.1, 0.5, 0.01]);
        assert_eq!(resolve.check(0.2, 0.05, 0.9, &mut rolls), FleeCheck::Started);
        assert_eq!(resolve.check(0.2, 0.05, 0.9, &mut rolls), FleeCheck::StillFleeing);
        assert_eq!(resolve.check(0.2, 0.05, 0.9, &mut rolls), FleeCheck::Recovered);
        assert!(!resolve.is_fleeing());
        assert!((resolve.flee_threshold() - 0.45).abs() < 1e-6);
    }
}

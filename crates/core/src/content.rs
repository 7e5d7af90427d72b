use crate::agent::BehaviorKind;
use crate::combat::CombatStats;
use crate::types::Species;

pub struct SpeciesProfile {
    pub name: &'static str,
    pub max_hp: i32,
    pub armor: i32,
    pub base_damage: i32,
    pub max_damage: i32,
    pub max_ap: u32,
    pub behavior: BehaviorKind,
    /// Base chance to open a conversation, scaled by temperament.
    pub dialogue_chance: f32,
    pub quest_tags: &'static [&'static str],
    /// Left on the tile when the monster dies.
    pub loot: Option<&'static str>,
}

impl SpeciesProfile {
    pub fn stats(&self) -> CombatStats {
        CombatStats::new(self.max_hp, self.armor, self.base_damage, self.max_damage, self.max_ap)
    }
}

pub fn species_profile(species: Species) -> SpeciesProfile {
    match species {
        Species::Goblin => SpeciesProfile {
            name: "goblin",
            max_hp: 10,
            armor: 0,
            base_damage: 3,
            max_damage: 4,
            max_ap: 4,
            behavior: BehaviorKind::Standard,
            dialogue_chance: 0.10,
            quest_tags: &["goblinoid", "greenskin"],
            loot: Some("rusty knife"),
        },
        Species::Wolf => SpeciesProfile {
            name: "wolf",
            max_hp: 8,
            armor: 0,
            base_damage: 3,
            max_damage: 5,
            max_ap: 6,
            behavior: BehaviorKind::Standard,
            dialogue_chance: 0.0,
            quest_tags: &["beast"],
            loot: Some("wolf pelt"),
        },
        Species::Bandit => SpeciesProfile {
            name: "bandit",
            max_hp: 14,
            armor: 1,
            base_damage: 4,
            max_damage: 6,
            max_ap: 4,
            behavior: BehaviorKind::Standard,
            dialogue_chance: 0.25,
            quest_tags: &["humanoid", "outlaw"],
            loot: Some("coin purse"),
        },
        Species::OrcBerserker => SpeciesProfile {
            name: "orc berserker",
            max_hp: 24,
            armor: 2,
            base_damage: 5,
            max_damage: 8,
            max_ap: 4,
            behavior: BehaviorKind::Berserker,
            dialogue_chance: 0.05,
            quest_tags: &["greenskin", "orc"],
            loot: Some("war axe"),
        },
        Species::Dryad => SpeciesProfile {
            name: "dryad",
            max_hp: 16,
            armor: 1,
            base_damage: 3,
            max_damage: 5,
            max_ap: 4,
            behavior: BehaviorKind::LureBound,
            dialogue_chance: 0.35,
            quest_tags: &["fey", "grove"],
            loot: Some("heartwood"),
        },
        Species::Wisp => SpeciesProfile {
            name: "wisp",
            max_hp: 6,
            armor: 0,
            base_damage: 2,
            max_damage: 2,
            max_ap: 4,
            behavior: BehaviorKind::PassiveDrainer,
            dialogue_chance: 0.15,
            quest_tags: &["spirit", "fey"],
            loot: None,
        },
    }
}

pub fn player_stats() -> CombatStats {
    CombatStats::new(30, 1, 5, 7, 4)
}

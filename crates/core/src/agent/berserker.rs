use serde::{Deserialize, Serialize};

use super::standard::decide_with_flee;
use super::{DecisionContext, Reaction, Strategy, engage};
use crate::combat::{CombatStats, Heal};
use crate::config::BalanceConfig;
use crate::personality::Resolve;
use crate::rolls::RollSource;
use crate::types::ActionTag;

/// Ignores fear once wounded past the rage trigger and may buff itself when hurt.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Berserker {
    triggers: u32,
}

impl Berserker {
    pub fn triggers(&self) -> u32 {
        self.triggers
    }

    pub fn restore(triggers: u32) -> Self {
        Self { triggers }
    }
}

impl Strategy for Berserker {
    fn decide(
        &mut self,
        ctx: &DecisionContext<'_>,
        resolve: &mut Resolve,
        rolls: &mut dyn RollSource,
    ) -> ActionTag {
        if ctx.hp_ratio < ctx.config.berserker_rage_trigger {
            return engage(ctx, rolls);
        }
        decide_with_flee(ctx, resolve, rolls)
    }

    fn on_damaged(
        &mut self,
        damage: i32,
        stats: &mut CombatStats,
        config: &BalanceConfig,
        rolls: &mut dyn RollSource,
    ) -> Option<Reaction> {
        if damage <= 0 || !stats.is_alive() || self.triggers >= config.berserker_max_buffs {
            return None;
        }
        // Each successful rage halves the odds of the next one.
        let chance = config.berserker_buff_chance / (1_u32 << self.triggers) as f32;
        if !rolls.chance(chance) {
            return None;
        }
        self.triggers += 1;
        let healed = stats.heal(Heal::Amount((damage + 1) / 2));
        stats.fortify(1, 1);
        Some(Reaction::Rage { healed })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Grid;
    use crate::personality::{Personality, Temperament};
    use crate::rolls::ScriptedRolls;
    use crate::types::{Pos, TileKind};

    #[test]
    fn enraged_berserker_attacks_instead_of_fleeing() {
        let grid = Grid::new(6, 6, TileKind::Grass);
        let config = BalanceConfig::default();
        let personality =
            Personality::preset(Temperament::Cowardly).with_flee_threshold(0.9).with_aggression(1.0);
        let ctx = DecisionContext {
            grid: &grid,
            config: &config,
            personality: &personality,
            position: Pos { y: 2, x: 2 },
            target: Pos { y: 2, x: 3 },
            hp_ratio: 0.3,
            hostile: true,
        };
        let mut resolve = Resolve::new(0.9);
        let mut rolls = ScriptedRolls::constant(0.0);
        assert_eq!(Berserker::default().decide(&ctx, &mut resolve, &mut rolls), ActionTag::Attack);
        assert!(!resolve.is_fleeing());

        let calm = DecisionContext { hp_ratio: 0.6, ..ctx };
        assert_eq!(Berserker::default().decide(&calm, &mut resolve, &mut rolls), ActionTag::Flee);
    }

    #[test]
    fn rage_chance_halves_and_caps() {
        let config = BalanceConfig::default();
        let mut stats = CombatStats::new(24, 2, 5, 8, 4);
        stats.take_damage(10);
        let mut berserker = Berserker::default();
        // 0.4 passes 0.5, fails 0.25, then 0.2 passes 0.25 and 0.1 passes 0.125.
        let mut rolls = ScriptedRolls::new([0.4, 0.4, 0.2, 0.1, 0.0]);
        assert_eq!(
            berserker.on_damaged(10, &mut stats, &config, &mut rolls),
            Some(Reaction::Rage { healed: 5 })
        );
        assert_eq!(stats.base_damage(), 6);
        assert_eq!(stats.armor(), 3);
        assert_eq!(berserker.on_damaged(4, &mut stats, &config, &mut rolls), None);
        assert!(berserker.on_damaged(4, &mut stats, &config, &mut rolls).is_some());
        assert!(berserker.on_damaged(4, &mut stats, &config, &mut rolls).is_some());
        assert_eq!(berserker.triggers(), 3);
        assert_eq!(berserker.on_damaged(4, &mut stats, &config, &mut rolls), None, "capped");
    }
}

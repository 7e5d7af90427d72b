use serde::{Deserialize, Serialize};

use crate::agent::Behavior;
use crate::combat::CombatStats;
use crate::personality::{Personality, Resolve};
use crate::types::{EntityId, Pos, Species};

#[derive(Clone, Debug, PartialEq)]
pub struct Monster {
    pub species: Species,
    pub personality: Personality,
    pub stats: CombatStats,
    pub behavior: Behavior,
    pub resolve: Resolve,
    pub hostile: bool,
    pub dialogue_chance: f32,
    pub dialogue_cooldown: u32,
    pub shout_cooldown: u32,
    /// Consults the decision oracle before its own behavior.
    pub oracle_driven: bool,
    pub spawn_point: Pos,
}

#[derive(Clone, Debug, PartialEq)]
pub enum EntityKind {
    Player { stats: CombatStats },
    Monster(Box<Monster>),
    Npc { name: String },
    Obstacle,
    /// Non-blocking decoration left where a monster died.
    Remains { species: Species },
}

#[derive(Clone, Debug, PartialEq)]
pub struct Entity {
    pub id: EntityId,
    pub(crate) pos: Pos,
    pub kind: EntityKind,
}

impl Entity {
    pub fn pos(&self) -> Pos {
        self.pos
    }

    pub fn is_blocking(&self) -> bool {
        !matches!(self.kind, EntityKind::Remains { .. })
    }

    pub fn stats(&self) -> Option<&CombatStats> {
        match &self.kind {
            EntityKind::Player { stats } => Some(stats),
            EntityKind::Monster(monster) => Some(&monster.stats),
            _ => None,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.stats().is_some_and(CombatStats::is_alive)
    }

    pub fn monster(&self) -> Option<&Monster> {
        match &self.kind {
            EntityKind::Monster(monster) => Some(monster),
            _ => None,
        }
    }

    pub fn monster_mut(&mut self) -> Option<&mut Monster> {
        match &mut self.kind {
            EntityKind::Monster(monster) => Some(monster),
            _ => None,
        }
    }
}

/// A slain monster waiting to return at its spawn point.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PendingRespawn {
    pub species: Species,
    pub personality: Personality,
    pub spawn_point: Pos,
    pub due_round: u64,
}

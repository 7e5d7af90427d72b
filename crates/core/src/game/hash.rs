//! Stable state hashing for determinism checks.
//! Entities are hashed in roster order by position and content, never by slotmap key, so a
//! restored snapshot hashes the same as the game it came from.

use std::hash::Hasher;

use xxhash_rust::xxh3::Xxh3;

use super::Game;
use crate::agent::Behavior;
use crate::combat::CombatStats;
use crate::entity::{EntityKind, Monster};
use crate::quest::QuestStatus;
use crate::scheduler::Phase;
use crate::types::{Pos, RunOutcome};

impl Game {
    pub fn snapshot_hash(&self) -> u64 {
        let mut hasher = Xxh3::new();
        hasher.write_u64(self.seed);
        hasher.write_u64(self.round);
        hasher.write_u64(self.rng.draws());
        hasher.write_u64(self.next_input_seq);
        hasher.write_u32(self.world.narrative_progress());
        hasher.write_u8(match self.scheduler.phase() {
            Phase::Player => 0,
            Phase::Monster => 1,
            Phase::Suspended { .. } => 2,
        });
        hasher.write_u8(match self.outcome {
            None => 0,
            Some(RunOutcome::Defeat) => 1,
        });

        for entity in self.world.roster() {
            write_pos(&mut hasher, entity.pos());
            match &entity.kind {
                EntityKind::Player { stats } => {
                    hasher.write_u8(0);
                    write_stats(&mut hasher, stats);
                }
                EntityKind::Monster(monster) => {
                    hasher.write_u8(1);
                    write_monster(&mut hasher, monster);
                }
                EntityKind::Npc { name } => {
                    hasher.write_u8(2);
                    hasher.write(name.as_bytes());
                }
                EntityKind::Obstacle => hasher.write_u8(3),
                EntityKind::Remains { species } => {
                    hasher.write_u8(4);
                    hasher.write_u8(*species as u8);
                }
            }
        }

        for pos in self.world.grid().positions() {
            if let Ok(tile) = self.world.grid().tile_at(pos) {
                for item in tile.items() {
                    write_pos(&mut hasher, pos);
                    hasher.write(item.name.as_bytes());
                }
            }
        }
        for item in &self.inventory {
            hasher.write(item.name.as_bytes());
        }
        for respawn in self.world.pending_respawns() {
            hasher.write_u8(respawn.species as u8);
            write_pos(&mut hasher, respawn.spawn_point);
            hasher.write_u64(respawn.due_round);
        }
        for quest in self.quests.quests() {
            hasher.write_u8(match quest.status {
                QuestStatus::NotStarted => 0,
                QuestStatus::InProgress => 1,
                QuestStatus::Completed => 2,
                QuestStatus::Failed => 3,
            });
            for condition in &quest.conditions {
                hasher.write_u32(condition.current());
            }
        }
        hasher.finish()
    }
}

fn write_pos(hasher: &mut Xxh3, pos: Pos) {
    hasher.write_i32(pos.x);
    hasher.write_i32(pos.y);
}

fn write_stats(hasher: &mut Xxh3, stats: &CombatStats) {
    hasher.write_i32(stats.max_hp());
    hasher.write_i32(stats.hp());
    hasher.write_i32(stats.armor());
    hasher.write_i32(stats.base_damage());
    hasher.write_i32(stats.max_damage());
    hasher.write_u32(stats.max_ap());
    hasher.write_u32(stats.ap());
}

fn write_monster(hasher: &mut Xxh3, monster: &Monster) {
    hasher.write_u8(monster.species as u8);
    hasher.write_u8(monster.personality.temperament() as u8);
    write_stats(hasher, &monster.stats);
    match &monster.behavior {
        Behavior::Standard(_) => hasher.write_u8(0),
        Behavior::Berserker(inner) => {
            hasher.write_u8(1);
            hasher.write_u32(inner.triggers());
        }
        Behavior::LureBound(inner) => {
            hasher.write_u8(2);
            hasher.write_u8(u8::from(inner.is_transformed()));
        }
        Behavior::PassiveDrainer(inner) => {
            hasher.write_u8(3);
            hasher.write_u8(u8::from(inner.is_pacified()));
        }
    }
    hasher.write_u8(u8::from(monster.resolve.is_fleeing()));
    hasher.write_u32(monster.resolve.flee_threshold().to_bits());
    hasher.write_u8(u8::from(monster.hostile));
    hasher.write_u32(monster.dialogue_chance.to_bits());
    hasher.write_u32(monster.dialogue_cooldown);
    hasher.write_u32(monster.shout_cooldown);
    hasher.write_u8(u8::from(monster.oracle_driven));
    write_pos(hasher, monster.spawn_point);
}

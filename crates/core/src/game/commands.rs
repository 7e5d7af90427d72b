//! Player commands.
//! Moves and attacks are AP-gated; a gate that fails leaves the world untouched and is not an
//! error. Errors are reserved for commands issued in the wrong phase.

use tracing::debug;

use super::Game;
use crate::agent::{Behavior, BehaviorKind, Reaction, Strategy};
use crate::combat::{StrikeOptions, strike};
use crate::entity::PendingRespawn;
use crate::error::GameError;
use crate::scheduler::Phase;
use crate::types::{DialogueOutcome, Direction, EntityId, LogEvent, PlayerCommand};

impl Game {
    pub fn apply(&mut self, command: PlayerCommand) -> Result<(), GameError> {
        if self.outcome.is_some() {
            return Err(GameError::RunFinished);
        }
        match command {
            PlayerCommand::Move(direction) => {
                self.require_player_phase()?;
                self.player_move(direction);
            }
            PlayerCommand::Attack(direction) => {
                self.require_player_phase()?;
                self.player_attack(direction);
            }
            PlayerCommand::EndTurn => {
                self.scheduler.end_turn(&mut self.world, &self.config, &mut self.log)?;
            }
            PlayerCommand::ConcludeDialogue(outcome) => self.conclude_dialogue(outcome)?,
        }
        debug!(seq = self.next_input_seq, ?command, "command applied");
        self.next_input_seq += 1;
        Ok(())
    }

    fn require_player_phase(&self) -> Result<(), GameError> {
        if self.scheduler.phase() == Phase::Player {
            Ok(())
        } else {
            Err(GameError::NotPlayerPhase)
        }
    }

    fn player_move(&mut self, direction: Direction) {
        let to = self.world.player_pos().step(direction);
        if !self.world.grid().is_walkable(to) {
            return;
        }
        if !self.world.player_stats_mut().spend_ap(self.config.move_cost) {
            return;
        }
        let player = self.world.player_id();
        self.world.move_entity(player, to);
        self.log.push(LogEvent::Moved { entity: player, to });
        for item in self.world.take_items(to) {
            self.log.push(LogEvent::ItemPickedUp { name: item.name.clone() });
            self.inventory.push(item);
        }
    }

    fn player_attack(&mut self, direction: Direction) {
        let at = self.world.player_pos().step(direction);
        let Some(target) = self.world.grid().blocker_at(at) else {
            return;
        };
        if !self.world.monster(target).is_some_and(|monster| monster.stats.is_alive()) {
            return;
        }
        if !self.world.player_stats_mut().spend_ap(self.config.attack_cost) {
            return;
        }
        let attacker = self.world.player_stats().clone();
        let player = self.world.player_id();
        let monster = self.world.monster_mut(target);
        let result = strike(
            &attacker,
            &mut monster.stats,
            StrikeOptions::default(),
            &self.config,
            &mut self.rng,
        );
        let dealt = result.outcome.dealt();
        self.log.push(LogEvent::Attacked {
            attacker: player,
            target,
            damage: dealt,
            critical: result.critical,
        });

        if result.outcome.is_kill() {
            self.on_monster_killed(target);
            return;
        }
        if monster.behavior.kind() != BehaviorKind::PassiveDrainer {
            monster.hostile = true;
        }
        let reaction =
            monster.behavior.on_damaged(dealt, &mut monster.stats, &self.config, &mut self.rng);
        if let Some(Reaction::Rage { healed }) = reaction {
            self.log.push(LogEvent::BerserkerRage { entity: target, healed });
        }
    }

    fn on_monster_killed(&mut self, target: EntityId) {
        let Some(slain) = self.world.kill(target) else {
            return;
        };
        self.quests.notify_kill(slain.species);
        self.log.push(LogEvent::EntityKilled { entity: target, species: Some(slain.species) });
        if self.config.respawn_after_rounds > 0 {
            self.world.schedule_respawn(PendingRespawn {
                species: slain.species,
                personality: slain.personality,
                spawn_point: slain.spawn_point,
                due_round: self.round + u64::from(self.config.respawn_after_rounds),
            });
        }
    }

    /// Ends a suspended monster phase. Provoking a lure-bound monster transforms it; a
    /// peaceful end advances the narrative counter spirits listen to. Spirits keep their own
    /// hostility: a pacified one stays pacified whatever the outcome.
    fn conclude_dialogue(&mut self, outcome: DialogueOutcome) -> Result<(), GameError> {
        let speaker = self.scheduler.conclude_dialogue(&mut self.log)?;
        match outcome {
            DialogueOutcome::Provoked => {
                if self.world.monster(speaker).is_some() {
                    let monster = self.world.monster_mut(speaker);
                    if monster.behavior.kind() != BehaviorKind::PassiveDrainer {
                        monster.hostile = true;
                    }
                    if let Behavior::LureBound(lure) = &mut monster.behavior
                        && lure.transform(&mut monster.stats, self.config.lure_transform_multiplier)
                    {
                        self.log.push(LogEvent::LureTransformed { entity: speaker });
                    }
                }
            }
            DialogueOutcome::Peaceful => {
                let progress = self.world.advance_narrative();
                debug!(progress, "narrative advanced");
            }
        }
        self.log.push(LogEvent::DialogueConcluded { entity: speaker, outcome });
        Ok(())
    }
}

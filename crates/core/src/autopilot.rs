//! Greedy player policy for headless runs.
//! Strikes an adjacent monster, otherwise walks toward the closest live monster, otherwise
//! ends the turn. Conversations end peacefully except with lure-bound monsters, which get
//! provoked. Tools and tests use it to produce reproducible command streams.

use crate::agent::BehaviorKind;
use crate::game::Game;
use crate::pathfinding::find_path;
use crate::scheduler::Phase;
use crate::spatial::manhattan;
use crate::types::{DialogueOutcome, Direction, PlayerCommand};

pub fn next_command(game: &Game) -> PlayerCommand {
    let world = game.world();
    if let Phase::Suspended { resume_after, .. } = game.phase() {
        let provoke = world
            .monster(resume_after)
            .is_some_and(|monster| monster.behavior.kind() == BehaviorKind::LureBound);
        let outcome = if provoke { DialogueOutcome::Provoked } else { DialogueOutcome::Peaceful };
        return PlayerCommand::ConcludeDialogue(outcome);
    }

    let config = game.config();
    let player = world.player_pos();
    let ap = world.player_stats().ap();
    if ap >= config.attack_cost {
        for direction in Direction::ALL {
            let target = world.grid().blocker_at(player.step(direction));
            if target
                .and_then(|id| world.monster(id))
                .is_some_and(|monster| monster.stats.is_alive())
            {
                return PlayerCommand::Attack(direction);
            }
        }
    }

    if ap >= config.move_cost {
        let nearest = world
            .roster()
            .filter(|entity| entity.monster().is_some() && entity.is_alive())
            .min_by_key(|entity| (manhattan(player, entity.pos()), entity.pos()));
        if let Some(entity) = nearest
            && let Some(step) = find_path(world.grid(), player, entity.pos()).first()
            && let Some(direction) = Direction::between(player, *step)
        {
            return PlayerCommand::Move(direction);
        }
    }
    PlayerCommand::EndTurn
}

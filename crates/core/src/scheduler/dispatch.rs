//! Carries out a chosen action against the world.
//! Every branch checks its preconditions and the AP gate before mutating anything, so a
//! failed action is a clean no-op.

use tracing::debug;

use super::TurnDeps;
use crate::clock::AnimationHandle;
use crate::combat::{Heal, StrikeOptions, resolve_attack, roll_damage, strike};
use crate::content::species_profile;
use crate::pathfinding::{find_path, find_path_onto, flee_step, wander_step};
use crate::spatial::{is_adjacent, is_grove_edge, nearest_matching_tile};
use crate::types::{ActionTag, EntityId, LogEvent, Pos};
use crate::world::World;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) enum Dispatched {
    NoOp,
    Spent,
    Struck(AnimationHandle),
    Dialogue,
}

pub(super) fn dispatch(
    world: &mut World,
    id: EntityId,
    action: ActionTag,
    deps: &mut TurnDeps<'_>,
    log: &mut Vec<LogEvent>,
) -> Dispatched {
    let Some(position) = world.entity(id).map(|entity| entity.pos()) else {
        return Dispatched::NoOp;
    };
    let target = world.player_pos();
    let grid = world.grid();

    let outcome = match action {
        ActionTag::Flee => {
            let next = flee_step(grid, position, target);
            step(world, id, next, deps, log)
        }
        ActionTag::Approach => {
            let next = find_path(grid, position, target).first().copied();
            let outcome = step(world, id, next, deps, log);
            if outcome == Dispatched::Spent {
                request_shout(world, id, "closes in", deps);
            }
            outcome
        }
        ActionTag::Wander => {
            let next = wander_step(grid, position, deps.rolls);
            step(world, id, next, deps, log)
        }
        ActionTag::SeekFeature => {
            let next = nearest_matching_tile(grid, position, is_grove_edge)
                .filter(|feature| *feature != position)
                .and_then(|feature| find_path_onto(grid, position, feature).first().copied());
            step(world, id, next, deps, log)
        }
        ActionTag::Attack => {
            let outcome = attack(world, id, position, target, deps, log);
            if matches!(outcome, Dispatched::Struck(_)) {
                request_shout(world, id, "attacks", deps);
            }
            outcome
        }
        ActionTag::MoveTo => {
            if is_adjacent(position, target) {
                drain(world, id, deps, log)
            } else {
                let next = find_path(grid, position, target).first().copied();
                step(world, id, next, deps, log)
            }
        }
        ActionTag::Talk => {
            world.monster_mut(id).dialogue_cooldown = deps.config.dialogue_cooldown;
            Dispatched::Dialogue
        }
        ActionTag::None => Dispatched::NoOp,
    };
    if outcome == Dispatched::NoOp && action != ActionTag::None {
        debug!(entity = ?id, ?action, "action had nothing to do");
    }
    outcome
}

fn step(
    world: &mut World,
    id: EntityId,
    next: Option<Pos>,
    deps: &TurnDeps<'_>,
    log: &mut Vec<LogEvent>,
) -> Dispatched {
    let Some(next) = next.filter(|pos| world.grid().is_walkable(*pos)) else {
        return Dispatched::NoOp;
    };
    if !world.monster_mut(id).stats.spend_ap(deps.config.move_cost) {
        return Dispatched::NoOp;
    }
    world.move_entity(id, next);
    log.push(LogEvent::Moved { entity: id, to: next });
    Dispatched::Spent
}

fn attack(
    world: &mut World,
    id: EntityId,
    position: Pos,
    target: Pos,
    deps: &mut TurnDeps<'_>,
    log: &mut Vec<LogEvent>,
) -> Dispatched {
    if !is_adjacent(position, target) || !world.player_stats().is_alive() {
        return Dispatched::NoOp;
    }
    let monster = world.monster_mut(id);
    if !monster.stats.spend_ap(deps.config.attack_cost) {
        return Dispatched::NoOp;
    }
    let attacker = monster.stats.clone();
    let options = StrikeOptions {
        crit_scale: monster.personality.crit_scale(),
        ignore_armor: false,
    };
    let player = world.player_id();
    let result = strike(&attacker, world.player_stats_mut(), options, deps.config, deps.rolls);
    let handle = deps.animations.start_attack_animation(id, player);
    log.push(LogEvent::Attacked {
        attacker: id,
        target: player,
        damage: result.outcome.dealt(),
        critical: result.critical,
    });
    if result.outcome.is_kill() {
        log.push(LogEvent::EntityKilled { entity: player, species: None });
    }
    Dispatched::Struck(handle)
}

/// Contact drain: ignores armor and heals the drainer by what it took.
fn drain(
    world: &mut World,
    id: EntityId,
    deps: &mut TurnDeps<'_>,
    log: &mut Vec<LogEvent>,
) -> Dispatched {
    if !world.player_stats().is_alive() {
        return Dispatched::NoOp;
    }
    let monster = world.monster_mut(id);
    if !monster.stats.spend_ap(deps.config.attack_cost) {
        return Dispatched::NoOp;
    }
    let roll = roll_damage(&monster.stats, deps.config, deps.rolls);
    let damage = resolve_attack(roll, 0, true);
    let player = world.player_id();
    let outcome = world.player_stats_mut().take_damage(damage);
    world.monster_mut(id).stats.heal(Heal::Amount(outcome.dealt()));
    log.push(LogEvent::Drained { drainer: id, target: player, amount: outcome.dealt() });
    if outcome.is_kill() {
        log.push(LogEvent::EntityKilled { entity: player, species: None });
    }
    Dispatched::Spent
}

fn request_shout(world: &mut World, id: EntityId, verb: &str, deps: &TurnDeps<'_>) {
    let Some(shouts) = deps.shouts else {
        return;
    };
    let monster = world.monster_mut(id);
    if monster.shout_cooldown > 0 {
        return;
    }
    monster.shout_cooldown = deps.config.shout_cooldown;
    let prompt = format!(
        "A {:?} {} {verb}. One short battle cry.",
        monster.personality.temperament(),
        species_profile(monster.species).name,
    );
    shouts.request_shout(id, prompt);
}

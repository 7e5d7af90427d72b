//! Deterministic movement primitives and shortest-path helpers.
//! This module exists so navigation rules are reusable by the scheduler and every behavior.
//! It does not cache anything: the grid mutates between calls, so each search starts fresh.

use std::collections::{BTreeMap, BTreeSet};

use crate::grid::Grid;
use crate::rolls::RollSource;
use crate::spatial::manhattan;
use crate::types::Pos;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
struct OpenNode {
    f: u32,
    h: u32,
    y: i32,
    x: i32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Arrival {
    /// Stop on any tile orthogonally adjacent to the goal; the goal itself is never entered.
    Adjacent,
    /// Stop on the goal tile, which must be walkable.
    OnGoal,
}

/// Shortest 4-directional path from `start` to a tile adjacent to `goal`.
///
/// The returned steps exclude `start` and end next to `goal`. An empty result means there is
/// nothing to walk: either no route exists or `start` is already adjacent.
pub fn find_path(grid: &Grid, start: Pos, goal: Pos) -> Vec<Pos> {
    astar(grid, start, goal, Arrival::Adjacent)
}

/// Shortest path that ends on `goal` itself. Empty when unreachable or already there.
pub fn find_path_onto(grid: &Grid, start: Pos, goal: Pos) -> Vec<Pos> {
    if !grid.is_walkable(goal) {
        return Vec::new();
    }
    astar(grid, start, goal, Arrival::OnGoal)
}

fn astar(grid: &Grid, start: Pos, goal: Pos, arrival: Arrival) -> Vec<Pos> {
    if !grid.in_bounds(start) || !grid.in_bounds(goal) {
        return Vec::new();
    }
    let heuristic = |p: Pos| match arrival {
        Arrival::Adjacent => manhattan(p, goal).saturating_sub(1),
        Arrival::OnGoal => manhattan(p, goal),
    };
    let arrived = |p: Pos| match arrival {
        Arrival::Adjacent => manhattan(p, goal) == 1,
        Arrival::OnGoal => p == goal,
    };

    let mut open_set = BTreeSet::new();
    let mut open_entries: BTreeMap<Pos, OpenNode> = BTreeMap::new();
    let mut came_from: BTreeMap<Pos, Pos> = BTreeMap::new();
    let mut g_score: BTreeMap<Pos, u32> = BTreeMap::new();

    let start_h = heuristic(start);
    let start_node = OpenNode { f: start_h, h: start_h, y: start.y, x: start.x };
    open_set.insert(start_node);
    open_entries.insert(start, start_node);
    g_score.insert(start, 0);

    while let Some(current_node) = open_set.pop_first() {
        let current = Pos { y: current_node.y, x: current_node.x };
        open_entries.remove(&current);

        if arrived(current) {
            return reconstruct_path(&came_from, start, current);
        }

        let current_g = g_score.get(&current).copied().unwrap_or(u32::MAX);
        if current_g == u32::MAX {
            continue;
        }

        for neighbor in grid.neighbors4(current) {
            let tentative_g = current_g.saturating_add(1);
            let existing_g = g_score.get(&neighbor).copied().unwrap_or(u32::MAX);
            if tentative_g >= existing_g {
                continue;
            }

            if let Some(existing_node) = open_entries.remove(&neighbor) {
                open_set.remove(&existing_node);
            }

            came_from.insert(neighbor, current);
            g_score.insert(neighbor, tentative_g);

            let h = heuristic(neighbor);
            let node = OpenNode { f: tentative_g.saturating_add(h), h, y: neighbor.y, x: neighbor.x };
            open_set.insert(node);
            open_entries.insert(neighbor, node);
        }
    }

    Vec::new()
}

fn reconstruct_path(came_from: &BTreeMap<Pos, Pos>, start: Pos, end: Pos) -> Vec<Pos> {
    let mut path = vec![end];
    let mut current = end;

    while current != start {
        let Some(prev) = came_from.get(&current).copied() else {
            return Vec::new();
        };
        current = prev;
        path.push(current);
    }

    path.reverse();
    path.remove(0);
    path
}

/// One step that does not bring `from` closer to `threat`, preferring the largest gain.
/// Ties keep neighbor order. `None` when every walkable neighbor closes the distance.
pub fn flee_step(grid: &Grid, from: Pos, threat: Pos) -> Option<Pos> {
    let current_distance = manhattan(from, threat);
    let mut best_step: Option<(Pos, u32)> = None;
    for candidate in grid.neighbors4(from) {
        let candidate_distance = manhattan(candidate, threat);
        let better = match best_step {
            None => true,
            Some((_, best_distance)) => candidate_distance > best_distance,
        };
        if better {
            best_step = Some((candidate, candidate_distance));
        }
    }
    best_step.filter(|(_, distance)| *distance >= current_distance).map(|(pos, _)| pos)
}

/// A uniformly chosen walkable neighbor.
pub fn wander_step(grid: &Grid, from: Pos, rolls: &mut dyn RollSource) -> Option<Pos> {
    let options = grid.neighbors4(from);
    if options.is_empty() {
        return None;
    }
    let pick = rolls.range_inclusive(0, options.len() as i32 - 1) as usize;
    options.get(pick).copied()
}

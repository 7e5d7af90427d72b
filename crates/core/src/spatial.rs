//! Distance metrics and neighborhood queries over the grid.
//! Radius checks (aggro, conversation, `entities_in_radius`) use Euclidean distance between
//! tile centers; adjacency and movement use Manhattan distance because steps are orthogonal.

use std::collections::{BTreeSet, VecDeque};

use crate::grid::Grid;
use crate::types::{EntityId, Pos, TileKind};

pub fn manhattan(a: Pos, b: Pos) -> u32 {
    a.x.abs_diff(b.x) + a.y.abs_diff(b.y)
}

pub fn euclidean(a: Pos, b: Pos) -> f32 {
    let dx = (a.x - b.x) as f32;
    let dy = (a.y - b.y) as f32;
    (dx * dx + dy * dy).sqrt()
}

pub fn is_adjacent(a: Pos, b: Pos) -> bool {
    manhattan(a, b) == 1
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Nearby {
    pub id: EntityId,
    pub pos: Pos,
    pub distance: f32,
}

/// Every entity, blocking or not, within Euclidean distance `radius` of `center`, nearest
/// first. Ties break on position then tile order, so consumers see a stable sequence.
pub fn entities_in_radius(grid: &Grid, center: Pos, radius: f32) -> Vec<Nearby> {
    if radius < 0.0 {
        return Vec::new();
    }
    let reach = radius.floor() as i32;
    let mut found = Vec::new();
    for y in (center.y - reach)..=(center.y + reach) {
        for x in (center.x - reach)..=(center.x + reach) {
            let pos = Pos { y, x };
            let Ok(tile) = grid.tile_at(pos) else {
                continue;
            };
            let distance = euclidean(center, pos);
            if distance > radius {
                continue;
            }
            for id in tile.blocker().into_iter().chain(tile.residents().iter().copied()) {
                found.push(Nearby { id, pos, distance });
            }
        }
    }
    found.sort_by(|a, b| a.distance.total_cmp(&b.distance).then_with(|| a.pos.cmp(&b.pos)));
    found
}

/// Breadth-first search over walkable tiles for the closest tile matching `predicate`.
/// `from` itself qualifies even when occupied by the searcher. Ties resolve in
/// neighbor order (up, right, down, left).
pub fn nearest_matching_tile(
    grid: &Grid,
    from: Pos,
    mut predicate: impl FnMut(&Grid, Pos) -> bool,
) -> Option<Pos> {
    if !grid.in_bounds(from) {
        return None;
    }
    let mut visited = BTreeSet::from([from]);
    let mut queue = VecDeque::from([from]);
    while let Some(current) = queue.pop_front() {
        if predicate(grid, current) {
            return Some(current);
        }
        for next in grid.neighbors4(current) {
            if visited.insert(next) {
                queue.push_back(next);
            }
        }
    }
    None
}

/// A passable tile orthogonally touching at least one tree.
pub fn is_grove_edge(grid: &Grid, pos: Pos) -> bool {
    grid.terrain(pos).is_some_and(TileKind::is_passable)
        && [(-1, 0), (0, 1), (1, 0), (0, -1)]
            .iter()
            .any(|(dy, dx)| grid.terrain(Pos { y: pos.y + dy, x: pos.x + dx }) == Some(TileKind::Tree))
}

//! Static tile map with per-tile occupancy and ground items.
//! This module exists so passability and occupancy have one owner with bounds-checked access.
//! It does not own the entity roster; `World` keeps both sides of the cross-reference in sync.

use std::mem;

use serde::{Deserialize, Serialize};

use crate::error::GridError;
use crate::types::{Direction, EntityId, Pos, TileKind};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroundItem {
    pub name: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Tile {
    pub terrain: TileKind,
    blocker: Option<EntityId>,
    residents: Vec<EntityId>,
    items: Vec<GroundItem>,
}

impl Tile {
    fn new(terrain: TileKind) -> Self {
        Self { terrain, blocker: None, residents: Vec::new(), items: Vec::new() }
    }

    pub fn blocker(&self) -> Option<EntityId> {
        self.blocker
    }

    /// Non-blocking entities standing here, such as remains.
    pub fn residents(&self) -> &[EntityId] {
        &self.residents
    }

    /// Ground items in drop order.
    pub fn items(&self) -> &[GroundItem] {
        &self.items
    }

    pub fn is_occupied(&self) -> bool {
        self.blocker.is_some()
    }
}

#[derive(Clone, Debug)]
pub struct Grid {
    width: usize,
    height: usize,
    tiles: Vec<Tile>,
}

impl Grid {
    pub fn new(width: usize, height: usize, fill: TileKind) -> Self {
        Self { width, height, tiles: vec![Tile::new(fill); width * height] }
    }

    /// Builds a grid from ASCII rows: `.` grass, `,` path, `"` forest, `T` tree, `~` water,
    /// `#` wall. Any other character is grass.
    pub fn from_rows(rows: &[&str]) -> Self {
        let height = rows.len();
        let width = rows.iter().map(|row| row.chars().count()).max().unwrap_or(0);
        let mut grid = Grid::new(width, height, TileKind::Wall);
        for (y, row) in rows.iter().enumerate() {
            for (x, ch) in row.chars().enumerate() {
                let kind = match ch {
                    ',' => TileKind::Path,
                    '"' => TileKind::Forest,
                    'T' => TileKind::Tree,
                    '~' => TileKind::Water,
                    '#' => TileKind::Wall,
                    _ => TileKind::Grass,
                };
                grid.set_terrain(Pos { y: y as i32, x: x as i32 }, kind);
            }
        }
        grid
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn in_bounds(&self, pos: Pos) -> bool {
        pos.x >= 0 && pos.y >= 0 && (pos.x as usize) < self.width && (pos.y as usize) < self.height
    }

    pub fn tile_at(&self, pos: Pos) -> Result<&Tile, GridError> {
        if !self.in_bounds(pos) {
            return Err(self.out_of_bounds(pos));
        }
        Ok(&self.tiles[self.index(pos)])
    }

    /// Terrain write used while building a map.
    ///
    /// # Panics
    /// Panics when `pos` is outside the grid; writes are never clamped.
    pub fn set_terrain(&mut self, pos: Pos, terrain: TileKind) {
        let idx = self.checked_index(pos);
        self.tiles[idx].terrain = terrain;
    }

    pub fn terrain(&self, pos: Pos) -> Option<TileKind> {
        self.tile_at(pos).ok().map(|tile| tile.terrain)
    }

    /// Passable terrain with no blocking entity. Out-of-bounds tiles are never walkable.
    pub fn is_walkable(&self, pos: Pos) -> bool {
        self.tile_at(pos).is_ok_and(|tile| tile.terrain.is_passable() && tile.blocker.is_none())
    }

    /// Walkable orthogonal neighbors in the fixed order up, right, down, left.
    pub fn neighbors4(&self, pos: Pos) -> Vec<Pos> {
        Direction::ALL.into_iter().map(|dir| pos.step(dir)).filter(|n| self.is_walkable(*n)).collect()
    }

    pub fn blocker_at(&self, pos: Pos) -> Option<EntityId> {
        self.tile_at(pos).ok().and_then(Tile::blocker)
    }

    pub fn positions(&self) -> impl Iterator<Item = Pos> + '_ {
        (0..self.height).flat_map(move |y| {
            (0..self.width).map(move |x| Pos { y: y as i32, x: x as i32 })
        })
    }

    pub fn place_item(&mut self, pos: Pos, item: GroundItem) {
        let idx = self.checked_index(pos);
        self.tiles[idx].items.push(item);
    }

    pub fn take_items(&mut self, pos: Pos) -> Vec<GroundItem> {
        if !self.in_bounds(pos) {
            return Vec::new();
        }
        let idx = self.index(pos);
        mem::take(&mut self.tiles[idx].items)
    }

    pub(crate) fn occupy(&mut self, pos: Pos, id: EntityId, blocking: bool) {
        let idx = self.checked_index(pos);
        let tile = &mut self.tiles[idx];
        if blocking {
            assert!(
                tile.blocker.is_none(),
                "tile ({}, {}) already holds a blocking entity",
                pos.x,
                pos.y
            );
            tile.blocker = Some(id);
        } else {
            tile.residents.push(id);
        }
    }

    pub(crate) fn vacate(&mut self, pos: Pos, id: EntityId) {
        let idx = self.checked_index(pos);
        let tile = &mut self.tiles[idx];
        if tile.blocker == Some(id) {
            tile.blocker = None;
        } else {
            tile.residents.retain(|resident| *resident != id);
        }
    }

    fn checked_index(&self, pos: Pos) -> usize {
        if let Err(err) = self.tile_at(pos) {
            panic!("grid write rejected: {err}");
        }
        self.index(pos)
    }

    fn index(&self, pos: Pos) -> usize {
        (pos.y as usize) * self.width + (pos.x as usize)
    }

    fn out_of_bounds(&self, pos: Pos) -> GridError {
        GridError::OutOfBounds { pos, width: self.width, height: self.height }
    }
}

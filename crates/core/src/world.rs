//! Owner of the grid and the entity roster.
//! This module exists so tile occupancy and the flat roster are always changed together.
//! It does not decide anything; callers choose what to spawn, move and kill.

use std::mem;

use slotmap::SlotMap;
use tracing::debug;

use crate::agent::Behavior;
use crate::combat::CombatStats;
use crate::content::{player_stats, species_profile};
use crate::entity::{Entity, EntityKind, Monster, PendingRespawn};
use crate::grid::{Grid, GroundItem};
use crate::personality::{Personality, Resolve};
use crate::types::{EntityId, Pos, Species};

#[derive(Clone, Debug)]
pub struct World {
    grid: Grid,
    entities: SlotMap<EntityId, Entity>,
    order: Vec<EntityId>,
    player_id: EntityId,
    narrative_progress: u32,
    respawns: Vec<PendingRespawn>,
}

/// What `kill` left behind.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Slain {
    pub species: Species,
    pub personality: Personality,
    pub pos: Pos,
    pub spawn_point: Pos,
    pub remains: EntityId,
}

impl World {
    pub fn new(grid: Grid, player_pos: Pos) -> Self {
        Self::with_player_stats(grid, player_pos, player_stats())
    }

    pub fn with_player_stats(grid: Grid, player_pos: Pos, stats: CombatStats) -> Self {
        let mut world = Self {
            grid,
            entities: SlotMap::with_key(),
            order: Vec::new(),
            player_id: EntityId::default(),
            narrative_progress: 0,
            respawns: Vec::new(),
        };
        world.player_id = world.insert(player_pos, EntityKind::Player { stats });
        world
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn player_id(&self) -> EntityId {
        self.player_id
    }

    pub fn player_pos(&self) -> Pos {
        self.entity_ref(self.player_id).pos
    }

    pub fn player_stats(&self) -> &CombatStats {
        match &self.entity_ref(self.player_id).kind {
            EntityKind::Player { stats } => stats,
            _ => panic!("player slot holds a non-player entity"),
        }
    }

    pub fn player_stats_mut(&mut self) -> &mut CombatStats {
        let player_id = self.player_id;
        match &mut self.entity_mut_ref(player_id).kind {
            EntityKind::Player { stats } => stats,
            _ => panic!("player slot holds a non-player entity"),
        }
    }

    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(id)
    }

    pub fn monster(&self, id: EntityId) -> Option<&Monster> {
        self.entities.get(id).and_then(Entity::monster)
    }

    /// Mutable monster access for an id the caller knows is live.
    ///
    /// # Panics
    /// Panics when `id` was despawned or is not a monster; acting through a stale id is a
    /// caller bug, not a runtime condition.
    pub fn monster_mut(&mut self, id: EntityId) -> &mut Monster {
        match self.entities.get_mut(id).and_then(Entity::monster_mut) {
            Some(monster) => monster,
            None => panic!("entity {id:?} is not a live monster"),
        }
    }

    /// A monster together with read access to the grid it stands on.
    pub(crate) fn monster_on_grid(&mut self, id: EntityId) -> Option<(&Grid, Pos, &mut Monster)> {
        let entity = self.entities.get_mut(id)?;
        let pos = entity.pos;
        let monster = entity.monster_mut()?;
        Some((&self.grid, pos, monster))
    }

    /// Entities in stable roster (spawn) order.
    pub fn roster(&self) -> impl Iterator<Item = &Entity> + '_ {
        self.order.iter().filter_map(|id| self.entities.get(*id))
    }

    pub fn monster_ids(&self) -> Vec<EntityId> {
        self.roster().filter(|entity| entity.monster().is_some()).map(|entity| entity.id).collect()
    }

    pub fn narrative_progress(&self) -> u32 {
        self.narrative_progress
    }

    pub fn advance_narrative(&mut self) -> u32 {
        self.narrative_progress += 1;
        self.narrative_progress
    }

    pub fn spawn_monster(&mut self, species: Species, personality: Personality, pos: Pos) -> EntityId {
        let profile = species_profile(species);
        let mut stats = profile.stats();
        let mods = personality.modifiers();
        stats.scale(mods.hp, mods.damage, mods.armor);
        let monster = Monster {
            species,
            personality,
            stats,
            behavior: Behavior::new(profile.behavior),
            resolve: Resolve::new(personality.flee_threshold()),
            hostile: true,
            dialogue_chance: (profile.dialogue_chance * personality.dialogue_propensity())
                .clamp(0.0, 1.0),
            dialogue_cooldown: 0,
            shout_cooldown: 0,
            oracle_driven: false,
            spawn_point: pos,
        };
        let id = self.insert(pos, EntityKind::Monster(Box::new(monster)));
        debug!(?id, ?species, x = pos.x, y = pos.y, "monster spawned");
        id
    }

    /// Inserts an already-built monster, as snapshot restore does.
    pub fn insert_monster(&mut self, monster: Monster, pos: Pos) -> EntityId {
        self.insert(pos, EntityKind::Monster(Box::new(monster)))
    }

    pub fn spawn_npc(&mut self, name: &str, pos: Pos) -> EntityId {
        self.insert(pos, EntityKind::Npc { name: name.to_string() })
    }

    pub fn spawn_obstacle(&mut self, pos: Pos) -> EntityId {
        self.insert(pos, EntityKind::Obstacle)
    }

    pub fn spawn_remains(&mut self, species: Species, pos: Pos) -> EntityId {
        self.insert(pos, EntityKind::Remains { species })
    }

    /// Moves a blocking entity onto a walkable tile. Returns false and changes nothing when the
    /// destination is not walkable.
    pub fn move_entity(&mut self, id: EntityId, to: Pos) -> bool {
        if !self.grid.is_walkable(to) {
            return false;
        }
        let entity = self.entity_mut_ref(id);
        let from = entity.pos;
        let blocking = entity.is_blocking();
        entity.pos = to;
        self.grid.vacate(from, id);
        self.grid.occupy(to, id, blocking);
        true
    }

    /// Removes a monster and leaves remains plus any loot on its tile.
    /// Returns `None` when `id` is not a monster.
    pub fn kill(&mut self, id: EntityId) -> Option<Slain> {
        let entity = self.entities.get(id)?;
        let monster = entity.monster()?;
        let (species, personality, spawn_point, pos) =
            (monster.species, monster.personality, monster.spawn_point, entity.pos);
        self.despawn(id);
        let remains = self.spawn_remains(species, pos);
        if let Some(loot) = species_profile(species).loot {
            self.grid.place_item(pos, GroundItem { name: loot.to_string() });
        }
        debug!(?id, ?species, "monster slain");
        Some(Slain { species, personality, pos, spawn_point, remains })
    }

    /// Removes an entity from both the grid and the roster. The player cannot be despawned.
    pub fn despawn(&mut self, id: EntityId) -> bool {
        if id == self.player_id {
            return false;
        }
        let Some(entity) = self.entities.remove(id) else {
            return false;
        };
        self.grid.vacate(entity.pos, id);
        self.order.retain(|other| *other != id);
        true
    }

    pub fn place_item(&mut self, pos: Pos, item: GroundItem) {
        self.grid.place_item(pos, item);
    }

    pub fn take_items(&mut self, pos: Pos) -> Vec<GroundItem> {
        self.grid.take_items(pos)
    }

    pub fn schedule_respawn(&mut self, respawn: PendingRespawn) {
        self.respawns.push(respawn);
    }

    pub fn pending_respawns(&self) -> &[PendingRespawn] {
        &self.respawns
    }

    /// Spawns every due respawn whose spawn tile is walkable; the rest wait for a later round.
    pub fn process_respawns(&mut self, round: u64) -> Vec<(EntityId, Species)> {
        let mut spawned = Vec::new();
        let mut waiting = Vec::new();
        for respawn in mem::take(&mut self.respawns) {
            if respawn.due_round <= round && self.grid.is_walkable(respawn.spawn_point) {
                let id = self.spawn_monster(respawn.species, respawn.personality, respawn.spawn_point);
                spawned.push((id, respawn.species));
            } else {
                waiting.push(respawn);
            }
        }
        self.respawns = waiting;
        spawned
    }

    pub(crate) fn set_narrative_progress(&mut self, progress: u32) {
        self.narrative_progress = progress;
    }

    /// # Panics
    /// Panics when `pos` is not walkable; spawning into a wall or onto another blocker is a
    /// caller bug.
    fn insert(&mut self, pos: Pos, kind: EntityKind) -> EntityId {
        let blocking = !matches!(kind, EntityKind::Remains { .. });
        if blocking {
            assert!(self.grid.is_walkable(pos), "cannot spawn onto tile ({}, {})", pos.x, pos.y);
        }
        let id = self.entities.insert_with_key(|id| Entity { id, pos, kind });
        self.grid.occupy(pos, id, blocking);
        self.order.push(id);
        id
    }

    fn entity_ref(&self, id: EntityId) -> &Entity {
        match self.entities.get(id) {
            Some(entity) => entity,
            None => panic!("entity {id:?} is not in the roster"),
        }
    }

    fn entity_mut_ref(&mut self, id: EntityId) -> &mut Entity {
        match self.entities.get_mut(id) {
            Some(entity) => entity,
            None => panic!("entity {id:?} is not in the roster"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::personality::Temperament;
    use crate::types::TileKind;

    fn open_world() -> World {
        World::new(Grid::new(6, 6, TileKind::Grass), Pos { y: 0, x: 0 })
    }

    #[test]
    fn spawn_applies_personality_modifiers_once() {
        let mut world = open_world();
        let id = world.spawn_monster(
            Species::Bandit,
            Personality::preset(Temperament::Stoic),
            Pos { y: 2, x: 2 },
        );
        let monster = world.monster(id).expect("monster");
        // Bandit 14 HP, armor 1; stoic x1.2 both.
        assert_eq!(monster.stats.max_hp(), 17);
        assert_eq!(monster.stats.armor(), 1);
        assert_eq!(world.grid().blocker_at(Pos { y: 2, x: 2 }), Some(id));
    }

    #[test]
    fn move_keeps_grid_and_roster_in_sync() {
        let mut world = open_world();
        let id = world.spawn_monster(
            Species::Goblin,
            Personality::preset(Temperament::Balanced),
            Pos { y: 2, x: 2 },
        );
        assert!(world.move_entity(id, Pos { y: 2, x: 3 }));
        assert_eq!(world.entity(id).expect("alive").pos(), Pos { y: 2, x: 3 });
        assert_eq!(world.grid().blocker_at(Pos { y: 2, x: 2 }), None);
        assert_eq!(world.grid().blocker_at(Pos { y: 2, x: 3 }), Some(id));
        let player = world.player_id();
        assert!(!world.move_entity(id, world.player_pos()), "occupied tile is refused");
        assert_eq!(world.grid().blocker_at(Pos { y: 0, x: 0 }), Some(player));
    }

    #[test]
    fn kill_leaves_non_blocking_remains_and_loot() {
        let mut world = open_world();
        let pos = Pos { y: 3, x: 3 };
        let id = world.spawn_monster(Species::Wolf, Personality::preset(Temperament::Balanced), pos);
        let slain = world.kill(id).expect("monster killed");
        assert_eq!(slain.species, Species::Wolf);
        assert!(world.entity(id).is_none());
        assert!(world.grid().is_walkable(pos), "remains do not block");
        assert!(matches!(
            world.entity(slain.remains).map(|e| &e.kind),
            Some(EntityKind::Remains { species: Species::Wolf })
        ));
        assert_eq!(world.take_items(pos)[0].name, "wolf pelt");
        assert_eq!(world.kill(slain.remains), None, "remains cannot be killed");
    }

    #[test]
    fn respawn_waits_for_a_free_spawn_point() {
        let mut world = open_world();
        let spawn = Pos { y: 4, x: 4 };
        world.schedule_respawn(PendingRespawn {
            species: Species::Goblin,
            personality: Personality::preset(Temperament::Balanced),
            spawn_point: spawn,
            due_round: 3,
        });
        assert!(world.process_respawns(2).is_empty());
        let blocker = world.spawn_obstacle(spawn);
        assert!(world.process_respawns(3).is_empty());
        assert_eq!(world.pending_respawns().len(), 1);
        world.despawn(blocker);
        let spawned = world.process_respawns(4);
        assert_eq!(spawned.len(), 1);
        assert_eq!(world.grid().blocker_at(spawn), Some(spawned[0].0));
    }

    #[test]
    fn roster_order_is_spawn_order() {
        let mut world = open_world();
        let personality = Personality::preset(Temperament::Balanced);
        let a = world.spawn_monster(Species::Goblin, personality, Pos { y: 5, x: 5 });
        let b = world.spawn_monster(Species::Wolf, personality, Pos { y: 1, x: 1 });
        let c = world.spawn_monster(Species::Wisp, personality, Pos { y: 3, x: 0 });
        world.despawn(b);
        assert_eq!(world.monster_ids(), vec![a, c]);
    }

    #[test]
    #[should_panic(expected = "is not a live monster")]
    fn acting_through_a_despawned_id_panics() {
        let mut world = open_world();
        let id = world.spawn_monster(
            Species::Goblin,
            Personality::preset(Temperament::Balanced),
            Pos { y: 1, x: 1 },
        );
        world.despawn(id);
        world.monster_mut(id).stats.take_damage(1);
    }

    #[test]
    #[should_panic(expected = "cannot spawn onto tile")]
    fn spawning_into_a_wall_panics() {
        let mut grid = Grid::new(3, 3, TileKind::Grass);
        grid.set_terrain(Pos { y: 1, x: 1 }, TileKind::Wall);
        let mut world = World::new(grid, Pos { y: 0, x: 0 });
        world.spawn_obstacle(Pos { y: 1, x: 1 });
    }
}

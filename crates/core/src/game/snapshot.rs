//! Plain-data snapshots of a run, taken between rounds.
//! This module exists so a session can be saved and resumed without exposing slotmap keys or
//! private invariants: every record here is public data, and restoring goes back through the
//! checked constructors. It does not pick a file format; callers serialize with serde.

use serde::{Deserialize, Serialize};

use crate::agent::{Behavior, Berserker, LureBound, PassiveDrainer, Standard};
use crate::combat::CombatStats;
use crate::config::BalanceConfig;
use crate::entity::{EntityKind, Monster, PendingRespawn};
use crate::error::SnapshotError;
use crate::grid::{Grid, GroundItem};
use crate::personality::{Personality, Resolve};
use crate::quest::{Quest, QuestCondition, QuestLog, QuestStatus};
use crate::rolls::SessionRng;
use crate::scheduler::Phase;
use crate::types::{Pos, RunOutcome, Species, TileKind};
use crate::world::World;

use super::Game;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameSnapshot {
    pub seed: u64,
    pub rng_draws: u64,
    pub round: u64,
    pub next_input_seq: u64,
    pub narrative_progress: u32,
    pub outcome: Option<RunOutcome>,
    pub grid: GridSnapshot,
    /// Roster order; the player is always first.
    pub entities: Vec<EntitySnapshot>,
    pub respawns: Vec<PendingRespawn>,
    pub inventory: Vec<GroundItem>,
    pub quests: Vec<QuestSnapshot>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridSnapshot {
    pub width: usize,
    pub height: usize,
    /// Row-major terrain.
    pub terrain: Vec<TileKind>,
    pub items: Vec<(Pos, GroundItem)>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsSnapshot {
    pub max_hp: i32,
    pub hp: i32,
    pub armor: i32,
    pub base_damage: i32,
    pub max_damage: i32,
    pub max_ap: u32,
    pub ap: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BehaviorSnapshot {
    Standard,
    Berserker { triggers: u32 },
    LureBound { transformed: bool },
    PassiveDrainer { pacified: bool },
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct MonsterSnapshot {
    pub species: Species,
    pub personality: Personality,
    pub stats: StatsSnapshot,
    pub behavior: BehaviorSnapshot,
    pub fleeing: bool,
    pub flee_threshold: f32,
    pub hostile: bool,
    pub dialogue_chance: f32,
    pub dialogue_cooldown: u32,
    pub shout_cooldown: u32,
    pub oracle_driven: bool,
    pub spawn_point: Pos,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum EntitySnapshot {
    Player { pos: Pos, stats: StatsSnapshot },
    Monster { pos: Pos, monster: MonsterSnapshot },
    Npc { pos: Pos, name: String },
    Obstacle { pos: Pos },
    Remains { pos: Pos, species: Species },
}

impl EntitySnapshot {
    fn pos(&self) -> Pos {
        match self {
            EntitySnapshot::Player { pos, .. }
            | EntitySnapshot::Monster { pos, .. }
            | EntitySnapshot::Npc { pos, .. }
            | EntitySnapshot::Obstacle { pos }
            | EntitySnapshot::Remains { pos, .. } => *pos,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestSnapshot {
    pub name: String,
    pub status: QuestStatus,
    pub conditions: Vec<ConditionSnapshot>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConditionSnapshot {
    pub description: String,
    pub tags: Vec<String>,
    pub required: u32,
    pub current: u32,
}

impl Game {
    /// Captures the run. Only allowed in the player phase, when no monster is mid-turn.
    pub fn snapshot(&self) -> Result<GameSnapshot, SnapshotError> {
        if self.phase() != Phase::Player {
            return Err(SnapshotError::NotAtPlayerPhase);
        }
        let world = self.world();
        Ok(GameSnapshot {
            seed: self.seed(),
            rng_draws: self.rng.draws(),
            round: self.round(),
            next_input_seq: self.next_input_seq,
            narrative_progress: world.narrative_progress(),
            outcome: self.outcome(),
            grid: grid_snapshot(world.grid()),
            entities: world.roster().map(|entity| entity_snapshot(entity.pos(), &entity.kind)).collect(),
            respawns: world.pending_respawns().to_vec(),
            inventory: self.inventory().to_vec(),
            quests: self.quests().quests().iter().map(quest_snapshot).collect(),
        })
    }

    /// Rebuilds a run in its player phase. Oracle and shout collaborators are not part of a
    /// snapshot; attach them again with `with_oracle` / `with_shouts`.
    pub fn restore(snapshot: &GameSnapshot, config: BalanceConfig) -> Result<Game, SnapshotError> {
        let grid = restore_grid(&snapshot.grid)?;
        let Some((EntitySnapshot::Player { pos, stats }, rest)) = snapshot.entities.split_first()
        else {
            return Err(SnapshotError::MissingPlayer);
        };
        check_placement(&grid, 0, *pos, true)?;
        let mut world = World::with_player_stats(grid, *pos, restore_stats(stats));

        for (offset, entity) in rest.iter().enumerate() {
            let index = offset + 1;
            let blocking = !matches!(entity, EntitySnapshot::Remains { .. });
            check_placement(world.grid(), index, entity.pos(), blocking)?;
            match entity {
                EntitySnapshot::Player { .. } => return Err(SnapshotError::MissingPlayer),
                EntitySnapshot::Monster { pos, monster } => {
                    world.insert_monster(restore_monster(monster), *pos);
                }
                EntitySnapshot::Npc { pos, name } => {
                    world.spawn_npc(name, *pos);
                }
                EntitySnapshot::Obstacle { pos } => {
                    world.spawn_obstacle(*pos);
                }
                EntitySnapshot::Remains { pos, species } => {
                    world.spawn_remains(*species, *pos);
                }
            }
        }
        world.set_narrative_progress(snapshot.narrative_progress);
        for respawn in &snapshot.respawns {
            world.schedule_respawn(*respawn);
        }

        let mut quests = QuestLog::default();
        for quest in &snapshot.quests {
            quests.add(restore_quest(quest));
        }

        let rng = SessionRng::resume(snapshot.seed, snapshot.rng_draws);
        let mut game = Game::from_parts(rng, config, world, quests);
        game.round = snapshot.round;
        game.next_input_seq = snapshot.next_input_seq;
        game.outcome = snapshot.outcome;
        game.inventory = snapshot.inventory.clone();
        Ok(game)
    }
}

fn grid_snapshot(grid: &Grid) -> GridSnapshot {
    let mut terrain = Vec::with_capacity(grid.width() * grid.height());
    let mut items = Vec::new();
    for pos in grid.positions() {
        if let Ok(tile) = grid.tile_at(pos) {
            terrain.push(tile.terrain);
            items.extend(tile.items().iter().map(|item| (pos, item.clone())));
        }
    }
    GridSnapshot { width: grid.width(), height: grid.height(), terrain, items }
}

fn restore_grid(snapshot: &GridSnapshot) -> Result<Grid, SnapshotError> {
    let (width, height) = (snapshot.width, snapshot.height);
    if width.checked_mul(height) != Some(snapshot.terrain.len()) {
        return Err(SnapshotError::TileCountMismatch { tiles: snapshot.terrain.len(), width, height });
    }
    let mut grid = Grid::new(width, height, TileKind::Grass);
    let positions: Vec<Pos> = grid.positions().collect();
    for (pos, terrain) in positions.into_iter().zip(&snapshot.terrain) {
        grid.set_terrain(pos, *terrain);
    }
    for (index, (pos, item)) in snapshot.items.iter().enumerate() {
        if !grid.in_bounds(*pos) {
            return Err(SnapshotError::InvalidPlacement { index, pos: *pos });
        }
        grid.place_item(*pos, item.clone());
    }
    Ok(grid)
}

fn check_placement(grid: &Grid, index: usize, pos: Pos, blocking: bool) -> Result<(), SnapshotError> {
    let valid = if blocking { grid.is_walkable(pos) } else { grid.in_bounds(pos) };
    if valid { Ok(()) } else { Err(SnapshotError::InvalidPlacement { index, pos }) }
}

fn entity_snapshot(pos: Pos, kind: &EntityKind) -> EntitySnapshot {
    match kind {
        EntityKind::Player { stats } => EntitySnapshot::Player { pos, stats: stats_snapshot(stats) },
        EntityKind::Monster(monster) => {
            EntitySnapshot::Monster { pos, monster: monster_snapshot(monster) }
        }
        EntityKind::Npc { name } => EntitySnapshot::Npc { pos, name: name.clone() },
        EntityKind::Obstacle => EntitySnapshot::Obstacle { pos },
        EntityKind::Remains { species } => EntitySnapshot::Remains { pos, species: *species },
    }
}

fn stats_snapshot(stats: &CombatStats) -> StatsSnapshot {
    StatsSnapshot {
        max_hp: stats.max_hp(),
        hp: stats.hp(),
        armor: stats.armor(),
        base_damage: stats.base_damage(),
        max_damage: stats.max_damage(),
        max_ap: stats.max_ap(),
        ap: stats.ap(),
    }
}

fn restore_stats(stats: &StatsSnapshot) -> CombatStats {
    CombatStats::restore(
        stats.max_hp,
        stats.hp,
        stats.armor,
        stats.base_damage,
        stats.max_damage,
        stats.max_ap,
        stats.ap,
    )
}

fn monster_snapshot(monster: &Monster) -> MonsterSnapshot {
    let behavior = match &monster.behavior {
        Behavior::Standard(_) => BehaviorSnapshot::Standard,
        Behavior::Berserker(inner) => BehaviorSnapshot::Berserker { triggers: inner.triggers() },
        Behavior::LureBound(inner) => {
            BehaviorSnapshot::LureBound { transformed: inner.is_transformed() }
        }
        Behavior::PassiveDrainer(inner) => {
            BehaviorSnapshot::PassiveDrainer { pacified: inner.is_pacified() }
        }
    };
    MonsterSnapshot {
        species: monster.species,
        personality: monster.personality,
        stats: stats_snapshot(&monster.stats),
        behavior,
        fleeing: monster.resolve.is_fleeing(),
        flee_threshold: monster.resolve.flee_threshold(),
        hostile: monster.hostile,
        dialogue_chance: monster.dialogue_chance,
        dialogue_cooldown: monster.dialogue_cooldown,
        shout_cooldown: monster.shout_cooldown,
        oracle_driven: monster.oracle_driven,
        spawn_point: monster.spawn_point,
    }
}

fn restore_monster(snapshot: &MonsterSnapshot) -> Monster {
    let behavior = match snapshot.behavior {
        BehaviorSnapshot::Standard => Behavior::Standard(Standard),
        BehaviorSnapshot::Berserker { triggers } => Behavior::Berserker(Berserker::restore(triggers)),
        BehaviorSnapshot::LureBound { transformed } => {
            Behavior::LureBound(LureBound::restore(transformed))
        }
        BehaviorSnapshot::PassiveDrainer { pacified } => {
            Behavior::PassiveDrainer(PassiveDrainer::restore(pacified))
        }
    };
    Monster {
        species: snapshot.species,
        personality: snapshot.personality,
        stats: restore_stats(&snapshot.stats),
        behavior,
        resolve: Resolve::restore(snapshot.fleeing, snapshot.flee_threshold),
        hostile: snapshot.hostile,
        dialogue_chance: snapshot.dialogue_chance.clamp(0.0, 1.0),
        dialogue_cooldown: snapshot.dialogue_cooldown,
        shout_cooldown: snapshot.shout_cooldown,
        oracle_driven: snapshot.oracle_driven,
        spawn_point: snapshot.spawn_point,
    }
}

fn quest_snapshot(quest: &Quest) -> QuestSnapshot {
    QuestSnapshot {
        name: quest.name.clone(),
        status: quest.status,
        conditions: quest
            .conditions
            .iter()
            .map(|condition| ConditionSnapshot {
                description: condition.description.clone(),
                tags: condition.tags.clone(),
                required: condition.required,
                current: condition.current(),
            })
            .collect(),
    }
}

fn restore_quest(snapshot: &QuestSnapshot) -> Quest {
    let conditions = snapshot
        .conditions
        .iter()
        .map(|condition| {
            let tags: Vec<&str> = condition.tags.iter().map(String::as_str).collect();
            let mut restored =
                QuestCondition::new(&condition.description, &tags, condition.required);
            restored.restore_progress(condition.current);
            restored
        })
        .collect();
    let mut quest = Quest::new(&snapshot.name, conditions);
    quest.status = snapshot.status;
    quest
}

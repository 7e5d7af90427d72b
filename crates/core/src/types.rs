use serde::{Deserialize, Serialize};
use slotmap::new_key_type;

new_key_type! {
    pub struct EntityId;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Pos {
    pub y: i32,
    pub x: i32,
}

impl Pos {
    pub fn step(self, direction: Direction) -> Pos {
        let (dy, dx) = direction.offset();
        Pos { y: self.y + dy, x: self.x + dx }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Right,
    Down,
    Left,
}

impl Direction {
    pub const ALL: [Direction; 4] =
        [Direction::Up, Direction::Right, Direction::Down, Direction::Left];

    pub fn offset(self) -> (i32, i32) {
        match self {
            Direction::Up => (-1, 0),
            Direction::Right => (0, 1),
            Direction::Down => (1, 0),
            Direction::Left => (0, -1),
        }
    }

    /// Direction of a single orthogonal step, if `to` is 4-adjacent to `from`.
    pub fn between(from: Pos, to: Pos) -> Option<Direction> {
        Direction::ALL.into_iter().find(|dir| from.step(*dir) == to)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TileKind {
    Grass,
    Path,
    Forest,
    Tree,
    Water,
    Wall,
}

impl TileKind {
    pub fn is_passable(self) -> bool {
        matches!(self, TileKind::Grass | TileKind::Path | TileKind::Forest)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Species {
    Goblin,
    Wolf,
    Bandit,
    OrcBerserker,
    Dryad,
    Wisp,
}

/// One action chosen by a monster for a single scheduler opportunity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionTag {
    Flee,
    Attack,
    Approach,
    Wander,
    Talk,
    /// Lure-bound monsters walking back to their grove.
    SeekFeature,
    /// Drain-on-contact pursuit used by passive spirits.
    MoveTo,
    None,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DialogueOutcome {
    Peaceful,
    Provoked,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerCommand {
    Move(Direction),
    Attack(Direction),
    EndTurn,
    ConcludeDialogue(DialogueOutcome),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunOutcome {
    Defeat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PhaseKind {
    Player,
    Monster,
    Dialogue,
}

#[derive(Clone, Debug, PartialEq)]
pub enum LogEvent {
    PhaseChanged { phase: PhaseKind },
    MonsterActed { entity: EntityId, action: ActionTag },
    Moved { entity: EntityId, to: Pos },
    Attacked { attacker: EntityId, target: EntityId, damage: i32, critical: bool },
    Drained { drainer: EntityId, target: EntityId, amount: i32 },
    EntityKilled { entity: EntityId, species: Option<Species> },
    FleeStarted { entity: EntityId },
    ResolveRecovered { entity: EntityId, flee_threshold: f32 },
    DialogueStarted { entity: EntityId },
    DialogueConcluded { entity: EntityId, outcome: DialogueOutcome },
    BerserkerRage { entity: EntityId, healed: i32 },
    GroveRegrowth { entity: EntityId },
    LureTransformed { entity: EntityId },
    SpiritPacified { entity: EntityId },
    OracleFallback { entity: EntityId },
    Shout { entity: EntityId, text: String },
    Respawned { entity: EntityId, species: Species },
    ItemPickedUp { name: String },
}

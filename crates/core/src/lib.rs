pub mod agent;
pub mod autopilot;
pub mod clock;
pub mod combat;
pub mod config;
pub mod content;
pub mod entity;
pub mod error;
pub mod game;
pub mod grid;
pub mod journal;
pub mod journal_file;
pub mod pathfinding;
pub mod personality;
pub mod quest;
pub mod replay;
pub mod rolls;
pub mod scenario;
pub mod scheduler;
pub mod shout;
pub mod spatial;
pub mod types;
pub mod world;

#[cfg(test)]
mod test_support;

pub use config::BalanceConfig;
pub use game::{Game, GameSnapshot};
pub use journal::{InputJournal, InputRecord};
pub use replay::*;
pub use scheduler::{Phase, TickOutcome};
pub use types::*;

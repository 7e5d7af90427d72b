use std::io;

use thiserror::Error;

use crate::types::Pos;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GridError {
    #[error("tile ({}, {}) is outside the {width}x{height} grid", .pos.x, .pos.y)]
    OutOfBounds { pos: Pos, width: usize, height: usize },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read balance config")]
    Io(#[from] io::Error),
    #[error("failed to parse balance config")]
    Parse(#[from] toml::de::Error),
    #[error("invalid balance value `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    #[error("command requires the player phase")]
    NotPlayerPhase,
    #[error("no dialogue is pending")]
    NoDialoguePending,
    #[error("the run has already ended")]
    RunFinished,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SnapshotError {
    #[error("snapshots can only be taken or restored at a player-phase boundary")]
    NotAtPlayerPhase,
    #[error("snapshot tile count {tiles} does not match {width}x{height}")]
    TileCountMismatch { tiles: usize, width: usize, height: usize },
    #[error("snapshot has no player entity")]
    MissingPlayer,
    #[error("snapshot places entity {index} on invalid tile ({}, {})", .pos.x, .pos.y)]
    InvalidPlacement { index: usize, pos: Pos },
}

#[derive(Debug, Error)]
pub enum JournalError {
    #[error("journal i/o failed")]
    Io(#[from] io::Error),
    #[error("journal json is malformed")]
    Json(#[from] serde_json::Error),
    #[error("unsupported journal format version {0}")]
    UnsupportedVersion(u16),
    #[error("journal file is empty")]
    EmptyFile,
    #[error("invalid journal header at line {line}: {message}")]
    InvalidHeader { line: usize, message: String },
    #[error("invalid journal record at line {line}: {message}")]
    InvalidRecord { line: usize, message: String },
    #[error("incomplete journal line at line {line}")]
    IncompleteLine { line: usize },
    #[error("journal hash chain broken at line {line}")]
    HashChainBroken { line: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReplayError {
    #[error("input {seq} was rejected: {source}")]
    Rejected { seq: u64, source: GameError },
    #[error("monster phase did not finish within {0} ticks")]
    Stalled(u32),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OracleError {
    #[error("decision oracle is unavailable: {0}")]
    Unavailable(String),
    #[error("decision oracle answered with an unusable action: {0}")]
    Unparseable(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShoutError {
    #[error("shout generation failed: {0}")]
    Generation(String),
}

//! Append-only JSONL journal with a SHA-256 hash chain for crash recovery.
//!
//! The file format is line-delimited JSON (`.jsonl`):
//! - Line 1: header with `format_version` and `seed`.
//! - Lines 2+: one record per accepted player command, carrying the round it was issued in
//!   and a hash chain (`prev_sha256_hex`, `sha256_hex`).
//!
//! Every append is flushed immediately. Loading validates each line's shape and the chain,
//! stopping at the first invalid or incomplete line.

use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::JournalError;
use crate::journal::{InputJournal, InputRecord, JOURNAL_FORMAT_VERSION};
use crate::types::PlayerCommand;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
struct FileHeader {
    format_version: u16,
    seed: u64,
}

/// Canonical hash input for one record.
#[derive(Serialize)]
struct RecordBody<'a> {
    seq: u64,
    round: u64,
    command: &'a PlayerCommand,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
struct FileRecord {
    seq: u64,
    round: u64,
    command: PlayerCommand,
    prev_sha256_hex: String,
    sha256_hex: String,
}

const INITIAL_HASH: &str = "0000000000000000000000000000000000000000000000000000000000000000";

/// `hex(SHA-256(body_json || prev_sha256_hex))`
fn chain_hash(body_json: &str, prev_sha256_hex: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(body_json.as_bytes());
    hasher.update(prev_sha256_hex.as_bytes());
    format!("{:064x}", hasher.finalize())
}

pub struct JournalWriter {
    writer: BufWriter<File>,
    last_sha256_hex: String,
    next_seq: u64,
}

impl JournalWriter {
    /// Creates the file and writes the header line.
    pub fn create(path: &Path, seed: u64) -> Result<Self, JournalError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut writer = BufWriter::new(File::create(path)?);
        let header = FileHeader { format_version: JOURNAL_FORMAT_VERSION, seed };
        writeln!(writer, "{}", serde_json::to_string(&header)?)?;
        writer.flush()?;
        Ok(Self { writer, last_sha256_hex: INITIAL_HASH.to_string(), next_seq: 0 })
    }

    /// Continues an existing file from the state `load_journal_from_file` reported.
    pub fn resume(path: &Path, loaded: &LoadedJournal) -> Result<Self, JournalError> {
        let file = OpenOptions::new().append(true).open(path)?;
        Ok(Self {
            writer: BufWriter::new(file),
            last_sha256_hex: loaded.last_sha256_hex.clone(),
            next_seq: loaded.next_seq,
        })
    }

    pub fn next_seq(&self) -> u64 {
        self.next_seq
    }

    pub fn append(&mut self, round: u64, command: &PlayerCommand) -> Result<u64, JournalError> {
        let seq = self.next_seq;
        let body_json = serde_json::to_string(&RecordBody { seq, round, command })?;
        let sha256_hex = chain_hash(&body_json, &self.last_sha256_hex);
        let record = FileRecord {
            seq,
            round,
            command: *command,
            prev_sha256_hex: self.last_sha256_hex.clone(),
            sha256_hex: sha256_hex.clone(),
        };
        writeln!(self.writer, "{}", serde_json::to_string(&record)?)?;
        self.writer.flush()?;

        self.last_sha256_hex = sha256_hex;
        self.next_seq += 1;
        Ok(seq)
    }
}

#[derive(Debug)]
pub struct LoadedJournal {
    pub journal: InputJournal,
    /// Round each record was issued in, parallel to `journal.inputs`.
    pub rounds: Vec<u64>,
    pub last_sha256_hex: String,
    pub next_seq: u64,
}

pub fn load_journal_from_file(path: &Path) -> Result<LoadedJournal, JournalError> {
    let content = fs::read_to_string(path)?;
    let lines: Vec<&str> = content.lines().collect();
    if lines.is_empty() {
        return Err(JournalError::EmptyFile);
    }
    if !content.ends_with('\n') {
        return Err(JournalError::IncompleteLine { line: lines.len() });
    }

    let header: FileHeader = serde_json::from_str(lines[0])
        .map_err(|e| JournalError::InvalidHeader { line: 1, message: e.to_string() })?;
    if header.format_version != JOURNAL_FORMAT_VERSION {
        return Err(JournalError::UnsupportedVersion(header.format_version));
    }

    let mut journal = InputJournal::new(header.seed);
    let mut rounds = Vec::new();
    let mut prev_sha256_hex = INITIAL_HASH.to_string();
    let mut next_seq = 0_u64;

    for (index, line) in lines.iter().enumerate().skip(1) {
        let line_number = index + 1;
        let invalid = |message: String| JournalError::InvalidRecord { line: line_number, message };
        if line.is_empty() {
            return Err(invalid("empty line".to_string()));
        }
        let record: FileRecord = serde_json::from_str(line).map_err(|e| invalid(e.to_string()))?;
        if record.seq != next_seq {
            return Err(invalid(format!("expected seq {next_seq}, found {}", record.seq)));
        }
        if record.prev_sha256_hex != prev_sha256_hex {
            return Err(JournalError::HashChainBroken { line: line_number });
        }
        let body = RecordBody { seq: record.seq, round: record.round, command: &record.command };
        let body_json = serde_json::to_string(&body).map_err(|e| invalid(e.to_string()))?;
        if record.sha256_hex != chain_hash(&body_json, &prev_sha256_hex) {
            return Err(JournalError::HashChainBroken { line: line_number });
        }

        journal.inputs.push(InputRecord { seq: record.seq, command: record.command });
        rounds.push(record.round);
        prev_sha256_hex = record.sha256_hex;
        next_seq += 1;
    }

    Ok(LoadedJournal { journal, rounds, last_sha256_hex: prev_sha256_hex, next_seq })
}

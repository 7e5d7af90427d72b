//! In-memory record of every accepted player command.
//! This module exists so a run can be reproduced from its seed plus the commands the player
//! issued. It does not replay anything; see `replay`.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::JournalError;
use crate::types::PlayerCommand;

pub const JOURNAL_FORMAT_VERSION: u16 = 1;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputJournal {
    pub format_version: u16,
    pub seed: u64,
    pub inputs: Vec<InputRecord>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputRecord {
    pub seq: u64,
    pub command: PlayerCommand,
}

impl InputJournal {
    pub fn new(seed: u64) -> Self {
        Self { format_version: JOURNAL_FORMAT_VERSION, seed, inputs: Vec::new() }
    }

    /// Appends with the next sequence number and returns it.
    pub fn append(&mut self, command: PlayerCommand) -> u64 {
        let seq = self.inputs.last().map_or(0, |record| record.seq + 1);
        self.inputs.push(InputRecord { seq, command });
        seq
    }

    pub fn to_json(&self) -> Result<String, JournalError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(source: &str) -> Result<Self, JournalError> {
        let journal: InputJournal = serde_json::from_str(source)?;
        if journal.format_version != JOURNAL_FORMAT_VERSION {
            return Err(JournalError::UnsupportedVersion(journal.format_version));
        }
        Ok(journal)
    }

    pub fn save(&self, path: &Path) -> Result<(), JournalError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, self.to_json()?)?;
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self, JournalError> {
        Self::from_json(&fs::read_to_string(path)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{DialogueOutcome, Direction};

    #[test]
    fn sequence_numbers_follow_the_last_record() {
        let mut journal = InputJournal::new(9);
        assert_eq!(journal.append(PlayerCommand::Move(Direction::Left)), 0);
        assert_eq!(journal.append(PlayerCommand::EndTurn), 1);
        assert_eq!(
            journal.append(PlayerCommand::ConcludeDialogue(DialogueOutcome::Peaceful)),
            2
        );
        let text = journal.to_json().unwrap();
        assert_eq!(InputJournal::from_json(&text).unwrap(), journal);
    }

    #[test]
    fn future_format_versions_are_refused() {
        let mut journal = InputJournal::new(1);
        journal.format_version = JOURNAL_FORMAT_VERSION + 1;
        let text = journal.to_json().unwrap();
        assert!(matches!(
            InputJournal::from_json(&text),
            Err(JournalError::UnsupportedVersion(version)) if version == JOURNAL_FORMAT_VERSION + 1
        ));
    }
}

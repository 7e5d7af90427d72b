//! Kill-driven quests.
//! The core only reports kills; the log decides which conditions they advance.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::content::species_profile;
use crate::types::Species;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum QuestStatus {
    NotStarted,
    InProgress,
    Completed,
    Failed,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestCondition {
    pub description: String,
    /// A kill counts when the slain species carries any of these tags.
    pub tags: Vec<String>,
    pub required: u32,
    current: u32,
}

impl QuestCondition {
    pub fn new(description: &str, tags: &[&str], required: u32) -> Self {
        Self {
            description: description.to_string(),
            tags: tags.iter().map(|tag| (*tag).to_string()).collect(),
            required,
            current: 0,
        }
    }

    pub fn current(&self) -> u32 {
        self.current
    }

    pub fn is_met(&self) -> bool {
        self.current >= self.required
    }

    fn matches(&self, species_tags: &[&str]) -> bool {
        self.tags.iter().any(|tag| species_tags.contains(&tag.as_str()))
    }

    fn record(&mut self) {
        self.current = (self.current + 1).min(self.required);
    }

    pub(crate) fn restore_progress(&mut self, current: u32) {
        self.current = current.min(self.required);
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quest {
    pub name: String,
    pub status: QuestStatus,
    pub conditions: Vec<QuestCondition>,
}

impl Quest {
    pub fn new(name: &str, conditions: Vec<QuestCondition>) -> Self {
        Self { name: name.to_string(), status: QuestStatus::NotStarted, conditions }
    }

    pub fn is_completable(&self) -> bool {
        self.status == QuestStatus::InProgress && self.conditions.iter().all(QuestCondition::is_met)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct QuestId(pub usize);

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestLog {
    quests: Vec<Quest>,
}

impl QuestLog {
    pub fn add(&mut self, quest: Quest) -> QuestId {
        self.quests.push(quest);
        QuestId(self.quests.len() - 1)
    }

    pub fn quest(&self, id: QuestId) -> Option<&Quest> {
        self.quests.get(id.0)
    }

    pub fn quests(&self) -> &[Quest] {
        &self.quests
    }

    pub fn start(&mut self, id: QuestId) -> bool {
        match self.quests.get_mut(id.0) {
            Some(quest) if quest.status == QuestStatus::NotStarted => {
                quest.status = QuestStatus::InProgress;
                true
            }
            _ => false,
        }
    }

    /// Completes the quest only when every condition is met.
    pub fn try_complete(&mut self, id: QuestId) -> bool {
        match self.quests.get_mut(id.0) {
            Some(quest) if quest.is_completable() => {
                quest.status = QuestStatus::Completed;
                info!(quest = %quest.name, "quest completed");
                true
            }
            _ => false,
        }
    }

    pub fn fail(&mut self, id: QuestId) -> bool {
        match self.quests.get_mut(id.0) {
            Some(quest) if quest.status == QuestStatus::InProgress => {
                quest.status = QuestStatus::Failed;
                true
            }
            _ => false,
        }
    }

    /// Kill observer. Only quests in progress advance; progress never decreases.
    pub fn notify_kill(&mut self, species: Species) {
        let tags = species_profile(species).quest_tags;
        for quest in self.quests.iter_mut().filter(|q| q.status == QuestStatus::InProgress) {
            for condition in quest.conditions.iter_mut().filter(|c| c.matches(tags)) {
                condition.record();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cull_log() -> (QuestLog, QuestId) {
        let mut log = QuestLog::default();
        let id = log.add(Quest::new(
            "Cull the greenskins",
            vec![
                QuestCondition::new("slay greenskins", &["greenskin"], 2),
                QuestCondition::new("slay a beast", &["beast"], 1),
            ],
        ));
        (log, id)
    }

    #[test]
    fn kills_before_start_do_not_count() {
        let (mut log, id) = cull_log();
        log.notify_kill(Species::Goblin);
        log.start(id);
        assert_eq!(log.quest(id).expect("quest").conditions[0].current(), 0);
    }

    #[test]
    fn completion_requires_every_condition() {
        let (mut log, id) = cull_log();
        assert!(log.start(id));
        log.notify_kill(Species::Goblin);
        log.notify_kill(Species::OrcBerserker);
        log.notify_kill(Species::Goblin);
        assert!(!log.try_complete(id), "beast condition still open");
        assert_eq!(log.quest(id).expect("quest").conditions[0].current(), 2, "clamped");
        log.notify_kill(Species::Wolf);
        assert!(log.try_complete(id));
        assert_eq!(log.quest(id).expect("quest").status, QuestStatus::Completed);
        assert!(!log.fail(id), "completed quests cannot fail");
    }

    #[test]
    fn failed_quest_stops_progressing() {
        let (mut log, id) = cull_log();
        log.start(id);
        assert!(log.fail(id));
        log.notify_kill(Species::Wolf);
        assert_eq!(log.quest(id).expect("quest").conditions[1].current(), 0);
        assert!(!log.try_complete(id));
    }
}

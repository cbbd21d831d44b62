//! Capped, most-recent-first game log

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::core::types::Turn;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub turn: Turn,
    pub message: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameLog {
    entries: VecDeque<LogEntry>,
    capacity: usize,
}

impl GameLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Prepend an entry, dropping the oldest once over capacity
    pub fn push(&mut self, turn: Turn, message: impl Into<String>) {
        let message = message.into();
        tracing::debug!(turn, "{}", message);
        self.entries.push_front(LogEntry { turn, message });
        self.entries.truncate(self.capacity);
    }

    /// Entries, newest first
    pub fn entries(&self) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter()
    }

    pub fn latest(&self) -> Option<&LogEntry> {
        self.entries.front()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether any retained entry contains `needle`
    pub fn contains(&self, needle: &str) -> bool {
        self.entries.iter().any(|e| e.message.contains(needle))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_is_newest_first_and_capped() {
        let mut log = GameLog::new(3);
        for i in 0..5 {
            log.push(1, format!("entry {}", i));
        }
        let messages: Vec<_> = log.entries().map(|e| e.message.as_str()).collect();
        assert_eq!(messages, vec!["entry 4", "entry 3", "entry 2"]);
        assert_eq!(log.latest().map(|e| e.message.as_str()), Some("entry 4"));
    }
}

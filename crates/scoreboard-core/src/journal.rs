//! Timestamped lifecycle journal of a run.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::{Arc, Mutex, PoisonError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JournalEntry {
    pub at: DateTime<Utc>,
    pub message: String,
}

impl JournalEntry {
    /// `<rfc3339 timestamp> - <message>`
    pub fn line(&self) -> String {
        format!(
            "{} - {}",
            self.at.to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
            self.message
        )
    }
}

/// Shared, append-only list of lifecycle messages.
///
/// Lines are also emitted through `tracing` by the callers; the journal keeps
/// them for the report's execution log.
#[derive(Debug, Clone, Default)]
pub struct Journal {
    entries: Arc<Mutex<Vec<JournalEntry>>>,
}

impl Journal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, message: impl Into<String>) {
        let entry = JournalEntry {
            at: Utc::now(),
            message: message.into(),
        };
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(entry);
    }

    pub fn entries(&self) -> Vec<JournalEntry> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn lines(&self) -> Vec<String> {
        self.entries().iter().map(JournalEntry::line).collect()
    }

    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

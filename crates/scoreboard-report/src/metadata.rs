//! Run metadata shown in report headers.

use chrono::{DateTime, Utc};
use scoreboard_core::Scoreboard;
use serde::Serialize;
use std::fmt::Debug;
use uuid::Uuid;

/// Everything a report shows besides the ledger itself.
///
/// Rendering only reads this, so the same metadata and snapshot always give
/// the same output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunMetadata {
    pub run_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
    /// Execution log lines, oldest first.
    pub log: Vec<String>,
}

impl RunMetadata {
    /// Metadata with a fresh run id and nothing else.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            title: title.into(),
            description: None,
            started_at: None,
            finished_at: None,
            log: Vec::new(),
        }
    }

    /// Capture name, description, timestamps and journal of a scoreboard.
    pub fn from_scoreboard<T>(scoreboard: &Scoreboard<T>) -> Self
    where
        T: Debug + Send + Sync + 'static,
    {
        Self {
            run_id: Uuid::new_v4(),
            title: scoreboard.name().to_string(),
            description: scoreboard.description().map(str::to_string),
            started_at: scoreboard.started_at(),
            finished_at: scoreboard.finished_at(),
            log: scoreboard.journal().lines(),
        }
    }

    pub fn with_run_id(mut self, run_id: Uuid) -> Self {
        self.run_id = run_id;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_times(mut self, started_at: DateTime<Utc>, finished_at: DateTime<Utc>) -> Self {
        self.started_at = Some(started_at);
        self.finished_at = Some(finished_at);
        self
    }

    pub fn with_log(mut self, log: Vec<String>) -> Self {
        self.log = log;
        self
    }

    /// Wall-clock duration of the run, when both ends are known.
    pub fn duration(&self) -> Option<chrono::Duration> {
        Some(self.finished_at? - self.started_at?)
    }
}

pub(crate) fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}

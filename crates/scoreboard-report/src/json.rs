//! JSON rendering for CI tooling.

use crate::error::ReportError;
use crate::metadata::RunMetadata;
use crate::text::origin_of;
use chrono::{DateTime, Utc};
use scoreboard_core::{Counts, LedgerSnapshot, RunStatus, Side, Transaction, Verdict};
use serde::Serialize;
use std::fmt::Debug;

/// Serialized shape of a whole report.
#[derive(Debug, Serialize)]
pub struct JsonReport<'a> {
    pub run: &'a RunMetadata,
    pub status: RunStatus,
    pub counts: Counts,
    pub records: Vec<JsonRecord>,
}

/// One ledger record with payloads rendered through `Debug`.
#[derive(Debug, Serialize)]
pub struct JsonRecord {
    pub index: u64,
    pub verdict: Verdict,
    pub actual: Option<String>,
    pub expected: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unpaired_side: Option<Side>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    pub recorded_at: DateTime<Utc>,
}

/// Render the ledger as pretty-printed JSON.
pub fn render_json<T: Debug>(
    snapshot: &LedgerSnapshot<T>,
    metadata: &RunMetadata,
) -> Result<String, ReportError> {
    let records = snapshot
        .records()
        .iter()
        .map(|record| JsonRecord {
            index: record.index,
            verdict: record.verdict,
            actual: record.actual.as_ref().map(Transaction::describe),
            expected: record.expected.as_ref().map(Transaction::describe),
            unpaired_side: record.unpaired_side(),
            origin: if record.verdict.is_failure() {
                origin_of(record)
            } else {
                None
            },
            detail: record.detail.clone(),
            recorded_at: record.recorded_at,
        })
        .collect();

    let report = JsonReport {
        run: metadata,
        status: snapshot.status(),
        counts: snapshot.counts(),
        records,
    };
    let mut json = serde_json::to_string_pretty(&report)?;
    json.push('\n');
    Ok(json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use scoreboard_core::{Scoreboard, ScoreboardConfig, StopMode};

    #[tokio::test]
    async fn test_render_json() {
        let sb = Scoreboard::new(ScoreboardConfig::new("json")).unwrap();
        sb.start().unwrap();
        sb.submit_actual(Transaction::new(1)).await.unwrap();
        sb.submit_expected(Transaction::new(1)).await.unwrap();
        sb.submit_expected(Transaction::new(2)).await.unwrap();
        sb.stop(StopMode::Flush).await.unwrap();

        let json = render_json(&sb.snapshot(), &RunMetadata::new("json")).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["status"], "failed");
        assert_eq!(value["counts"]["total"], 2);
        assert_eq!(value["counts"]["unpaired"], 1);
        assert_eq!(value["run"]["title"], "json");
        assert_eq!(value["records"][0]["verdict"], "MATCH");
        assert_eq!(value["records"][0]["actual"], "1");
        assert!(value["records"][0].get("origin").is_none());
        assert_eq!(value["records"][1]["verdict"], "UNPAIRED");
        assert_eq!(value["records"][1]["unpaired_side"], "expected");
        assert!(value["records"][1]["actual"].is_null());
        assert_eq!(value["records"][1]["expected"], "2");
    }
}

//! Plain-text rendering.

use crate::metadata::{format_timestamp, RunMetadata};
use scoreboard_core::{LedgerSnapshot, ResultRecord, RunStatus, Transaction};
use std::fmt::Debug;

/// Render the ledger as plain text.
///
/// ```text
/// [uart] --- Scoreboard Report ---
/// #1: MATCH — actual="foo", expected="foo"
/// #2: MISMATCH — actual="bar", expected="baz"
///     Line: tests/uart.rs:42
/// Total=2, Matched=1, Mismatched=1, Unpaired=0, Faulted=0
/// [uart] TEST FAILED: 1 failing record(s).
/// ```
pub fn render_text<T: Debug>(snapshot: &LedgerSnapshot<T>, metadata: &RunMetadata) -> String {
    let title = &metadata.title;
    let mut output = format!("[{title}] --- Scoreboard Report ---\n");

    if let Some(description) = &metadata.description {
        output.push_str(&format!("Test Description: {description}\n"));
    }
    output.push_str(&format!("Run: {}\n", metadata.run_id));
    if let Some(started_at) = metadata.started_at {
        output.push_str(&format!("Started: {}\n", format_timestamp(started_at)));
    }
    if let Some(finished_at) = metadata.finished_at {
        output.push_str(&format!("Finished: {}\n", format_timestamp(finished_at)));
    }
    output.push('\n');

    for record in snapshot.records() {
        output.push_str(&record_line(record));
        output.push('\n');
        if let Some(detail) = &record.detail {
            output.push_str(&format!("    Error: {detail}\n"));
        }
        if record.verdict.is_failure() {
            if let Some(origin) = origin_of(record) {
                output.push_str(&format!("    Line: {origin}\n"));
            }
        }
    }

    let counts = snapshot.counts();
    output.push_str(&counts.summary_line());
    output.push('\n');
    output.push_str(&format!("[{title}] {}\n", status_line(counts.status(), counts.failures())));
    output.push_str(&format!("[{title}] ---------------------------\n"));
    output
}

/// `#<index>: <VERDICT> — actual=<repr>, expected=<repr>`
pub fn record_line<T: Debug>(record: &ResultRecord<T>) -> String {
    format!(
        "#{}: {} — actual={}, expected={}",
        record.index,
        record.verdict,
        describe(record.actual.as_ref()),
        describe(record.expected.as_ref()),
    )
}

fn status_line(status: RunStatus, failures: u64) -> String {
    match status {
        RunStatus::Passed => "TEST PASSED: No mismatches found.".to_string(),
        RunStatus::Failed => format!("TEST FAILED: {failures} failing record(s)."),
        RunStatus::NoComparisons => "WARNING: No comparisons were performed.".to_string(),
    }
}

pub(crate) fn describe<T: Debug>(transaction: Option<&Transaction<T>>) -> String {
    transaction
        .map(Transaction::describe)
        .unwrap_or_else(|| "<none>".to_string())
}

/// Creation site of the actual transaction, or the expected one when absent.
pub(crate) fn origin_of<T>(record: &ResultRecord<T>) -> Option<String> {
    record
        .actual
        .as_ref()
        .or(record.expected.as_ref())
        .map(|transaction| transaction.origin().to_string())
}

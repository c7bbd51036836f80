//! Integration tests for writing reports to files.
//!
//! These tests verify that:
//! 1. Reporting twice gives byte-identical output
//! 2. The file format follows the destination
//! 3. The returned status matches the ledger

use scoreboard_core::{RunStatus, Scoreboard, ScoreboardConfig, StopMode, Transaction};
use scoreboard_report::{report, Destination, ReportFormat, RunMetadata};

/// Helper to run the foo/bar scenario and return the finished scoreboard
async fn finished_scoreboard() -> Scoreboard<&'static str> {
    let sb = Scoreboard::new(
        ScoreboardConfig::new("files").with_description("report file tests"),
    )
    .unwrap();
    sb.start().unwrap();
    for (a, e) in [("foo", "foo"), ("bar", "baz")] {
        sb.submit_actual(Transaction::new(a)).await.unwrap();
        sb.submit_expected(Transaction::new(e)).await.unwrap();
    }
    sb.stop(StopMode::Flush).await.unwrap();
    sb
}

#[tokio::test]
async fn test_report_twice_is_byte_identical() {
    let sb = finished_scoreboard().await;
    let snapshot = sb.snapshot();
    let metadata = RunMetadata::from_scoreboard(&sb);
    let dir = tempfile::tempdir().unwrap();

    for format in [ReportFormat::Text, ReportFormat::Html, ReportFormat::Json] {
        let path = dir.path().join(format!("report.{format}"));
        let destination = Destination::File(path.clone());

        report(&snapshot, &metadata, &destination, format).unwrap();
        let first = std::fs::read(&path).unwrap();
        report(&snapshot, &metadata, &destination, format).unwrap();
        let second = std::fs::read(&path).unwrap();

        assert_eq!(first, second, "{format} report changed between calls");
    }
}

#[tokio::test]
async fn test_html_destination_gets_html() {
    let sb = finished_scoreboard().await;
    let dir = tempfile::tempdir().unwrap();
    let destination = Destination::File(dir.path().join("scoreboard_report.html"));

    let status = report(
        &sb.snapshot(),
        &RunMetadata::from_scoreboard(&sb),
        &destination,
        destination.default_format(),
    )
    .unwrap();
    assert_eq!(status, RunStatus::Failed);

    let Destination::File(path) = destination else {
        unreachable!()
    };
    let html = std::fs::read_to_string(path).unwrap();
    assert!(html.starts_with("<!DOCTYPE html>"));
    assert!(html.contains("Test Description: report file tests"));
    assert!(html.contains("Overall Status: FAILED"));
}

#[tokio::test]
async fn test_text_file_contains_mismatch_line() {
    let sb = finished_scoreboard().await;
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("scoreboard_report.txt");

    report(
        &sb.snapshot(),
        &RunMetadata::from_scoreboard(&sb),
        &Destination::File(path.clone()),
        ReportFormat::Text,
    )
    .unwrap();

    let text = std::fs::read_to_string(path).unwrap();
    assert!(text.contains("#2: MISMATCH"));
    assert!(text.contains("Total=2, Matched=1, Mismatched=1, Unpaired=0"));
}

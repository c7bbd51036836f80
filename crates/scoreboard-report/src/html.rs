//! Self-contained HTML rendering.

use crate::metadata::{format_timestamp, RunMetadata};
use crate::text::{describe, origin_of};
use scoreboard_core::{LedgerSnapshot, RunStatus, Verdict};
use std::fmt::Debug;

const STYLE: &str = "\
body { font-family: Arial, sans-serif; }
h1, h2 { color: #333; }
table { width: 100%; border-collapse: collapse; }
th, td { padding: 8px; text-align: left; border-bottom: 1px solid #ddd; vertical-align: top; }
tr:hover { background-color: #f5f5f5; }
tr.verdict-mismatch { background-color: #fde2e2; }
tr.verdict-unpaired { background-color: #fff3cd; }
tr.verdict-fault { background-color: #f8d7da; font-weight: bold; }
.status-passed { color: green; }
.status-failed { color: red; }
.status-no-comparisons { color: orange; }
pre { background-color: #f4f4f4; padding: 10px; border: 1px solid #ddd; white-space: pre-wrap; }
";

/// Render the ledger as a standalone HTML document.
pub fn render_html<T: Debug>(snapshot: &LedgerSnapshot<T>, metadata: &RunMetadata) -> String {
    let title = escape(&metadata.title);
    let counts = snapshot.counts();
    let status = counts.status();

    let mut body = format!("<h1>Scoreboard Report: {title}</h1>\n");
    body.push_str(&format!(
        "<h2>Test Description: {}</h2>\n",
        escape(metadata.description.as_deref().unwrap_or("N/A"))
    ));
    body.push_str(&format!("<p><strong>Run:</strong> {}</p>\n", metadata.run_id));
    if let Some(started_at) = metadata.started_at {
        body.push_str(&format!(
            "<p><strong>Started:</strong> {}</p>\n",
            format_timestamp(started_at)
        ));
    }
    if let Some(finished_at) = metadata.finished_at {
        body.push_str(&format!(
            "<p><strong>Finished:</strong> {}</p>\n",
            format_timestamp(finished_at)
        ));
    }
    body.push_str("<hr>\n");

    body.push_str("<h2>Results</h2>\n");
    if snapshot.is_empty() {
        body.push_str("<p><strong>Warning:</strong> No comparisons were performed.</p>\n");
    } else {
        body.push_str(
            "<table>\n<tr><th>Index</th><th>Verdict</th><th>Actual</th><th>Expected</th></tr>\n",
        );
        for record in snapshot.records() {
            let mut actual = escape(&describe(record.actual.as_ref()));
            if record.verdict.is_failure() {
                if let Some(origin) = origin_of(record) {
                    actual.push_str(&format!("<br><small>Line: {}</small>", escape(&origin)));
                }
            }
            if let Some(detail) = &record.detail {
                actual.push_str(&format!("<br><strong>Error:</strong> {}", escape(detail)));
            }
            body.push_str(&format!(
                "<tr class=\"{}\"><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
                row_class(record.verdict),
                record.index,
                record.verdict,
                actual,
                escape(&describe(record.expected.as_ref())),
            ));
        }
        body.push_str("</table>\n");
    }

    body.push_str("<h2>Summary</h2>\n<div class=\"summary\">\n");
    for (label, value) in [
        ("Total", counts.total),
        ("Matched", counts.matched),
        ("Mismatched", counts.mismatched),
        ("Unpaired", counts.unpaired),
        ("Faulted", counts.faulted),
    ] {
        body.push_str(&format!("<p><strong>{label}:</strong> {value}</p>\n"));
    }
    body.push_str("</div>\n");
    body.push_str(&format!(
        "<h2 class=\"{}\">Overall Status: {}</h2>\n",
        status_class(status),
        status_label(status)
    ));

    body.push_str("<h2>Execution Log</h2>\n<pre><code>");
    for line in &metadata.log {
        body.push_str(&escape(line));
        body.push('\n');
    }
    body.push_str("</code></pre>\n");

    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n\
         <title>Scoreboard Report: {title}</title>\n<style>\n{STYLE}</style>\n\
         </head>\n<body>\n{body}</body>\n</html>\n"
    )
}

fn row_class(verdict: Verdict) -> &'static str {
    match verdict {
        Verdict::Match => "verdict-match",
        Verdict::Mismatch => "verdict-mismatch",
        Verdict::Unpaired => "verdict-unpaired",
        Verdict::Fault => "verdict-fault",
    }
}

fn status_class(status: RunStatus) -> &'static str {
    match status {
        RunStatus::Passed => "status-passed",
        RunStatus::Failed => "status-failed",
        RunStatus::NoComparisons => "status-no-comparisons",
    }
}

fn status_label(status: RunStatus) -> &'static str {
    match status {
        RunStatus::Passed => "PASSED",
        RunStatus::Failed => "FAILED",
        RunStatus::NoComparisons => "WARNING",
    }
}

/// Escape text for element content and double-quoted attributes.
pub fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use scoreboard_core::{Scoreboard, ScoreboardConfig, StopMode, Transaction};

    #[test]
    fn test_escape() {
        assert_eq!(
            escape("<b>\"a\" & 'b'</b>"),
            "&lt;b&gt;&quot;a&quot; &amp; &#39;b&#39;&lt;/b&gt;"
        );
    }

    #[tokio::test]
    async fn test_render_html_rows_and_classes() {
        let sb = Scoreboard::new(ScoreboardConfig::new("html<test>")).unwrap();
        sb.start().unwrap();
        for (a, e) in [("<ok>", "<ok>"), ("bar", "baz")] {
            sb.submit_actual(Transaction::new(a)).await.unwrap();
            sb.submit_expected(Transaction::new(e)).await.unwrap();
        }
        sb.submit_actual(Transaction::new("extra")).await.unwrap();
        sb.stop(StopMode::Flush).await.unwrap();

        let metadata = crate::RunMetadata::from_scoreboard(&sb);
        let html = render_html(&sb.snapshot(), &metadata);

        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<title>Scoreboard Report: html&lt;test&gt;</title>"));
        assert!(html.contains("<th>Index</th><th>Verdict</th><th>Actual</th><th>Expected</th>"));
        assert!(html.contains("<tr class=\"verdict-match\"><td>1</td><td>MATCH</td><td>&quot;&lt;ok&gt;&quot;</td>"));
        assert!(html.contains("<tr class=\"verdict-mismatch\"><td>2</td><td>MISMATCH</td>"));
        assert!(html.contains("<tr class=\"verdict-unpaired\"><td>3</td><td>UNPAIRED</td>"));
        assert!(html.contains("<td>&lt;none&gt;</td></tr>"));
        assert!(html.contains("<p><strong>Unpaired:</strong> 1</p>"));
        assert!(html.contains("class=\"status-failed\">Overall Status: FAILED"));
        assert!(html.contains("<h2>Execution Log</h2>"));
        assert!(html.contains("Scoreboard initialized"));
        assert!(!html.contains("<ok>"));
    }

    #[test]
    fn test_render_html_empty() {
        let sb = Scoreboard::<u8>::new(ScoreboardConfig::new("empty")).unwrap();
        let html = render_html(&sb.snapshot(), &crate::RunMetadata::new("empty"));
        assert!(html.contains("No comparisons were performed."));
        assert!(html.contains("Overall Status: WARNING"));
        assert!(!html.contains("<table>"));
    }
}

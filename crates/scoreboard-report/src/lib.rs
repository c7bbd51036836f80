//! Report rendering for scoreboard runs.
//!
//! Rendering is a pure function of a [`LedgerSnapshot`] and [`RunMetadata`]:
//! the same inputs always give byte-identical output, and nothing here can
//! change the ledger. Delivery errors surface as [`ReportError`] so the
//! caller can retry with another destination.

pub mod args;
pub mod error;
pub mod format;
pub mod html;
pub mod json;
pub mod metadata;
pub mod text;

pub use args::ReportArgs;
pub use error::ReportError;
pub use format::{Destination, ReportFormat};
pub use html::render_html;
pub use json::render_json;
pub use metadata::RunMetadata;
pub use text::render_text;

use scoreboard_core::{LedgerSnapshot, RunStatus};
use std::fmt::Debug;
use std::io::Write;
use tracing::{error, info};

/// Render a snapshot in the given format.
pub fn render<T: Debug>(
    snapshot: &LedgerSnapshot<T>,
    metadata: &RunMetadata,
    format: ReportFormat,
) -> Result<String, ReportError> {
    match format {
        ReportFormat::Text => Ok(render_text(snapshot, metadata)),
        ReportFormat::Html => Ok(render_html(snapshot, metadata)),
        ReportFormat::Json => render_json(snapshot, metadata),
    }
}

/// Render and deliver a report, returning the run status.
///
/// The status comes from the snapshot, so it is the same whichever
/// destination or format is used.
pub fn report<T: Debug>(
    snapshot: &LedgerSnapshot<T>,
    metadata: &RunMetadata,
    destination: &Destination,
    format: ReportFormat,
) -> Result<RunStatus, ReportError> {
    let rendered = render(snapshot, metadata, format)?;

    match destination {
        Destination::Console => {
            let mut stdout = std::io::stdout().lock();
            stdout
                .write_all(rendered.as_bytes())
                .and_then(|()| stdout.flush())
                .map_err(ReportError::Console)?;
        }
        Destination::File(path) => {
            if let Err(source) = std::fs::write(path, rendered.as_bytes()) {
                error!(
                    "[{}] Error writing {} report to {}: {}",
                    metadata.title,
                    format,
                    path.display(),
                    source
                );
                return Err(ReportError::Write {
                    path: path.clone(),
                    source,
                });
            }
            info!(
                "[{}] {} report saved to {}",
                metadata.title,
                format,
                path.display()
            );
        }
    }

    Ok(snapshot.status())
}

#[cfg(test)]
mod tests {
    use super::*;
    use scoreboard_core::{Scoreboard, ScoreboardConfig, StopMode, Transaction};
    use std::path::PathBuf;

    #[tokio::test]
    async fn test_report_to_unwritable_path_keeps_ledger() {
        let sb = Scoreboard::new(ScoreboardConfig::new("unwritable")).unwrap();
        sb.start().unwrap();
        sb.submit_actual(Transaction::new("a")).await.unwrap();
        sb.submit_expected(Transaction::new("a")).await.unwrap();
        sb.stop(StopMode::Flush).await.unwrap();

        let snapshot = sb.snapshot();
        let metadata = RunMetadata::from_scoreboard(&sb);
        let bad = Destination::File(PathBuf::from("/nonexistent-dir/report.txt"));
        let err = report(&snapshot, &metadata, &bad, ReportFormat::Text).unwrap_err();
        assert!(matches!(err, ReportError::Write { .. }));

        // Retry elsewhere with the same snapshot
        let dir = tempfile::tempdir().unwrap();
        let good = Destination::File(dir.path().join("report.txt"));
        let status = report(&snapshot, &metadata, &good, ReportFormat::Text).unwrap();
        assert_eq!(status, RunStatus::Passed);
        assert_eq!(sb.counts().matched, 1);
    }
}

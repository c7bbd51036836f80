//! Error types for report generation.

use std::path::PathBuf;
use thiserror::Error;

/// A report could not be produced or delivered.
///
/// Never affects the ledger: the same snapshot can be reported again to
/// another destination.
#[derive(Error, Debug)]
pub enum ReportError {
    /// The report file could not be written.
    #[error("Failed to write report to {path:?}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Standard output could not be written.
    #[error("Failed to write report to the console: {0}")]
    Console(#[source] std::io::Error),

    /// JSON serialization error.
    #[error("Failed to serialize JSON report: {0}")]
    Json(#[from] serde_json::Error),
}

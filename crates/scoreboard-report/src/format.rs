//! Report formats and destinations.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// Output format for a report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    /// One line per record plus a summary.
    #[default]
    Text,
    /// Self-contained HTML document.
    Html,
    /// Machine-readable JSON.
    Json,
}

impl ReportFormat {
    /// Pick a format from a file extension: `.html`/`.htm` is HTML, `.json`
    /// is JSON, anything else is text.
    pub fn infer(path: &Path) -> Self {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);
        match extension.as_deref() {
            Some("html" | "htm") => ReportFormat::Html,
            Some("json") => ReportFormat::Json,
            _ => ReportFormat::Text,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ReportFormat::Text => "text",
            ReportFormat::Html => "html",
            ReportFormat::Json => "json",
        }
    }
}

impl fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a report goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    /// Standard output.
    Console,
    /// A file, created or truncated.
    File(PathBuf),
}

impl Destination {
    /// Format implied by the destination when none is given explicitly.
    pub fn default_format(&self) -> ReportFormat {
        match self {
            Destination::Console => ReportFormat::Text,
            Destination::File(path) => ReportFormat::infer(path),
        }
    }
}

impl From<Option<PathBuf>> for Destination {
    fn from(path: Option<PathBuf>) -> Self {
        path.map_or(Destination::Console, Destination::File)
    }
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Destination::Console => f.write_str("console"),
            Destination::File(path) => write!(f, "{}", path.display()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_infer() {
        assert_eq!(ReportFormat::infer(Path::new("out.html")), ReportFormat::Html);
        assert_eq!(ReportFormat::infer(Path::new("OUT.HTM")), ReportFormat::Html);
        assert_eq!(ReportFormat::infer(Path::new("out.json")), ReportFormat::Json);
        assert_eq!(ReportFormat::infer(Path::new("out.txt")), ReportFormat::Text);
        assert_eq!(ReportFormat::infer(Path::new("report")), ReportFormat::Text);
    }

    #[test]
    fn test_destination_default_format() {
        assert_eq!(Destination::from(None).default_format(), ReportFormat::Text);
        assert_eq!(
            Destination::from(Some(PathBuf::from("r.html"))).default_format(),
            ReportFormat::Html
        );
    }
}

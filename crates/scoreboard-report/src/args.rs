//! CLI argument definitions for report output.

use crate::format::{Destination, ReportFormat};
use clap::Args;
use std::path::PathBuf;

/// Arguments selecting an optional report file in addition to the console.
#[derive(Args, Clone, Debug, Default)]
pub struct ReportArgs {
    /// Write the report to this file as well (format follows the extension)
    #[arg(long, env = "SCOREBOARD_REPORT")]
    pub report: Option<PathBuf>,

    /// Format of the report file, overriding the extension
    #[arg(long, value_enum, env = "SCOREBOARD_REPORT_FORMAT")]
    pub format: Option<ReportFormat>,

    /// Do not print the text report to standard output
    #[arg(long)]
    pub quiet: bool,
}

impl ReportArgs {
    /// Every (destination, format) pair these arguments ask for, console first.
    pub fn targets(&self) -> Vec<(Destination, ReportFormat)> {
        let mut targets = Vec::new();
        if !self.quiet {
            targets.push((Destination::Console, ReportFormat::Text));
        }
        if let Some(path) = &self.report {
            let destination = Destination::File(path.clone());
            let format = self.format.unwrap_or_else(|| destination.default_format());
            targets.push((destination, format));
        }
        targets
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        report: ReportArgs,
    }

    #[test]
    fn test_console_only_by_default() {
        let cli = TestCli::parse_from(["test"]);
        assert_eq!(
            cli.report.targets(),
            vec![(Destination::Console, ReportFormat::Text)]
        );
    }

    #[test]
    fn test_file_format_from_extension_or_flag() {
        let cli = TestCli::parse_from(["test", "--report", "out.html", "--quiet"]);
        assert_eq!(
            cli.report.targets(),
            vec![(Destination::File(PathBuf::from("out.html")), ReportFormat::Html)]
        );

        let cli = TestCli::parse_from(["test", "--report", "out.log", "--format", "json"]);
        assert_eq!(
            cli.report.targets()[1],
            (Destination::File(PathBuf::from("out.log")), ReportFormat::Json)
        );
    }
}

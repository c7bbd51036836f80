//! Command-line interface for the scoreboard
//!
//! # Usage Examples
//!
//! ```bash
//! # Demo run, text report on the console
//! scoreboard demo
//!
//! # Load settings from a config file and write an HTML report as well
//! scoreboard demo --config scoreboard.yaml --report scoreboard_report.html
//!
//! # JSON report for CI, nothing on stdout
//! scoreboard demo --report results.out --format json --quiet
//! ```
//!
//! Log verbosity follows `RUST_LOG` (e.g. `RUST_LOG=info`).

use anyhow::Context;
use clap::{Parser, Subcommand};
use scoreboard::demo::run_demo;
use scoreboard::{ReportArgs, RunStatus, ScoreboardConfig};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "scoreboard")]
#[command(about = "Compare actual and expected transaction streams")]
#[command(long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the built-in demo streams through a scoreboard
    Demo {
        /// Scoreboard config file (.yaml, .yml or .toml)
        #[arg(long, env = "SCOREBOARD_CONFIG")]
        config: Option<PathBuf>,

        /// Scoreboard name, overriding the config file
        #[arg(long)]
        name: Option<String>,

        /// Bound each stream's queue to this many items
        #[arg(long)]
        capacity: Option<usize>,

        /// Report output options
        #[command(flatten)]
        report: ReportArgs,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = run().await {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}

async fn run() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Demo {
            config,
            name,
            capacity,
            report,
        } => {
            let mut scoreboard_config = match config {
                Some(path) => ScoreboardConfig::from_file(&path)
                    .with_context(|| format!("Failed to load config from {path:?}"))?,
                None => ScoreboardConfig::new("my_test_scoreboard")
                    .with_description("Demo run of mixed payload streams"),
            };
            if let Some(name) = name {
                scoreboard_config = scoreboard_config.with_name(name);
            }
            if let Some(capacity) = capacity {
                scoreboard_config = scoreboard_config.with_capacity(capacity);
            }

            let status = run_demo(scoreboard_config, &report).await?;
            match status {
                RunStatus::Passed => {}
                RunStatus::Failed => anyhow::bail!("Scoreboard run failed"),
                RunStatus::NoComparisons => anyhow::bail!("No comparisons were performed"),
            }
        }
    }

    Ok(())
}

//! Scoreboard
//!
//! A streaming scoreboard for test environments: producers push transactions
//! into an actual stream and an expected stream, a background worker compares
//! them pair by pair in submission order, and the verdicts are reported as
//! text, HTML or JSON.
//!
//! # Crates
//!
//! - `scoreboard_core` - transactions, lanes, the comparison worker and the ledger
//! - `scoreboard_report` - report rendering and delivery
//!
//! # CLI Usage
//!
//! ```bash
//! # Run the demo streams and print the text report
//! scoreboard demo
//!
//! # Also write an HTML report, with a bounded queue of 4 items per stream
//! scoreboard demo --capacity 4 --report scoreboard_report.html
//! ```

pub mod demo;

pub use scoreboard_core::{
    by_key, channel_observer, from_fn, try_from_fn, ChannelObserver, Comparator,
    ComparisonError, ConfigError, ControlError, Counts, LedgerSnapshot, LogObserver, Origin,
    ResultRecord, RunStatus, Scoreboard, ScoreboardConfig, Side, StopMode, StreamSender,
    StructuralEq, SubmissionError, Transaction, Verdict, VerdictObserver, WorkerState,
};
pub use scoreboard_report::{
    render, report, Destination, ReportArgs, ReportError, ReportFormat, RunMetadata,
};

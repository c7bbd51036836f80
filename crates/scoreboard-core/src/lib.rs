//! Concurrent comparison engine for actual vs expected transaction streams.
//!
//! A [`Scoreboard`] owns two FIFO lanes (actual and expected), a single
//! background comparison worker and an append-only [`Ledger`] of verdicts.
//! The Nth actual transaction is always paired with the Nth expected one,
//! whatever the wall-clock interleaving of the producers.
//!
//! - [`transaction`]: the comparable unit of data
//! - [`comparator`]: pluggable equality
//! - [`queue`]: producer handles and per-side lanes
//! - [`worker`]: worker lifecycle and stop modes
//! - [`ledger`]: verdicts, records and counts
//! - [`observer`]: real-time notification of failing records
//! - [`config`]: YAML/TOML configuration

pub mod comparator;
pub mod config;
pub mod error;
pub mod journal;
pub mod ledger;
pub mod observer;
pub mod queue;
mod scoreboard;
pub mod transaction;
pub mod worker;

pub use comparator::{by_key, from_fn, try_from_fn, Comparator, StructuralEq};
pub use config::ScoreboardConfig;
pub use error::{ComparisonError, ConfigError, ControlError, SubmissionError};
pub use journal::{Journal, JournalEntry};
pub use ledger::{Counts, Ledger, LedgerSnapshot, ResultRecord, RunStatus, Verdict};
pub use observer::{channel_observer, ChannelObserver, LogObserver, VerdictObserver};
pub use queue::{Side, StreamSender};
pub use scoreboard::Scoreboard;
pub use transaction::{Origin, Transaction};
pub use worker::{StopMode, WorkerState};

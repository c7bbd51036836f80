//! The comparison worker.
//!
//! A single task per scoreboard. It holds at most one dequeued item per side,
//! waits until it has one of each, compares them, and appends the verdict to
//! the ledger before touching the next pair. When one side reaches
//! end-of-stream every remaining item on the other side becomes UNPAIRED.
//!
//! ```text
//! IDLE --start--> RUNNING --both closed / flush--> DRAINING --drained--> STOPPED
//!                    |                                  |
//!                    +------------- abort --------------+-----> STOPPED
//! ```

use crate::comparator::{evaluate, Comparator};
use crate::journal::Journal;
use crate::ledger::{self, ResultRecord, SharedLedger};
use crate::observer::{format_record, VerdictObserver};
use crate::queue::{Lane, LaneReceiver, Side};
use crate::transaction::Transaction;
use serde::Serialize;
use std::fmt::{self, Debug};
use std::sync::Arc;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Lifecycle of the comparison worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkerState {
    /// Created, not consuming yet.
    Idle,
    /// Pairing items as they arrive.
    Running,
    /// Inputs are closed; finishing what is already buffered.
    Draining,
    /// Terminal. The ledger no longer changes.
    Stopped,
}

impl fmt::Display for WorkerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            WorkerState::Idle => "IDLE",
            WorkerState::Running => "RUNNING",
            WorkerState::Draining => "DRAINING",
            WorkerState::Stopped => "STOPPED",
        };
        f.write_str(s)
    }
}

/// How an explicit stop treats items that are still queued.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StopMode {
    /// Close both inputs and compare everything already submitted. Leftovers
    /// on the longer side are recorded as UNPAIRED.
    #[default]
    Flush,
    /// Exit as soon as possible. Items not yet compared are discarded and
    /// produce no record.
    Abort,
}

impl fmt::Display for StopMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StopMode::Flush => f.write_str("flush"),
            StopMode::Abort => f.write_str("abort"),
        }
    }
}

/// Stop signals shared between the facade and the worker.
#[derive(Debug, Clone, Default)]
pub(crate) struct StopSignals {
    pub(crate) flush: CancellationToken,
    pub(crate) abort: CancellationToken,
}

impl StopSignals {
    pub(crate) fn request(&self, mode: StopMode) {
        match mode {
            StopMode::Flush => self.flush.cancel(),
            StopMode::Abort => self.abort.cancel(),
        }
    }
}

enum Step<T> {
    Abort,
    Flush,
    Actual(Option<Transaction<T>>),
    Expected(Option<Transaction<T>>),
}

pub(crate) struct Worker<T> {
    pub(crate) name: String,
    pub(crate) actual_rx: LaneReceiver<Transaction<T>>,
    pub(crate) expected_rx: LaneReceiver<Transaction<T>>,
    pub(crate) actual_lane: Arc<Lane<Transaction<T>>>,
    pub(crate) expected_lane: Arc<Lane<Transaction<T>>>,
    pub(crate) comparator: Arc<dyn Comparator<T>>,
    pub(crate) ledger: SharedLedger<T>,
    pub(crate) observers: Vec<Arc<dyn VerdictObserver<T>>>,
    pub(crate) notify_matches: bool,
    pub(crate) journal: Journal,
    pub(crate) state: Arc<watch::Sender<WorkerState>>,
    pub(crate) signals: StopSignals,
}

impl<T> Worker<T>
where
    T: Debug + Send + Sync + 'static,
{
    /// Run until both streams are exhausted or an abort is requested.
    pub(crate) async fn run(mut self) {
        self.note("Comparison worker started");

        let mut pending_actual: Option<Transaction<T>> = None;
        let mut pending_expected: Option<Transaction<T>> = None;
        let mut actual_done = false;
        let mut expected_done = false;
        let mut flushing = false;

        loop {
            match (pending_actual.take(), pending_expected.take()) {
                (Some(actual), Some(expected)) => self.compare(actual, expected),
                (Some(actual), None) if expected_done => self.unpaired(Side::Actual, actual),
                (None, Some(expected)) if actual_done => self.unpaired(Side::Expected, expected),
                (actual, expected) => {
                    pending_actual = actual;
                    pending_expected = expected;
                }
            }

            if actual_done && expected_done {
                break;
            }

            if flushing || (self.actual_lane.is_closed() && self.expected_lane.is_closed()) {
                self.enter(WorkerState::Draining);
            }

            let step = tokio::select! {
                biased;

                _ = self.signals.abort.cancelled() => Step::Abort,
                _ = self.signals.flush.cancelled(), if !flushing => Step::Flush,
                item = self.actual_rx.recv(), if pending_actual.is_none() && !actual_done => {
                    Step::Actual(item)
                }
                item = self.expected_rx.recv(), if pending_expected.is_none() && !expected_done => {
                    Step::Expected(item)
                }
            };

            match step {
                Step::Abort => {
                    self.actual_lane.close();
                    self.expected_lane.close();
                    let discarded =
                        usize::from(pending_actual.is_some()) + usize::from(pending_expected.is_some());
                    self.note(format!(
                        "Abort requested; discarding {discarded} dequeued item(s) and anything still queued"
                    ));
                    break;
                }
                Step::Flush => {
                    flushing = true;
                    self.actual_lane.close();
                    self.expected_lane.close();
                    self.actual_rx.close();
                    self.expected_rx.close();
                    self.note("Flush requested; inputs closed, draining buffered items");
                }
                Step::Actual(Some(transaction)) => pending_actual = Some(transaction),
                Step::Expected(Some(transaction)) => pending_expected = Some(transaction),
                Step::Actual(None) => {
                    actual_done = true;
                    debug!("[{}] Actual stream exhausted", self.name);
                }
                Step::Expected(None) => {
                    expected_done = true;
                    debug!("[{}] Expected stream exhausted", self.name);
                }
            }
        }

        let counts = ledger::read(&self.ledger).counts();
        self.note(format!(
            "Comparison worker stopped: {}",
            counts.summary_line()
        ));
        self.enter(WorkerState::Stopped);
    }

    fn compare(&self, actual: Transaction<T>, expected: Transaction<T>) {
        let outcome = evaluate(&*self.comparator, actual.payload(), expected.payload());
        self.record(|index| match outcome {
            Ok(matched) => ResultRecord::compared(index, actual, expected, matched),
            Err(err) => ResultRecord::faulted(index, actual, expected, err.to_string()),
        });
    }

    fn unpaired(&self, side: Side, leftover: Transaction<T>) {
        self.record(|index| ResultRecord::unpaired(index, side, leftover));
    }

    /// Append under the write lock, then notify. Only this task appends, so
    /// the index read under the lock is the one the record gets.
    ///
    /// The abort check also happens under the lock: once the facade has
    /// cancelled abort and taken the lock, nothing more is appended.
    fn record(&self, build: impl FnOnce(u64) -> ResultRecord<T>) {
        let record = {
            let mut ledger = ledger::write(&self.ledger);
            let index = ledger.next_index();
            if self.signals.abort.is_cancelled() {
                debug!("[{}] Abort requested; dropping result #{}", self.name, index);
                return;
            }
            ledger.append(build(index))
        };

        let failed = record.verdict.is_failure();
        if failed {
            self.journal
                .record(format!("[{}] {}", self.name, format_record(&record)));
        }
        if failed || self.notify_matches {
            for observer in &self.observers {
                observer.on_record(&self.name, &record);
            }
        }
    }

    fn enter(&self, next: WorkerState) {
        self.state.send_if_modified(|state| {
            if *state == next {
                return false;
            }
            debug!("[{}] Worker state {} -> {}", self.name, state, next);
            *state = next;
            true
        });
    }

    fn note(&self, message: impl Into<String>) {
        let message = message.into();
        info!("[{}] {}", self.name, message);
        self.journal.record(format!("[{}] {}", self.name, message));
    }
}

impl<T> Drop for Worker<T> {
    fn drop(&mut self) {
        // Covers a task aborted mid-run: waiters on the state must not hang.
        let state = *self.state.borrow();
        if matches!(state, WorkerState::Running | WorkerState::Draining) {
            warn!("[{}] Comparison worker dropped while {}", self.name, state);
        }
        if state != WorkerState::Stopped {
            self.state.send_replace(WorkerState::Stopped);
        }
    }
}

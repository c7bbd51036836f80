//! The scoreboard facade: owns the two lanes, the ledger and the worker.

use crate::comparator::{Comparator, StructuralEq};
use crate::config::ScoreboardConfig;
use crate::error::{ConfigError, ControlError, SubmissionError};
use crate::journal::Journal;
use crate::ledger::{self, Counts, Ledger, LedgerSnapshot, RunStatus, SharedLedger};
use crate::observer::{LogObserver, VerdictObserver};
use crate::queue::{Lane, Side, StreamSender};
use crate::transaction::Transaction;
use crate::worker::{StopMode, StopSignals, Worker, WorkerState};
use chrono::{DateTime, Utc};
use std::fmt::Debug;
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError, RwLock};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{info, warn};

/// Compares an actual transaction stream against an expected one.
///
/// Producers feed each side through [`Scoreboard::actual`] and
/// [`Scoreboard::expected`] (or the `submit_*` shortcuts). The Nth actual
/// transaction is compared with the Nth expected one on a background task,
/// and every verdict lands in the ledger in pair order.
///
/// ```no_run
/// use scoreboard_core::{Scoreboard, ScoreboardConfig, StopMode, Transaction};
///
/// # async fn run() -> Result<(), Box<dyn std::error::Error>> {
/// let scoreboard = Scoreboard::new(ScoreboardConfig::new("uart"))?;
/// scoreboard.start()?;
/// scoreboard.submit_actual(Transaction::new("foo")).await?;
/// scoreboard.submit_expected(Transaction::new("foo")).await?;
/// let counts = scoreboard.stop(StopMode::Flush).await?;
/// assert_eq!(counts.matched, 1);
/// # Ok(())
/// # }
/// ```
pub struct Scoreboard<T> {
    config: ScoreboardConfig,
    actual: StreamSender<T>,
    expected: StreamSender<T>,
    ledger: SharedLedger<T>,
    journal: Journal,
    state: Arc<watch::Sender<WorkerState>>,
    signals: StopSignals,
    /// Present until `start` hands it to the runtime.
    worker: Mutex<Option<Worker<T>>>,
    handle: Mutex<Option<JoinHandle<()>>>,
    started_at: OnceLock<DateTime<Utc>>,
    finished_at: OnceLock<DateTime<Utc>>,
}

impl<T> Scoreboard<T>
where
    T: PartialEq + Debug + Send + Sync + 'static,
{
    /// Create a scoreboard comparing payloads with `PartialEq`.
    pub fn new(config: ScoreboardConfig) -> Result<Self, ConfigError> {
        Self::with_comparator(config, StructuralEq)
    }
}

impl<T> Scoreboard<T>
where
    T: Debug + Send + Sync + 'static,
{
    /// Create a scoreboard with a custom equality.
    pub fn with_comparator(
        config: ScoreboardConfig,
        comparator: impl Comparator<T> + 'static,
    ) -> Result<Self, ConfigError> {
        config.validate()?;

        let (actual_lane, actual_rx) = Lane::new(Side::Actual, config.capacity);
        let (expected_lane, expected_rx) = Lane::new(Side::Expected, config.capacity);
        let actual_lane = Arc::new(actual_lane);
        let expected_lane = Arc::new(expected_lane);
        let ledger: SharedLedger<T> = Arc::new(RwLock::new(Ledger::default()));
        let journal = Journal::new();
        let (state, _) = watch::channel(WorkerState::Idle);
        let state = Arc::new(state);
        let signals = StopSignals::default();

        let worker = Worker {
            name: config.name.clone(),
            actual_rx,
            expected_rx,
            actual_lane: Arc::clone(&actual_lane),
            expected_lane: Arc::clone(&expected_lane),
            comparator: Arc::new(comparator),
            ledger: Arc::clone(&ledger),
            observers: vec![Arc::new(LogObserver) as Arc<dyn VerdictObserver<T>>],
            notify_matches: config.notify_matches,
            journal: journal.clone(),
            state: Arc::clone(&state),
            signals: signals.clone(),
        };

        let scoreboard = Self {
            actual: StreamSender::new(actual_lane),
            expected: StreamSender::new(expected_lane),
            ledger,
            journal,
            state,
            signals,
            worker: Mutex::new(Some(worker)),
            handle: Mutex::new(None),
            started_at: OnceLock::new(),
            finished_at: OnceLock::new(),
            config,
        };
        scoreboard.note("Scoreboard initialized");
        Ok(scoreboard)
    }

    /// Register an extra observer. Only possible before `start`.
    pub fn add_observer(
        &self,
        observer: impl VerdictObserver<T> + 'static,
    ) -> Result<(), ControlError> {
        match lock(&self.worker).as_mut() {
            Some(worker) => {
                worker.observers.push(Arc::new(observer));
                Ok(())
            }
            None => Err(ControlError::AlreadyStarted(self.config.name.clone())),
        }
    }

    /// Spawn the comparison worker (IDLE -> RUNNING).
    ///
    /// Transactions submitted before this call are buffered and compared once
    /// the worker runs.
    ///
    /// # Panics
    ///
    /// Must be called from within a Tokio runtime.
    pub fn start(&self) -> Result<(), ControlError> {
        let worker = lock(&self.worker)
            .take()
            .ok_or_else(|| ControlError::AlreadyStarted(self.config.name.clone()))?;

        let _ = self.started_at.set(Utc::now());
        self.state.send_replace(WorkerState::Running);
        *lock(&self.handle) = Some(tokio::spawn(worker.run()));
        self.note("Scoreboard started");
        Ok(())
    }

    /// Stop the worker and wait for it to exit.
    ///
    /// Waits at most `stop_timeout_secs`; past that the task is aborted and
    /// [`ControlError::StopTimeout`] is returned. The ledger keeps whatever was
    /// recorded up to that point and no longer grows. Stopping an already stopped scoreboard just
    /// returns the final counts.
    pub async fn stop(&self, mode: StopMode) -> Result<Counts, ControlError> {
        let handle = lock(&self.handle).take();
        let Some(mut handle) = handle else {
            if self.started_at.get().is_none() {
                return Err(ControlError::NotStarted(self.config.name.clone()));
            }
            return Ok(self.counts());
        };

        self.note(format!("Stopping scoreboard ({mode})..."));
        self.signals.request(mode);

        let timeout = self.config.stop_timeout();
        let outcome = match tokio::time::timeout(timeout, &mut handle).await {
            Ok(Ok(())) => Ok(self.counts()),
            Ok(Err(source)) => Err(ControlError::Join {
                name: self.config.name.clone(),
                source,
            }),
            Err(_) => {
                self.signals.abort.cancel();
                handle.abort();
                // Wait out an append already holding the lock; later ones see the abort.
                drop(ledger::write(&self.ledger));
                self.actual.close();
                self.expected.close();
                warn!(
                    "[{}] Comparison worker did not stop within {:?}; aborted",
                    self.config.name, timeout
                );
                self.journal.record(format!(
                    "[{}] Warning: comparison worker did not stop gracefully",
                    self.config.name
                ));
                self.state.send_replace(WorkerState::Stopped);
                Err(ControlError::StopTimeout {
                    name: self.config.name.clone(),
                    timeout,
                })
            }
        };

        let _ = self.finished_at.set(Utc::now());
        self.note("Scoreboard stopped");
        outcome
    }

    /// Wait until the worker reaches STOPPED.
    ///
    /// This does not close anything: it returns once both streams have been
    /// closed and drained, or after a stop from another task.
    pub async fn wait_drained(&self) -> Result<Counts, ControlError> {
        if self.started_at.get().is_none() {
            return Err(ControlError::NotStarted(self.config.name.clone()));
        }
        let mut state = self.state.subscribe();
        // The sender lives in `self`, so the channel cannot close under us.
        let _ = state
            .wait_for(|state| *state == WorkerState::Stopped)
            .await;
        let _ = self.finished_at.set(Utc::now());
        Ok(self.counts())
    }

    /// Producer handle for the actual stream.
    pub fn actual(&self) -> StreamSender<T> {
        self.actual.clone()
    }

    /// Producer handle for the expected stream.
    pub fn expected(&self) -> StreamSender<T> {
        self.expected.clone()
    }

    pub async fn submit_actual(&self, transaction: Transaction<T>) -> Result<(), SubmissionError> {
        self.actual.submit(transaction).await
    }

    pub async fn submit_expected(
        &self,
        transaction: Transaction<T>,
    ) -> Result<(), SubmissionError> {
        self.expected.submit(transaction).await
    }

    /// Mark the actual stream finished.
    pub fn close_actual(&self) {
        self.close_side(&self.actual);
    }

    /// Mark the expected stream finished.
    pub fn close_expected(&self) {
        self.close_side(&self.expected);
    }

    /// Close both streams. Once the worker has drained them it stops on its own.
    pub fn close(&self) {
        self.close_actual();
        self.close_expected();
    }

    fn close_side(&self, sender: &StreamSender<T>) {
        if sender.close() {
            self.note(format!(
                "{} stream closed after {} transaction(s)",
                capitalize(sender.side().as_str()),
                sender.submitted()
            ));
        }
    }

    pub fn counts(&self) -> Counts {
        ledger::read(&self.ledger).counts()
    }

    pub fn status(&self) -> RunStatus {
        self.counts().status()
    }

    /// Consistent copy of the ledger, safe to hold while the worker runs.
    pub fn snapshot(&self) -> LedgerSnapshot<T> {
        ledger::read(&self.ledger).snapshot()
    }

    pub fn state(&self) -> WorkerState {
        *self.state.borrow()
    }

    /// Watch worker state changes.
    pub fn subscribe_state(&self) -> watch::Receiver<WorkerState> {
        self.state.subscribe()
    }

    pub fn journal(&self) -> &Journal {
        &self.journal
    }

    pub fn config(&self) -> &ScoreboardConfig {
        &self.config
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn description(&self) -> Option<&str> {
        self.config.description.as_deref()
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at.get().copied()
    }

    pub fn finished_at(&self) -> Option<DateTime<Utc>> {
        self.finished_at.get().copied()
    }

    fn note(&self, message: impl Into<String>) {
        let message = message.into();
        info!("[{}] {}", self.config.name, message);
        self.journal
            .record(format!("[{}] {}", self.config.name, message));
    }
}

impl<T> Drop for Scoreboard<T> {
    fn drop(&mut self) {
        // Tearing down a live scoreboard is an abort: in-flight items vanish.
        self.signals.abort.cancel();
    }
}

fn lock<V>(mutex: &Mutex<V>) -> MutexGuard<'_, V> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::Verdict;
    use std::time::Duration;

    fn board(name: &str) -> Scoreboard<&'static str> {
        Scoreboard::new(ScoreboardConfig::new(name)).unwrap()
    }

    #[tokio::test]
    async fn test_start_twice_is_rejected() {
        let sb = board("twice");
        sb.start().unwrap();
        assert!(matches!(sb.start(), Err(ControlError::AlreadyStarted(_))));
        sb.stop(StopMode::Abort).await.unwrap();
    }

    #[tokio::test]
    async fn test_stop_before_start() {
        let sb = board("idle");
        assert_eq!(sb.state(), WorkerState::Idle);
        assert!(matches!(
            sb.stop(StopMode::Flush).await,
            Err(ControlError::NotStarted(_))
        ));
        assert!(matches!(
            sb.wait_drained().await,
            Err(ControlError::NotStarted(_))
        ));
    }

    #[tokio::test]
    async fn test_submission_before_start_is_buffered() {
        let sb = board("buffered");
        sb.submit_actual(Transaction::new("a")).await.unwrap();
        sb.submit_expected(Transaction::new("a")).await.unwrap();
        sb.start().unwrap();
        sb.close();
        let counts = sb.wait_drained().await.unwrap();
        assert_eq!(counts.matched, 1);
        assert_eq!(sb.state(), WorkerState::Stopped);
        assert_eq!(sb.status(), RunStatus::Passed);
    }

    #[tokio::test]
    async fn test_submit_after_close_fails() {
        let sb = board("closed");
        sb.close_expected();
        assert_eq!(
            sb.submit_expected(Transaction::new("late")).await,
            Err(SubmissionError::Closed(Side::Expected))
        );
        assert!(sb.submit_actual(Transaction::new("ok")).await.is_ok());
    }

    #[tokio::test]
    async fn test_flush_stop_records_leftovers() {
        let sb = board("flush");
        sb.start().unwrap();
        sb.submit_actual(Transaction::new("x")).await.unwrap();
        sb.submit_actual(Transaction::new("y")).await.unwrap();
        sb.submit_expected(Transaction::new("x")).await.unwrap();

        let counts = sb.stop(StopMode::Flush).await.unwrap();
        assert_eq!(counts.total, 2);
        assert_eq!(counts.unpaired, 1);
        assert_eq!(
            sb.submit_actual(Transaction::new("z")).await,
            Err(SubmissionError::Closed(Side::Actual))
        );
        assert!(sb.finished_at().is_some());
        // Stopping again is harmless
        assert_eq!(sb.stop(StopMode::Flush).await.unwrap(), counts);
    }

    #[tokio::test]
    async fn test_abort_leaves_ledger_as_is() {
        let sb = board("abort");
        sb.submit_actual(Transaction::new("only_actual")).await.unwrap();
        sb.start().unwrap();
        let counts = sb.stop(StopMode::Abort).await.unwrap();
        assert_eq!(counts.total, 0);
        assert_eq!(sb.status(), RunStatus::NoComparisons);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_stop_timeout_aborts_worker() {
        // A slow comparator keeps the worker busy past the zero timeout
        let config = ScoreboardConfig::new("stuck").with_stop_timeout_secs(0);
        let sb = Scoreboard::with_comparator(
            config,
            crate::comparator::from_fn(|_: &u8, _: &u8| {
                std::thread::sleep(Duration::from_millis(500));
                true
            }),
        )
        .unwrap();
        sb.submit_actual(Transaction::new(1)).await.unwrap();
        sb.submit_expected(Transaction::new(1)).await.unwrap();
        sb.start().unwrap();

        let err = sb.stop(StopMode::Flush).await.unwrap_err();
        assert!(matches!(err, ControlError::StopTimeout { .. }));
        assert_eq!(sb.state(), WorkerState::Stopped);
    }

    fn slow_board(name: &str, delay: Duration, stop_timeout_secs: u64) -> Scoreboard<u8> {
        let config = ScoreboardConfig::new(name).with_stop_timeout_secs(stop_timeout_secs);
        Scoreboard::with_comparator(
            config,
            crate::comparator::from_fn(move |a: &u8, e: &u8| {
                std::thread::sleep(delay);
                a == e
            }),
        )
        .unwrap()
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_ledger_is_frozen_after_stop_timeout() {
        let sb = slow_board("frozen", Duration::from_millis(400), 1);
        for i in 0..6u8 {
            sb.submit_actual(Transaction::new(i)).await.unwrap();
            sb.submit_expected(Transaction::new(i)).await.unwrap();
        }
        sb.start().unwrap();

        let err = sb.stop(StopMode::Flush).await.unwrap_err();
        assert!(matches!(err, ControlError::StopTimeout { .. }));
        assert_eq!(sb.state(), WorkerState::Stopped);
        let total_at_stop = sb.counts().total;
        assert!(total_at_stop < 6);

        // Long enough for every buffered pair to have been compared
        tokio::time::sleep(Duration::from_secs(3)).await;
        assert_eq!(sb.counts().total, total_at_stop);
        assert_eq!(sb.snapshot().len() as u64, total_at_stop);
        assert!(sb.actual().is_closed());
        assert!(sb.expected().is_closed());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_state_moves_through_running_and_draining() {
        let sb = slow_board("states", Duration::from_millis(300), 5);
        let mut states = sb.subscribe_state();
        assert_eq!(*states.borrow_and_update(), WorkerState::Idle);

        sb.start().unwrap();
        assert_eq!(*states.borrow_and_update(), WorkerState::Running);

        // Expected stays open, so the worker keeps running while it compares
        sb.submit_actual(Transaction::new(1)).await.unwrap();
        sb.submit_expected(Transaction::new(1)).await.unwrap();
        sb.close_actual();
        sb.submit_actual(Transaction::new(2)).await.unwrap_err();
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(sb.state(), WorkerState::Running);

        // A second pair is still buffered when the last stream closes
        let sb = slow_board("states_drain", Duration::from_millis(300), 5);
        let mut states = sb.subscribe_state();
        sb.start().unwrap();
        for i in [1, 2] {
            sb.submit_actual(Transaction::new(i)).await.unwrap();
            sb.submit_expected(Transaction::new(i)).await.unwrap();
        }
        sb.close();
        states
            .wait_for(|state| *state == WorkerState::Draining)
            .await
            .unwrap();
        assert!(sb.counts().total < 2);

        states
            .wait_for(|state| *state == WorkerState::Stopped)
            .await
            .unwrap();
        assert_eq!(sb.counts().matched, 2);
    }

    #[tokio::test]
    async fn test_abort_closes_producer_handles() {
        let sb = board("abort_handles");
        sb.start().unwrap();
        let actual = sb.actual();
        assert!(!actual.is_closed());

        sb.stop(StopMode::Abort).await.unwrap();
        assert!(actual.is_closed());
        assert!(sb.expected().is_closed());
        assert_eq!(
            actual.submit(Transaction::new("late")).await,
            Err(SubmissionError::Closed(Side::Actual))
        );
    }

    #[tokio::test]
    async fn test_add_observer_after_start_is_rejected() {
        let sb = board("observers");
        sb.start().unwrap();
        assert!(matches!(
            sb.add_observer(LogObserver),
            Err(ControlError::AlreadyStarted(_))
        ));
        sb.stop(StopMode::Abort).await.unwrap();
    }

    #[tokio::test]
    async fn test_journal_records_lifecycle_and_failures() {
        let sb = board("journal");
        sb.start().unwrap();
        sb.submit_actual(Transaction::new("bar")).await.unwrap();
        sb.submit_expected(Transaction::new("baz")).await.unwrap();
        sb.stop(StopMode::Flush).await.unwrap();

        let messages: Vec<String> = sb
            .journal()
            .entries()
            .into_iter()
            .map(|entry| entry.message)
            .collect();
        assert_eq!(messages[0], "[journal] Scoreboard initialized");
        assert!(messages.contains(&"[journal] Scoreboard started".to_string()));
        assert!(messages
            .iter()
            .any(|m| m.starts_with("[journal] #1: MISMATCH")));
        assert_eq!(messages.last().map(String::as_str), Some("[journal] Scoreboard stopped"));
        assert_eq!(sb.snapshot().records()[0].verdict, Verdict::Mismatch);
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let result = Scoreboard::<u8>::new(ScoreboardConfig::default().with_capacity(0));
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }
}

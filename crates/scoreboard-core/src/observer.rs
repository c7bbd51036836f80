//! Real-time verdict notification.
//!
//! The worker appends a record to the ledger first and then hands it to every
//! registered observer, so an observer never sees a record the ledger lacks.
//! By default only MISMATCH, UNPAIRED and FAULT records are forwarded; set
//! `notify_matches` in the config to see MATCH records too.

use crate::ledger::{ResultRecord, Verdict};
use crate::transaction::Transaction;
use std::fmt::Debug;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tracing::{debug, error, warn};

/// Receives records as soon as the worker appends them.
///
/// Called on the worker task; implementations must not block.
pub trait VerdictObserver<T>: Send + Sync {
    fn on_record(&self, scoreboard: &str, record: &Arc<ResultRecord<T>>);
}

/// Logs each record through `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogObserver;

impl<T: Debug> VerdictObserver<T> for LogObserver {
    fn on_record(&self, scoreboard: &str, record: &Arc<ResultRecord<T>>) {
        let line = format_record(record);
        match record.verdict {
            Verdict::Match => debug!("[{scoreboard}] {line}"),
            Verdict::Mismatch | Verdict::Unpaired => warn!("[{scoreboard}] {line}"),
            Verdict::Fault => error!("[{scoreboard}] {line}"),
        }
    }
}

/// Forwards records over an unbounded channel. See [`channel_observer`].
pub struct ChannelObserver<T> {
    tx: mpsc::UnboundedSender<Arc<ResultRecord<T>>>,
}

impl<T: Send + Sync> VerdictObserver<T> for ChannelObserver<T> {
    fn on_record(&self, _scoreboard: &str, record: &Arc<ResultRecord<T>>) {
        // Nobody listening any more
        let _ = self.tx.send(Arc::clone(record));
    }
}

/// Create a channel observer and the stream of records it forwards.
///
/// The stream ends once the scoreboard (and with it the observer) is dropped.
pub fn channel_observer<T>() -> (ChannelObserver<T>, UnboundedReceiverStream<Arc<ResultRecord<T>>>)
{
    let (tx, rx) = mpsc::unbounded_channel();
    (ChannelObserver { tx }, UnboundedReceiverStream::new(rx))
}

/// One-line rendering of a record, shared by logging and the journal.
pub fn format_record<T: Debug>(record: &ResultRecord<T>) -> String {
    let mut line = format!(
        "#{}: {} actual={}, expected={}",
        record.index,
        record.verdict,
        describe(record.actual.as_ref()),
        describe(record.expected.as_ref()),
    );
    if let Some(detail) = &record.detail {
        line.push_str(&format!(" ({detail})"));
    }
    line
}

fn describe<T: Debug>(transaction: Option<&Transaction<T>>) -> String {
    transaction
        .map(Transaction::describe)
        .unwrap_or_else(|| "<none>".to_string())
}

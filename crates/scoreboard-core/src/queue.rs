//! The ordered dual queue: one FIFO lane per stream.
//!
//! Each lane is a tokio mpsc channel. Without a capacity the channel is
//! unbounded and submission never waits; with a capacity, `submit` waits for
//! space (backpressure). Closing a lane drops its only long-lived sender, so
//! the worker sees end-of-stream once the buffered items are consumed.

use crate::error::SubmissionError;
use crate::transaction::Transaction;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::mpsc;
use tracing::trace;

/// Which stream a transaction belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    /// Results from the system under test.
    Actual,
    /// References from the reference model.
    Expected,
}

impl Side {
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Actual => "actual",
            Side::Expected => "expected",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

enum LaneSender<T> {
    Bounded(mpsc::Sender<T>),
    Unbounded(mpsc::UnboundedSender<T>),
}

impl<T> Clone for LaneSender<T> {
    fn clone(&self) -> Self {
        match self {
            LaneSender::Bounded(tx) => LaneSender::Bounded(tx.clone()),
            LaneSender::Unbounded(tx) => LaneSender::Unbounded(tx.clone()),
        }
    }
}

/// Consumer end of a lane, owned by the comparison worker.
pub(crate) enum LaneReceiver<T> {
    Bounded(mpsc::Receiver<T>),
    Unbounded(mpsc::UnboundedReceiver<T>),
}

impl<T> LaneReceiver<T> {
    /// Next item in submission order, or `None` once the lane is closed and empty.
    pub(crate) async fn recv(&mut self) -> Option<T> {
        match self {
            LaneReceiver::Bounded(rx) => rx.recv().await,
            LaneReceiver::Unbounded(rx) => rx.recv().await,
        }
    }

    /// Refuse further sends while keeping buffered items readable.
    pub(crate) fn close(&mut self) {
        match self {
            LaneReceiver::Bounded(rx) => rx.close(),
            LaneReceiver::Unbounded(rx) => rx.close(),
        }
    }
}

/// Producer end of a lane, shared by every producer of that side.
pub(crate) struct Lane<T> {
    side: Side,
    sender: Mutex<Option<LaneSender<T>>>,
    submitted: AtomicU64,
}

impl<T> Lane<T> {
    pub(crate) fn new(side: Side, capacity: Option<usize>) -> (Self, LaneReceiver<T>) {
        let (sender, receiver) = match capacity {
            Some(capacity) => {
                let (tx, rx) = mpsc::channel(capacity);
                (LaneSender::Bounded(tx), LaneReceiver::Bounded(rx))
            }
            None => {
                let (tx, rx) = mpsc::unbounded_channel();
                (LaneSender::Unbounded(tx), LaneReceiver::Unbounded(rx))
            }
        };
        let lane = Self {
            side,
            sender: Mutex::new(Some(sender)),
            submitted: AtomicU64::new(0),
        };
        (lane, receiver)
    }

    fn sender(&self) -> Result<LaneSender<T>, SubmissionError> {
        self.sender
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .ok_or(SubmissionError::Closed(self.side))
    }

    pub(crate) async fn submit(&self, item: T) -> Result<(), SubmissionError> {
        let sent = match self.sender()? {
            LaneSender::Bounded(tx) => tx.send(item).await.is_ok(),
            LaneSender::Unbounded(tx) => tx.send(item).is_ok(),
        };
        self.accepted(sent)
    }

    pub(crate) fn blocking_submit(&self, item: T) -> Result<(), SubmissionError> {
        let sent = match self.sender()? {
            LaneSender::Bounded(tx) => tx.blocking_send(item).is_ok(),
            LaneSender::Unbounded(tx) => tx.send(item).is_ok(),
        };
        self.accepted(sent)
    }

    fn accepted(&self, sent: bool) -> Result<(), SubmissionError> {
        if !sent {
            // The worker closed the receiver (flush or abort).
            return Err(SubmissionError::Closed(self.side));
        }
        let count = self.submitted.fetch_add(1, Ordering::Relaxed) + 1;
        trace!("Enqueued {} transaction #{}", self.side, count);
        Ok(())
    }

    /// Close the lane. Returns `false` if it was already closed.
    pub(crate) fn close(&self) -> bool {
        self.sender
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
            .is_some()
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.sender
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_none()
    }

    pub(crate) fn submitted(&self) -> u64 {
        self.submitted.load(Ordering::Relaxed)
    }
}

/// Cloneable producer handle for one side of a scoreboard.
///
/// Any number of producers may hold a clone; items from all of them are
/// delivered in the order they were enqueued.
pub struct StreamSender<T> {
    lane: Arc<Lane<Transaction<T>>>,
}

impl<T> Clone for StreamSender<T> {
    fn clone(&self) -> Self {
        Self {
            lane: Arc::clone(&self.lane),
        }
    }
}

impl<T> StreamSender<T> {
    pub(crate) fn new(lane: Arc<Lane<Transaction<T>>>) -> Self {
        Self { lane }
    }

    /// The side this handle feeds.
    pub fn side(&self) -> Side {
        self.lane.side
    }

    /// Enqueue a transaction, waiting for space if the lane is bounded.
    pub async fn submit(&self, transaction: Transaction<T>) -> Result<(), SubmissionError> {
        self.lane.submit(transaction).await
    }

    /// Enqueue from a synchronous producer thread.
    ///
    /// # Panics
    ///
    /// On a bounded lane this blocks the thread and panics if called from
    /// inside an async context, like `tokio::sync::mpsc::Sender::blocking_send`.
    pub fn blocking_submit(&self, transaction: Transaction<T>) -> Result<(), SubmissionError> {
        self.lane.blocking_submit(transaction)
    }

    /// Mark the stream finished. Later submissions fail with
    /// [`SubmissionError::Closed`].
    pub fn close(&self) -> bool {
        self.lane.close()
    }

    pub fn is_closed(&self) -> bool {
        self.lane.is_closed()
    }

    /// Number of transactions accepted on this side so far.
    pub fn submitted(&self) -> u64 {
        self.lane.submitted()
    }
}

//! The result ledger: an append-only record of verdicts and running counts.

use crate::queue::Side;
use crate::transaction::Transaction;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Outcome recorded for one pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Verdict {
    /// The comparator accepted the pair.
    Match,
    /// The comparator rejected the pair.
    Mismatch,
    /// One stream ended with this item left over; there was nothing to compare it to.
    Unpaired,
    /// The comparator failed while evaluating the pair.
    Fault,
}

impl Verdict {
    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Match => "MATCH",
            Verdict::Mismatch => "MISMATCH",
            Verdict::Unpaired => "UNPAIRED",
            Verdict::Fault => "FAULT",
        }
    }

    /// Anything other than MATCH fails the run.
    pub fn is_failure(&self) -> bool {
        !matches!(self, Verdict::Match)
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry in the ledger.
#[derive(Debug)]
pub struct ResultRecord<T> {
    /// 1-based pair index, dense across the run.
    pub index: u64,
    pub verdict: Verdict,
    /// Absent only for an UNPAIRED expected leftover.
    pub actual: Option<Transaction<T>>,
    /// Absent only for an UNPAIRED actual leftover.
    pub expected: Option<Transaction<T>>,
    pub recorded_at: DateTime<Utc>,
    /// Failure message for FAULT records.
    pub detail: Option<String>,
}

impl<T> ResultRecord<T> {
    pub(crate) fn compared(
        index: u64,
        actual: Transaction<T>,
        expected: Transaction<T>,
        matched: bool,
    ) -> Self {
        Self {
            index,
            verdict: if matched {
                Verdict::Match
            } else {
                Verdict::Mismatch
            },
            actual: Some(actual),
            expected: Some(expected),
            recorded_at: Utc::now(),
            detail: None,
        }
    }

    pub(crate) fn faulted(
        index: u64,
        actual: Transaction<T>,
        expected: Transaction<T>,
        detail: String,
    ) -> Self {
        Self {
            index,
            verdict: Verdict::Fault,
            actual: Some(actual),
            expected: Some(expected),
            recorded_at: Utc::now(),
            detail: Some(detail),
        }
    }

    pub(crate) fn unpaired(index: u64, side: Side, leftover: Transaction<T>) -> Self {
        let (actual, expected) = match side {
            Side::Actual => (Some(leftover), None),
            Side::Expected => (None, Some(leftover)),
        };
        Self {
            index,
            verdict: Verdict::Unpaired,
            actual,
            expected,
            recorded_at: Utc::now(),
            detail: None,
        }
    }

    /// For UNPAIRED records, the stream that had the leftover item.
    pub fn unpaired_side(&self) -> Option<Side> {
        match (self.verdict, &self.actual, &self.expected) {
            (Verdict::Unpaired, Some(_), None) => Some(Side::Actual),
            (Verdict::Unpaired, None, Some(_)) => Some(Side::Expected),
            _ => None,
        }
    }
}

/// Overall outcome of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    /// At least one record, all of them MATCH.
    Passed,
    /// At least one MISMATCH, UNPAIRED or FAULT record.
    Failed,
    /// The ledger is empty.
    NoComparisons,
}

impl RunStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunStatus::Passed => "PASSED",
            RunStatus::Failed => "FAILED",
            RunStatus::NoComparisons => "NO COMPARISONS",
        }
    }

    pub fn passed(&self) -> bool {
        matches!(self, RunStatus::Passed)
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Running counters. `total` always equals the sum of the other four.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counts {
    pub total: u64,
    pub matched: u64,
    pub mismatched: u64,
    pub unpaired: u64,
    pub faulted: u64,
}

impl Counts {
    fn record(&mut self, verdict: Verdict) {
        self.total += 1;
        match verdict {
            Verdict::Match => self.matched += 1,
            Verdict::Mismatch => self.mismatched += 1,
            Verdict::Unpaired => self.unpaired += 1,
            Verdict::Fault => self.faulted += 1,
        }
    }

    pub fn failures(&self) -> u64 {
        self.mismatched + self.unpaired + self.faulted
    }

    pub fn status(&self) -> RunStatus {
        if self.total == 0 {
            RunStatus::NoComparisons
        } else if self.failures() == 0 {
            RunStatus::Passed
        } else {
            RunStatus::Failed
        }
    }

    /// `Total=<n>, Matched=<n>, Mismatched=<n>, Unpaired=<n>, Faulted=<n>`
    pub fn summary_line(&self) -> String {
        format!(
            "Total={}, Matched={}, Mismatched={}, Unpaired={}, Faulted={}",
            self.total, self.matched, self.mismatched, self.unpaired, self.faulted
        )
    }
}

/// Append-only store of result records.
///
/// Only the comparison worker appends; everyone else reads through
/// [`LedgerSnapshot`].
#[derive(Debug)]
pub struct Ledger<T> {
    records: Vec<Arc<ResultRecord<T>>>,
    counts: Counts,
}

impl<T> Default for Ledger<T> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            counts: Counts::default(),
        }
    }
}

impl<T> Ledger<T> {
    /// Index the next appended record must carry.
    pub fn next_index(&self) -> u64 {
        self.records.len() as u64 + 1
    }

    pub(crate) fn append(&mut self, record: ResultRecord<T>) -> Arc<ResultRecord<T>> {
        debug_assert_eq!(record.index, self.next_index(), "ledger indices must be dense");
        self.counts.record(record.verdict);
        let record = Arc::new(record);
        self.records.push(Arc::clone(&record));
        record
    }

    pub fn all(&self) -> &[Arc<ResultRecord<T>>] {
        &self.records
    }

    pub fn counts(&self) -> Counts {
        self.counts
    }

    pub fn snapshot(&self) -> LedgerSnapshot<T> {
        LedgerSnapshot {
            records: self.records.clone(),
            counts: self.counts,
        }
    }
}

pub(crate) type SharedLedger<T> = Arc<RwLock<Ledger<T>>>;

pub(crate) fn read<T>(ledger: &SharedLedger<T>) -> RwLockReadGuard<'_, Ledger<T>> {
    ledger.read().unwrap_or_else(PoisonError::into_inner)
}

pub(crate) fn write<T>(ledger: &SharedLedger<T>) -> RwLockWriteGuard<'_, Ledger<T>> {
    ledger.write().unwrap_or_else(PoisonError::into_inner)
}

/// A consistent, read-only view of the ledger at one point in time.
#[derive(Debug)]
pub struct LedgerSnapshot<T> {
    records: Vec<Arc<ResultRecord<T>>>,
    counts: Counts,
}

impl<T> Clone for LedgerSnapshot<T> {
    fn clone(&self) -> Self {
        Self {
            records: self.records.clone(),
            counts: self.counts,
        }
    }
}

impl<T> LedgerSnapshot<T> {
    pub fn records(&self) -> &[Arc<ResultRecord<T>>] {
        &self.records
    }

    pub fn counts(&self) -> Counts {
        self.counts
    }

    pub fn status(&self) -> RunStatus {
        self.counts.status()
    }

    /// Record with the given 1-based index.
    pub fn get(&self, index: u64) -> Option<&ResultRecord<T>> {
        let position = usize::try_from(index.checked_sub(1)?).ok()?;
        self.records.get(position).map(Arc::as_ref)
    }

    /// Records that failed the run, in index order.
    pub fn failures(&self) -> impl Iterator<Item = &ResultRecord<T>> {
        self.records
            .iter()
            .map(Arc::as_ref)
            .filter(|record| record.verdict.is_failure())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

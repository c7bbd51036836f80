//! Equality capabilities used by the comparison worker.

use crate::error::ComparisonError;
use std::any::Any;
use std::marker::PhantomData;
use std::panic::{self, AssertUnwindSafe};

/// Decides whether an actual payload matches an expected one.
///
/// Implementations must be total for every payload a producer submits. An
/// `Err` (or a panic) is recorded as a FAULT for that pair only.
pub trait Comparator<T>: Send + Sync {
    fn compare(&self, actual: &T, expected: &T) -> Result<bool, ComparisonError>;
}

/// Field-by-field equality through `PartialEq`.
#[derive(Debug, Clone, Copy, Default)]
pub struct StructuralEq;

impl<T: PartialEq> Comparator<T> for StructuralEq {
    fn compare(&self, actual: &T, expected: &T) -> Result<bool, ComparisonError> {
        Ok(actual == expected)
    }
}

/// Comparator backed by an infallible closure. See [`from_fn`].
#[derive(Debug, Clone, Copy)]
pub struct FnComparator<F>(F);

impl<T, F> Comparator<T> for FnComparator<F>
where
    F: Fn(&T, &T) -> bool + Send + Sync,
{
    fn compare(&self, actual: &T, expected: &T) -> Result<bool, ComparisonError> {
        Ok((self.0)(actual, expected))
    }
}

/// Comparator backed by a fallible closure. See [`try_from_fn`].
#[derive(Debug, Clone, Copy)]
pub struct TryFnComparator<F>(F);

impl<T, F> Comparator<T> for TryFnComparator<F>
where
    F: Fn(&T, &T) -> Result<bool, ComparisonError> + Send + Sync,
{
    fn compare(&self, actual: &T, expected: &T) -> Result<bool, ComparisonError> {
        (self.0)(actual, expected)
    }
}

/// Compares a projected key of both payloads. See [`by_key`].
pub struct KeyComparator<F, K> {
    key: F,
    _key: PhantomData<fn() -> K>,
}

impl<T, K, F> Comparator<T> for KeyComparator<F, K>
where
    F: Fn(&T) -> K + Send + Sync,
    K: PartialEq,
{
    fn compare(&self, actual: &T, expected: &T) -> Result<bool, ComparisonError> {
        Ok((self.key)(actual) == (self.key)(expected))
    }
}

/// Build a comparator from a closure returning whether the pair matches.
pub fn from_fn<T, F>(f: F) -> FnComparator<F>
where
    F: Fn(&T, &T) -> bool + Send + Sync,
{
    FnComparator(f)
}

/// Build a comparator from a closure that may fail.
pub fn try_from_fn<T, F>(f: F) -> TryFnComparator<F>
where
    F: Fn(&T, &T) -> Result<bool, ComparisonError> + Send + Sync,
{
    TryFnComparator(f)
}

/// Build a comparator that matches when both payloads project to equal keys.
///
/// ```
/// use scoreboard_core::comparator::{by_key, Comparator};
///
/// struct Response { status: u16, body: String }
///
/// let cmp = by_key(|r: &Response| r.status);
/// let a = Response { status: 200, body: "a".into() };
/// let b = Response { status: 200, body: "b".into() };
/// assert!(cmp.compare(&a, &b).unwrap());
/// ```
pub fn by_key<T, K, F>(key: F) -> KeyComparator<F, K>
where
    F: Fn(&T) -> K + Send + Sync,
    K: PartialEq,
{
    KeyComparator {
        key,
        _key: PhantomData,
    }
}

/// Run a comparator, converting a panic into a [`ComparisonError`].
pub(crate) fn evaluate<T>(
    comparator: &dyn Comparator<T>,
    actual: &T,
    expected: &T,
) -> Result<bool, ComparisonError> {
    match panic::catch_unwind(AssertUnwindSafe(|| comparator.compare(actual, expected))) {
        Ok(result) => result,
        Err(payload) => Err(ComparisonError::new(format!(
            "comparator panicked: {}",
            panic_message(payload.as_ref())
        ))),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&'static str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.as_str()
    } else {
        "unknown panic payload"
    }
}

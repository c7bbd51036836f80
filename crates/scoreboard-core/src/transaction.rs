//! Transactions flowing through the actual and expected streams.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::panic::Location;

/// Source location that created a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Origin {
    /// Source file.
    pub file: &'static str,
    /// Line within `file`.
    pub line: u32,
}

impl From<&'static Location<'static>> for Origin {
    fn from(location: &'static Location<'static>) -> Self {
        Self {
            file: location.file(),
            line: location.line(),
        }
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.line)
    }
}

/// A single comparable unit of data.
///
/// The payload is opaque to the scoreboard: it is only ever handed to a
/// [`crate::Comparator`]. The creation timestamp and origin are carried for
/// reporting and never take part in equality.
///
/// # Example
///
/// ```
/// use scoreboard_core::Transaction;
///
/// let a = Transaction::new("data_A");
/// let b = Transaction::new("data_A").with_description("from the reference model");
/// assert!(a.equals(&b));
/// ```
#[derive(Debug, Clone)]
pub struct Transaction<T> {
    payload: T,
    description: Option<String>,
    created_at: DateTime<Utc>,
    origin: Origin,
}

impl<T> Transaction<T> {
    /// Wrap a payload, capturing the caller's location and the current time.
    #[track_caller]
    pub fn new(payload: T) -> Self {
        Self {
            payload,
            description: None,
            created_at: Utc::now(),
            origin: Origin::from(Location::caller()),
        }
    }

    /// Attach a human-readable description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Override the creation timestamp.
    pub fn with_timestamp(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }

    /// The wrapped payload.
    pub fn payload(&self) -> &T {
        &self.payload
    }

    /// Consume the transaction, returning the payload.
    pub fn into_payload(self) -> T {
        self.payload
    }

    /// Optional description.
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// When the transaction was created.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Where the transaction was created.
    pub fn origin(&self) -> Origin {
        self.origin
    }
}

impl<T: PartialEq> Transaction<T> {
    /// Default structural equality: payloads only.
    pub fn equals(&self, other: &Self) -> bool {
        self.payload == other.payload
    }
}

impl<T: fmt::Debug> Transaction<T> {
    /// Representation used in reports and notifications.
    pub fn describe(&self) -> String {
        match &self.description {
            Some(description) => format!("{:?} ({description})", self.payload),
            None => format!("{:?}", self.payload),
        }
    }
}

impl<T: PartialEq> PartialEq for Transaction<T> {
    fn eq(&self, other: &Self) -> bool {
        self.equals(other)
    }
}

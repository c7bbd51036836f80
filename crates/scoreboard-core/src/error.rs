//! Error types for the scoreboard engine.

use crate::queue::Side;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Errors returned synchronously to a producer whose submission was rejected.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionError {
    /// The stream was closed before the transaction could be enqueued.
    #[error("The {0} stream is closed")]
    Closed(Side),
}

/// A comparator failed to evaluate a pair.
///
/// The worker records the pair as a FAULT and carries on with the next pair.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Comparison failed: {message}")]
pub struct ComparisonError {
    message: String,
}

impl ComparisonError {
    /// Create a comparison error with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// The failure message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Errors from the control API (start, stop, drain).
#[derive(Error, Debug)]
pub enum ControlError {
    /// `start` was called on a scoreboard whose worker already ran.
    #[error("Scoreboard '{0}' is already started")]
    AlreadyStarted(String),

    /// A stop or drain was requested before `start`.
    #[error("Scoreboard '{0}' was never started")]
    NotStarted(String),

    /// The worker did not exit within the configured stop timeout.
    #[error("Comparison worker of '{name}' did not stop within {timeout:?}")]
    StopTimeout { name: String, timeout: Duration },

    /// The worker task panicked or was cancelled by the runtime.
    #[error("Comparison worker of '{name}' failed: {source}")]
    Join {
        name: String,
        #[source]
        source: tokio::task::JoinError,
    },
}

/// Errors raised while loading or validating a [`crate::ScoreboardConfig`].
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("Failed to read config file {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// YAML parse error.
    #[error("Invalid YAML config: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// TOML parse error.
    #[error("Invalid TOML config: {0}")]
    Toml(#[from] toml::de::Error),

    /// The file extension is neither YAML nor TOML.
    #[error("Unsupported config format: {0:?}")]
    UnsupportedFormat(PathBuf),

    /// A field holds a value the engine cannot run with.
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_submission_error_names_side() {
        assert_eq!(
            SubmissionError::Closed(Side::Expected).to_string(),
            "The expected stream is closed"
        );
    }

    #[test]
    fn test_comparison_error_message() {
        let err = ComparisonError::new("status field missing");
        assert_eq!(err.message(), "status field missing");
        assert_eq!(err.to_string(), "Comparison failed: status field missing");
    }
}

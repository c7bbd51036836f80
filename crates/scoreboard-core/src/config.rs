//! Scoreboard configuration.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Default scoreboard name, used as the `[name]` prefix of log lines.
pub const DEFAULT_NAME: &str = "scoreboard";

/// Default number of seconds `stop` waits for the worker.
pub const DEFAULT_STOP_TIMEOUT_SECS: u64 = 5;

/// Configuration for a scoreboard instance.
///
/// Every field has a default, so a config file only needs to name the fields
/// it changes:
///
/// ```yaml
/// name: uart_rx
/// description: UART receiver against the reference model
/// capacity: 64
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScoreboardConfig {
    /// Name shown in log lines and reports.
    pub name: String,
    /// Free-form description of the test.
    pub description: Option<String>,
    /// Per-stream queue bound. `None` means unbounded.
    pub capacity: Option<usize>,
    /// How long `stop` waits for the worker before aborting it.
    pub stop_timeout_secs: u64,
    /// Also forward MATCH records to observers.
    pub notify_matches: bool,
}

impl Default for ScoreboardConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_NAME.to_string(),
            description: None,
            capacity: None,
            stop_timeout_secs: DEFAULT_STOP_TIMEOUT_SECS,
            notify_matches: false,
        }
    }
}

impl ScoreboardConfig {
    /// Create a configuration with the given name and defaults otherwise.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Set the name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Set the test description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Bound both queues to `capacity` items.
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = Some(capacity);
        self
    }

    /// Set the stop timeout in seconds.
    pub fn with_stop_timeout_secs(mut self, secs: u64) -> Self {
        self.stop_timeout_secs = secs;
        self
    }

    /// Forward MATCH records to observers as well.
    pub fn with_notify_matches(mut self, notify: bool) -> Self {
        self.notify_matches = notify;
        self
    }

    pub fn stop_timeout(&self) -> Duration {
        Duration::from_secs(self.stop_timeout_secs)
    }

    /// Check the values the engine cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.name.trim().is_empty() {
            return Err(ConfigError::Invalid("name must not be empty".to_string()));
        }
        if self.capacity == Some(0) {
            return Err(ConfigError::Invalid(
                "capacity must be at least 1 (omit it for unbounded queues)".to_string(),
            ));
        }
        Ok(())
    }

    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config file, picking the parser from the extension
    /// (`.yaml`, `.yml` or `.toml`).
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);
        let parse: fn(&str) -> Result<Self, ConfigError> = match extension.as_deref() {
            Some("yaml" | "yml") => Self::from_yaml,
            Some("toml") => Self::from_toml,
            _ => return Err(ConfigError::UnsupportedFormat(path.to_path_buf())),
        };
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        parse(&content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = ScoreboardConfig::default();
        assert_eq!(config.name, "scoreboard");
        assert_eq!(config.capacity, None);
        assert_eq!(config.stop_timeout(), Duration::from_secs(5));
        assert!(!config.notify_matches);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder() {
        let config = ScoreboardConfig::new("uart")
            .with_description("rx path")
            .with_capacity(8)
            .with_stop_timeout_secs(1)
            .with_notify_matches(true);
        assert_eq!(config.name, "uart");
        assert_eq!(config.description.as_deref(), Some("rx path"));
        assert_eq!(config.capacity, Some(8));
        assert_eq!(config.stop_timeout_secs, 1);
        assert!(config.notify_matches);
    }

    #[test]
    fn test_from_yaml_partial() {
        let config = ScoreboardConfig::from_yaml("name: uart_rx\ncapacity: 64\n").unwrap();
        assert_eq!(config.name, "uart_rx");
        assert_eq!(config.capacity, Some(64));
        assert_eq!(config.stop_timeout_secs, DEFAULT_STOP_TIMEOUT_SECS);
    }

    #[test]
    fn test_from_toml() {
        let config =
            ScoreboardConfig::from_toml("name = \"spi\"\nnotify_matches = true\n").unwrap();
        assert_eq!(config.name, "spi");
        assert!(config.notify_matches);
    }

    #[test]
    fn test_zero_capacity_is_invalid() {
        let err = ScoreboardConfig::from_yaml("capacity: 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        assert!(matches!(
            ScoreboardConfig::from_yaml("nmae: typo\n"),
            Err(ConfigError::Yaml(_))
        ));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "name = \"from_file\"").unwrap();
        let config = ScoreboardConfig::from_file(file.path()).unwrap();
        assert_eq!(config.name, "from_file");

        let err = ScoreboardConfig::from_file(Path::new("scoreboard.ini")).unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedFormat(_)));

        let err = ScoreboardConfig::from_file(Path::new("/nonexistent/sb.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}

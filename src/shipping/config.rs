//! Configuration for the log shipper
//!
//! Every field has a default, so a JSON config only needs to name what it
//! changes.

use crate::core::{AnalyticsError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// How old partitions are removed by the daily cleanup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetentionPolicy {
    /// Delete every partition dated `retention_days` ago or earlier
    #[default]
    Sweep,
    /// Delete only the partition dated exactly `retention_days` ago
    ExactOffset,
}

/// Log shipper configuration
///
/// # Examples
///
/// ```
/// use rust_analytics_system::shipping::{RetentionPolicy, ShipperConfig};
/// use std::time::Duration;
///
/// let config = ShipperConfig::new()
///     .with_server("logs.internal", 5958)
///     .with_directory("/var/lib/app/analytics")
///     .with_retention(14, RetentionPolicy::Sweep)
///     .with_send_timeout(Duration::from_secs(2));
///
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShipperConfig {
    /// Log server host name
    pub host: String,
    /// Log server UDP port
    pub port: u16,
    /// Directory holding the day partitions
    pub directory: PathBuf,
    /// Partition file name prefix, followed by `YYYY-MM-DD`
    pub file_prefix: String,
    /// Days of backlog kept and flushed
    pub retention_days: u32,
    pub retention_policy: RetentionPolicy,
    /// Delay between cleanups
    pub cleanup_interval_secs: u64,
    /// Write timeout for each datagram
    pub send_timeout_ms: u64,
}

pub const DEFAULT_PORT: u16 = 5958;
pub const DEFAULT_FILE_PREFIX: &str = "logstash_";
pub const DEFAULT_RETENTION_DAYS: u32 = 7;
const DAY_SECS: u64 = 24 * 60 * 60;

impl Default for ShipperConfig {
    fn default() -> Self {
        Self {
            host: "logger.example.com".to_string(),
            port: DEFAULT_PORT,
            directory: PathBuf::from("analytics_logs"),
            file_prefix: DEFAULT_FILE_PREFIX.to_string(),
            retention_days: DEFAULT_RETENTION_DAYS,
            retention_policy: RetentionPolicy::default(),
            cleanup_interval_secs: DAY_SECS,
            send_timeout_ms: 5_000,
        }
    }
}

impl ShipperConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_server(mut self, host: impl Into<String>, port: u16) -> Self {
        self.host = host.into();
        self.port = port;
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_directory(mut self, directory: impl Into<PathBuf>) -> Self {
        self.directory = directory.into();
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_file_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.file_prefix = prefix.into();
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_retention(mut self, days: u32, policy: RetentionPolicy) -> Self {
        self.retention_days = days;
        self.retention_policy = policy;
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_cleanup_interval(mut self, interval: Duration) -> Self {
        self.cleanup_interval_secs = interval.as_secs();
        self
    }

    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_send_timeout(mut self, timeout: Duration) -> Self {
        self.send_timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
        self
    }

    pub fn cleanup_interval(&self) -> Duration {
        Duration::from_secs(self.cleanup_interval_secs)
    }

    pub fn send_timeout(&self) -> Duration {
        Duration::from_millis(self.send_timeout_ms)
    }

    /// Check the configuration for values the shipper cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.host.trim().is_empty() {
            return Err(AnalyticsError::config("ShipperConfig", "host must not be empty"));
        }
        if self.port == 0 {
            return Err(AnalyticsError::config("ShipperConfig", "port must be non-zero"));
        }
        if self.file_prefix.is_empty() {
            return Err(AnalyticsError::config("ShipperConfig", "file_prefix must not be empty"));
        }
        if self.file_prefix.contains(['/', '\\']) || self.file_prefix.contains("..") {
            return Err(AnalyticsError::config(
                "ShipperConfig",
                format!("file_prefix '{}' must be a plain file name", self.file_prefix),
            ));
        }
        if self.retention_days == 0 {
            return Err(AnalyticsError::config("ShipperConfig", "retention_days must be at least 1"));
        }
        if self.cleanup_interval_secs == 0 {
            return Err(AnalyticsError::config("ShipperConfig", "cleanup interval must be non-zero"));
        }
        if self.send_timeout_ms == 0 {
            return Err(AnalyticsError::config("ShipperConfig", "send timeout must be non-zero"));
        }
        Ok(())
    }

    /// Parse and validate a JSON configuration
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: ShipperConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON configuration file
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            AnalyticsError::config(
                "ShipperConfig",
                format!("cannot read '{}': {}", path.display(), e),
            )
        })?;
        Self::from_json_str(&json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = ShipperConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.port, 5958);
        assert_eq!(config.retention_days, 7);
        assert_eq!(config.cleanup_interval(), Duration::from_secs(86_400));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = ShipperConfig::from_json_str(
            r#"{ "host": "logs.internal", "retention_policy": "exact_offset" }"#,
        )
        .unwrap();

        assert_eq!(config.host, "logs.internal");
        assert_eq!(config.retention_policy, RetentionPolicy::ExactOffset);
        assert_eq!(config.file_prefix, DEFAULT_FILE_PREFIX);
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(ShipperConfig::new().with_server("", 5958).validate().is_err());
        assert!(ShipperConfig::new().with_server("h", 0).validate().is_err());
        assert!(ShipperConfig::new().with_file_prefix("../evil").validate().is_err());
        assert!(ShipperConfig::new()
            .with_retention(0, RetentionPolicy::Sweep)
            .validate()
            .is_err());
        assert!(ShipperConfig::from_json_str(r#"{ "port": 0 }"#).is_err());
    }

    #[test]
    fn test_malformed_json_is_json_error() {
        let err = ShipperConfig::from_json_str("{ not json").unwrap_err();
        assert!(matches!(err, AnalyticsError::JsonError(_)));
    }
}

//! Detector configuration
//!
//! Configuration loaded from environment variables and command line.

use std::time::Duration;
use thiserror::Error;

/// Environment variable holding the settle interval in seconds
pub const SETTLE_INTERVAL_ENV: &str = "GRIDWATCH_SETTLE_INTERVAL";

/// Configuration errors
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

/// Rebalance detector configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectorConfig {
    /// Time between the two bucket snapshots of one check
    pub settle_interval: Duration,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            settle_interval: Duration::from_secs(5),
        }
    }
}

impl DetectorConfig {
    /// Create configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let settle_interval = match lookup(SETTLE_INTERVAL_ENV) {
            Some(raw) => {
                let secs: u64 = raw.trim().parse().map_err(|_| {
                    ConfigError::InvalidValue(SETTLE_INTERVAL_ENV.to_string(), raw.clone())
                })?;
                Duration::from_secs(secs)
            }
            None => DetectorConfig::default().settle_interval,
        };

        Ok(Self { settle_interval })
    }

    pub fn with_settle_interval(settle_interval: Duration) -> Self {
        Self { settle_interval }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = DetectorConfig::default();
        assert_eq!(config.settle_interval, Duration::from_secs(5));
    }

    #[test]
    fn test_env_override() {
        let config = DetectorConfig::from_lookup(|key| {
            (key == SETTLE_INTERVAL_ENV).then(|| "12".to_string())
        })
        .unwrap();
        assert_eq!(config.settle_interval, Duration::from_secs(12));
    }

    #[test]
    fn test_env_unset_uses_default() {
        let config = DetectorConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config, DetectorConfig::default());
    }

    #[test]
    fn test_env_invalid_value() {
        let err = DetectorConfig::from_lookup(|_| Some("soon".to_string())).unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidValue(SETTLE_INTERVAL_ENV.to_string(), "soon".to_string())
        );
    }
}

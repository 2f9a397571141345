//! Configuration management
//!
//! Handles storing and loading CLI configuration.
//! Config directory: ~/.gridwatch/ (cross-platform)
//!
//! Config file format (~/.gridwatch/config.toml):
//! ```toml
//! [bridge]
//! host = "locator1.example.com"
//! port = 8778
//! context = "bridge"
//! request_timeout_secs = 10
//!
//! [rebalance]
//! settle_interval_secs = 5
//! ```
//!
//! Values missing from the file fall back to `GRIDWATCH_*` environment
//! variables, then to built-in defaults. Command-line flags override all.

use anyhow::{Context, Result};
use gridwatch_core::{DEFAULT_CONTEXT, DEFAULT_PORT};
use gridwatch_rebalancer::DetectorConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::warn;

/// Structure of ~/.gridwatch/config.toml
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct GridwatchConfig {
    /// Management bridge settings
    #[serde(default)]
    pub bridge: BridgeSettings,

    /// Rebalance check settings
    #[serde(default)]
    pub rebalance: RebalanceSettings,
}

/// Management bridge connection settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BridgeSettings {
    /// Host to query when none is given on the command line
    #[serde(default = "default_host", skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,

    /// Bridge port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Context path the bridge is mounted under
    #[serde(default = "default_context")]
    pub context: String,

    /// Per-request timeout; unset keeps the HTTP client default
    #[serde(default = "default_request_timeout", skip_serializing_if = "Option::is_none")]
    pub request_timeout_secs: Option<u64>,
}

impl Default for BridgeSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            context: default_context(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl BridgeSettings {
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}

fn default_host() -> Option<String> {
    std::env::var("GRIDWATCH_HOST").ok()
}

fn default_port() -> u16 {
    std::env::var("GRIDWATCH_PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(DEFAULT_PORT)
}

fn default_context() -> String {
    std::env::var("GRIDWATCH_CONTEXT").unwrap_or_else(|_| DEFAULT_CONTEXT.to_string())
}

fn default_request_timeout() -> Option<u64> {
    std::env::var("GRIDWATCH_REQUEST_TIMEOUT")
        .ok()
        .and_then(|v| v.parse().ok())
}

/// Rebalance check settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RebalanceSettings {
    /// Seconds between the two bucket snapshots of a check
    #[serde(default = "default_settle_interval_secs")]
    pub settle_interval_secs: u64,
}

impl Default for RebalanceSettings {
    fn default() -> Self {
        Self {
            settle_interval_secs: default_settle_interval_secs(),
        }
    }
}

impl RebalanceSettings {
    pub fn settle_interval(&self) -> Duration {
        Duration::from_secs(self.settle_interval_secs)
    }
}

fn default_settle_interval_secs() -> u64 {
    match DetectorConfig::from_env() {
        Ok(config) => config.settle_interval.as_secs(),
        Err(e) => {
            warn!(error = %e, "Ignoring settle interval from environment");
            DetectorConfig::default().settle_interval.as_secs()
        }
    }
}

/// Get the config directory path (~/.gridwatch/)
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir().context("Could not determine home directory")?;
    Ok(home.join(".gridwatch"))
}

/// Get the config file path
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join("config.toml"))
}

/// Load configuration from `path`.
/// Falls back to defaults if the file is missing or unreadable.
pub fn load_config_from(path: &Path) -> GridwatchConfig {
    if !path.exists() {
        return GridwatchConfig::default();
    }

    match fs::read_to_string(path) {
        Ok(content) => match toml::from_str(&content) {
            Ok(config) => config,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to parse config file");
                GridwatchConfig::default()
            }
        },
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Failed to read config file");
            GridwatchConfig::default()
        }
    }
}

/// Save configuration to `path`, creating its directory if needed
pub fn save_config_to(path: &Path, config: &GridwatchConfig) -> Result<()> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create config directory {}", dir.display()))?;
    }
    let content = toml::to_string_pretty(config).context("Failed to serialize config")?;
    fs::write(path, content).context("Failed to write config file")?;
    Ok(())
}

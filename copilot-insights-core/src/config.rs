//! Configuration loading and management
//!
//! Configuration is loaded from `~/.config/copilot-insights/config.toml`
//!
//! This module follows the XDG Base Directory Specification:
//! - Config: `$XDG_CONFIG_HOME/copilot-insights/` (~/.config/copilot-insights/)
//! - Data: `$XDG_DATA_HOME/copilot-insights/` (~/.local/share/copilot-insights/)
//! - State/Logs: `$XDG_STATE_HOME/copilot-insights/` (~/.local/state/copilot-insights/)

use crate::analytics::{SummaryOptions, TimeFrame, TimeRange, WeekStart};
use crate::analytics::{DEFAULT_ACTIVE_SEAT_WINDOW_DAYS, DEFAULT_MOST_USED_MODEL};
use crate::error::{Error, Result};
use crate::types::Scope;
use serde::Deserialize;
use std::path::{Path, PathBuf};

const APP_DIR: &str = "copilot-insights";

/// Returns a best-effort home directory path.
fn home_dir() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Returns XDG_CONFIG_HOME or ~/.config
fn xdg_config_home() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".config"))
}

/// Returns XDG_DATA_HOME or ~/.local/share
fn xdg_data_home() -> PathBuf {
    std::env::var("XDG_DATA_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".local/share"))
}

/// Returns XDG_STATE_HOME or ~/.local/state
fn xdg_state_home() -> PathBuf {
    std::env::var("XDG_STATE_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".local/state"))
}

/// Main configuration struct
#[derive(Debug, Deserialize, Default)]
pub struct Config {
    /// Aggregation defaults
    #[serde(default)]
    pub insights: InsightsConfig,

    /// Where records come from
    #[serde(default)]
    pub source: SourceConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Aggregation defaults
#[derive(Debug, Deserialize)]
pub struct InsightsConfig {
    /// Query window used when none is given
    #[serde(default)]
    pub default_time_range: TimeRange,

    /// Bucket granularity used when none is given
    #[serde(default)]
    pub default_time_frame: TimeFrame,

    /// First day of weekly buckets
    #[serde(default)]
    pub week_start: WeekStart,

    /// Days since last activity for a seat to count as active
    #[serde(default = "default_active_seat_window_days")]
    pub active_seat_window_days: i64,

    /// Reported as most-used model when the data names none
    #[serde(default = "default_fallback_model")]
    pub fallback_model: String,
}

impl Default for InsightsConfig {
    fn default() -> Self {
        Self {
            default_time_range: TimeRange::default(),
            default_time_frame: TimeFrame::default(),
            week_start: WeekStart::default(),
            active_seat_window_days: default_active_seat_window_days(),
            fallback_model: default_fallback_model(),
        }
    }
}

impl InsightsConfig {
    pub fn summary_options(&self) -> SummaryOptions {
        SummaryOptions {
            active_seat_window_days: self.active_seat_window_days,
            fallback_model: self.fallback_model.clone(),
        }
    }
}

fn default_active_seat_window_days() -> i64 {
    DEFAULT_ACTIVE_SEAT_WINDOW_DAYS
}

fn default_fallback_model() -> String {
    DEFAULT_MOST_USED_MODEL.to_string()
}

/// Kind of query layer
#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// JSON export files on disk
    #[default]
    File,
    /// Dashboard backend API
    Http,
}

/// Query layer configuration
#[derive(Debug, Deserialize, Clone)]
pub struct SourceConfig {
    #[serde(default)]
    pub kind: SourceKind,

    /// Metrics export file (default: `$XDG_DATA_HOME/copilot-insights/metrics.json`)
    pub metrics_path: Option<PathBuf>,

    /// Seats export file (default: `$XDG_DATA_HOME/copilot-insights/seats.json`)
    pub seats_path: Option<PathBuf>,

    /// API base URL, e.g. `https://insights.example.com/api`
    pub api_base_url: Option<String>,

    /// HTTP request timeout in seconds
    #[serde(default = "default_source_timeout")]
    pub timeout_secs: u64,

    /// Enterprise / organization / team to query
    #[serde(flatten)]
    pub scope: Scope,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            kind: SourceKind::default(),
            metrics_path: None,
            seats_path: None,
            api_base_url: None,
            timeout_secs: default_source_timeout(),
            scope: Scope::default(),
        }
    }
}

impl SourceConfig {
    /// Validate configuration, returning error message if invalid
    pub fn validate(&self) -> Result<()> {
        if self.kind == SourceKind::Http && self.api_base_url.is_none() {
            return Err(Error::Config(
                "source.api_base_url is required when source.kind = \"http\"".to_string(),
            ));
        }
        if self.timeout_secs == 0 {
            return Err(Error::Config(
                "source.timeout_secs must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    pub fn metrics_path(&self) -> PathBuf {
        self.metrics_path
            .clone()
            .unwrap_or_else(|| Config::data_dir().join("metrics.json"))
    }

    pub fn seats_path(&self) -> PathBuf {
        self.seats_path
            .clone()
            .unwrap_or_else(|| Config::data_dir().join("seats.json"))
    }
}

fn default_source_timeout() -> u64 {
    30
}

/// Logging configuration
#[derive(Debug, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Maximum number of log files to keep
    #[serde(default = "default_max_log_files")]
    pub max_files: usize,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            max_files: default_max_log_files(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_max_log_files() -> usize {
    5
}

impl Config {
    /// Load configuration from the default path
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();

        if !config_path.exists() {
            tracing::info!("No config file found at {:?}, using defaults", config_path);
            return Ok(Config::default());
        }

        Self::load_from(&config_path)
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("failed to read config file {:?}: {}", path, e)))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("failed to parse config: {}", e)))?;

        config.source.validate()?;
        Ok(config)
    }

    /// Returns the default config file path
    ///
    /// `$XDG_CONFIG_HOME/copilot-insights/config.toml`
    pub fn config_path() -> PathBuf {
        xdg_config_home().join(APP_DIR).join("config.toml")
    }

    /// Returns the data directory path (for JSON exports)
    ///
    /// `$XDG_DATA_HOME/copilot-insights/`
    pub fn data_dir() -> PathBuf {
        xdg_data_home().join(APP_DIR)
    }

    /// Returns the state directory path (for logs)
    ///
    /// `$XDG_STATE_HOME/copilot-insights/`
    pub fn state_dir() -> PathBuf {
        xdg_state_home().join(APP_DIR)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.insights.default_time_range, TimeRange::Last28Days);
        assert_eq!(config.insights.default_time_frame, TimeFrame::Daily);
        assert_eq!(config.insights.week_start, WeekStart::Monday);
        assert_eq!(config.insights.active_seat_window_days, 30);
        assert_eq!(config.insights.fallback_model, "Claude Sonnet 4.5");
        assert_eq!(config.source.kind, SourceKind::File);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_parse_config() {
        let toml = r#"
[insights]
default_time_range = "3_months"
default_time_frame = "weekly"
week_start = "sunday"
active_seat_window_days = 14

[source]
kind = "http"
api_base_url = "https://insights.example.com/api"
organization = "acme"

[logging]
level = "debug"
"#;
        let config: Config = toml::from_str(toml).unwrap();

        assert_eq!(config.insights.default_time_range, TimeRange::Last3Months);
        assert_eq!(config.insights.default_time_frame, TimeFrame::Weekly);
        assert_eq!(config.insights.week_start, WeekStart::Sunday);
        assert_eq!(config.insights.summary_options().active_seat_window_days, 14);
        assert_eq!(config.source.kind, SourceKind::Http);
        assert_eq!(config.source.scope.organization.as_deref(), Some("acme"));
        assert_eq!(config.source.timeout_secs, 30);
        assert!(config.source.validate().is_ok());
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_source_config_validation() {
        // File source needs nothing
        assert!(SourceConfig::default().validate().is_ok());

        // HTTP without a base URL should fail
        let config = SourceConfig {
            kind: SourceKind::Http,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = SourceConfig {
            timeout_secs: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_explicit_paths_win() {
        let config = SourceConfig {
            metrics_path: Some(PathBuf::from("/tmp/m.json")),
            ..Default::default()
        };
        assert_eq!(config.metrics_path(), PathBuf::from("/tmp/m.json"));
        assert!(config.seats_path().ends_with("copilot-insights/seats.json"));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[source]\nkind = \"http\"\n").unwrap();

        // HTTP without a base URL is rejected at load time
        assert!(Config::load_from(&path).is_err());

        std::fs::write(&path, "[insights]\nfallback_model = \"GPT-4.1\"\n").unwrap();
        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.insights.fallback_model, "GPT-4.1");
    }
}

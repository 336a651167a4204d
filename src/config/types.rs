//! Configuration types.
//!
//! This module defines the JSON configuration file layout and the logging
//! enums shared by the configuration file and the command line.
//!
//! Every component section is optional: a component whose section is absent
//! is simply not wired, and its operations fail with `NotInitialized`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::ValueEnum;
use serde::Deserialize;

use crate::config::constants::{
    DB_PATH, DEFAULT_CACHE_TIME, DEFAULT_MAX_DISTANCE_METERS, DEFAULT_ORIGIN_TIMEOUT,
    DEFAULT_SWEEP_INTERVAL, PACC_DEFAULT_SENTINEL,
};
use crate::error_handling::{ConfigError, ConfigValidationError};

/// Logging level for the application.
///
/// Controls the verbosity of log output, from most restrictive (Error) to most
/// verbose (Trace).
#[derive(Clone, Debug, PartialEq, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Only error messages
    Error,
    /// Error and warning messages
    Warn,
    /// Error, warning, and informational messages
    Info,
    /// All messages except trace
    Debug,
    /// All messages including trace
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(l: LogLevel) -> Self {
        match l {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Log output format.
///
/// - `Plain`: Human-readable format with colors (default)
/// - `Json`: Structured JSON format for machine parsing
#[derive(Clone, Debug, PartialEq, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable format with colors (default)
    Plain,
    /// Structured JSON format for machine parsing
    Json,
}

/// Settings of the assistance-data cache and its origin servers.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AssistanceConfig {
    /// Token sent to the origin servers
    pub token: String,

    /// Origin servers, tried in order until one answers 200
    pub servers: Vec<String>,

    /// Position accuracy in meters passed as `pacc` (sentinel 300000 = origin default)
    pub pacc: u32,

    /// Per-origin request timeout in seconds (0 = default)
    pub timeout_secs: u64,

    /// Lifetime of a cache entry in seconds (0 = default)
    pub cache_time_secs: u64,

    /// Maximum distance in meters between a request and a cached reading
    pub max_distance: f64,

    /// Propagate store read errors instead of treating them as a cache miss
    pub strict_cache_reads: bool,

    /// Interval in seconds between expired-entry sweeps (0 = default)
    pub sweep_interval_secs: u64,
}

impl Default for AssistanceConfig {
    fn default() -> Self {
        Self {
            token: String::new(),
            servers: Vec::new(),
            pacc: PACC_DEFAULT_SENTINEL,
            timeout_secs: 0,
            cache_time_secs: 0,
            max_distance: DEFAULT_MAX_DISTANCE_METERS,
            strict_cache_reads: false,
            sweep_interval_secs: 0,
        }
    }
}

impl AssistanceConfig {
    /// Per-origin request timeout, falling back to two minutes.
    pub fn timeout(&self) -> Duration {
        non_zero_secs(self.timeout_secs).unwrap_or(DEFAULT_ORIGIN_TIMEOUT)
    }

    /// Cache entry lifetime, falling back to thirty minutes.
    pub fn cache_time(&self) -> Duration {
        non_zero_secs(self.cache_time_secs).unwrap_or(DEFAULT_CACHE_TIME)
    }

    /// Expiry sweep interval, falling back to one minute.
    pub fn sweep_interval(&self) -> Duration {
        non_zero_secs(self.sweep_interval_secs).unwrap_or(DEFAULT_SWEEP_INTERVAL)
    }
}

fn non_zero_secs(secs: u64) -> Option<Duration> {
    (secs > 0).then(|| Duration::from_secs(secs))
}

/// Settings of the geofence index. Its presence alone enables the component.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct GeofenceConfig {}

/// Service configuration, usually loaded from a JSON file.
///
/// # Examples
///
/// ```no_run
/// use location_service::Config;
///
/// let config = Config::load("config.json").expect("valid config");
/// assert!(config.geofence.is_some());
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Database path (SQLite file)
    pub db_path: PathBuf,

    /// Log level
    pub log_level: LogLevel,

    /// Log format
    pub log_format: LogFormat,

    /// Assistance-data cache; `None` leaves it unwired
    pub assistance: Option<AssistanceConfig>,

    /// Geofence index; `None` leaves it unwired
    pub geofence: Option<GeofenceConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from(DB_PATH),
            log_level: LogLevel::Info,
            log_format: LogFormat::Plain,
            assistance: None,
            geofence: None,
        }
    }
}

impl Config {
    /// Reads, parses and validates a JSON configuration file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Read` if the file cannot be read,
    /// `ConfigError::Parse` if it is not valid JSON for this layout and
    /// `ConfigError::Invalid` if a field fails [`Config::validate`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let data = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let config: Config = serde_json::from_str(&data)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that every configured value is usable.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        let Some(assistance) = &self.assistance else {
            return Ok(());
        };

        if assistance.servers.is_empty() {
            return Err(ConfigValidationError {
                field: "assistance.servers",
                message: "at least one origin server is required".to_string(),
            });
        }
        for server in &assistance.servers {
            match url::Url::parse(server) {
                Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => {}
                Ok(parsed) => {
                    return Err(ConfigValidationError {
                        field: "assistance.servers",
                        message: format!(
                            "unsupported scheme '{}' in {server}; expected http or https",
                            parsed.scheme()
                        ),
                    })
                }
                Err(e) => {
                    return Err(ConfigValidationError {
                        field: "assistance.servers",
                        message: format!("{server} is not a valid URL: {e}"),
                    })
                }
            }
        }

        if !assistance.max_distance.is_finite() || assistance.max_distance <= 0.0 {
            return Err(ConfigValidationError {
                field: "assistance.max_distance",
                message: format!(
                    "must be a positive number of meters, got {}",
                    assistance.max_distance
                ),
            });
        }

        Ok(())
    }
}

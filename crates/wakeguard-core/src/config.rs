//! Configuration management
//!
//! Handles loading, validation, and atomic saving of the YAML
//! configuration file. A missing file is replaced with written defaults;
//! a file that exists but fails to parse or validate is a fatal startup
//! error.

use crate::error::ConfigError;
use crate::schedule::{parse_session_time, WorkSchedule};
use crate::simulate::SimulationMode;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Top-level configuration snapshot.
///
/// Immutable for the lifetime of one daemon run; shared read-only across
/// all loops behind an `Arc`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Application metadata
    #[serde(default)]
    pub daemon: DaemonInfo,

    /// Task scheduler settings
    #[serde(default)]
    pub scheduler: SchedulerConfig,

    /// Idle prevention settings
    #[serde(default)]
    pub idle_prevention: IdlePreventionConfig,

    /// Watchdog settings
    #[serde(default)]
    pub health: HealthConfig,

    /// Retry policy for the input adapter
    #[serde(default)]
    pub retry: RetryPolicyConfig,

    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Weekly work schedule
    #[serde(default)]
    pub work_schedule: WorkSchedule,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            daemon: DaemonInfo::default(),
            scheduler: SchedulerConfig::default(),
            idle_prevention: IdlePreventionConfig::default(),
            health: HealthConfig::default(),
            retry: RetryPolicyConfig::default(),
            logging: LoggingConfig::default(),
            work_schedule: WorkSchedule::default(),
        }
    }
}

/// Application name and version carried in the configuration file
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DaemonInfo {
    #[serde(default = "default_daemon_name")]
    pub name: String,

    #[serde(default = "default_daemon_version")]
    pub version: String,
}

impl Default for DaemonInfo {
    fn default() -> Self {
        Self {
            name: default_daemon_name(),
            version: default_daemon_version(),
        }
    }
}

/// Task scheduler configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SchedulerConfig {
    /// Cadence of the schedule-gated task loop (default: 5m).
    ///
    /// Must be strictly smaller than the idle-prevention interval so the
    /// scheduler observes state changes faster than idle prevention can
    /// mask them.
    #[serde(default = "default_scheduler_interval", with = "humantime_serde")]
    pub interval: Duration,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            interval: default_scheduler_interval(),
        }
    }
}

/// Idle prevention configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct IdlePreventionConfig {
    /// Whether the always-on prevention loop and its watchdog run at all
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Expected maximum gap between simulated inputs (default: 10m).
    /// The watchdog threshold derives from this value.
    #[serde(default = "default_prevention_interval", with = "humantime_serde")]
    pub interval: Duration,

    /// Kind of input synthesized on each tick
    #[serde(default = "default_mode")]
    pub mode: SimulationMode,
}

impl Default for IdlePreventionConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            interval: default_prevention_interval(),
            mode: default_mode(),
        }
    }
}

/// Watchdog configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HealthConfig {
    /// Slack added to the idle-prevention interval before observed idle
    /// time counts as a silent failure (default: 1m)
    #[serde(default = "default_health_margin", with = "humantime_serde")]
    pub margin: Duration,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            margin: default_health_margin(),
        }
    }
}

/// Retry policy consumed by the input adapter
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RetryPolicyConfig {
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    #[serde(default = "default_retry_interval", with = "humantime_serde")]
    pub retry_interval: Duration,
}

impl Default for RetryPolicyConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            retry_interval: default_retry_interval(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// Minimum level: error, warn, info, debug, or trace
    #[serde(default = "default_log_level")]
    pub level: String,

    /// `"console"` for stdout, anything else is treated as a file path
    #[serde(default = "default_log_output")]
    pub output: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            output: default_log_output(),
        }
    }
}

// Default value functions
fn default_daemon_name() -> String {
    "wakeguard".to_string()
}

fn default_daemon_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

fn default_scheduler_interval() -> Duration {
    Duration::from_secs(5 * 60)
}

fn default_enabled() -> bool {
    true
}

fn default_prevention_interval() -> Duration {
    Duration::from_secs(10 * 60)
}

fn default_mode() -> SimulationMode {
    SimulationMode::Mixed
}

fn default_health_margin() -> Duration {
    Duration::from_secs(60)
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_interval() -> Duration {
    Duration::from_secs(10)
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_output() -> String {
    "console".to_string()
}

impl Config {
    /// Watchdog threshold: observed idle time beyond this means the
    /// prevention mechanism has silently failed
    pub fn health_threshold(&self) -> Duration {
        self.idle_prevention.interval + self.health.margin
    }

    /// Validates the configuration values.
    ///
    /// # Errors
    /// Returns `ConfigError::InvalidValue` if:
    /// - either interval is zero
    /// - the scheduler interval is not strictly smaller than the
    ///   idle-prevention interval
    /// - the health margin is zero
    /// - the log level is unknown
    /// - any work session has an unparsable bound or a start that does
    ///   not strictly precede its end
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.scheduler.interval.is_zero() {
            return Err(ConfigError::InvalidValue(
                "scheduler.interval must be > 0".to_string(),
            ));
        }

        if self.idle_prevention.interval.is_zero() {
            return Err(ConfigError::InvalidValue(
                "idle_prevention.interval must be > 0".to_string(),
            ));
        }

        if self.scheduler.interval >= self.idle_prevention.interval {
            return Err(ConfigError::InvalidValue(format!(
                "scheduler.interval ({:?}) must be smaller than idle_prevention.interval ({:?})",
                self.scheduler.interval, self.idle_prevention.interval
            )));
        }

        if self.health.margin.is_zero() {
            return Err(ConfigError::InvalidValue(
                "health.margin must be > 0".to_string(),
            ));
        }

        if self
            .logging
            .level
            .parse::<crate::logging::LogLevel>()
            .is_err()
        {
            return Err(ConfigError::InvalidValue(format!(
                "logging.level '{}' is not one of: error, warn, info, debug, trace",
                self.logging.level
            )));
        }

        for (day, sessions) in &self.work_schedule {
            for session in sessions {
                let start = parse_session_time(&session.start).ok_or_else(|| {
                    ConfigError::InvalidValue(format!(
                        "work_schedule.{} start time '{}' is not HH:MM",
                        day, session.start
                    ))
                })?;
                let end = parse_session_time(&session.end).ok_or_else(|| {
                    ConfigError::InvalidValue(format!(
                        "work_schedule.{} end time '{}' is not HH:MM",
                        day, session.end
                    ))
                })?;
                if start >= end {
                    return Err(ConfigError::InvalidValue(format!(
                        "work_schedule.{}: start ({}) must be before end ({})",
                        day, session.start, session.end
                    )));
                }
            }
        }

        Ok(())
    }
}

/// Returns the default configuration file path (`~/.wakeguard/config.yaml`)
pub fn default_config_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".wakeguard")
        .join("config.yaml")
}

/// Loads configuration from the specified path.
///
/// If the file does not exist, a default configuration file is written
/// and the defaults returned. A file that exists but fails to parse or
/// validate is a fatal error; the daemon must not start on a
/// configuration the user did not intend.
pub fn load_config_from_path(path: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        let default_config = Config::default();
        save_config(path, &default_config)?;
        tracing::info!("Created default configuration file at {:?}", path);
        return Ok(default_config);
    }

    let content = fs::read_to_string(path)?;

    let config: Config = serde_yaml::from_str(&content)
        .map_err(|e| ConfigError::ParseError(format!("{}: {}", path.display(), e)))?;

    config.validate()?;

    Ok(config)
}

/// Loads configuration from the default path
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from_path(&default_config_path())
}

/// Atomically writes the configuration to the given path.
///
/// Serializes to a temporary sibling first, then renames over the target
/// so a crash mid-write never leaves a truncated file.
pub fn save_config(path: &Path, config: &Config) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let yaml = serde_yaml::to_string(config)
        .map_err(|e| ConfigError::ParseError(e.to_string()))?;

    let tmp_path = path.with_extension("yaml.tmp");
    fs::write(&tmp_path, yaml)?;
    fs::rename(&tmp_path, path)?;

    Ok(())
}

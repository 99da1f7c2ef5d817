//! Wakeguard Core - Domain logic for the work-hours aware keep-awake daemon
//!
//! This crate contains the configuration model, the work-schedule
//! evaluator, the daemon's control loops, and the port definitions that
//! the platform adapters implement.

pub mod config;
pub mod daemon;
pub mod error;
pub mod health;
pub mod idle_guard;
pub mod logging;
pub mod ports;
pub mod schedule;
pub mod scheduler;
pub mod simulate;

// Re-export primary types for convenient access
pub use config::{
    default_config_path, load_config, load_config_from_path, save_config, Config, HealthConfig,
    IdlePreventionConfig, LoggingConfig, RetryPolicyConfig, SchedulerConfig,
};
pub use daemon::{Daemon, DaemonState};
pub use error::{ConfigError, WakeguardError};
pub use health::HealthMonitor;
pub use idle_guard::{IdleGuard, PREVENTION_TICK};
pub use logging::{init_logger, LogLevel, LogOutput, LoggerConfig, LoggerError, LoggerGuard};
pub use ports::idle::{IdlePort, IdleQueryError};
pub use ports::input::{InputAction, InputError, InputPort};
pub use schedule::{is_work_time, weekday_key, WorkSchedule, WorkSession};
pub use scheduler::{SchedulerError, TaskScheduler};
pub use simulate::{simulate_activity, simulate_once, SimulateError, SimulationMode};

//! Common error types
//!
//! Domain-specific errors live next to their modules and are re-exported
//! here; `WakeguardError` wraps them all for callers that need a single
//! error surface.

use thiserror::Error;

pub use crate::logging::LoggerError;
pub use crate::ports::idle::IdleQueryError;
pub use crate::ports::input::InputError;
pub use crate::scheduler::SchedulerError;
pub use crate::simulate::SimulateError;

/// Top-level error type
#[derive(Debug, Error)]
pub enum WakeguardError {
    /// Configuration errors are fatal before the daemon constructs
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Input simulation errors
    #[error("Input error: {0}")]
    Input(#[from] InputError),

    /// Simulation orchestration errors
    #[error("Simulation error: {0}")]
    Simulate(#[from] SimulateError),

    /// Idle-time query errors
    #[error("Idle query error: {0}")]
    IdleQuery(#[from] IdleQueryError),

    /// Scheduler errors
    #[error("Scheduler error: {0}")]
    Scheduler(#[from] SchedulerError),

    /// Logger errors
    #[error("Logger error: {0}")]
    Logger(#[from] LoggerError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Parse error
    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    /// A field violated a validation invariant
    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

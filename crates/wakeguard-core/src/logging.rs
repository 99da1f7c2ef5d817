//! Logging infrastructure
//!
//! Builds the `tracing` subscriber from the configuration's logging
//! section. The logger is an explicitly constructed handle: callers
//! initialize it once at startup and hold the returned guard, rather
//! than relying on lazily initialized global state.

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Errors that can occur during logger initialization
#[derive(Debug, Error)]
pub enum LoggerError {
    /// Failed to create the log directory
    #[error("Failed to create log directory: {0}")]
    DirectoryCreationFailed(String),

    /// Failed to install the subscriber
    #[error("Failed to initialize logger: {0}")]
    InitializationFailed(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Log level configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Converts to tracing's LevelFilter
    pub fn to_level_filter(self) -> tracing::level_filters::LevelFilter {
        use tracing::level_filters::LevelFilter;
        match self {
            LogLevel::Error => LevelFilter::ERROR,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Trace => LevelFilter::TRACE,
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogLevel::Error => write!(f, "error"),
            LogLevel::Warn => write!(f, "warn"),
            LogLevel::Info => write!(f, "info"),
            LogLevel::Debug => write!(f, "debug"),
            LogLevel::Trace => write!(f, "trace"),
        }
    }
}

impl std::str::FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "error" => Ok(LogLevel::Error),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "info" => Ok(LogLevel::Info),
            "debug" => Ok(LogLevel::Debug),
            "trace" => Ok(LogLevel::Trace),
            _ => Err(format!("Unknown log level: {}", s)),
        }
    }
}

/// Where log lines go
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogOutput {
    /// Human-readable output on stdout
    Console,
    /// Daily-rotated file at the given path
    File(PathBuf),
}

impl LogOutput {
    /// Interprets the configuration's output field: the literal
    /// `"console"` selects stdout, anything else is a file path.
    pub fn parse(raw: &str) -> Self {
        if raw.eq_ignore_ascii_case("console") {
            LogOutput::Console
        } else {
            LogOutput::File(PathBuf::from(raw))
        }
    }
}

/// Logger configuration handle
#[derive(Debug, Clone)]
pub struct LoggerConfig {
    pub level: LogLevel,
    pub output: LogOutput,
}

impl LoggerConfig {
    pub fn new(level: LogLevel, output: LogOutput) -> Self {
        Self { level, output }
    }

    /// Builds the handle from the configuration's logging section
    pub fn from_config(logging: &crate::config::LoggingConfig) -> Result<Self, LoggerError> {
        let level = logging
            .level
            .parse::<LogLevel>()
            .map_err(LoggerError::InitializationFailed)?;
        Ok(Self::new(level, LogOutput::parse(&logging.output)))
    }
}

/// Guard that keeps the file writer alive
///
/// When dropped, buffered log lines are flushed. Console logging needs
/// no guard; the field is simply empty then.
pub struct LoggerGuard {
    _guard: Option<tracing_appender::non_blocking::WorkerGuard>,
}

/// Initializes the global logger from the given handle.
///
/// Returns a `LoggerGuard` the caller must keep alive for the duration
/// of the program.
pub fn init_logger(config: LoggerConfig) -> Result<LoggerGuard, LoggerError> {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("wakeguard={}", config.level)));

    match config.output {
        LogOutput::Console => {
            let stdout_layer = fmt::layer()
                .with_writer(std::io::stdout)
                .with_ansi(true)
                .with_target(true);

            tracing_subscriber::registry()
                .with(env_filter)
                .with(stdout_layer)
                .try_init()
                .map_err(|e| LoggerError::InitializationFailed(e.to_string()))?;

            Ok(LoggerGuard { _guard: None })
        }
        LogOutput::File(ref path) => {
            let (dir, file_name) = split_log_path(path)?;

            if !dir.exists() {
                std::fs::create_dir_all(&dir).map_err(|e| {
                    LoggerError::DirectoryCreationFailed(format!("{}: {}", dir.display(), e))
                })?;
            }

            let file_appender = tracing_appender::rolling::daily(&dir, file_name);
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

            let file_layer = fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(true)
                .with_file(true)
                .with_line_number(true);

            tracing_subscriber::registry()
                .with(env_filter)
                .with(file_layer)
                .try_init()
                .map_err(|e| LoggerError::InitializationFailed(e.to_string()))?;

            tracing::info!(log_file = %path.display(), level = %config.level, "Logger initialized");

            Ok(LoggerGuard {
                _guard: Some(guard),
            })
        }
    }
}

/// Splits a log file path into its directory and file name for the
/// rolling appender
fn split_log_path(path: &Path) -> Result<(PathBuf, String), LoggerError> {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .ok_or_else(|| {
            LoggerError::InitializationFailed(format!(
                "log output path {:?} has no file name",
                path
            ))
        })?;
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    Ok((dir, file_name))
}

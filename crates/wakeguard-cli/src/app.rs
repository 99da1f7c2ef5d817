//! Application initialization
//!
//! Shared bootstrap for all subcommands: load the configuration, build
//! the logger, install a panic hook that records fatal errors before the
//! process dies.

use anyhow::{Context, Result};
use std::panic;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::error;
use wakeguard_core::{
    default_config_path, load_config_from_path, Config, LoggerConfig, LoggerGuard,
};

/// Application context holding initialized components
pub struct AppContext {
    /// Application configuration
    pub config: Arc<Config>,
    /// Keeps the file logger's writer alive for the process lifetime
    #[allow(dead_code)]
    logger_guard: Option<LoggerGuard>,
}

/// Initializes the application.
///
/// Loads (or creates) the configuration, optionally installs the logger
/// described by its logging section, and sets up the panic hook.
/// Configuration errors are fatal here, before any loop starts.
pub fn initialize(config_path: Option<PathBuf>, with_logger: bool) -> Result<AppContext> {
    let path = config_path.unwrap_or_else(default_config_path);
    let config = load_config_from_path(&path)
        .with_context(|| format!("Failed to load configuration from {}", path.display()))?;
    let config = Arc::new(config);

    let logger_guard = if with_logger {
        let logger_config = LoggerConfig::from_config(&config.logging)
            .context("Invalid logging configuration")?;
        Some(wakeguard_core::init_logger(logger_config).context("Failed to initialize logger")?)
    } else {
        None
    };

    setup_panic_hook();

    Ok(AppContext {
        config,
        logger_guard,
    })
}

/// Records panics in the log before the default hook aborts the thread
fn setup_panic_hook() {
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |panic_info| {
        let location = panic_info
            .location()
            .map(|l| format!("{}:{}:{}", l.file(), l.line(), l.column()))
            .unwrap_or_else(|| "unknown location".to_string());

        let message = if let Some(s) = panic_info.payload().downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = panic_info.payload().downcast_ref::<String>() {
            s.clone()
        } else {
            "unknown panic payload".to_string()
        };

        error!("FATAL ERROR at {}: {}", location, message);

        default_hook(panic_info);
    }));
}

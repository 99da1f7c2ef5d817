//! Foreground daemon command
//!
//! Handles `wakeguard run`: starts the daemon and keeps it running until
//! an interrupt or termination signal arrives, then shuts down in order.

use crate::app;
use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::signal;
use wakeguard_adapters::{EnigoInput, SystemIdle};
use wakeguard_core::Daemon;

pub async fn run(config_path: Option<PathBuf>) -> Result<()> {
    let ctx = app::initialize(config_path, true)?;
    let config = Arc::clone(&ctx.config);

    let input = Arc::new(
        EnigoInput::new(&config.retry).context("Failed to initialize the input backend")?,
    );
    let idle = Arc::new(SystemIdle::new());

    let daemon = Daemon::new(Arc::clone(&config), input, idle);
    daemon.start().await;

    println!("Wakeguard daemon started");
    println!("  Simulation mode:    {}", config.idle_prevention.mode);
    println!(
        "  Scheduler interval: {}",
        humantime::format_duration(config.scheduler.interval)
    );
    println!(
        "  Watchdog threshold: {}",
        humantime::format_duration(config.health_threshold())
    );
    println!("Press Ctrl+C to stop.");

    wait_for_shutdown().await;

    println!("\nShutting down...");
    tracing::info!("Shutdown signal received, stopping daemon");
    daemon.stop().await;
    println!("Wakeguard daemon stopped");

    Ok(())
}

/// Blocks until SIGINT or, on Unix, SIGTERM
async fn wait_for_shutdown() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal as unix_signal, SignalKind};

        match unix_signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = signal::ctrl_c() => {}
                    _ = sigterm.recv() => {}
                }
            }
            Err(e) => {
                tracing::warn!("Failed to register SIGTERM handler: {}", e);
                let _ = signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = signal::ctrl_c().await;
    }
}

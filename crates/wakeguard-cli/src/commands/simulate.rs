//! One-shot simulation command
//!
//! Handles `wakeguard simulate`: performs a single activity simulation
//! with the configured (or overridden) mode. Works independently of any
//! running daemon and is the quickest way to verify platform
//! permissions.

use crate::app;
use anyhow::{Context, Result};
use std::path::PathBuf;
use wakeguard_adapters::EnigoInput;
use wakeguard_core::{simulate_once, SimulationMode};

pub async fn run(config_path: Option<PathBuf>, mode: Option<SimulationMode>) -> Result<()> {
    let ctx = app::initialize(config_path, false)?;
    let mode = mode.unwrap_or(ctx.config.idle_prevention.mode);

    let input =
        EnigoInput::new(&ctx.config.retry).context("Failed to initialize the input backend")?;

    simulate_once(&input, mode)
        .await
        .context("Simulation failed")?;

    println!("Simulated {} activity", mode);
    Ok(())
}

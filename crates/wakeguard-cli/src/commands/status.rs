//! Status command
//!
//! Handles `wakeguard status`: prints the effective configuration, the
//! current position relative to the work schedule, and the OS-observed
//! idle time.

use crate::app;
use anyhow::Result;
use chrono::{Datelike, Local};
use std::path::PathBuf;
use wakeguard_adapters::SystemIdle;
use wakeguard_core::ports::idle::IdlePort;
use wakeguard_core::{is_work_time, weekday_key};

pub async fn run(config_path: Option<PathBuf>) -> Result<()> {
    let ctx = app::initialize(config_path, false)?;
    let config = ctx.config;
    let now = Local::now();

    println!("Wakeguard Status");
    println!("================");
    println!();

    let in_work_hours = is_work_time(now, &config.work_schedule);
    println!(
        "Now: {} ({})",
        now.format("%Y-%m-%d %H:%M:%S"),
        if in_work_hours {
            "inside work hours, task execution suppressed"
        } else {
            "outside work hours"
        }
    );

    let today = weekday_key(now.weekday());
    match config.work_schedule.get(today) {
        Some(sessions) if !sessions.is_empty() => {
            println!("Sessions for {}:", today);
            for session in sessions {
                println!("  {} - {}", session.start, session.end);
            }
        }
        _ => println!("No work sessions configured for {}", today),
    }

    match SystemIdle::new().idle_time().await {
        Ok(idle) => println!(
            "OS idle time: {}",
            humantime::format_duration(std::time::Duration::from_secs(idle.as_secs()))
        ),
        Err(e) => println!("OS idle time: unavailable ({})", e),
    }

    println!();
    println!("Configuration");
    println!("-------------");
    println!(
        "  Idle prevention:    {} ({} mode, every {})",
        if config.idle_prevention.enabled {
            "enabled"
        } else {
            "disabled"
        },
        config.idle_prevention.mode,
        humantime::format_duration(wakeguard_core::PREVENTION_TICK)
    );
    println!(
        "  Scheduler interval: {}",
        humantime::format_duration(config.scheduler.interval)
    );
    println!(
        "  Watchdog threshold: {}",
        humantime::format_duration(config.health_threshold())
    );
    println!(
        "  Logging:            {} -> {}",
        config.logging.level, config.logging.output
    );

    Ok(())
}

//! Idle-time query adapter
//!
//! Reads how long the OS has observed no real user input, with one
//! backend per platform. Synthetic events posted by the input adapter
//! reset these timers, which is exactly what the health watchdog relies
//! on.

use async_trait::async_trait;
use std::time::Duration;
use wakeguard_core::ports::idle::{IdlePort, IdleQueryError};

#[cfg(target_os = "macos")]
mod macos;

#[cfg(target_os = "windows")]
mod windows;

#[cfg(target_os = "linux")]
mod linux;

/// Idle-time adapter backed by the current platform's idle source
#[derive(Debug, Default)]
pub struct SystemIdle;

impl SystemIdle {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl IdlePort for SystemIdle {
    async fn idle_time(&self) -> Result<Duration, IdleQueryError> {
        // The macOS and Linux backends shell out; keep that off the
        // async worker threads
        tokio::task::spawn_blocking(query_idle_time)
            .await
            .map_err(|e| IdleQueryError::QueryFailed(format!("idle query task failed: {}", e)))?
    }
}

fn query_idle_time() -> Result<Duration, IdleQueryError> {
    #[cfg(target_os = "macos")]
    {
        macos::query_idle_time()
    }

    #[cfg(target_os = "windows")]
    {
        windows::query_idle_time()
    }

    #[cfg(target_os = "linux")]
    {
        linux::query_idle_time()
    }

    #[cfg(not(any(target_os = "macos", target_os = "windows", target_os = "linux")))]
    {
        Err(IdleQueryError::Unsupported)
    }
}

//! Linux idle-time backend
//!
//! Uses `xprintidle`, which reports milliseconds since the last X11
//! input event. Wayland compositors expose idle time over
//! compositor-specific D-Bus APIs only; the XWayland path covered here
//! is the common denominator.

use std::process::Command;
use std::time::Duration;
use wakeguard_core::ports::idle::IdleQueryError;

pub fn query_idle_time() -> Result<Duration, IdleQueryError> {
    let output = Command::new("xprintidle")
        .output()
        .map_err(|e| IdleQueryError::QueryFailed(format!("failed to run xprintidle: {}", e)))?;

    if !output.status.success() {
        return Err(IdleQueryError::QueryFailed(format!(
            "xprintidle exited with {}",
            output.status
        )));
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    parse_millis(stdout.trim())
}

fn parse_millis(raw: &str) -> Result<Duration, IdleQueryError> {
    raw.parse::<u64>()
        .map(Duration::from_millis)
        .map_err(|e| {
            IdleQueryError::QueryFailed(format!("unexpected xprintidle output '{}': {}", raw, e))
        })
}

//! macOS idle-time backend
//!
//! Reads `HIDIdleTime` (nanoseconds since the last HID event) from the
//! IOKit registry via `ioreg`.

use std::process::Command;
use std::time::Duration;
use wakeguard_core::ports::idle::IdleQueryError;

pub fn query_idle_time() -> Result<Duration, IdleQueryError> {
    let output = Command::new("ioreg")
        .args(["-c", "IOHIDSystem", "-d", "4"])
        .output()
        .map_err(|e| IdleQueryError::QueryFailed(format!("failed to run ioreg: {}", e)))?;

    if !output.status.success() {
        return Err(IdleQueryError::QueryFailed(format!(
            "ioreg exited with {}",
            output.status
        )));
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    parse_hid_idle_time(&stdout)
}

/// Extracts the `"HIDIdleTime" = <nanos>` line from ioreg output
fn parse_hid_idle_time(ioreg_output: &str) -> Result<Duration, IdleQueryError> {
    for line in ioreg_output.lines() {
        if !line.contains("HIDIdleTime") {
            continue;
        }
        if let Some(value) = line.split('=').nth(1) {
            if let Ok(nanos) = value.trim().parse::<u64>() {
                return Ok(Duration::from_nanos(nanos));
            }
        }
    }
    Err(IdleQueryError::QueryFailed(
        "HIDIdleTime not found in ioreg output".to_string(),
    ))
}

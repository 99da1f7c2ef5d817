//! Windows idle-time backend
//!
//! Delta between the current tick count and the tick of the last input
//! event reported by `GetLastInputInfo`. Both counters are 32-bit
//! milliseconds; the wrapping subtraction keeps the delta correct across
//! the ~49-day rollover.

use std::time::Duration;
use wakeguard_core::ports::idle::IdleQueryError;
use windows_sys::Win32::System::SystemInformation::GetTickCount;
use windows_sys::Win32::UI::Input::KeyboardAndMouse::{GetLastInputInfo, LASTINPUTINFO};

pub fn query_idle_time() -> Result<Duration, IdleQueryError> {
    unsafe {
        let mut last_input = LASTINPUTINFO {
            cbSize: std::mem::size_of::<LASTINPUTINFO>() as u32,
            dwTime: 0,
        };

        if GetLastInputInfo(&mut last_input) == 0 {
            return Err(IdleQueryError::QueryFailed(
                "GetLastInputInfo failed".to_string(),
            ));
        }

        let idle_ms = GetTickCount().wrapping_sub(last_input.dwTime);
        Ok(Duration::from_millis(u64::from(idle_ms)))
    }
}

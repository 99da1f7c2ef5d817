//! Input simulation adapter
//!
//! Synthesizes a neutral key tap or a tiny mouse jiggle through `enigo`.
//! Transient send failures are retried per the configured retry policy
//! before being reported to the caller.

use async_trait::async_trait;
use enigo::{Coordinate, Direction, Enigo, Key, Keyboard, Mouse, Settings};
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::sleep;
use tracing::{debug, warn};
use wakeguard_core::config::RetryPolicyConfig;
use wakeguard_core::ports::input::{InputAction, InputError, InputPort};

/// Input adapter backed by `enigo`.
///
/// macOS needs the Accessibility permission, Wayland needs uinput
/// access; on both, failures surface as `SendFailed` and the calling
/// loop carries on.
pub struct EnigoInput {
    // enigo is Send but not Sync, so serialize access behind a mutex
    enigo: Mutex<Enigo>,
    max_retries: u32,
    retry_interval: Duration,
}

impl EnigoInput {
    /// Creates the adapter, connecting to the platform input backend.
    pub fn new(retry: &RetryPolicyConfig) -> Result<Self, InputError> {
        let enigo = Enigo::new(&Settings::default())
            .map_err(|e| InputError::BackendUnavailable(e.to_string()))?;
        Ok(Self {
            enigo: Mutex::new(enigo),
            max_retries: retry.max_retries,
            retry_interval: retry.retry_interval,
        })
    }

    async fn send_once(&self, action: InputAction) -> Result<(), InputError> {
        let mut enigo = self.enigo.lock().await;
        match action {
            InputAction::KeyPress => {
                // Shift alone changes nothing in whatever has focus
                enigo
                    .key(Key::Shift, Direction::Click)
                    .map_err(|e| send_failed(action, e))?;
            }
            InputAction::MouseMove => {
                let (x, y) = enigo.location().map_err(|e| send_failed(action, e))?;
                enigo
                    .move_mouse(1, 0, Coordinate::Rel)
                    .map_err(|e| send_failed(action, e))?;
                enigo
                    .move_mouse(x, y, Coordinate::Abs)
                    .map_err(|e| send_failed(action, e))?;
            }
        }
        Ok(())
    }
}

fn send_failed(action: InputAction, err: impl std::fmt::Display) -> InputError {
    InputError::SendFailed {
        action: action.describe(),
        reason: err.to_string(),
    }
}

#[async_trait]
impl InputPort for EnigoInput {
    async fn send_input(&self, action: InputAction) -> Result<(), InputError> {
        let mut attempt = 0;
        loop {
            match self.send_once(action).await {
                Ok(()) => {
                    debug!("Sent {}", action.describe());
                    return Ok(());
                }
                Err(e) if attempt < self.max_retries => {
                    attempt += 1;
                    warn!(
                        attempt,
                        max_retries = self.max_retries,
                        "Retrying {}: {}",
                        action.describe(),
                        e
                    );
                    sleep(self.retry_interval).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_construction_in_headless_environments() {
        // CI machines may have no display server; the only acceptable
        // failure is an unavailable backend
        let retry = RetryPolicyConfig::default();
        match EnigoInput::new(&retry) {
            Ok(adapter) => {
                assert_eq!(adapter.max_retries, retry.max_retries);
                assert_eq!(adapter.retry_interval, retry.retry_interval);
            }
            Err(InputError::BackendUnavailable(_)) => {}
            Err(other) => panic!("unexpected construction error: {}", other),
        }
    }
}

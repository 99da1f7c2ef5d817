//! Input simulation port definition

use async_trait::async_trait;
use thiserror::Error;

/// A single synthetic input event the daemon can request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputAction {
    /// Tap of a neutral modifier key
    KeyPress,
    /// Small cursor displacement that leaves the pointer where it was
    MouseMove,
}

impl InputAction {
    /// Human-readable action name, used in logs and error messages
    pub fn describe(self) -> &'static str {
        match self {
            InputAction::KeyPress => "key press",
            InputAction::MouseMove => "mouse move",
        }
    }
}

/// Errors that can occur while synthesizing input
#[derive(Debug, Error)]
pub enum InputError {
    /// The platform input backend could not be initialized
    #[error("Input backend unavailable: {0}")]
    BackendUnavailable(String),

    /// The event was rejected by the OS (missing permission, API error)
    #[error("Failed to send {action}: {reason}")]
    SendFailed {
        action: &'static str,
        reason: String,
    },
}

/// Port for synthesizing user input events
///
/// Implementations must be callable from any task; failures are expected
/// to be transient and are never fatal to the calling loop.
#[async_trait]
pub trait InputPort: Send + Sync {
    /// Synthesize one input event of the given kind
    async fn send_input(&self, action: InputAction) -> Result<(), InputError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_names() {
        assert_eq!(InputAction::KeyPress.describe(), "key press");
        assert_eq!(InputAction::MouseMove.describe(), "mouse move");
    }

    #[test]
    fn test_input_error_messages() {
        let err = InputError::SendFailed {
            action: "key press",
            reason: "permission denied".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("key press"));
        assert!(msg.contains("permission denied"));

        let err = InputError::BackendUnavailable("no display".to_string());
        assert!(err.to_string().contains("no display"));
    }
}

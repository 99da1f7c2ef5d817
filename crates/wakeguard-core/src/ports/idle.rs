//! Idle-time query port definition

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur while querying the OS idle timer
#[derive(Debug, Error)]
pub enum IdleQueryError {
    /// No idle-time source exists on this platform
    #[error("Idle time query is not supported on this platform")]
    Unsupported,

    /// The query itself failed (tool missing, API error, unparsable output)
    #[error("Failed to query idle time: {0}")]
    QueryFailed(String),
}

/// Port for reading how long the OS has observed no real user input
///
/// A failed query means "unknown", not "idle"; callers skip the check
/// rather than acting on it.
#[async_trait]
pub trait IdlePort: Send + Sync {
    /// Time elapsed since the last real input event
    async fn idle_time(&self) -> Result<Duration, IdleQueryError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_idle_error_messages() {
        let err = IdleQueryError::Unsupported;
        assert!(err.to_string().contains("not supported"));

        let err = IdleQueryError::QueryFailed("ioreg exited with status 1".to_string());
        assert!(err.to_string().contains("ioreg"));
    }
}

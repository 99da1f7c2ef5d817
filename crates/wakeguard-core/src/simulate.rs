//! Activity simulation orchestration
//!
//! Expands the configured simulation mode into an ordered action list and
//! drives it through the input port, aborting on the first failure.

use crate::ports::input::{InputAction, InputError, InputPort};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;
use tracing::{debug, info};

/// Which kind of synthetic input the daemon produces on each tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SimulationMode {
    /// Key press only
    Key,
    /// Mouse move only
    Mouse,
    /// Key press, then mouse move
    Mixed,
}

impl SimulationMode {
    /// Ordered actions performed for this mode
    pub fn actions(self) -> &'static [InputAction] {
        match self {
            SimulationMode::Key => &[InputAction::KeyPress],
            SimulationMode::Mouse => &[InputAction::MouseMove],
            SimulationMode::Mixed => &[InputAction::KeyPress, InputAction::MouseMove],
        }
    }
}

impl std::fmt::Display for SimulationMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SimulationMode::Key => write!(f, "key"),
            SimulationMode::Mouse => write!(f, "mouse"),
            SimulationMode::Mixed => write!(f, "mixed"),
        }
    }
}

impl FromStr for SimulationMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "key" => Ok(SimulationMode::Key),
            "mouse" => Ok(SimulationMode::Mouse),
            "mixed" => Ok(SimulationMode::Mixed),
            _ => Err(format!(
                "Unknown simulation mode '{}'; must be one of: key, mouse, mixed",
                s
            )),
        }
    }
}

/// Errors from a simulation run
#[derive(Debug, Error)]
pub enum SimulateError {
    /// One of the actions failed; the remaining actions were not attempted
    #[error("Simulate {action} failed: {source}")]
    ActionFailed {
        action: &'static str,
        #[source]
        source: InputError,
    },
}

/// Performs one activity simulation for the given mode.
///
/// Actions run in mode order; the first failure aborts the remainder and
/// the returned error names the action that failed.
pub async fn simulate_activity<I>(port: &I, mode: SimulationMode) -> Result<(), SimulateError>
where
    I: InputPort + ?Sized,
{
    for &action in mode.actions() {
        port.send_input(action)
            .await
            .map_err(|source| SimulateError::ActionFailed {
                action: action.describe(),
                source,
            })?;
        debug!("Simulated {}", action.describe());
    }
    Ok(())
}

/// One-shot simulation with logged outcome, for callers outside the
/// periodic loops (the `wakeguard simulate` command).
pub async fn simulate_once<I>(port: &I, mode: SimulationMode) -> Result<(), SimulateError>
where
    I: InputPort + ?Sized,
{
    simulate_activity(port, mode).await?;
    info!(%mode, "Activity simulated");
    Ok(())
}

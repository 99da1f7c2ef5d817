//! Always-on idle prevention loop
//!
//! Fires an activity simulation on a fixed one-minute cadence for as
//! long as the guard is running, regardless of the work schedule. The
//! schedule only gates the task scheduler; this loop is the baseline
//! that keeps the OS awake at all.

use crate::ports::input::InputPort;
use crate::simulate::{simulate_activity, SimulationMode};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

/// Fixed cadence of the prevention loop, independent of configuration
pub const PREVENTION_TICK: Duration = Duration::from_secs(60);

/// Pause between stop and start during a restart, long enough for
/// OS-level input resources to be released
const RESTART_PAUSE: Duration = Duration::from_millis(100);

/// The idle prevention loop handle.
///
/// `start` and `stop` are idempotent: a redundant call logs a notice and
/// returns. Each start creates a fresh cancellation token; tokens are
/// never reused across restarts.
pub struct IdleGuard<I>
where
    I: InputPort + 'static,
{
    input: Arc<I>,
    mode: SimulationMode,
    tick: Duration,
    running: Arc<AtomicBool>,
    cancel: Mutex<CancellationToken>,
}

impl<I> IdleGuard<I>
where
    I: InputPort + 'static,
{
    /// Creates a stopped guard that will simulate with the given mode
    pub fn new(input: Arc<I>, mode: SimulationMode) -> Self {
        Self {
            input,
            mode,
            tick: PREVENTION_TICK,
            running: Arc::new(AtomicBool::new(false)),
            cancel: Mutex::new(CancellationToken::new()),
        }
    }

    /// Returns whether the prevention loop is currently running
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Starts the prevention loop.
    ///
    /// No-op (with a logged notice) if the loop is already running.
    pub fn start(&self) {
        if self.running.swap(true, Ordering::SeqCst) {
            info!("Idle prevention already running");
            return;
        }

        let cancel = CancellationToken::new();
        *self.cancel.lock().unwrap() = cancel.clone();

        let input = Arc::clone(&self.input);
        let mode = self.mode;
        let tick = self.tick;

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => {
                        info!("Idle prevention stopped");
                        break;
                    }
                    _ = sleep(tick) => {
                        // Failures are transient; the loop never dies on them
                        if let Err(e) = simulate_activity(input.as_ref(), mode).await {
                            error!("Idle prevention error: {}", e);
                        }
                    }
                }
            }
        });

        info!(%mode, "Idle prevention started");
    }

    /// Stops the prevention loop.
    ///
    /// No-op (with a logged notice) if the loop is not running. The loop
    /// task exits on its own once it observes the cancelled token; no
    /// join is required.
    pub fn stop(&self) {
        if !self.running.swap(false, Ordering::SeqCst) {
            info!("Idle prevention is not running");
            return;
        }

        self.cancel.lock().unwrap().cancel();
        info!("Idle prevention stop requested");
    }

    /// Stop, brief pause for resource release, start again
    pub async fn restart(&self) {
        self.stop();
        sleep(RESTART_PAUSE).await;
        self.start();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::input::{InputAction, InputError};
    use async_trait::async_trait;
    use std::sync::atomic::AtomicUsize;

    struct CountingPort {
        sent: AtomicUsize,
        should_fail: AtomicBool,
    }

    impl CountingPort {
        fn new() -> Self {
            Self {
                sent: AtomicUsize::new(0),
                should_fail: AtomicBool::new(false),
            }
        }

        fn sent(&self) -> usize {
            self.sent.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl InputPort for CountingPort {
        async fn send_input(&self, action: InputAction) -> Result<(), InputError> {
            if self.should_fail.load(Ordering::SeqCst) {
                return Err(InputError::SendFailed {
                    action: action.describe(),
                    reason: "mock failure".to_string(),
                });
            }
            self.sent.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_guard_starts_stopped() {
        let guard = IdleGuard::new(Arc::new(CountingPort::new()), SimulationMode::Key);
        assert!(!guard.is_running());
    }

    #[tokio::test]
    async fn test_start_and_stop_flags() {
        let guard = IdleGuard::new(Arc::new(CountingPort::new()), SimulationMode::Key);
        guard.start();
        assert!(guard.is_running());
        guard.stop();
        assert!(!guard.is_running());
    }

    #[tokio::test]
    async fn test_double_start_and_double_stop_are_noops() {
        let guard = IdleGuard::new(Arc::new(CountingPort::new()), SimulationMode::Key);
        guard.start();
        guard.start();
        assert!(guard.is_running());
        guard.stop();
        guard.stop();
        assert!(!guard.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn test_ticks_on_one_minute_cadence() {
        let port = Arc::new(CountingPort::new());
        let guard = IdleGuard::new(Arc::clone(&port), SimulationMode::Key);

        guard.start();
        // Just shy of the first tick: nothing yet
        sleep(Duration::from_secs(59)).await;
        assert_eq!(port.sent(), 0);

        // Three full minutes: three ticks
        sleep(Duration::from_secs(126)).await;
        assert_eq!(port.sent(), 3);

        guard.stop();
    }

    #[tokio::test(start_paused = true)]
    async fn test_mixed_mode_sends_two_inputs_per_tick() {
        let port = Arc::new(CountingPort::new());
        let guard = IdleGuard::new(Arc::clone(&port), SimulationMode::Mixed);

        guard.start();
        sleep(Duration::from_secs(61)).await;
        assert_eq!(port.sent(), 2);

        guard.stop();
    }

    #[tokio::test(start_paused = true)]
    async fn test_simulation_failure_does_not_stop_loop() {
        let port = Arc::new(CountingPort::new());
        let guard = IdleGuard::new(Arc::clone(&port), SimulationMode::Key);

        port.should_fail.store(true, Ordering::SeqCst);
        guard.start();
        sleep(Duration::from_secs(121)).await;
        assert_eq!(port.sent(), 0);

        // Loop survived the failures and keeps ticking once they clear
        port.should_fail.store(false, Ordering::SeqCst);
        sleep(Duration::from_secs(61)).await;
        assert!(port.sent() >= 1);

        guard.stop();
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_ticks_after_stop() {
        let port = Arc::new(CountingPort::new());
        let guard = IdleGuard::new(Arc::clone(&port), SimulationMode::Key);

        guard.start();
        sleep(Duration::from_secs(61)).await;
        let seen = port.sent();
        assert!(seen >= 1);

        guard.stop();
        // Give the loop a chance to observe the token, then wait well
        // past several would-be ticks
        sleep(Duration::from_secs(300)).await;
        assert_eq!(port.sent(), seen);
    }

    #[tokio::test(start_paused = true)]
    async fn test_restart_produces_fresh_loop() {
        let port = Arc::new(CountingPort::new());
        let guard = IdleGuard::new(Arc::clone(&port), SimulationMode::Key);

        guard.start();
        guard.restart().await;
        assert!(guard.is_running());

        sleep(Duration::from_secs(61)).await;
        assert!(port.sent() >= 1);

        guard.stop();
    }
}

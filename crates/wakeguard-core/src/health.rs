//! Health-check watchdog
//!
//! Periodically compares the OS-observed idle duration against the
//! expected idle-prevention cadence. If real input has not been seen for
//! longer than the prevention interval plus a margin, the simulation
//! path has silently failed and the daemon is restarted.

use crate::config::Config;
use crate::ports::idle::IdlePort;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Watchdog loop parameters.
///
/// The monitor never owns its restart path: the controller hands it a
/// callback and a cancellation token, and the controller is also the
/// only thing that serializes restarts. After a triggered restart the
/// token this monitor holds has been cancelled, so the stale loop exits
/// on its next poll instead of firing again.
pub struct HealthMonitor<Q>
where
    Q: IdlePort + 'static,
{
    idle: Arc<Q>,
    interval: Duration,
    threshold: Duration,
}

impl<Q> HealthMonitor<Q>
where
    Q: IdlePort + 'static,
{
    pub fn new(idle: Arc<Q>, interval: Duration, threshold: Duration) -> Self {
        Self {
            idle,
            interval,
            threshold,
        }
    }

    /// Derives cadence and threshold from the configuration: checks run
    /// on the scheduler interval, the threshold is the idle-prevention
    /// interval plus the configured margin.
    pub fn from_config(idle: Arc<Q>, config: &Config) -> Self {
        Self::new(idle, config.scheduler.interval, config.health_threshold())
    }

    /// Spawns the watchdog loop.
    ///
    /// `restart` is invoked inline on a threshold breach; the loop is
    /// never joined, it exits by observing `cancel`.
    pub fn spawn<R, Fut>(self, cancel: CancellationToken, restart: R)
    where
        R: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send,
    {
        tokio::spawn(async move {
            info!(
                interval = ?self.interval,
                threshold = ?self.threshold,
                "Health check started"
            );

            loop {
                tokio::select! {
                    _ = cancel.cancelled() => {
                        info!("Health check stopped");
                        break;
                    }
                    _ = sleep(self.interval) => {
                        match self.idle.idle_time().await {
                            Err(e) => {
                                // Unknown is not unhealthy; skip this tick
                                warn!("Health check: failed to query idle time: {}", e);
                            }
                            Ok(idle) if idle > self.threshold => {
                                error!(
                                    ?idle,
                                    threshold = ?self.threshold,
                                    "Health check: idle time exceeds threshold, restarting daemon"
                                );
                                restart().await;
                            }
                            Ok(idle) => {
                                debug!(?idle, "Health check: idle time healthy");
                            }
                        }
                    }
                }
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::idle::IdleQueryError;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};

    struct MockIdlePort {
        idle_secs: AtomicU64,
        should_fail: AtomicBool,
    }

    impl MockIdlePort {
        fn new(idle_secs: u64) -> Self {
            Self {
                idle_secs: AtomicU64::new(idle_secs),
                should_fail: AtomicBool::new(false),
            }
        }
    }

    #[async_trait]
    impl IdlePort for MockIdlePort {
        async fn idle_time(&self) -> Result<Duration, IdleQueryError> {
            if self.should_fail.load(Ordering::SeqCst) {
                return Err(IdleQueryError::QueryFailed("mock failure".to_string()));
            }
            Ok(Duration::from_secs(self.idle_secs.load(Ordering::SeqCst)))
        }
    }

    const INTERVAL: Duration = Duration::from_secs(60);
    const THRESHOLD: Duration = Duration::from_secs(600);

    fn restart_counter() -> (Arc<AtomicUsize>, impl Fn() -> std::future::Ready<()> + Send + Sync + 'static)
    {
        let counter = Arc::new(AtomicUsize::new(0));
        let counter_in_restart = Arc::clone(&counter);
        let restart = move || {
            counter_in_restart.fetch_add(1, Ordering::SeqCst);
            std::future::ready(())
        };
        (counter, restart)
    }

    #[tokio::test(start_paused = true)]
    async fn test_healthy_idle_time_does_not_restart() {
        // One second below the threshold
        let idle = Arc::new(MockIdlePort::new(THRESHOLD.as_secs() - 1));
        let monitor = HealthMonitor::new(Arc::clone(&idle), INTERVAL, THRESHOLD);
        let cancel = CancellationToken::new();
        let (restarts, restart) = restart_counter();

        monitor.spawn(cancel.clone(), restart);
        sleep(INTERVAL * 3 + Duration::from_secs(1)).await;

        assert_eq!(restarts.load(Ordering::SeqCst), 0);
        cancel.cancel();
    }

    #[tokio::test(start_paused = true)]
    async fn test_idle_time_at_threshold_does_not_restart() {
        // Exactly at the threshold: breach requires strictly greater
        let idle = Arc::new(MockIdlePort::new(THRESHOLD.as_secs()));
        let monitor = HealthMonitor::new(Arc::clone(&idle), INTERVAL, THRESHOLD);
        let cancel = CancellationToken::new();
        let (restarts, restart) = restart_counter();

        monitor.spawn(cancel.clone(), restart);
        sleep(INTERVAL * 2 + Duration::from_secs(1)).await;

        assert_eq!(restarts.load(Ordering::SeqCst), 0);
        cancel.cancel();
    }

    #[tokio::test(start_paused = true)]
    async fn test_breach_restarts_once_per_tick() {
        let idle = Arc::new(MockIdlePort::new(THRESHOLD.as_secs() + 1));
        let monitor = HealthMonitor::new(Arc::clone(&idle), INTERVAL, THRESHOLD);
        let cancel = CancellationToken::new();
        let (restarts, restart) = restart_counter();

        monitor.spawn(cancel.clone(), restart);
        sleep(INTERVAL * 3 + Duration::from_secs(1)).await;

        // One restart per breaching tick, no storm within a tick
        assert_eq!(restarts.load(Ordering::SeqCst), 3);
        cancel.cancel();
    }

    #[tokio::test(start_paused = true)]
    async fn test_restart_that_cancels_token_fires_exactly_once() {
        // Mirrors the controller: a real restart replaces the watchdog
        // token, so the stale monitor must exit after one trigger
        let idle = Arc::new(MockIdlePort::new(THRESHOLD.as_secs() + 1));
        let monitor = HealthMonitor::new(Arc::clone(&idle), INTERVAL, THRESHOLD);
        let cancel = CancellationToken::new();

        let counter = Arc::new(AtomicUsize::new(0));
        let counter_in_restart = Arc::clone(&counter);
        let cancel_in_restart = cancel.clone();
        let restart = move || {
            counter_in_restart.fetch_add(1, Ordering::SeqCst);
            cancel_in_restart.cancel();
            std::future::ready(())
        };

        monitor.spawn(cancel.clone(), restart);
        sleep(INTERVAL * 5 + Duration::from_secs(1)).await;

        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_query_failure_skips_tick() {
        let idle = Arc::new(MockIdlePort::new(THRESHOLD.as_secs() + 100));
        idle.should_fail.store(true, Ordering::SeqCst);

        let monitor = HealthMonitor::new(Arc::clone(&idle), INTERVAL, THRESHOLD);
        let cancel = CancellationToken::new();
        let (restarts, restart) = restart_counter();

        monitor.spawn(cancel.clone(), restart);
        sleep(INTERVAL * 2 + Duration::from_secs(1)).await;

        // Unknown idle time never triggers recovery
        assert_eq!(restarts.load(Ordering::SeqCst), 0);

        // The loop survived the failures: once queries succeed again the
        // breach is acted on
        idle.should_fail.store(false, Ordering::SeqCst);
        sleep(INTERVAL + Duration::from_secs(1)).await;
        assert!(restarts.load(Ordering::SeqCst) >= 1);

        cancel.cancel();
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancellation_stops_loop() {
        let idle = Arc::new(MockIdlePort::new(THRESHOLD.as_secs() + 1));
        let monitor = HealthMonitor::new(Arc::clone(&idle), INTERVAL, THRESHOLD);
        let cancel = CancellationToken::new();
        let (restarts, restart) = restart_counter();

        monitor.spawn(cancel.clone(), restart);
        cancel.cancel();
        sleep(INTERVAL * 3).await;

        assert_eq!(restarts.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_from_config_derivation() {
        let mut config = Config::default();
        config.scheduler.interval = Duration::from_secs(300);
        config.idle_prevention.interval = Duration::from_secs(600);
        config.health.margin = Duration::from_secs(60);

        let monitor =
            HealthMonitor::from_config(Arc::new(MockIdlePort::new(0)), &config);
        assert_eq!(monitor.interval, Duration::from_secs(300));
        assert_eq!(monitor.threshold, Duration::from_secs(660));
    }
}

//! Daemon controller
//!
//! Composes the three loops (idle prevention, task scheduler, health
//! watchdog), owns their lifecycle, and exposes the process-level
//! start/stop/restart contract. All external transitions serialize on a
//! single mutex, which is also what keeps watchdog-triggered and manual
//! restarts from racing each other.

use crate::config::Config;
use crate::health::HealthMonitor;
use crate::idle_guard::IdleGuard;
use crate::ports::idle::IdlePort;
use crate::ports::input::InputPort;
use crate::scheduler::TaskScheduler;
use crate::simulate::simulate_activity;
use chrono::Local;
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

/// Pause between stop and start during a restart, long enough for
/// OS-level resources to be released
const RESTART_PAUSE: Duration = Duration::from_millis(100);

/// Observable controller state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DaemonState {
    Stopped,
    Running,
}

impl std::fmt::Display for DaemonState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DaemonState::Stopped => write!(f, "stopped"),
            DaemonState::Running => write!(f, "running"),
        }
    }
}

/// Mutable controller internals, only ever touched under the mutex
struct DaemonInner {
    state: DaemonState,
    /// Fresh instance per start; a stopped scheduler is never reused
    scheduler: Option<Arc<TaskScheduler>>,
    /// Fresh token per start; cancelling it retires the current watchdog
    health_cancel: CancellationToken,
}

/// The daemon controller.
///
/// Constructed once per process with the configuration snapshot and the
/// two platform ports; `start`, `stop`, and `restart` may then be called
/// in any order and are safe against redundant calls.
pub struct Daemon<I, Q>
where
    I: InputPort + 'static,
    Q: IdlePort + 'static,
{
    config: Arc<Config>,
    input: Arc<I>,
    idle_query: Arc<Q>,
    guard: IdleGuard<I>,
    inner: Mutex<DaemonInner>,
    /// Handle the watchdog uses to reach back into `restart` without
    /// keeping the controller alive on its own
    weak_self: Weak<Self>,
}

impl<I, Q> Daemon<I, Q>
where
    I: InputPort + 'static,
    Q: IdlePort + 'static,
{
    pub fn new(config: Arc<Config>, input: Arc<I>, idle_query: Arc<Q>) -> Arc<Self> {
        Arc::new_cyclic(|weak| Self {
            guard: IdleGuard::new(Arc::clone(&input), config.idle_prevention.mode),
            config,
            input,
            idle_query,
            inner: Mutex::new(DaemonInner {
                state: DaemonState::Stopped,
                scheduler: None,
                health_cancel: CancellationToken::new(),
            }),
            weak_self: weak.clone(),
        })
    }

    /// Current controller state
    pub async fn state(&self) -> DaemonState {
        self.inner.lock().await.state
    }

    /// Whether the idle prevention loop is live
    pub fn prevention_running(&self) -> bool {
        self.guard.is_running()
    }

    /// Starts the daemon (Stopped -> Running).
    ///
    /// No-op with a logged notice when already running.
    pub async fn start(&self) {
        let mut inner = self.inner.lock().await;
        if inner.state == DaemonState::Running {
            info!("Daemon already running");
            return;
        }
        self.start_locked(&mut inner);
    }

    /// Stops the daemon (Running -> Stopped), draining the scheduler
    /// before tearing down idle prevention.
    ///
    /// No-op with a logged notice when already stopped.
    pub async fn stop(&self) {
        let mut inner = self.inner.lock().await;
        if inner.state == DaemonState::Stopped {
            info!("Daemon is not running");
            return;
        }
        self.stop_locked(&mut inner).await;
    }

    /// Full restart: stop, brief pause for resource release, start with
    /// a fresh scheduler and a fresh watchdog token. Ends in Running
    /// from either prior state.
    ///
    /// Safe to invoke from inside a watchdog tick: the controller never
    /// joins the watchdog task, so the monitor that triggered the
    /// restart simply observes its cancelled token afterwards and exits.
    pub async fn restart(&self) {
        let mut inner = self.inner.lock().await;
        info!("Restarting daemon");
        self.restart_locked(&mut inner).await;
    }

    /// Restart path used by the watchdog.
    ///
    /// A watchdog's restart request can be in flight while a manual stop
    /// or another restart retires that watchdog; the request is then
    /// stale and must not resurrect the daemon. Tokens are only ever
    /// cancelled under the controller mutex, so checking the token here,
    /// under the same mutex, is sufficient.
    async fn restart_from_watchdog(&self, token: CancellationToken) {
        let mut inner = self.inner.lock().await;
        if token.is_cancelled() {
            debug!("Ignoring stale watchdog restart request");
            return;
        }
        info!("Restarting daemon (watchdog)");
        self.restart_locked(&mut inner).await;
    }

    async fn restart_locked(&self, inner: &mut DaemonInner) {
        if inner.state == DaemonState::Running {
            self.stop_locked(inner).await;
        }
        sleep(RESTART_PAUSE).await;
        self.start_locked(inner);
    }

    fn start_locked(&self, inner: &mut DaemonInner) {
        info!("Starting daemon");

        if self.config.idle_prevention.enabled {
            self.guard.start();
        }

        // Fresh scheduler bound to the current configuration
        let scheduler = Arc::new(TaskScheduler::new(Arc::clone(&self.config)));

        // The scheduled task re-checks the work schedule and then drives
        // the same simulation primitive as the prevention loop. Both
        // firing independently is intentional defense in depth.
        let input = Arc::clone(&self.input);
        let mode = self.config.idle_prevention.mode;
        let scheduler_for_task = Arc::clone(&scheduler);
        let task = move || {
            let input = Arc::clone(&input);
            let scheduler = Arc::clone(&scheduler_for_task);
            async move {
                if !scheduler.check_work_time(Local::now()) {
                    match simulate_activity(input.as_ref(), mode).await {
                        Ok(()) => info!("Scheduled activity simulated"),
                        Err(e) => error!("Scheduled activity simulation failed: {}", e),
                    }
                }
            }
        };
        if let Err(e) = scheduler.schedule_task(task) {
            // Unreachable with a fresh instance; surfaced rather than
            // silently dropped in case that ever changes
            error!("Failed to schedule task: {}", e);
        }
        inner.scheduler = Some(scheduler);

        if self.config.idle_prevention.enabled {
            let cancel = CancellationToken::new();
            inner.health_cancel = cancel.clone();

            let monitor = HealthMonitor::from_config(Arc::clone(&self.idle_query), &self.config);
            let weak = self.weak_self.clone();
            let token = cancel.clone();
            monitor.spawn(cancel, move || {
                let weak = weak.clone();
                let token = token.clone();
                async move {
                    if let Some(daemon) = weak.upgrade() {
                        daemon.restart_from_watchdog(token).await;
                    }
                }
            });
        }

        inner.state = DaemonState::Running;
        info!("Daemon started");
    }

    async fn stop_locked(&self, inner: &mut DaemonInner) {
        info!("Stopping daemon");

        // Watchdog first so no restart races the teardown
        inner.health_cancel.cancel();

        // Drain the scheduler before the idle loop goes away: no
        // work-hour-gated task may run against a half-stopped daemon
        if let Some(scheduler) = inner.scheduler.take() {
            scheduler.stop().await;
        }

        self.guard.stop();

        inner.state = DaemonState::Stopped;
        info!("Daemon stopped");
    }
}

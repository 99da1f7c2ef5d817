//! Schedule-gated task scheduler
//!
//! Runs a supplied task on the configured cadence, but only outside work
//! hours: during a work session the user is presumed present and the
//! tick is skipped.

use crate::config::Config;
use crate::schedule;
use chrono::{DateTime, Local};
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

/// How often the drain loop in [`TaskScheduler::stop`] re-checks the
/// running flag
const DRAIN_POLL: Duration = Duration::from_millis(10);

/// Errors that can occur during scheduler operations
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// A task has already been scheduled on this instance
    #[error("Scheduler already has a task scheduled")]
    AlreadyScheduled,

    /// The configured cadence cannot drive a timer
    #[error("Invalid scheduler interval: {0}")]
    InvalidInterval(String),
}

/// One-shot scheduler instance.
///
/// Each instance runs at most one task loop for its lifetime; the daemon
/// controller constructs a fresh scheduler on every (re)start rather
/// than reusing a stopped one.
pub struct TaskScheduler {
    config: Arc<Config>,
    /// True while the task loop is live; cleared by the loop itself as
    /// its final action so `stop` can block on full drain
    running: Arc<AtomicBool>,
    scheduled: AtomicBool,
    cancel: CancellationToken,
}

impl TaskScheduler {
    pub fn new(config: Arc<Config>) -> Self {
        Self {
            config,
            running: Arc::new(AtomicBool::new(false)),
            scheduled: AtomicBool::new(false),
            cancel: CancellationToken::new(),
        }
    }

    /// Returns whether the task loop is currently live
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Whether `now` falls inside a configured work session
    pub fn check_work_time(&self, now: DateTime<Local>) -> bool {
        schedule::is_work_time(now, &self.config.work_schedule)
    }

    /// Launches the task loop.
    ///
    /// On each tick the loop evaluates the work schedule; outside work
    /// hours the task future is awaited inline, so a slow task delays
    /// the next tick rather than piling up. Inside work hours the tick
    /// is skipped.
    ///
    /// # Errors
    /// Returns `SchedulerError::AlreadyScheduled` on a second call.
    pub fn schedule_task<F, Fut>(&self, task: F) -> Result<(), SchedulerError>
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send,
    {
        if self.scheduled.swap(true, Ordering::SeqCst) {
            return Err(SchedulerError::AlreadyScheduled);
        }
        self.running.store(true, Ordering::SeqCst);

        let config = Arc::clone(&self.config);
        let running = Arc::clone(&self.running);
        let cancel = self.cancel.clone();

        tokio::spawn(async move {
            info!(interval = ?config.scheduler.interval, "Task scheduler started");

            loop {
                if cancel.is_cancelled() {
                    break;
                }

                let now = Local::now();
                if !schedule::is_work_time(now, &config.work_schedule) {
                    task().await;
                } else {
                    debug!("Inside work hours, skipping task tick");
                }

                let interval = match next_interval(&config) {
                    Ok(interval) => interval,
                    Err(e) => {
                        // Cannot proceed without a usable cadence; exit
                        // cleanly instead of busy-looping
                        error!("Task scheduler exiting: {}", e);
                        break;
                    }
                };

                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = sleep(interval) => {}
                }
            }

            running.store(false, Ordering::SeqCst);
            info!("Task scheduler stopped");
        });

        Ok(())
    }

    /// Signals cancellation and blocks until the task loop has fully
    /// exited: once this returns, no further task side effects occur.
    ///
    /// Idempotent; stopping a scheduler that is not running logs and
    /// returns immediately.
    pub async fn stop(&self) {
        if !self.running.load(Ordering::SeqCst) {
            debug!("Task scheduler is not running");
            return;
        }

        self.cancel.cancel();

        while self.running.load(Ordering::SeqCst) {
            sleep(DRAIN_POLL).await;
        }
    }
}

/// Cadence for the next tick.
///
/// Configuration validation rejects a zero interval up front, but the
/// loop re-checks on every tick: a cadence that cannot drive a timer
/// must end the loop, not spin it.
fn next_interval(config: &Config) -> Result<Duration, SchedulerError> {
    let interval = config.scheduler.interval;
    if interval.is_zero() {
        return Err(SchedulerError::InvalidInterval(
            "interval is zero".to_string(),
        ));
    }
    Ok(interval)
}

/// Builds a schedule where every weekday is fully covered by one session
#[cfg(test)]
pub(crate) fn all_day_schedule() -> schedule::WorkSchedule {
    use crate::schedule::{WorkSchedule, WorkSession};
    let mut schedule = WorkSchedule::new();
    for day in [
        "monday",
        "tuesday",
        "wednesday",
        "thursday",
        "friday",
        "saturday",
        "sunday",
    ] {
        schedule.insert(day.to_string(), vec![WorkSession::new("00:00", "23:59")]);
    }
    schedule
}

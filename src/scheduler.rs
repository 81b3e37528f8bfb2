//! Recurring job scheduler
//!
//! Fires a job on wall-clock boundaries that are whole multiples of the
//! interval since the Unix epoch, so a two-minute interval behaves like the
//! cron expression `*/2 * * * *`. Missed ticks are not caught up.
//!
//! At most one run is in flight at a time: a tick that arrives while the
//! previous run is still going is skipped.

use chrono::{DateTime, Utc};
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// First interval boundary strictly after `now`
pub fn next_boundary(now: DateTime<Utc>, interval: Duration) -> DateTime<Utc> {
    let step = i64::try_from(interval.as_millis()).unwrap_or(i64::MAX).max(1);
    let now_ms = now.timestamp_millis();
    let next_ms = now_ms
        .div_euclid(step)
        .saturating_add(1)
        .saturating_mul(step);
    // Past chrono's range: never fire rather than spin
    DateTime::from_timestamp_millis(next_ms).unwrap_or(DateTime::<Utc>::MAX_UTC)
}

/// Source of wall-clock time for tick alignment
pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// Clears the in-flight flag when a run ends, including by panic
struct RunGuard(Arc<AtomicBool>);

impl Drop for RunGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Owns a recurring job's timing
#[derive(Clone)]
pub struct Scheduler {
    interval: Duration,
    clock: Clock,
}

impl fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scheduler")
            .field("interval", &self.interval)
            .finish_non_exhaustive()
    }
}

impl Scheduler {
    /// Create a scheduler firing every `interval` on the system clock
    pub fn new(interval: Duration) -> Self {
        Self::with_clock(interval, Arc::new(Utc::now))
    }

    /// Create a scheduler that reads wall-clock time from `clock`
    pub const fn with_clock(interval: Duration, clock: Clock) -> Self {
        Self { interval, clock }
    }

    /// Interval between ticks
    pub const fn interval(&self) -> Duration {
        self.interval
    }

    /// Next time the job will fire, as seen from now
    pub fn next_tick(&self) -> DateTime<Utc> {
        next_boundary((self.clock)(), self.interval)
    }

    /// Start firing `job` on every tick until stopped
    pub fn start<F, Fut>(self, job: F) -> SchedulerHandle
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
        let Self { interval, clock } = self;

        let task = tokio::spawn(async move {
            info!("Starting scheduler with interval {:?}", interval);

            let in_flight = Arc::new(AtomicBool::new(false));
            let mut current: Option<JoinHandle<()>> = None;

            loop {
                let now = clock();
                let next = next_boundary(now, interval);
                let wait = (next - now).to_std().unwrap_or(Duration::ZERO);
                debug!(next = %next, "waiting for next tick");

                tokio::select! {
                    () = tokio::time::sleep(wait) => {
                        if in_flight.swap(true, Ordering::SeqCst) {
                            warn!("previous run still in progress, skipping tick");
                            continue;
                        }
                        let guard = RunGuard(Arc::clone(&in_flight));
                        let run = job();
                        current = Some(tokio::spawn(async move {
                            let _guard = guard;
                            run.await;
                        }));
                    }
                    changed = shutdown_rx.changed() => {
                        if changed.is_err() || *shutdown_rx.borrow() {
                            info!("Scheduler shutting down");
                            break;
                        }
                    }
                }
            }

            if let Some(handle) = current
                && let Err(e) = handle.await
            {
                warn!(error = %e, "in-flight run ended abnormally");
            }
        });

        SchedulerHandle { shutdown_tx, task }
    }
}

/// Handle to a running scheduler
pub struct SchedulerHandle {
    shutdown_tx: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl SchedulerHandle {
    /// Ask the scheduler to stop; no new runs start after this
    pub fn stop(&self) {
        // Receiver gone means the loop already exited
        let _ = self.shutdown_tx.send(true);
    }

    /// Wait for the scheduler loop and any in-flight run to finish
    pub async fn join(self) {
        if let Err(e) = self.task.await {
            warn!(error = %e, "scheduler task ended abnormally");
        }
    }

    /// Stop and wait
    pub async fn shutdown(self) {
        self.stop();
        self.join().await;
    }
}

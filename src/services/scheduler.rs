//! Polling scheduler
//!
//! Runs at most one repeating timer per tracker. Every tick fans out one
//! status request per active job; each response is merged into the registry
//! on its own, so a slow or failing job never holds up the others. The timer
//! stops itself once no active job remains and is restarted by the next
//! submission.
//!
//! ```text
//!   Idle ──ensure_started──► Running ──tick: no active jobs──► Idle
//!                             │   ▲
//!                             └───┘ tick: poll active jobs
//! ```

use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

use crate::models::job::{JobId, JobKind};
use crate::services::registry::JobRegistry;
use crate::services::status_client::StatusClient;

/// Result of a single scheduler tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// No active jobs were left; the timer has been stopped.
    Stopped,
    /// Polls were dispatched. `skipped` counts jobs whose previous poll had
    /// not yet returned.
    Polled { dispatched: usize, skipped: usize },
}

enum SchedulerState {
    Idle,
    Running(JoinHandle<()>),
}

pub struct PollingScheduler<K: JobKind> {
    registry: Arc<JobRegistry<K>>,
    client: Arc<dyn StatusClient<K>>,
    period: Duration,
    state: Mutex<SchedulerState>,
    in_flight: Mutex<HashSet<JobId>>,
    polls: TaskTracker,
    shutdown: CancellationToken,
    timers_started: AtomicU64,
    polls_issued: AtomicU64,
}

impl<K: JobKind> PollingScheduler<K> {
    pub fn new(
        registry: Arc<JobRegistry<K>>,
        client: Arc<dyn StatusClient<K>>,
        period: Duration,
    ) -> Self {
        Self {
            registry,
            client,
            period,
            state: Mutex::new(SchedulerState::Idle),
            in_flight: Mutex::new(HashSet::new()),
            polls: TaskTracker::new(),
            shutdown: CancellationToken::new(),
            timers_started: AtomicU64::new(0),
            polls_issued: AtomicU64::new(0),
        }
    }

    fn state(&self) -> MutexGuard<'_, SchedulerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn in_flight(&self) -> MutexGuard<'_, HashSet<JobId>> {
        self.in_flight.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Start the timer unless it is already running.
    ///
    /// The first tick fires immediately. Returns `true` if a new timer was
    /// started. Never starts again after [`shutdown`](Self::shutdown).
    pub fn ensure_started(self: &Arc<Self>) -> bool {
        if self.shutdown.is_cancelled() {
            tracing::debug!(kind = K::NAME, "Scheduler shut down, not starting");
            return false;
        }

        let mut state = self.state();
        if let SchedulerState::Running(handle) = &*state {
            if !handle.is_finished() {
                return false;
            }
        }

        let this = Arc::clone(self);
        *state = SchedulerState::Running(tokio::spawn(this.run()));
        self.timers_started.fetch_add(1, Ordering::Relaxed);

        tracing::info!(
            kind = K::NAME,
            period_ms = self.period.as_millis() as u64,
            "Status polling started"
        );
        true
    }

    async fn run(self: Arc<Self>) {
        let mut interval = tokio::time::interval(self.period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = self.shutdown.cancelled() => break,
                _ = interval.tick() => {}
            }

            if self.tick() == TickOutcome::Stopped {
                break;
            }
        }

        tracing::debug!(kind = K::NAME, "Polling loop exited");
    }

    /// Poll every active job once.
    ///
    /// Stops the timer when there is nothing left to poll. The stop decision
    /// is taken under the same lock as [`ensure_started`](Self::ensure_started),
    /// so a job submitted concurrently is always picked up by some timer.
    pub fn tick(self: &Arc<Self>) -> TickOutcome {
        let active = {
            let mut state = self.state();
            let active = self.registry.active_ids();

            if active.is_empty() || self.shutdown.is_cancelled() {
                if let SchedulerState::Running(handle) =
                    std::mem::replace(&mut *state, SchedulerState::Idle)
                {
                    handle.abort();
                    tracing::info!(kind = K::NAME, "No active jobs, status polling stopped");
                }
                return TickOutcome::Stopped;
            }
            active
        };

        let mut dispatched = 0;
        let mut skipped = 0;
        for id in active {
            if !self.in_flight().insert(id.clone()) {
                tracing::trace!(job_id = %id, "Previous poll still in flight, skipping");
                skipped += 1;
                continue;
            }

            dispatched += 1;
            let this = Arc::clone(self);
            self.polls.spawn(this.poll(id));
        }

        tracing::debug!(kind = K::NAME, dispatched, skipped, "Polling tick");
        TickOutcome::Polled { dispatched, skipped }
    }

    async fn poll(self: Arc<Self>, id: JobId) {
        self.polls_issued.fetch_add(1, Ordering::Relaxed);
        metrics::counter!("job_status_polls_total", "kind" => K::NAME).increment(1);

        let outcome = tokio::select! {
            _ = self.shutdown.cancelled() => None,
            outcome = self.client.fetch_status(&id) => Some(outcome),
        };
        self.in_flight().remove(&id);

        let Some(outcome) = outcome else {
            return;
        };
        if self.shutdown.is_cancelled() {
            tracing::debug!(job_id = %id, "Discarding status received after shutdown");
            return;
        }
        if outcome.is_err() {
            metrics::counter!("job_status_poll_errors_total", "kind" => K::NAME).increment(1);
        }

        self.registry.apply_status(&id, outcome);
    }

    /// Stop the timer and drop in-flight polls for good.
    pub fn shutdown(&self) {
        self.shutdown.cancel();
        if let SchedulerState::Running(handle) = std::mem::replace(&mut *self.state(), SchedulerState::Idle) {
            handle.abort();
        }
        self.polls.close();
        self.in_flight().clear();
        tracing::info!(kind = K::NAME, "Status polling shut down");
    }

    pub fn is_running(&self) -> bool {
        matches!(&*self.state(), SchedulerState::Running(handle) if !handle.is_finished())
    }

    pub fn is_shut_down(&self) -> bool {
        self.shutdown.is_cancelled()
    }

    /// Number of timers started over the scheduler's lifetime.
    pub fn timers_started(&self) -> u64 {
        self.timers_started.load(Ordering::Relaxed)
    }

    /// Number of status requests issued over the scheduler's lifetime.
    pub fn polls_issued(&self) -> u64 {
        self.polls_issued.load(Ordering::Relaxed)
    }

    /// Status requests that have not returned yet.
    pub fn in_flight_polls(&self) -> usize {
        self.polls.len()
    }
}

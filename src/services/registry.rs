//! Job registry
//!
//! Holds every job a tracker knows about and is the only place job state
//! changes. Status snapshots from polls are merged here; once a job reaches
//! a terminal state no later snapshot can alter it.

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tokio::sync::broadcast;

use crate::models::job::{Job, JobId, JobKind, JobStatus};
use crate::models::status::StatusSnapshot;
use crate::services::status_client::PollError;

pub const DEFAULT_FAILURE_MESSAGE: &str = "processing failed";

/// Default buffer capacity for the change-event channel.
const EVENT_CAPACITY: usize = 256;

/// What kind of change a [`JobEvent`] reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobChange {
    Submitted,
    Progress,
    Succeeded,
    Failed,
}

/// Published on every registry mutation that a view may want to render.
#[derive(Debug, Clone)]
pub struct JobEvent {
    pub job_id: JobId,
    pub kind: &'static str,
    pub change: JobChange,
    pub status: JobStatus,
    pub progress: u8,
    pub timestamp: DateTime<Utc>,
}

impl JobEvent {
    fn from_job<K: JobKind>(job: &Job<K>, change: JobChange) -> Self {
        Self {
            job_id: job.id.clone(),
            kind: K::NAME,
            change,
            status: job.status,
            progress: job.progress,
            timestamp: Utc::now(),
        }
    }
}

/// Result of merging one poll outcome into the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// No job with this id.
    Unknown,
    /// The job had already finished; nothing changed.
    Ignored,
    /// Snapshot carried nothing new.
    Unchanged,
    /// Status or progress moved forward.
    Updated,
    Succeeded,
    Failed,
    /// Transient poll error recorded; the job stays active.
    Retrying,
}

impl ApplyOutcome {
    fn change(self) -> Option<JobChange> {
        match self {
            Self::Updated => Some(JobChange::Progress),
            Self::Succeeded => Some(JobChange::Succeeded),
            Self::Failed => Some(JobChange::Failed),
            _ => None,
        }
    }
}

struct Inner<K: JobKind> {
    jobs: HashMap<JobId, Job<K>>,
    /// Insertion order; jobs are never removed.
    order: Vec<JobId>,
}

/// Source of truth for the jobs of one kind.
pub struct JobRegistry<K: JobKind> {
    inner: RwLock<Inner<K>>,
    events: broadcast::Sender<JobEvent>,
    max_transient_failures: Option<u32>,
}

impl<K: JobKind> JobRegistry<K> {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            inner: RwLock::new(Inner {
                jobs: HashMap::new(),
                order: Vec::new(),
            }),
            events,
            max_transient_failures: None,
        }
    }

    /// Fail a job after this many consecutive transient poll errors.
    pub fn with_failure_limit(mut self, limit: Option<u32>) -> Self {
        self.max_transient_failures = limit.filter(|l| *l > 0);
        self
    }

    fn read(&self) -> RwLockReadGuard<'_, Inner<K>> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Inner<K>> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Subscribe to change events for every job in this registry.
    pub fn subscribe(&self) -> broadcast::Receiver<JobEvent> {
        self.events.subscribe()
    }

    fn publish(&self, event: JobEvent) {
        // Only fails when nobody is listening.
        let _ = self.events.send(event);
    }

    /// Register a freshly submitted job in `Processing`.
    ///
    /// Returns `false` without touching anything if the id is already known.
    pub fn submit(&self, id: JobId, label: impl Into<String>, kind: K) -> bool {
        self.submit_with_status(id, label, kind, JobStatus::Processing)
    }

    /// Register a job with the status the backend reported at submission.
    ///
    /// Only `Pending` is honoured; anything else starts as `Processing` so
    /// that results always arrive together with `Success` from a poll.
    pub fn submit_with_status(
        &self,
        id: JobId,
        label: impl Into<String>,
        kind: K,
        initial: JobStatus,
    ) -> bool {
        let status = match initial {
            JobStatus::Pending => JobStatus::Pending,
            _ => JobStatus::Processing,
        };

        let event = {
            let mut inner = self.write();
            if inner.jobs.contains_key(&id) {
                tracing::debug!(job_id = %id, kind = K::NAME, "Ignoring duplicate submission");
                return false;
            }

            let job = Job::new(id.clone(), label.into(), kind, status);
            let event = JobEvent::from_job(&job, JobChange::Submitted);
            inner.order.push(id.clone());
            inner.jobs.insert(id, job);
            event
        };

        tracing::info!(job_id = %event.job_id, kind = K::NAME, status = ?status, "Job registered");
        self.publish(event);
        true
    }

    /// Merge the outcome of one status poll into the job it belongs to.
    pub fn apply_status(
        &self,
        id: &JobId,
        outcome: Result<StatusSnapshot<K::Payload>, PollError>,
    ) -> ApplyOutcome {
        let (applied, event) = {
            let mut inner = self.write();
            let Some(job) = inner.jobs.get_mut(id) else {
                tracing::debug!(job_id = %id, kind = K::NAME, "Status for unknown job");
                return ApplyOutcome::Unknown;
            };

            if job.status.is_terminal() {
                tracing::debug!(job_id = %id, status = ?job.status, "Ignoring status for finished job");
                return ApplyOutcome::Ignored;
            }

            let applied = match outcome {
                Ok(snapshot) => merge_snapshot(job, snapshot),
                Err(err) if !err.is_transient() => {
                    fail(job, err.to_string());
                    ApplyOutcome::Failed
                }
                Err(err) => self.record_transient(job, &err),
            };

            let event = applied.change().map(|change| JobEvent::from_job(job, change));
            (applied, event)
        };

        match applied {
            ApplyOutcome::Succeeded => {
                tracing::info!(job_id = %id, kind = K::NAME, "Job completed");
                metrics::counter!("jobs_finished_total", "kind" => K::NAME, "outcome" => "success")
                    .increment(1);
            }
            ApplyOutcome::Failed => {
                tracing::warn!(job_id = %id, kind = K::NAME, "Job failed");
                metrics::counter!("jobs_finished_total", "kind" => K::NAME, "outcome" => "failed")
                    .increment(1);
            }
            _ => {}
        }

        if let Some(event) = event {
            self.publish(event);
        }
        applied
    }

    fn record_transient(&self, job: &mut Job<K>, err: &PollError) -> ApplyOutcome {
        job.transient_failures += 1;
        tracing::warn!(
            job_id = %job.id,
            kind = K::NAME,
            attempt = job.transient_failures,
            error = %err,
            "Status poll failed, will retry"
        );

        match self.max_transient_failures {
            Some(limit) if job.transient_failures >= limit => {
                let message = format!(
                    "status polling failed after {} attempts: {}",
                    job.transient_failures, err
                );
                fail(job, message);
                ApplyOutcome::Failed
            }
            _ => ApplyOutcome::Retrying,
        }
    }

    /// Ids of jobs still waiting on the backend.
    pub fn active_ids(&self) -> Vec<JobId> {
        let inner = self.read();
        inner
            .order
            .iter()
            .filter(|id| inner.jobs.get(*id).is_some_and(Job::is_active))
            .cloned()
            .collect()
    }

    /// All jobs, newest first.
    pub fn snapshot(&self) -> Vec<Job<K>> {
        let inner = self.read();
        inner
            .order
            .iter()
            .rev()
            .filter_map(|id| inner.jobs.get(id))
            .cloned()
            .collect()
    }

    pub fn get(&self, id: &JobId) -> Option<Job<K>> {
        self.read().jobs.get(id).cloned()
    }

    pub fn len(&self) -> usize {
        self.read().jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().jobs.is_empty()
    }
}

impl<K: JobKind> Default for JobRegistry<K> {
    fn default() -> Self {
        Self::new()
    }
}

fn merge_snapshot<K: JobKind>(job: &mut Job<K>, snapshot: StatusSnapshot<K::Payload>) -> ApplyOutcome {
    job.transient_failures = 0;

    match snapshot.status {
        JobStatus::Success => {
            job.results = snapshot
                .result
                .map(|payload| job.kind.map_results(&payload))
                .unwrap_or_default();
            job.status = JobStatus::Success;
            job.progress = 100;
            job.updated_at = Utc::now();
            ApplyOutcome::Succeeded
        }
        JobStatus::Failed => {
            let message = snapshot
                .error_message
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_FAILURE_MESSAGE.to_string());
            fail(job, message);
            ApplyOutcome::Failed
        }
        next => {
            let before = (job.status, job.progress);
            if job.status.can_advance_to(next) {
                job.status = next;
            }
            if let Some(progress) = snapshot.progress {
                job.progress = job.progress.max(progress.min(100));
            }

            if (job.status, job.progress) == before {
                ApplyOutcome::Unchanged
            } else {
                job.updated_at = Utc::now();
                ApplyOutcome::Updated
            }
        }
    }
}

fn fail<K: JobKind>(job: &mut Job<K>, message: String) {
    job.status = JobStatus::Failed;
    job.error_message = Some(message);
    job.results.clear();
    job.updated_at = Utc::now();
}

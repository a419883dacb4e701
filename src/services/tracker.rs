use std::future::Future;
use std::sync::Arc;
use tokio::sync::broadcast;

use crate::config::PollingConfig;
use crate::models::job::{Job, JobId, JobKind, JobStatus};
use crate::models::status::Submission;
use crate::services::backend::SubmitError;
use crate::services::registry::{JobEvent, JobRegistry};
use crate::services::scheduler::PollingScheduler;
use crate::services::status_client::StatusClient;

/// Entry point a view uses to run and observe jobs of one kind.
///
/// Owns the registry and its scheduler. Dropping the tracker tears the
/// scheduler down, so no state is updated once nobody can observe it.
pub struct JobTracker<K: JobKind> {
    registry: Arc<JobRegistry<K>>,
    scheduler: Arc<PollingScheduler<K>>,
}

impl<K: JobKind> JobTracker<K> {
    pub fn new(client: Arc<dyn StatusClient<K>>, config: &PollingConfig) -> Self {
        let registry = Arc::new(JobRegistry::new().with_failure_limit(config.max_transient_failures));
        let scheduler = Arc::new(PollingScheduler::new(
            Arc::clone(&registry),
            client,
            config.interval(),
        ));
        Self { registry, scheduler }
    }

    /// Submit a job through `request` and start tracking it.
    ///
    /// Nothing is registered when the submission fails.
    pub async fn submit<Fut>(
        &self,
        label: impl Into<String>,
        kind: K,
        request: Fut,
    ) -> Result<JobId, SubmitError>
    where
        Fut: Future<Output = Result<Submission, SubmitError>>,
    {
        let label = label.into();
        let submission = match request.await {
            Ok(submission) => submission,
            Err(e) => {
                tracing::warn!(kind = K::NAME, label = %label, error = %e, "Job submission failed");
                return Err(e);
            }
        };

        metrics::counter!("jobs_submitted_total", "kind" => K::NAME).increment(1);
        self.track_with_status(
            submission.job_id.clone(),
            label,
            kind,
            submission.initial_status.unwrap_or(JobStatus::Processing),
        );
        Ok(submission.job_id)
    }

    /// Track a job that was created elsewhere (e.g. by an upload).
    pub fn track(&self, id: JobId, label: impl Into<String>, kind: K) -> bool {
        self.track_with_status(id, label, kind, JobStatus::Processing)
    }

    fn track_with_status(&self, id: JobId, label: impl Into<String>, kind: K, initial: JobStatus) -> bool {
        let inserted = self.registry.submit_with_status(id, label, kind, initial);
        // Re-arm even for duplicates: the job may still be active.
        self.scheduler.ensure_started();
        inserted
    }

    pub fn active_ids(&self) -> Vec<JobId> {
        self.registry.active_ids()
    }

    /// Jobs newest first.
    pub fn snapshot(&self) -> Vec<Job<K>> {
        self.registry.snapshot()
    }

    pub fn job(&self, id: &JobId) -> Option<Job<K>> {
        self.registry.get(id)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<JobEvent> {
        self.registry.subscribe()
    }

    pub fn is_polling(&self) -> bool {
        self.scheduler.is_running()
    }

    pub fn registry(&self) -> &Arc<JobRegistry<K>> {
        &self.registry
    }

    pub fn scheduler(&self) -> &Arc<PollingScheduler<K>> {
        &self.scheduler
    }

    /// Stop polling for good. Jobs keep their last known state.
    pub fn shutdown(&self) {
        if !self.scheduler.is_shut_down() {
            self.scheduler.shutdown();
        }
    }
}

impl<K: JobKind> Drop for JobTracker<K> {
    fn drop(&mut self) {
        self.shutdown();
    }
}

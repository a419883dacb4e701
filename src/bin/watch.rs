use media_job_tracker::{
    config::AppConfig,
    models::job::{JobId, JobStatus},
    models::kind::SeparationMode,
    services::{backend::BackendClient, tracker::JobTracker},
};
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tracing_subscriber::EnvFilter;

/// `WATCH_*` settings for a single run.
#[derive(Debug, Deserialize)]
struct WatchConfig {
    media_id: u64,
    #[serde(default = "default_mode")]
    mode: String,
    #[serde(default = "default_label")]
    label: String,
}

fn default_mode() -> String {
    SeparationMode::TwoTrack.to_string()
}

fn default_label() -> String {
    "watch".to_string()
}

#[tokio::main]
async fn main() {
    // Initialize structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    let config = AppConfig::from_env().expect("Failed to load configuration");
    let watch: WatchConfig = envy::prefixed("WATCH_")
        .from_env()
        .expect("Failed to load WATCH_ configuration");
    let mode: SeparationMode = watch.mode.parse().expect("WATCH_MODE must be vocal, stem4 or stem6");

    tracing::info!(media_id = watch.media_id, mode = %mode, "Starting separation watch");

    let backend = Arc::new(BackendClient::new(
        config.backend_base_url.clone(),
        config.backend_token.clone(),
    ));
    let tracker = JobTracker::<SeparationMode>::new(backend.clone(), &config.polling());

    // Subscribe first so no change is missed between submit and the first poll.
    let mut events = tracker.subscribe();

    let job_id = match tracker
        .submit(&watch.label, mode, backend.submit_separation(watch.media_id, mode))
        .await
    {
        Ok(id) => id,
        Err(e) => {
            tracing::error!(error = %e, "Could not start separation");
            std::process::exit(1);
        }
    };

    loop {
        match events.recv().await {
            Ok(event) if event.job_id == job_id => {
                tracing::info!(
                    job_id = %event.job_id,
                    status = ?event.status,
                    progress = event.progress,
                    "Job update"
                );
                if event.status.is_terminal() {
                    break;
                }
            }
            Ok(_) => {}
            Err(RecvError::Lagged(skipped)) => {
                tracing::debug!(skipped, "Missed job events");
                if is_finished(&tracker, &job_id) {
                    break;
                }
            }
            Err(RecvError::Closed) => break,
        }
    }

    report(&tracker, &job_id);
    tracker.shutdown();
}

fn is_finished(tracker: &JobTracker<SeparationMode>, id: &JobId) -> bool {
    tracker.job(id).is_some_and(|job| job.status.is_terminal())
}

fn report(tracker: &JobTracker<SeparationMode>, id: &JobId) {
    let Some(job) = tracker.job(id) else {
        tracing::error!(job_id = %id, "Job disappeared from tracker");
        return;
    };

    match job.status {
        JobStatus::Success => {
            tracing::info!(job_id = %id, tracks = job.results.len(), "Separation complete");
            for track in &job.results {
                tracing::info!(
                    name = %track.name,
                    description = %track.description,
                    url = %track.url,
                    "Track"
                );
            }
        }
        _ => {
            tracing::warn!(
                job_id = %id,
                error = job.error_message.as_deref().unwrap_or_default(),
                "Separation did not succeed"
            );
        }
    }
}

use async_trait::async_trait;

use crate::models::job::{JobId, JobKind};
use crate::models::status::StatusSnapshot;

/// Fetches the current status of one job.
///
/// One round trip per call and no retries; the scheduler decides when to ask
/// again.
#[async_trait]
pub trait StatusClient<K: JobKind>: Send + Sync {
    async fn fetch_status(&self, id: &JobId) -> Result<StatusSnapshot<K::Payload>, PollError>;
}

/// Failure of a single status poll.
#[derive(Debug, thiserror::Error)]
pub enum PollError {
    /// The backend does not know the job. Terminal for the job.
    #[error("job not found")]
    NotFound,

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("status endpoint returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("failed to parse status response: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("unexpected job status: {0}")]
    UnexpectedStatus(String),

    #[error("backend error ({code}): {message}")]
    Backend { code: i32, message: String },
}

impl PollError {
    /// Whether the job should keep being polled after this error.
    pub fn is_transient(&self) -> bool {
        !matches!(self, Self::NotFound)
    }
}

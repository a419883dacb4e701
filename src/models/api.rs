use garde::Validate;
use serde::{Deserialize, Serialize};

use crate::models::job::{JobId, JobStatus};
use crate::models::kind::SeparationMode;

/// Request to start a separation job for an uploaded file.
#[derive(Debug, Deserialize, Validate)]
pub struct SeparationJobRequest {
    #[garde(range(min = 1))]
    pub media_id: u64,

    #[garde(length(min = 1, max = 255))]
    pub label: String,

    #[garde(skip)]
    pub mode: SeparationMode,
}

/// Request to follow the transcode of an uploaded file.
#[derive(Debug, Deserialize, Validate)]
pub struct TranscodeJobRequest {
    #[garde(range(min = 1))]
    pub media_id: u64,

    #[garde(length(min = 1, max = 255))]
    pub label: String,
}

/// Response after a job has been accepted for tracking.
#[derive(Debug, Serialize, Deserialize)]
pub struct SubmitResponse {
    pub job_id: JobId,
    pub status: JobStatus,
}

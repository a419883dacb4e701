use serde::Deserialize;

use crate::models::job::{JobId, JobStatus};

/// One status observation for a job, as returned by a status poll.
#[derive(Debug, Clone)]
pub struct StatusSnapshot<P> {
    pub status: JobStatus,
    /// Progress in percent, when the backend reports it.
    pub progress: Option<u8>,
    /// Present only on success.
    pub result: Option<P>,
    pub error_message: Option<String>,
}

impl<P> StatusSnapshot<P> {
    pub fn processing(progress: u8) -> Self {
        Self {
            status: JobStatus::Processing,
            progress: Some(progress),
            result: None,
            error_message: None,
        }
    }

    pub fn success(result: P) -> Self {
        Self {
            status: JobStatus::Success,
            progress: Some(100),
            result: Some(result),
            error_message: None,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            status: JobStatus::Failed,
            progress: None,
            result: None,
            error_message: Some(message.into()),
        }
    }
}

/// Accepted job returned by a submission endpoint.
#[derive(Debug, Clone)]
pub struct Submission {
    pub job_id: JobId,
    pub initial_status: Option<JobStatus>,
}

/// Response of `POST /api/audio/separation/{mode}`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeparationResponse {
    pub code: i32,
    #[serde(default)]
    pub message: Option<String>,
    pub task_id: Option<JobId>,
}

/// Response of `GET /api/audio/task/{id}`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskStatusResponse {
    pub task_id: Option<JobId>,
    pub status: String,
    pub progress: Option<i32>,
    pub vocal_url: Option<String>,
    pub inst_url: Option<String>,
    pub track_urls: Option<Vec<String>>,
    pub error_msg: Option<String>,
}

/// Envelope used by the media service.
#[derive(Debug, Deserialize)]
pub struct ApiResponse<T> {
    pub code: i32,
    #[serde(default)]
    pub message: Option<String>,
    pub data: Option<T>,
}

/// Media record returned by `GET /api/media/status/{id}`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaDto {
    pub id: JobId,
    pub url: Option<String>,
    /// 0 = done, 1 = processing, 2 = failed.
    pub status: Option<i32>,
    /// Fraction complete in `0.0..=1.0`.
    pub progress: Option<f64>,
    pub error_msg: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub duration_sec: Option<f64>,
}

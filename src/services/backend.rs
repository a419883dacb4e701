use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::Serialize;

use crate::models::job::{JobId, JobStatus};
use crate::models::kind::{SeparationMode, SeparationPayload, Transcode, TranscodePayload};
use crate::models::side_panel::SidePanel;
use crate::models::status::{
    ApiResponse, MediaDto, SeparationResponse, StatusSnapshot, Submission, TaskStatusResponse,
};
use crate::services::single_flight::FetchError;
use crate::services::status_client::{PollError, StatusClient};

/// HTTP client for the creative-hub gateway.
pub struct BackendClient {
    http: Client,
    base_url: String,
    api_token: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SeparationRequest {
    media_id: u64,
}

impl BackendClient {
    pub fn new(base_url: impl Into<String>, api_token: Option<String>) -> Self {
        Self::with_client(Client::new(), base_url, api_token)
    }

    /// Reuse an existing [`reqwest::Client`] (shared connection pool).
    pub fn with_client(http: Client, base_url: impl Into<String>, api_token: Option<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_token,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self.http.request(method, format!("{}{}", self.base_url, path));
        match &self.api_token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Start a separation job for an uploaded media file.
    pub async fn submit_separation(
        &self,
        media_id: u64,
        mode: SeparationMode,
    ) -> Result<Submission, SubmitError> {
        let response = self
            .request(Method::POST, &format!("/api/audio/separation/{}", mode))
            .json(&SeparationRequest { media_id })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SubmitError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.bytes().await?;
        let parsed: SeparationResponse = serde_json::from_slice(&body)?;

        match parsed.task_id {
            Some(job_id) if parsed.code == 0 => {
                tracing::info!(job_id = %job_id, media_id, mode = %mode, "Separation job accepted");
                Ok(Submission {
                    job_id,
                    initial_status: Some(JobStatus::Processing),
                })
            }
            _ => Err(SubmitError::Rejected {
                code: parsed.code,
                message: parsed
                    .message
                    .unwrap_or_else(|| "task creation failed".to_string()),
            }),
        }
    }

    /// Fetch the side panel for the authenticated user.
    pub async fn fetch_side_panel(&self) -> Result<SidePanel, FetchError> {
        metrics::counter!("side_panel_fetches_total").increment(1);

        let response = self
            .request(Method::GET, "/api/auth/side/panel")
            .send()
            .await
            .map_err(|e| FetchError::Failed(e.to_string()))?;

        match response.status() {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(FetchError::Unauthorized),
            status if !status.is_success() => {
                Err(FetchError::Failed(format!("side panel returned {}", status)))
            }
            _ => response
                .json::<SidePanel>()
                .await
                .map_err(|e| FetchError::Failed(e.to_string())),
        }
    }

    /// Send a status request and return the body of a successful response.
    ///
    /// A 404 means the job is gone, which is distinct from any other failure.
    async fn status_body(&self, path: &str) -> Result<Vec<u8>, PollError> {
        let response = self.request(Method::GET, path).send().await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(PollError::NotFound);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PollError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response.bytes().await?.to_vec())
    }
}

#[async_trait]
impl StatusClient<SeparationMode> for BackendClient {
    async fn fetch_status(&self, id: &JobId) -> Result<StatusSnapshot<SeparationPayload>, PollError> {
        let body = self.status_body(&format!("/api/audio/task/{}", id)).await?;
        let parsed: TaskStatusResponse = serde_json::from_slice(&body)?;
        separation_snapshot(parsed)
    }
}

#[async_trait]
impl StatusClient<Transcode> for BackendClient {
    async fn fetch_status(&self, id: &JobId) -> Result<StatusSnapshot<TranscodePayload>, PollError> {
        let body = self.status_body(&format!("/api/media/status/{}", id)).await?;
        let parsed: ApiResponse<MediaDto> = serde_json::from_slice(&body)?;
        media_snapshot(parsed)
    }
}

fn clamp_percent(value: f64) -> u8 {
    value.round().clamp(0.0, 100.0) as u8
}

/// Convert a task status response into a snapshot.
pub fn separation_snapshot(
    response: TaskStatusResponse,
) -> Result<StatusSnapshot<SeparationPayload>, PollError> {
    let status = match response.status.as_str() {
        "PENDING" => JobStatus::Pending,
        "PROCESSING" => JobStatus::Processing,
        "SUCCESS" => JobStatus::Success,
        "FAILED" => JobStatus::Failed,
        other => return Err(PollError::UnexpectedStatus(other.to_string())),
    };

    let result = (status == JobStatus::Success).then(|| {
        SeparationPayload::from_wire(response.track_urls, response.vocal_url, response.inst_url)
    });

    Ok(StatusSnapshot {
        status,
        progress: response.progress.map(|p| clamp_percent(f64::from(p))),
        result,
        error_message: response.error_msg,
    })
}

/// Convert a media status envelope into a snapshot.
pub fn media_snapshot(
    response: ApiResponse<MediaDto>,
) -> Result<StatusSnapshot<TranscodePayload>, PollError> {
    if response.code != 0 {
        return Err(PollError::Backend {
            code: response.code,
            message: response.message.unwrap_or_default(),
        });
    }
    let media = response.data.ok_or(PollError::NotFound)?;

    let status = match media.status {
        Some(0) => JobStatus::Success,
        Some(1) | None => JobStatus::Processing,
        Some(2) => JobStatus::Failed,
        Some(other) => return Err(PollError::UnexpectedStatus(other.to_string())),
    };

    let result = (status == JobStatus::Success).then(|| TranscodePayload {
        url: media.url,
        width: media.width,
        height: media.height,
        duration_sec: media.duration_sec,
    });

    Ok(StatusSnapshot {
        status,
        progress: media.progress.map(|p| clamp_percent(p * 100.0)),
        result,
        error_message: media.error_msg,
    })
}

/// Failure to create a job. No job is tracked when this is returned.
#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("submission endpoint returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("submission rejected ({code}): {message}")]
    Rejected { code: i32, message: String },

    #[error("failed to parse submission response: {0}")]
    Parse(#[from] serde_json::Error),
}

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use garde::Validate;

use crate::app_state::AppState;
use crate::models::api::{SeparationJobRequest, SubmitResponse, TranscodeJobRequest};
use crate::models::job::{Job, JobId, JobStatus};
use crate::models::kind::{SeparationMode, Transcode};
use crate::services::backend::SubmitError;

/// POST /api/v1/separations: Start a separation job and track it.
pub async fn submit_separation(
    State(state): State<AppState>,
    Json(request): Json<SeparationJobRequest>,
) -> Result<(StatusCode, Json<SubmitResponse>), StatusCode> {
    request.validate().map_err(|_| StatusCode::BAD_REQUEST)?;

    let job_id = state
        .separations
        .submit(
            request.label,
            request.mode,
            state.backend.submit_separation(request.media_id, request.mode),
        )
        .await
        .map_err(|e| match e {
            SubmitError::Rejected { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            _ => StatusCode::BAD_GATEWAY,
        })?;

    let status = state
        .separations
        .job(&job_id)
        .map_or(JobStatus::Processing, |job| job.status);

    Ok((StatusCode::ACCEPTED, Json(SubmitResponse { job_id, status })))
}

/// POST /api/v1/transcodes: Follow the transcode of an uploaded file.
pub async fn track_transcode(
    State(state): State<AppState>,
    Json(request): Json<TranscodeJobRequest>,
) -> Result<(StatusCode, Json<SubmitResponse>), StatusCode> {
    request.validate().map_err(|_| StatusCode::BAD_REQUEST)?;

    let job_id = JobId::from(request.media_id);
    state.transcodes.track(job_id.clone(), request.label, Transcode);

    let status = state
        .transcodes
        .job(&job_id)
        .map_or(JobStatus::Processing, |job| job.status);

    Ok((StatusCode::ACCEPTED, Json(SubmitResponse { job_id, status })))
}

/// GET /api/v1/separations: All separation jobs, newest first.
pub async fn list_separations(State(state): State<AppState>) -> Json<Vec<Job<SeparationMode>>> {
    Json(state.separations.snapshot())
}

/// GET /api/v1/separations/{job_id}
pub async fn get_separation(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> Result<Json<Job<SeparationMode>>, StatusCode> {
    state
        .separations
        .job(&JobId::from(job_id))
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

/// GET /api/v1/transcodes: All transcode jobs, newest first.
pub async fn list_transcodes(State(state): State<AppState>) -> Json<Vec<Job<Transcode>>> {
    Json(state.transcodes.snapshot())
}

/// GET /api/v1/transcodes/{job_id}
pub async fn get_transcode(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> Result<Json<Job<Transcode>>, StatusCode> {
    state
        .transcodes
        .job(&JobId::from(job_id))
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

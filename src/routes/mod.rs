pub mod jobs;
pub mod ops;
pub mod side_panel;

use axum::routing::{get, post};
use axum::Router;

use crate::app_state::AppState;

/// Health and job/side-panel API routes. `/metrics` is mounted by the binary,
/// which owns the Prometheus recorder.
pub fn api_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(ops::health_check))
        .route(
            "/api/v1/separations",
            post(jobs::submit_separation).get(jobs::list_separations),
        )
        .route("/api/v1/separations/{job_id}", get(jobs::get_separation))
        .route(
            "/api/v1/transcodes",
            post(jobs::track_transcode).get(jobs::list_transcodes),
        )
        .route("/api/v1/transcodes/{job_id}", get(jobs::get_transcode))
        .route("/api/v1/side-panel", get(side_panel::get_side_panel))
        .route("/api/v1/side-panel/reload", post(side_panel::reload_side_panel))
        .with_state(state)
}

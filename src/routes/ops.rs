use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use metrics_exporter_prometheus::PrometheusHandle;
use serde::Serialize;
use std::sync::Arc;

use crate::app_state::AppState;
use crate::models::job::JobKind;
use crate::services::tracker::JobTracker;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub trackers: TrackerHealth,
}

#[derive(Serialize)]
pub struct TrackerHealth {
    pub separations: TrackerStats,
    pub transcodes: TrackerStats,
}

#[derive(Serialize)]
pub struct TrackerStats {
    pub total: usize,
    pub active: usize,
    pub polling: bool,
    pub polls_issued: u64,
}

impl TrackerStats {
    fn of<K: JobKind>(tracker: &JobTracker<K>) -> Self {
        Self {
            total: tracker.registry().len(),
            active: tracker.active_ids().len(),
            polling: tracker.is_polling(),
            polls_issued: tracker.scheduler().polls_issued(),
        }
    }
}

/// GET /health: Liveness plus a summary of what is being tracked.
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        trackers: TrackerHealth {
            separations: TrackerStats::of(&state.separations),
            transcodes: TrackerStats::of(&state.transcodes),
        },
    })
}

/// Prometheus metrics scrape endpoint.
pub async fn prometheus_metrics(State(handle): State<Arc<PrometheusHandle>>) -> impl IntoResponse {
    handle.render()
}

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;

use crate::app_state::AppState;
use crate::models::side_panel::SidePanel;
use crate::services::side_panel;
use crate::services::single_flight::FetchError;

#[derive(Serialize)]
pub struct ReloadResponse {
    pub invalidated: bool,
}

/// GET /api/v1/side-panel: Current user's side panel, fetched at most once.
pub async fn get_side_panel(
    State(state): State<AppState>,
) -> Result<Json<SidePanel>, StatusCode> {
    side_panel::load_with(state.side_panel, &state.backend)
        .await
        .map(Json)
        .map_err(|e| match e {
            FetchError::Unauthorized => StatusCode::UNAUTHORIZED,
            FetchError::Failed(_) => StatusCode::BAD_GATEWAY,
        })
}

/// POST /api/v1/side-panel/reload: Drop the cached panel (e.g. after re-login).
pub async fn reload_side_panel(State(state): State<AppState>) -> Json<ReloadResponse> {
    let invalidated = side_panel::reload_with(state.side_panel);
    tracing::info!(invalidated, "Side panel cache reset");
    Json(ReloadResponse { invalidated })
}

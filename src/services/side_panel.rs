use std::sync::OnceLock;

use crate::models::side_panel::SidePanel;
use crate::services::backend::BackendClient;
use crate::services::single_flight::{FetchError, SingleFlightCache};

/// Cache key of the current user's side panel.
pub const SIDE_PANEL_KEY: &str = "sidepanel";

/// Process-wide side panel cache (lazily initialized, never torn down).
static SIDE_PANEL_CACHE: OnceLock<SingleFlightCache<&'static str, SidePanel>> = OnceLock::new();

pub fn shared_cache() -> &'static SingleFlightCache<&'static str, SidePanel> {
    SIDE_PANEL_CACHE.get_or_init(SingleFlightCache::new)
}

/// Load the side panel, sharing one request among concurrent callers.
pub async fn load(backend: &BackendClient) -> Result<SidePanel, FetchError> {
    load_with(shared_cache(), backend).await
}

/// Same as [`load`] against an explicit cache.
pub async fn load_with(
    cache: &SingleFlightCache<&'static str, SidePanel>,
    backend: &BackendClient,
) -> Result<SidePanel, FetchError> {
    let outcome = cache.get(SIDE_PANEL_KEY, || backend.fetch_side_panel()).await;
    if let Err(e) = &outcome {
        tracing::debug!(error = %e, "Side panel unavailable");
    }
    outcome
}

/// Forget the cached side panel so the next load fetches it again.
pub fn reload() -> bool {
    reload_with(shared_cache())
}

pub fn reload_with(cache: &SingleFlightCache<&'static str, SidePanel>) -> bool {
    cache.invalidate(&SIDE_PANEL_KEY)
}

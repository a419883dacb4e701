use std::sync::Arc;

use crate::config::PollingConfig;
use crate::models::kind::{SeparationMode, Transcode};
use crate::models::side_panel::SidePanel;
use crate::services::backend::BackendClient;
use crate::services::side_panel;
use crate::services::single_flight::SingleFlightCache;
use crate::services::tracker::JobTracker;

/// Shared application state passed to all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub backend: Arc<BackendClient>,
    pub separations: Arc<JobTracker<SeparationMode>>,
    pub transcodes: Arc<JobTracker<Transcode>>,
    pub side_panel: &'static SingleFlightCache<&'static str, SidePanel>,
}

impl AppState {
    pub fn new(backend: BackendClient, polling: &PollingConfig) -> Self {
        let backend = Arc::new(backend);
        let separations = JobTracker::<SeparationMode>::new(backend.clone(), polling);
        let transcodes = JobTracker::<Transcode>::new(backend.clone(), polling);

        Self {
            backend,
            separations: Arc::new(separations),
            transcodes: Arc::new(transcodes),
            side_panel: side_panel::shared_cache(),
        }
    }

    /// Use a different side panel cache than the process-wide one.
    pub fn with_side_panel_cache(
        mut self,
        cache: &'static SingleFlightCache<&'static str, SidePanel>,
    ) -> Self {
        self.side_panel = cache;
        self
    }

    /// Stop all polling (process shutdown).
    pub fn shutdown(&self) {
        self.separations.shutdown();
        self.transcodes.shutdown();
    }
}

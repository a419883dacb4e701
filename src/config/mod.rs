use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize)]
pub struct AppConfig {
    /// Server bind address (e.g., "127.0.0.1:3000").
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Base URL of the backend gateway (e.g., "http://localhost:8080")
    pub backend_base_url: String,

    /// Bearer token sent with every backend request
    #[serde(default)]
    pub backend_token: Option<String>,

    /// Status polling period in milliseconds
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Fail a job after this many consecutive transient poll errors.
    /// Unset means retry forever.
    #[serde(default)]
    pub poll_max_transient_failures: Option<u32>,
}

fn default_bind_addr() -> String {
    "127.0.0.1:3000".to_string()
}

fn default_poll_interval_ms() -> u64 {
    1000
}

impl AppConfig {
    pub fn from_env() -> Result<Self, envy::Error> {
        dotenvy::dotenv().ok();
        envy::from_env()
    }

    pub fn polling(&self) -> PollingConfig {
        PollingConfig {
            interval_ms: self.poll_interval_ms,
            max_transient_failures: self.poll_max_transient_failures,
        }
    }
}

/// Settings shared by every job tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollingConfig {
    pub interval_ms: u64,
    pub max_transient_failures: Option<u32>,
}

impl PollingConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms.max(1))
    }
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_poll_interval_ms(),
            max_transient_failures: None,
        }
    }
}

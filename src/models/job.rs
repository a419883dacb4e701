use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

use crate::models::track::Track;

/// Opaque job identifier assigned by the backend.
///
/// The gateway sends numeric ids while other services use strings, so both
/// deserialize into the same value.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct JobId(String);

impl JobId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<u64> for JobId {
    fn from(id: u64) -> Self {
        Self(id.to_string())
    }
}

impl From<&str> for JobId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for JobId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl<'de> Deserialize<'de> for JobId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Number(u64),
            Text(String),
        }

        Ok(match RawId::deserialize(deserializer)? {
            RawId::Number(n) => Self::from(n),
            RawId::Text(s) => Self(s),
        })
    }
}

/// Lifecycle status of a tracked job.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobStatus {
    Pending,
    Processing,
    Success,
    Failed,
}

impl JobStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Success | Self::Failed)
    }

    fn rank(self) -> u8 {
        match self {
            Self::Pending => 0,
            Self::Processing => 1,
            Self::Success | Self::Failed => 2,
        }
    }

    /// Whether moving from `self` to `next` goes forward in the lifecycle.
    pub fn can_advance_to(self, next: JobStatus) -> bool {
        !self.is_terminal() && next.rank() >= self.rank()
    }
}

/// The kind of work a job performs.
///
/// A kind fixes the payload shape the status endpoint returns on success and
/// how that payload becomes result tracks, which lets separation and
/// transcoding jobs share one registry and scheduler implementation.
pub trait JobKind: Clone + fmt::Debug + Send + Sync + 'static {
    /// Raw success payload carried by a status snapshot.
    type Payload: fmt::Debug + Send + Sync + 'static;

    /// Short name used in logs and metric labels.
    const NAME: &'static str;

    fn map_results(&self, payload: &Self::Payload) -> Vec<Track>;
}

/// A tracked asynchronous backend job.
#[derive(Debug, Clone, Serialize)]
pub struct Job<K: JobKind> {
    pub id: JobId,
    pub label: String,
    pub kind: K,
    pub status: JobStatus,
    pub progress: u8,
    pub results: Vec<Track>,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub transient_failures: u32,
}

impl<K: JobKind> Job<K> {
    pub fn new(id: JobId, label: String, kind: K, status: JobStatus) -> Self {
        let now = Utc::now();
        Self {
            id,
            label,
            kind,
            status,
            progress: 0,
            results: Vec::new(),
            error_message: None,
            created_at: now,
            updated_at: now,
            transient_failures: 0,
        }
    }

    pub fn is_active(&self) -> bool {
        !self.status.is_terminal()
    }
}

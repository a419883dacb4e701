use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

use crate::models::job::JobKind;
use crate::models::track::Track;
use crate::services::result_mapper;

/// Separation scheme chosen at submission.
///
/// The string form doubles as the backend endpoint segment
/// (`/api/audio/separation/{mode}`).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr, EnumIter,
)]
pub enum SeparationMode {
    #[serde(rename = "vocal")]
    #[strum(serialize = "vocal")]
    TwoTrack,
    #[serde(rename = "stem4")]
    #[strum(serialize = "stem4")]
    FourTrack,
    #[serde(rename = "stem6")]
    #[strum(serialize = "stem6")]
    SixTrack,
}

/// Track URLs reported by a finished separation job, by track position.
///
/// A `None` entry is a position the backend left empty; later entries keep
/// their position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeparationPayload {
    pub urls: Vec<Option<String>>,
}

impl SeparationPayload {
    /// Every position filled, in order.
    pub fn from_urls<I>(urls: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        Self {
            urls: urls.into_iter().map(|url| Some(url.into())).collect(),
        }
    }

    /// Builds the positional URL list from the two wire layouts.
    ///
    /// `track_urls` wins when non-empty. Otherwise `vocal_url` fills the first
    /// position and `inst_url` the second, each independently of the other.
    pub fn from_wire(
        track_urls: Option<Vec<String>>,
        vocal_url: Option<String>,
        inst_url: Option<String>,
    ) -> Self {
        let present = |url: Option<String>| url.filter(|u| !u.is_empty());

        let urls = match track_urls.filter(|urls| !urls.is_empty()) {
            Some(urls) => urls.into_iter().map(|url| present(Some(url))).collect(),
            None => vec![present(vocal_url), present(inst_url)],
        };
        Self { urls }
    }

    /// URLs that are present, in position order.
    pub fn available_urls(&self) -> Vec<&str> {
        self.urls.iter().filter_map(|url| url.as_deref()).collect()
    }
}

impl JobKind for SeparationMode {
    type Payload = SeparationPayload;

    const NAME: &'static str = "separation";

    fn map_results(&self, payload: &SeparationPayload) -> Vec<Track> {
        result_mapper::map_slots(*self, payload.urls.iter().map(Option::as_deref))
    }
}

/// Media transcoding triggered by an upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transcode;

/// Output of a finished transcode.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TranscodePayload {
    pub url: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub duration_sec: Option<f64>,
}

impl JobKind for Transcode {
    type Payload = TranscodePayload;

    const NAME: &'static str = "transcode";

    fn map_results(&self, payload: &TranscodePayload) -> Vec<Track> {
        result_mapper::map_media(payload)
    }
}

//! Result track mapping
//!
//! Turns the URL list of a finished job into named tracks. Each separation
//! mode has a fixed, ordered set of stem names; URLs are paired with those
//! names by position.

use crate::models::kind::{SeparationMode, TranscodePayload};
use crate::models::track::Track;

/// A named position in a mode's output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackSlot {
    pub name: &'static str,
    pub description: &'static str,
}

const fn slot(name: &'static str, description: &'static str) -> TrackSlot {
    TrackSlot { name, description }
}

const TWO_TRACK: &[TrackSlot] = &[slot("Vocal", "Vocals"), slot("Instrumental", "Accompaniment")];

const FOUR_TRACK: &[TrackSlot] = &[
    slot("Vocal", "Vocals"),
    slot("Drums", "Drums"),
    slot("Bass", "Bass"),
    slot("Other", "Other instruments"),
];

const SIX_TRACK: &[TrackSlot] = &[
    slot("Vocal", "Vocals"),
    slot("Drums", "Drums"),
    slot("Bass", "Bass"),
    slot("Other", "Other instruments"),
    slot("Piano", "Piano"),
    slot("Guitar", "Guitar"),
];

impl SeparationMode {
    /// Ordered track names produced by this mode.
    pub fn slots(self) -> &'static [TrackSlot] {
        match self {
            Self::TwoTrack => TWO_TRACK,
            Self::FourTrack => FOUR_TRACK,
            Self::SixTrack => SIX_TRACK,
        }
    }
}

/// Pair backend URLs with the mode's track names.
///
/// URLs beyond the known names are labeled `Track N` (1-based position)
/// with an empty description.
pub fn map_tracks(mode: SeparationMode, urls: &[String]) -> Vec<Track> {
    map_slots(mode, urls.iter().map(|url| Some(url.as_str())))
}

/// Like [`map_tracks`], but positions may be empty. An empty position
/// produces no track and does not shift the names of later ones.
pub fn map_slots<'a, I>(mode: SeparationMode, urls: I) -> Vec<Track>
where
    I: IntoIterator<Item = Option<&'a str>>,
{
    let slots = mode.slots();
    urls.into_iter()
        .enumerate()
        .filter_map(|(index, url)| {
            let url = url?;
            Some(match slots.get(index) {
                Some(slot) => Track::new(slot.name, url, slot.description),
                None => Track::new(format!("Track {}", index + 1), url, ""),
            })
        })
        .collect()
}

/// A finished transcode yields one playable media track.
pub fn map_media(payload: &TranscodePayload) -> Vec<Track> {
    let Some(url) = payload.url.as_deref().filter(|u| !u.is_empty()) else {
        return Vec::new();
    };

    let description = match (payload.width, payload.height, payload.duration_sec) {
        (Some(w), Some(h), Some(secs)) => format!("{}x{}, {:.1}s", w, h, secs),
        (Some(w), Some(h), None) => format!("{}x{}", w, h),
        (_, _, Some(secs)) => format!("{:.1}s", secs),
        _ => String::new(),
    };

    vec![Track::new("Media", url, description)]
}

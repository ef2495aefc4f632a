//! # Playback Types
//!
//! The track model and the observable transport state.

use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Track
// ============================================================================

/// Category tag of a track.
///
/// Serialized as a plain string: `"official"` or any other free-form tag.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TrackKind {
    /// Curated content published by the platform itself.
    Official,
    /// Any other tag, kept verbatim.
    Other(String),
    #[default]
    Unspecified,
}

impl TrackKind {
    pub fn as_str(&self) -> &str {
        match self {
            TrackKind::Official => "official",
            TrackKind::Other(tag) => tag,
            TrackKind::Unspecified => "",
        }
    }

    pub fn is_official(&self) -> bool {
        matches!(self, TrackKind::Official)
    }
}

impl From<String> for TrackKind {
    fn from(value: String) -> Self {
        match value.as_str() {
            "official" => TrackKind::Official,
            "" => TrackKind::Unspecified,
            _ => TrackKind::Other(value),
        }
    }
}

impl From<&str> for TrackKind {
    fn from(value: &str) -> Self {
        TrackKind::from(value.to_string())
    }
}

impl From<TrackKind> for String {
    fn from(kind: TrackKind) -> Self {
        match kind {
            TrackKind::Other(tag) => tag,
            other => other.as_str().to_string(),
        }
    }
}

impl fmt::Display for TrackKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One playable audio item and its metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub artist: String,
    /// Artwork reference
    #[serde(default)]
    pub image: String,
    /// Audio resource locator
    pub source_url: String,
    #[serde(default)]
    pub kind: TrackKind,
}

impl Track {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        source_url: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            artist: String::new(),
            image: String::new(),
            source_url: source_url.into(),
            kind: TrackKind::Unspecified,
        }
    }

    pub fn with_artist(mut self, artist: impl Into<String>) -> Self {
        self.artist = artist.into();
        self
    }

    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = image.into();
        self
    }

    pub fn with_kind(mut self, kind: impl Into<TrackKind>) -> Self {
        self.kind = kind.into();
        self
    }

    /// A track without a source cannot be handed to the media element.
    pub fn has_source(&self) -> bool {
        !self.source_url.trim().is_empty()
    }
}

// ============================================================================
// Playback Rate
// ============================================================================

/// The enumerated playback speeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub enum PlaybackRate {
    Half,
    ThreeQuarters,
    #[default]
    Normal,
    OneAndQuarter,
    OneAndHalf,
    OneAndThreeQuarters,
    Double,
}

impl PlaybackRate {
    pub const ALL: [PlaybackRate; 7] = [
        PlaybackRate::Half,
        PlaybackRate::ThreeQuarters,
        PlaybackRate::Normal,
        PlaybackRate::OneAndQuarter,
        PlaybackRate::OneAndHalf,
        PlaybackRate::OneAndThreeQuarters,
        PlaybackRate::Double,
    ];

    pub fn as_f64(self) -> f64 {
        match self {
            PlaybackRate::Half => 0.5,
            PlaybackRate::ThreeQuarters => 0.75,
            PlaybackRate::Normal => 1.0,
            PlaybackRate::OneAndQuarter => 1.25,
            PlaybackRate::OneAndHalf => 1.5,
            PlaybackRate::OneAndThreeQuarters => 1.75,
            PlaybackRate::Double => 2.0,
        }
    }

    /// Matches `value` against the enumerated set; anything else is `None`.
    ///
    /// ```
    /// use core_playback::PlaybackRate;
    ///
    /// assert_eq!(PlaybackRate::from_f64(1.5), Some(PlaybackRate::OneAndHalf));
    /// assert_eq!(PlaybackRate::from_f64(1.33), None);
    /// ```
    pub fn from_f64(value: f64) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|rate| (rate.as_f64() - value).abs() < 1e-9)
    }
}

impl TryFrom<f64> for PlaybackRate {
    type Error = String;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::from_f64(value).ok_or_else(|| format!("unsupported playback rate: {}", value))
    }
}

impl From<PlaybackRate> for f64 {
    fn from(rate: PlaybackRate) -> Self {
        rate.as_f64()
    }
}

impl fmt::Display for PlaybackRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x", self.as_f64())
    }
}

// ============================================================================
// Playback State
// ============================================================================

/// Outcome of handing the current track to the media element.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum LoadStatus {
    /// No track loaded.
    #[default]
    Idle,
    /// Source handed over, metadata not yet known.
    Loading,
    /// Duration known, ready to play.
    Ready,
    /// Terminal for this load attempt; the caller must `load()` again.
    Failed { message: String },
}

impl LoadStatus {
    pub fn is_failed(&self) -> bool {
        matches!(self, LoadStatus::Failed { .. })
    }
}

/// The single transport state of the player.
///
/// If `current_track` is `None` then `is_playing` is false and
/// `position_seconds` is 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaybackState {
    pub current_track: Option<Track>,
    pub is_playing: bool,
    pub position_seconds: f64,
    pub duration_seconds: f64,
    pub volume: f64,
    pub is_muted: bool,
    pub playback_rate: PlaybackRate,
    pub load_status: LoadStatus,
}

impl Default for PlaybackState {
    fn default() -> Self {
        Self::with_volume(1.0)
    }
}

impl PlaybackState {
    pub(crate) fn with_volume(volume: f64) -> Self {
        Self {
            current_track: None,
            is_playing: false,
            position_seconds: 0.0,
            duration_seconds: 0.0,
            volume,
            is_muted: false,
            playback_rate: PlaybackRate::Normal,
            load_status: LoadStatus::Idle,
        }
    }

    pub fn has_track(&self) -> bool {
        self.current_track.is_some()
    }

    pub fn track_id(&self) -> Option<&str> {
        self.current_track.as_ref().map(|track| track.id.as_str())
    }

    /// Fraction of the track played, in [0, 1]; 0 while the duration is unknown.
    pub fn progress(&self) -> f64 {
        if self.duration_seconds > 0.0 {
            (self.position_seconds / self.duration_seconds).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    pub fn at_end(&self) -> bool {
        self.duration_seconds > 0.0 && self.position_seconds >= self.duration_seconds
    }

    /// Volume actually reaching the output.
    pub fn effective_volume(&self) -> f64 {
        if self.is_muted {
            0.0
        } else {
            self.volume
        }
    }
}

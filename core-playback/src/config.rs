//! # Playback Configuration
//!
//! Tunables for the playback engine.

use core_runtime::config::PlayerSettings;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Playback engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaybackConfig {
    /// Storage key holding the serialized current track.
    ///
    /// Default: `current-track`.
    #[serde(default = "default_track_key")]
    pub track_key: String,

    /// Storage key holding the `{ volume, muted, rate }` snapshot.
    ///
    /// Default: `playback-state`.
    #[serde(default = "default_output_key")]
    pub output_key: String,

    /// Volume used until the user changes it.
    ///
    /// Default: 1.0.
    #[serde(default = "default_volume")]
    pub default_volume: f64,

    /// Period of the progress ticker in milliseconds.
    ///
    /// Default: 250 ms.
    #[serde(default = "default_progress_interval_ms")]
    pub progress_interval_ms: u64,

    /// Whether progress ticks are announced as `PositionChanged` events.
    /// Explicit seeks are always announced.
    ///
    /// Default: false.
    #[serde(default = "default_emit_position_events")]
    pub emit_position_events: bool,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            track_key: default_track_key(),
            output_key: default_output_key(),
            default_volume: default_volume(),
            progress_interval_ms: default_progress_interval_ms(),
            emit_position_events: default_emit_position_events(),
        }
    }
}

impl PlaybackConfig {
    pub fn progress_interval(&self) -> Duration {
        Duration::from_millis(self.progress_interval_ms)
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), String> {
        if self.track_key.is_empty() || self.output_key.is_empty() {
            return Err("storage keys must not be empty".to_string());
        }

        if self.track_key == self.output_key {
            return Err("track_key and output_key must differ".to_string());
        }

        if !(0.0..=1.0).contains(&self.default_volume) {
            return Err("default_volume must be between 0.0 and 1.0".to_string());
        }

        if self.progress_interval_ms == 0 {
            return Err("progress_interval_ms must be > 0".to_string());
        }

        Ok(())
    }
}

impl From<&PlayerSettings> for PlaybackConfig {
    fn from(settings: &PlayerSettings) -> Self {
        Self {
            track_key: settings.storage_keys.current_track.clone(),
            output_key: settings.storage_keys.playback_state.clone(),
            default_volume: settings.default_volume,
            progress_interval_ms: settings.progress_interval_ms,
            ..Self::default()
        }
    }
}

// ============================================================================
// Default Functions (for serde)
// ============================================================================

fn default_track_key() -> String {
    "current-track".to_string()
}

fn default_output_key() -> String {
    "playback-state".to_string()
}

fn default_volume() -> f64 {
    1.0
}

fn default_progress_interval_ms() -> u64 {
    250
}

fn default_emit_position_events() -> bool {
    false
}

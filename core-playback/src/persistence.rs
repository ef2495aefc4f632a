//! Durable snapshot of the player: the current track and the output settings.
//!
//! Position is deliberately absent; a reload resumes paused at 0.

use crate::error::{PlaybackError, Result};
use crate::types::{PlaybackRate, PlaybackState, Track};
use bridge_traits::SettingsStore;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Persisted `{ "volume", "muted", "rate" }` snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OutputSettings {
    pub volume: f64,
    pub muted: bool,
    pub rate: f64,
}

impl OutputSettings {
    pub fn from_state(state: &PlaybackState) -> Self {
        Self {
            volume: state.volume,
            muted: state.is_muted,
            rate: state.playback_rate.as_f64(),
        }
    }

    /// Checks ranges and resolves the rate against the enumerated set.
    pub fn validated(self) -> Result<(f64, bool, PlaybackRate)> {
        if !self.volume.is_finite() || !(0.0..=1.0).contains(&self.volume) {
            return Err(PlaybackError::InvalidOutput(format!(
                "volume {} outside [0, 1]",
                self.volume
            )));
        }

        let rate = PlaybackRate::from_f64(self.rate).ok_or_else(|| {
            PlaybackError::InvalidOutput(format!("unsupported rate {}", self.rate))
        })?;

        Ok((self.volume, self.muted, rate))
    }
}

/// Reads and writes the two playback keys.
#[derive(Clone)]
pub struct PlaybackPersistence {
    store: Arc<dyn SettingsStore>,
    track_key: String,
    output_key: String,
}

impl PlaybackPersistence {
    pub fn new(
        store: Arc<dyn SettingsStore>,
        track_key: impl Into<String>,
        output_key: impl Into<String>,
    ) -> Self {
        Self {
            store,
            track_key: track_key.into(),
            output_key: output_key.into(),
        }
    }

    pub async fn load_track(&self) -> Result<Option<Track>> {
        match self.store.get_string(&self.track_key).await? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    pub async fn save_track(&self, track: &Track) -> Result<()> {
        let raw = serde_json::to_string(track)?;
        self.store.set_string(&self.track_key, &raw).await?;
        Ok(())
    }

    pub async fn load_output(&self) -> Result<Option<OutputSettings>> {
        match self.store.get_string(&self.output_key).await? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    pub async fn save_output(&self, output: OutputSettings) -> Result<()> {
        let raw = serde_json::to_string(&output)?;
        self.store.set_string(&self.output_key, &raw).await?;
        Ok(())
    }

    /// Removes both keys.
    pub async fn clear(&self) -> Result<()> {
        self.store.delete(&self.track_key).await?;
        self.store.delete(&self.output_key).await?;
        Ok(())
    }
}

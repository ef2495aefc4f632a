//! # Playback Error Types
//!
//! Errors raised inside the engine's persistence layer. Commands never return
//! these to callers: they are logged and replaced by defaults.

use bridge_traits::BridgeError;
use thiserror::Error;

/// Errors that can occur while reading or writing persisted playback data.
#[derive(Error, Debug)]
pub enum PlaybackError {
    /// The settings store rejected the operation.
    #[error("Settings store error: {0}")]
    Storage(#[from] BridgeError),

    /// A persisted value could not be encoded or decoded.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A persisted output snapshot carried values outside the allowed ranges.
    #[error("Invalid output settings: {0}")]
    InvalidOutput(String),
}

impl PlaybackError {
    /// Returns `true` if the stored value itself is bad, as opposed to the
    /// store being unreachable.
    pub fn is_corrupt_data(&self) -> bool {
        matches!(
            self,
            PlaybackError::Serialization(_) | PlaybackError::InvalidOutput(_)
        )
    }
}

/// Result type for playback persistence operations.
pub type Result<T> = std::result::Result<T, PlaybackError>;

//! # Playback Module
//!
//! The single process-wide audio player.
//!
//! ## Overview
//!
//! This crate handles:
//! - The track model and transport state ([`Track`], [`PlaybackState`])
//! - Imperative transport commands ([`PlaybackEngine`])
//! - The resume snapshot kept in the host settings store
//! - The recurring progress tick and sign-out handling (native runtime)
//!
//! Audio decoding is not done here: the engine drives a host
//! [`MediaElement`](bridge_traits::MediaElement).

pub mod config;
pub mod engine;
pub mod error;
pub mod persistence;
pub mod session;
#[cfg(not(target_arch = "wasm32"))]
pub mod ticker;
pub mod types;

pub use config::PlaybackConfig;
pub use engine::PlaybackEngine;
pub use error::{PlaybackError, Result};
pub use persistence::OutputSettings;
#[cfg(not(target_arch = "wasm32"))]
pub use ticker::ProgressTicker;
pub use types::{LoadStatus, PlaybackRate, PlaybackState, Track, TrackKind};

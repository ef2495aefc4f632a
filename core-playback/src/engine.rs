//! # Playback Engine
//!
//! Owns the single current track and its transport state, drives the platform
//! media element and persists the resume snapshot.
//!
//! ## Overview
//!
//! - Commands take `&self` and never fail: arguments out of range are clamped
//!   or ignored, and commands issued without a track are no-ops.
//! - State lives in a `tokio::sync::watch` channel. Every view subscribes to
//!   the same channel, so all representations of the player stay in sync.
//! - Media-load failures surface only as [`LoadStatus::Failed`] plus a
//!   [`PlaybackEvent::Error`] on the event bus.
//! - Commands are serialized: one that arrives while another is awaiting the
//!   media element runs after it, against the state it left behind.
//!
//! ## Usage
//!
//! ```ignore
//! use core_playback::{PlaybackConfig, PlaybackEngine, Track};
//!
//! let engine = PlaybackEngine::new(media, store, PlaybackConfig::default())
//!     .with_event_bus(bus.clone());
//! engine.restore().await;
//!
//! engine.load(Track::new("ep-12", "Episode 12", "https://cdn.example.com/ep12.mp3")).await;
//! engine.play().await;
//!
//! let mut state = engine.subscribe();
//! while state.changed().await.is_ok() {
//!     render(&state.borrow());
//! }
//! ```

use crate::config::PlaybackConfig;
use crate::persistence::{OutputSettings, PlaybackPersistence};
use crate::types::{LoadStatus, PlaybackRate, PlaybackState, Track};
use bridge_traits::{MediaElement, MediaEvent, SettingsStore};
use core_runtime::events::{CoreEvent, EventBus, PlaybackEvent};
use core_runtime::logging::source_label;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Mutex};
use tracing::{debug, info, instrument, warn};

/// The process-wide player.
pub struct PlaybackEngine {
    media: Arc<dyn MediaElement>,
    persistence: PlaybackPersistence,
    events: Option<EventBus>,
    config: PlaybackConfig,
    state: watch::Sender<PlaybackState>,
    commands: Mutex<()>,
}

impl PlaybackEngine {
    pub fn new(
        media: Arc<dyn MediaElement>,
        store: Arc<dyn SettingsStore>,
        config: PlaybackConfig,
    ) -> Self {
        let persistence =
            PlaybackPersistence::new(store, config.track_key.clone(), config.output_key.clone());
        let (state, _) = watch::channel(PlaybackState::with_volume(config.default_volume));

        Self {
            media,
            persistence,
            events: None,
            config,
            state,
            commands: Mutex::new(()),
        }
    }

    /// Publish lifecycle events on `bus`.
    pub fn with_event_bus(mut self, bus: EventBus) -> Self {
        self.events = Some(bus);
        self
    }

    pub fn config(&self) -> &PlaybackConfig {
        &self.config
    }

    /// Subscribe to state changes.
    pub fn subscribe(&self) -> watch::Receiver<PlaybackState> {
        self.state.subscribe()
    }

    /// Current state.
    pub fn snapshot(&self) -> PlaybackState {
        self.state.borrow().clone()
    }

    pub fn has_track(&self) -> bool {
        self.state.borrow().has_track()
    }

    // ========================================================================
    // Track lifecycle
    // ========================================================================

    /// Replace the current track.
    ///
    /// The previous media resource is released first. Position and duration
    /// reset to 0 and the player is left paused.
    #[instrument(skip(self, track), fields(track_id = %track.id))]
    pub async fn load(&self, track: Track) {
        let _guard = self.commands.lock().await;
        if self.has_track() {
            if let Err(err) = self.media.unload().await {
                warn!(error = %err, "Failed to release previous media resource");
            }
        }

        info!(
            title = %track.title,
            source = source_label(&track.source_url),
            "Loading track"
        );
        self.adopt_track(&track);

        if let Err(err) = self.persistence.save_track(&track).await {
            warn!(error = %err, "Failed to persist current track");
        }

        self.attach_source(&track).await;
    }

    /// Rehydrate the persisted track and output settings.
    ///
    /// The track comes back paused at 0. Missing or unreadable data leaves the
    /// defaults in place.
    pub async fn restore(&self) {
        let _guard = self.commands.lock().await;
        match self.persistence.load_output().await {
            Ok(Some(output)) => match output.validated() {
                Ok((volume, muted, rate)) => {
                    self.state.send_if_modified(|state| {
                        let changed = state.volume != volume
                            || state.is_muted != muted
                            || state.playback_rate != rate;
                        state.volume = volume;
                        state.is_muted = muted;
                        state.playback_rate = rate;
                        changed
                    });
                }
                Err(err) => warn!(error = %err, "Ignoring persisted output settings"),
            },
            Ok(None) => {}
            Err(err) => warn!(error = %err, "Failed to read persisted output settings"),
        }

        let track = match self.persistence.load_track().await {
            Ok(track) => track,
            Err(err) => {
                warn!(error = %err, "Failed to read persisted track");
                None
            }
        };

        match track {
            Some(track) => {
                info!(track_id = %track.id, "Restoring persisted track");
                self.adopt_track(&track);
                self.attach_source(&track).await;
            }
            None => self.apply_output().await,
        }
    }

    /// Clear the track and every transport value back to defaults.
    ///
    /// Both persisted keys are removed.
    pub async fn reset(&self) {
        let _guard = self.commands.lock().await;
        let previous = self.snapshot();

        if previous.has_track() {
            if let Err(err) = self.media.pause().await {
                warn!(error = %err, "Failed to pause media element during reset");
            }
            if let Err(err) = self.media.unload().await {
                warn!(error = %err, "Failed to release media resource during reset");
            }
        }

        let defaults = PlaybackState::with_volume(self.config.default_volume);
        self.state.send_if_modified(|state| {
            if *state == defaults {
                false
            } else {
                *state = defaults;
                true
            }
        });

        self.apply_output().await;

        if let Err(err) = self.persistence.clear().await {
            warn!(error = %err, "Failed to clear persisted playback state");
        }

        if let Some(track) = previous.current_track {
            debug!(track_id = %track.id, "Player reset");
            self.emit(PlaybackEvent::Stopped { track_id: track.id });
        }
    }

    // ========================================================================
    // Transport
    // ========================================================================

    /// Start or resume playback.
    ///
    /// No-op without a track, after a failed load, or while already playing.
    /// At the end of the track playback restarts from 0.
    pub async fn play(&self) {
        let _guard = self.commands.lock().await;
        self.play_locked().await;
    }

    async fn play_locked(&self) {
        let state = self.snapshot();
        let Some(track) = state.current_track.as_ref() else {
            debug!("play ignored: no track loaded");
            return;
        };
        if state.load_status.is_failed() {
            debug!(track_id = %track.id, "play ignored: media failed to load");
            return;
        }
        if state.is_playing {
            return;
        }

        let restart = state.at_end();
        if restart {
            if let Err(err) = self.media.seek(Duration::ZERO).await {
                warn!(error = %err, "Failed to rewind media element");
            }
        }

        if let Err(err) = self.media.play().await {
            warn!(track_id = %track.id, error = %err, "Media element refused to play");
            self.emit(PlaybackEvent::Error {
                track_id: Some(track.id.clone()),
                message: err.to_string(),
                recoverable: true,
            });
            return;
        }

        let mut started_at = None;
        self.state.send_if_modified(|current| {
            if current.track_id() != Some(track.id.as_str()) || current.is_playing {
                return false;
            }
            if restart {
                current.position_seconds = 0.0;
            }
            current.is_playing = true;
            started_at = Some(current.position_seconds);
            true
        });

        match started_at {
            Some(position) if position > 0.0 => self.emit(PlaybackEvent::Resumed {
                track_id: track.id.clone(),
                position_ms: to_millis(position),
            }),
            Some(_) => self.emit(PlaybackEvent::Started {
                track_id: track.id.clone(),
                title: track.title.clone(),
            }),
            None => {}
        }
    }

    /// Pause playback; no-op unless playing.
    pub async fn pause(&self) {
        let _guard = self.commands.lock().await;
        self.pause_locked().await;
    }

    async fn pause_locked(&self) {
        let state = self.snapshot();
        let Some(track_id) = state.track_id().map(str::to_owned) else {
            debug!("pause ignored: no track loaded");
            return;
        };
        if !state.is_playing {
            return;
        }

        if let Err(err) = self.media.pause().await {
            warn!(error = %err, "Failed to pause media element");
        }

        let mut paused_at = None;
        self.state.send_if_modified(|current| {
            if !current.is_playing {
                return false;
            }
            current.is_playing = false;
            paused_at = Some(current.position_seconds);
            true
        });

        if let Some(position) = paused_at {
            self.emit(PlaybackEvent::Paused {
                track_id,
                position_ms: to_millis(position),
            });
        }
    }

    pub async fn toggle_play(&self) {
        let _guard = self.commands.lock().await;
        let playing = self.state.borrow().is_playing;
        if playing {
            self.pause_locked().await;
        } else {
            self.play_locked().await;
        }
    }

    /// Move to `seconds`, clamped to `[0, duration]`.
    ///
    /// `is_playing` is left untouched. NaN targets are ignored.
    pub async fn seek_to(&self, seconds: f64) {
        let _guard = self.commands.lock().await;
        self.seek_locked(seconds).await;
    }

    async fn seek_locked(&self, seconds: f64) {
        if seconds.is_nan() {
            debug!("seek ignored: target is NaN");
            return;
        }

        let mut target = None;
        self.state.send_if_modified(|state| {
            let Some(track_id) = state.track_id().map(str::to_owned) else {
                return false;
            };
            let clamped = seconds.clamp(0.0, state.duration_seconds);
            target = Some((track_id, clamped, state.duration_seconds));
            if state.position_seconds == clamped {
                return false;
            }
            state.position_seconds = clamped;
            true
        });

        let Some((track_id, position, duration)) = target else {
            debug!("seek ignored: no track loaded");
            return;
        };

        if let Err(err) = self.media.seek(Duration::from_secs_f64(position)).await {
            warn!(error = %err, "Failed to seek media element");
        }

        self.emit(PlaybackEvent::PositionChanged {
            track_id,
            position_ms: to_millis(position),
            duration_ms: to_millis(duration),
        });
    }

    /// Seek relative to the current position.
    pub async fn skip(&self, delta_seconds: f64) {
        if delta_seconds.is_nan() {
            return;
        }
        let _guard = self.commands.lock().await;
        let position = self.state.borrow().position_seconds;
        self.seek_locked(position + delta_seconds).await;
    }

    // ========================================================================
    // Output
    // ========================================================================

    /// Set the volume, clamped to `[0, 1]`. Any positive volume unmutes.
    pub async fn set_volume(&self, volume: f64) {
        let _guard = self.commands.lock().await;
        if volume.is_nan() {
            debug!("volume ignored: value is NaN");
            return;
        }
        let volume = volume.clamp(0.0, 1.0);

        let mut unmuted = false;
        let changed = self.state.send_if_modified(|state| {
            if !state.has_track() {
                return false;
            }
            let was_muted = state.is_muted;
            if volume > 0.0 {
                state.is_muted = false;
            }
            unmuted = was_muted && !state.is_muted;
            let changed = state.volume != volume || unmuted;
            state.volume = volume;
            changed
        });
        if !changed {
            return;
        }

        if let Err(err) = self.media.set_volume(volume as f32).await {
            warn!(error = %err, "Failed to apply volume");
        }
        if unmuted {
            if let Err(err) = self.media.set_muted(false).await {
                warn!(error = %err, "Failed to unmute media element");
            }
        }
        self.output_changed().await;
    }

    /// Flip mute; the stored volume is kept.
    pub async fn toggle_mute(&self) {
        let _guard = self.commands.lock().await;
        let mut muted = None;
        self.state.send_if_modified(|state| {
            if !state.has_track() {
                return false;
            }
            state.is_muted = !state.is_muted;
            muted = Some(state.is_muted);
            true
        });
        let Some(muted) = muted else {
            return;
        };

        if let Err(err) = self.media.set_muted(muted).await {
            warn!(error = %err, "Failed to apply mute");
        }
        self.output_changed().await;
    }

    /// Change speed; values outside the enumerated set are ignored.
    pub async fn set_playback_rate(&self, rate: f64) {
        let _guard = self.commands.lock().await;
        let Some(rate) = PlaybackRate::from_f64(rate) else {
            debug!(rate, "playback rate ignored: not a supported speed");
            return;
        };

        let changed = self.state.send_if_modified(|state| {
            if !state.has_track() || state.playback_rate == rate {
                return false;
            }
            state.playback_rate = rate;
            true
        });
        if !changed {
            return;
        }

        if let Err(err) = self.media.set_playback_rate(rate.as_f64() as f32).await {
            warn!(error = %err, "Failed to apply playback rate");
        }
        self.output_changed().await;
    }

    // ========================================================================
    // Progress and media notifications
    // ========================================================================

    /// Advance the position by `elapsed` scaled by the playback rate.
    ///
    /// Only while playing with a known duration. Reaching the duration stops
    /// playback and holds the position there.
    pub fn advance(&self, elapsed: Duration) {
        if elapsed.is_zero() {
            return;
        }

        let mut outcome = None;
        self.state.send_if_modified(|state| {
            if !state.is_playing || state.duration_seconds <= 0.0 {
                return false;
            }
            let Some(track_id) = state.track_id().map(str::to_owned) else {
                return false;
            };

            let next = state.position_seconds + elapsed.as_secs_f64() * state.playback_rate.as_f64();
            let completed = next >= state.duration_seconds;
            state.position_seconds = next.min(state.duration_seconds);
            if completed {
                state.is_playing = false;
            }
            outcome = Some((track_id, state.position_seconds, state.duration_seconds, completed));
            true
        });

        match outcome {
            Some((track_id, _, _, true)) => {
                debug!(track_id = %track_id, "Track reached its end");
                self.emit(PlaybackEvent::Completed { track_id });
            }
            Some((track_id, position, duration, false)) if self.config.emit_position_events => {
                self.emit(PlaybackEvent::PositionChanged {
                    track_id,
                    position_ms: to_millis(position),
                    duration_ms: to_millis(duration),
                });
            }
            _ => {}
        }
    }

    /// Apply a notification reported by the media element.
    ///
    /// Notifications arriving without a track are dropped.
    pub fn handle_media_event(&self, event: MediaEvent) {
        match event {
            MediaEvent::MetadataLoaded { duration } => {
                let duration = duration.as_secs_f64();
                let updated = self.state.send_if_modified(|state| {
                    if !state.has_track() || state.load_status.is_failed() {
                        return false;
                    }
                    state.duration_seconds = duration;
                    state.position_seconds = state.position_seconds.min(duration);
                    state.load_status = LoadStatus::Ready;
                    true
                });
                if updated {
                    debug!(duration_seconds = duration, "Media metadata loaded");
                }
            }
            MediaEvent::TimeUpdate { position } => {
                let position = position.as_secs_f64();
                self.state.send_if_modified(|state| {
                    if !state.has_track() || state.duration_seconds <= 0.0 {
                        return false;
                    }
                    let position = position.min(state.duration_seconds);
                    if state.position_seconds == position {
                        return false;
                    }
                    state.position_seconds = position;
                    true
                });
            }
            MediaEvent::Ended => {
                let mut completed = None;
                self.state.send_if_modified(|state| {
                    let Some(track_id) = state.track_id().map(str::to_owned) else {
                        return false;
                    };
                    if !state.is_playing && state.at_end() {
                        return false;
                    }
                    state.is_playing = false;
                    state.position_seconds = state.duration_seconds;
                    completed = Some(track_id);
                    true
                });
                if let Some(track_id) = completed {
                    self.emit(PlaybackEvent::Completed { track_id });
                }
            }
            MediaEvent::Failed { message } => {
                let track_id = self.state.borrow().track_id().map(str::to_owned);
                if let Some(track_id) = track_id {
                    self.fail_load(&track_id, message);
                }
            }
        }
    }

    // ========================================================================
    // Internals
    // ========================================================================

    fn adopt_track(&self, track: &Track) {
        self.state.send_modify(|state| {
            state.current_track = Some(track.clone());
            state.is_playing = false;
            state.position_seconds = 0.0;
            state.duration_seconds = 0.0;
            state.load_status = LoadStatus::Loading;
        });
        self.emit(PlaybackEvent::TrackLoaded {
            track_id: track.id.clone(),
            title: track.title.clone(),
        });
    }

    async fn attach_source(&self, track: &Track) {
        if !track.has_source() {
            self.fail_load(&track.id, "Track has no media source".to_string());
            return;
        }

        match self.media.load(&track.source_url).await {
            Ok(()) => self.apply_output().await,
            Err(err) => self.fail_load(&track.id, err.to_string()),
        }
    }

    /// Marks the load attempt for `track_id` as failed, unless another track
    /// replaced it in the meantime.
    fn fail_load(&self, track_id: &str, message: String) {
        let failed = self.state.send_if_modified(|state| {
            if state.track_id() != Some(track_id) {
                return false;
            }
            state.is_playing = false;
            state.load_status = LoadStatus::Failed {
                message: message.clone(),
            };
            true
        });

        if failed {
            warn!(track_id, message = %message, "Media failed to load");
            self.emit(PlaybackEvent::Error {
                track_id: Some(track_id.to_string()),
                message,
                recoverable: false,
            });
        }
    }

    /// Push volume, mute and rate to the media element.
    async fn apply_output(&self) {
        let (volume, muted, rate) = {
            let state = self.state.borrow();
            (state.volume, state.is_muted, state.playback_rate)
        };

        if let Err(err) = self.media.set_volume(volume as f32).await {
            warn!(error = %err, "Failed to apply volume");
        }
        if let Err(err) = self.media.set_muted(muted).await {
            warn!(error = %err, "Failed to apply mute");
        }
        if let Err(err) = self.media.set_playback_rate(rate.as_f64() as f32).await {
            warn!(error = %err, "Failed to apply playback rate");
        }
    }

    async fn output_changed(&self) {
        let (output, audible) = {
            let state = self.state.borrow();
            (OutputSettings::from_state(&state), state.effective_volume())
        };
        debug!(volume = output.volume, audible, rate = output.rate, "Output changed");
        if let Err(err) = self.persistence.save_output(output).await {
            warn!(error = %err, "Failed to persist output settings");
        }
        self.emit(PlaybackEvent::OutputChanged {
            volume: output.volume,
            muted: output.muted,
            rate: output.rate,
        });
    }

    fn emit(&self, event: PlaybackEvent) {
        if let Some(bus) = &self.events {
            // Nobody listening is fine.
            let _ = bus.emit(CoreEvent::Playback(event));
        }
    }
}

fn to_millis(seconds: f64) -> u64 {
    (seconds * 1000.0).round() as u64
}

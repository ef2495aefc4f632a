//! Behavioural tests for the playback engine
//!
//! This suite verifies:
//! - Transport commands and their no-op rules
//! - Clamping of volume, seek and rate arguments
//! - Media-element notifications and load failures
//! - Persistence of the resume snapshot and restore after reload
//! - Sign-out handling over the event bus
//! - Commands overlapping a pending media-element call

use async_trait::async_trait;
use bridge_traits::error::Result as BridgeResult;
use bridge_traits::{BridgeError, MediaElement, MediaEvent, MemorySettingsStore, SettingsStore};
use core_playback::session::spawn_session_listener;
use core_playback::{LoadStatus, PlaybackConfig, PlaybackEngine, PlaybackRate, Track, TrackKind};
use core_runtime::events::{CoreEvent, DisplayEvent, EventBus, PlaybackEvent, SessionEvent};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;

// ============================================================================
// Test doubles
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
enum MediaCall {
    Load(String),
    Play,
    Pause,
    Seek(Duration),
    Volume(f32),
    Muted(bool),
    Rate(f32),
    Unload,
}

/// Media element that records every call and can be told to fail.
#[derive(Default)]
struct RecordingMedia {
    calls: Mutex<Vec<MediaCall>>,
    fail_load: Mutex<bool>,
    reject_play: Mutex<bool>,
}

impl RecordingMedia {
    fn calls(&self) -> Vec<MediaCall> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: MediaCall) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl MediaElement for RecordingMedia {
    async fn load(&self, url: &str) -> BridgeResult<()> {
        self.record(MediaCall::Load(url.to_string()));
        if *self.fail_load.lock().unwrap() {
            return Err(BridgeError::OperationFailed("404 Not Found".to_string()));
        }
        Ok(())
    }

    async fn play(&self) -> BridgeResult<()> {
        self.record(MediaCall::Play);
        if *self.reject_play.lock().unwrap() {
            return Err(BridgeError::MediaRejected("autoplay blocked".to_string()));
        }
        Ok(())
    }

    async fn pause(&self) -> BridgeResult<()> {
        self.record(MediaCall::Pause);
        Ok(())
    }

    async fn seek(&self, position: Duration) -> BridgeResult<()> {
        self.record(MediaCall::Seek(position));
        Ok(())
    }

    async fn set_volume(&self, volume: f32) -> BridgeResult<()> {
        self.record(MediaCall::Volume(volume));
        Ok(())
    }

    async fn set_muted(&self, muted: bool) -> BridgeResult<()> {
        self.record(MediaCall::Muted(muted));
        Ok(())
    }

    async fn set_playback_rate(&self, rate: f32) -> BridgeResult<()> {
        self.record(MediaCall::Rate(rate));
        Ok(())
    }

    async fn unload(&self) -> BridgeResult<()> {
        self.record(MediaCall::Unload);
        Ok(())
    }
}

/// Settings store whose every operation fails.
struct FailingStore;

#[async_trait]
impl SettingsStore for FailingStore {
    async fn set_string(&self, _key: &str, _value: &str) -> BridgeResult<()> {
        Err(BridgeError::NotAvailable("storage disabled".to_string()))
    }

    async fn get_string(&self, _key: &str) -> BridgeResult<Option<String>> {
        Err(BridgeError::NotAvailable("storage disabled".to_string()))
    }

    async fn delete(&self, _key: &str) -> BridgeResult<()> {
        Err(BridgeError::NotAvailable("storage disabled".to_string()))
    }

    async fn list_keys(&self) -> BridgeResult<Vec<String>> {
        Err(BridgeError::NotAvailable("storage disabled".to_string()))
    }

    async fn clear_all(&self) -> BridgeResult<()> {
        Err(BridgeError::NotAvailable("storage disabled".to_string()))
    }
}

/// Media element whose `play` stays pending until the gate opens.
#[derive(Default)]
struct GatedMedia {
    calls: Mutex<Vec<MediaCall>>,
    play_started: Mutex<bool>,
    gate: Notify,
}

impl GatedMedia {
    fn calls(&self) -> Vec<MediaCall> {
        self.calls.lock().unwrap().clone()
    }

    fn play_pending(&self) -> bool {
        *self.play_started.lock().unwrap()
    }

    fn open(&self) {
        self.gate.notify_one();
    }
}

#[async_trait]
impl MediaElement for GatedMedia {
    async fn load(&self, url: &str) -> BridgeResult<()> {
        self.calls.lock().unwrap().push(MediaCall::Load(url.to_string()));
        Ok(())
    }

    async fn play(&self) -> BridgeResult<()> {
        *self.play_started.lock().unwrap() = true;
        self.gate.notified().await;
        self.calls.lock().unwrap().push(MediaCall::Play);
        Ok(())
    }

    async fn pause(&self) -> BridgeResult<()> {
        self.calls.lock().unwrap().push(MediaCall::Pause);
        Ok(())
    }

    async fn seek(&self, position: Duration) -> BridgeResult<()> {
        self.calls.lock().unwrap().push(MediaCall::Seek(position));
        Ok(())
    }

    async fn set_volume(&self, _volume: f32) -> BridgeResult<()> {
        Ok(())
    }

    async fn set_muted(&self, _muted: bool) -> BridgeResult<()> {
        Ok(())
    }

    async fn set_playback_rate(&self, _rate: f32) -> BridgeResult<()> {
        Ok(())
    }

    async fn unload(&self) -> BridgeResult<()> {
        self.calls.lock().unwrap().push(MediaCall::Unload);
        Ok(())
    }
}

struct Harness {
    engine: Arc<PlaybackEngine>,
    media: Arc<RecordingMedia>,
    store: Arc<MemorySettingsStore>,
    bus: EventBus,
}

fn harness_with_store(store: Arc<MemorySettingsStore>) -> Harness {
    let media = Arc::new(RecordingMedia::default());
    let bus = EventBus::new(64);
    let engine = PlaybackEngine::new(media.clone(), store.clone(), PlaybackConfig::default())
        .with_event_bus(bus.clone());

    Harness {
        engine: Arc::new(engine),
        media,
        store,
        bus,
    }
}

fn harness() -> Harness {
    harness_with_store(Arc::new(MemorySettingsStore::new()))
}

fn episode(id: &str) -> Track {
    Track::new(id, format!("Episode {id}"), format!("https://cdn.example.com/{id}.mp3"))
        .with_artist("The Reading Room")
        .with_image(format!("https://cdn.example.com/{id}.jpg"))
        .with_kind("official")
}

/// Loads `track` and reports a duration, leaving the engine paused at 0.
async fn loaded(h: &Harness, track: Track, duration_secs: u64) {
    h.engine.load(track).await;
    h.engine.handle_media_event(MediaEvent::MetadataLoaded {
        duration: Duration::from_secs(duration_secs),
    });
}

fn playback_events(receiver: &mut tokio::sync::broadcast::Receiver<CoreEvent>) -> Vec<PlaybackEvent> {
    let mut events = Vec::new();
    while let Ok(event) = receiver.try_recv() {
        if let CoreEvent::Playback(event) = event {
            events.push(event);
        }
    }
    events
}

// ============================================================================
// Loading
// ============================================================================

#[tokio::test]
async fn test_load_resets_transport_and_leaves_player_paused() {
    let h = harness();
    loaded(&h, episode("a"), 300).await;
    h.engine.play().await;
    h.engine.seek_to(120.0).await;

    h.engine.load(episode("b")).await;

    let state = h.engine.snapshot();
    assert_eq!(state.track_id(), Some("b"));
    assert!(!state.is_playing);
    assert_eq!(state.position_seconds, 0.0);
    assert_eq!(state.duration_seconds, 0.0);
    assert_eq!(state.load_status, LoadStatus::Loading);
}

#[tokio::test]
async fn test_load_persists_track_json() {
    let h = harness();
    h.engine.load(episode("a")).await;

    let raw = h.store.get_string("current-track").await.unwrap().unwrap();
    let stored: Track = serde_json::from_str(&raw).unwrap();
    assert_eq!(stored, episode("a"));
    assert_eq!(stored.kind, TrackKind::Official);
}

#[tokio::test]
async fn test_metadata_marks_track_ready() {
    let h = harness();
    loaded(&h, episode("a"), 42).await;

    let state = h.engine.snapshot();
    assert_eq!(state.duration_seconds, 42.0);
    assert_eq!(state.load_status, LoadStatus::Ready);
}

#[tokio::test]
async fn test_bridge_load_failure_sets_failed_status() {
    let h = harness();
    *h.media.fail_load.lock().unwrap() = true;
    let mut events = h.bus.subscribe();

    h.engine.load(episode("broken")).await;

    let state = h.engine.snapshot();
    assert!(matches!(state.load_status, LoadStatus::Failed { ref message } if message.contains("404")));
    assert_eq!(state.track_id(), Some("broken"));

    let error = playback_events(&mut events)
        .into_iter()
        .find(|event| matches!(event, PlaybackEvent::Error { .. }));
    assert_eq!(
        error,
        Some(PlaybackEvent::Error {
            track_id: Some("broken".to_string()),
            message: "Bridge operation failed: 404 Not Found".to_string(),
            recoverable: false,
        })
    );
}

#[tokio::test]
async fn test_empty_source_fails_without_touching_media() {
    let h = harness();
    h.engine
        .load(Track::new("silent", "No audio", ""))
        .await;

    assert!(h.engine.snapshot().load_status.is_failed());
    assert!(!h
        .media
        .calls()
        .iter()
        .any(|call| matches!(call, MediaCall::Load(_))));
}

#[tokio::test]
async fn test_failed_media_event_stops_playback() {
    let h = harness();
    loaded(&h, episode("a"), 100).await;
    h.engine.play().await;

    h.engine.handle_media_event(MediaEvent::Failed {
        message: "decode error".to_string(),
    });

    let state = h.engine.snapshot();
    assert!(!state.is_playing);
    assert_eq!(
        state.load_status,
        LoadStatus::Failed {
            message: "decode error".to_string()
        }
    );

    // Terminal for this load attempt: play does nothing until the next load.
    h.engine.play().await;
    assert!(!h.engine.snapshot().is_playing);

    loaded(&h, episode("b"), 100).await;
    h.engine.play().await;
    assert!(h.engine.snapshot().is_playing);
}

// ============================================================================
// Transport
// ============================================================================

#[tokio::test]
async fn test_commands_without_track_are_noops() {
    let h = harness();
    let before = h.engine.snapshot();

    h.engine.play().await;
    h.engine.pause().await;
    h.engine.toggle_play().await;
    h.engine.seek_to(30.0).await;
    h.engine.skip(15.0).await;
    h.engine.set_volume(0.3).await;
    h.engine.toggle_mute().await;
    h.engine.set_playback_rate(1.5).await;
    h.engine.advance(Duration::from_secs(5));
    h.engine.handle_media_event(MediaEvent::Ended);

    assert_eq!(h.engine.snapshot(), before);
    assert!(h.media.calls().is_empty());
}

#[tokio::test]
async fn test_play_and_pause_are_idempotent() {
    let h = harness();
    loaded(&h, episode("a"), 100).await;

    h.engine.play().await;
    h.engine.play().await;
    assert!(h.engine.snapshot().is_playing);
    let plays = h
        .media
        .calls()
        .iter()
        .filter(|call| **call == MediaCall::Play)
        .count();
    assert_eq!(plays, 1);

    h.engine.pause().await;
    h.engine.pause().await;
    assert!(!h.engine.snapshot().is_playing);
}

#[tokio::test]
async fn test_toggle_play_follows_parity() {
    let h = harness();
    loaded(&h, episode("a"), 100).await;

    for toggles in 1..=5 {
        h.engine.toggle_play().await;
        assert_eq!(h.engine.snapshot().is_playing, toggles % 2 == 1);
    }
}

#[tokio::test]
async fn test_rejected_play_keeps_player_paused() {
    let h = harness();
    loaded(&h, episode("a"), 100).await;
    *h.media.reject_play.lock().unwrap() = true;
    let mut events = h.bus.subscribe();

    h.engine.play().await;

    assert!(!h.engine.snapshot().is_playing);
    assert!(playback_events(&mut events).iter().any(|event| matches!(
        event,
        PlaybackEvent::Error {
            recoverable: true,
            ..
        }
    )));
}

#[tokio::test]
async fn test_play_emits_started_then_resumed() {
    let h = harness();
    loaded(&h, episode("a"), 100).await;
    let mut events = h.bus.subscribe();

    h.engine.play().await;
    h.engine.advance(Duration::from_secs(10));
    h.engine.pause().await;
    h.engine.play().await;

    let events = playback_events(&mut events);
    assert_eq!(
        events,
        vec![
            PlaybackEvent::Started {
                track_id: "a".to_string(),
                title: "Episode a".to_string(),
            },
            PlaybackEvent::Paused {
                track_id: "a".to_string(),
                position_ms: 10_000,
            },
            PlaybackEvent::Resumed {
                track_id: "a".to_string(),
                position_ms: 10_000,
            },
        ]
    );
}

#[tokio::test]
async fn test_seek_clamps_to_track_bounds() {
    let h = harness();
    loaded(&h, episode("a"), 200).await;

    for (target, expected) in [
        (50.0, 50.0),
        (-10.0, 0.0),
        (500.0, 200.0),
        (200.0, 200.0),
        (f64::INFINITY, 200.0),
    ] {
        h.engine.seek_to(target).await;
        assert_eq!(h.engine.snapshot().position_seconds, expected, "target {target}");
    }

    h.engine.seek_to(f64::NAN).await;
    assert_eq!(h.engine.snapshot().position_seconds, 200.0);
}

#[tokio::test]
async fn test_seek_does_not_change_playing_flag() {
    let h = harness();
    loaded(&h, episode("a"), 200).await;

    h.engine.seek_to(20.0).await;
    assert!(!h.engine.snapshot().is_playing);

    h.engine.play().await;
    h.engine.seek_to(80.0).await;
    assert!(h.engine.snapshot().is_playing);
    assert!(h
        .media
        .calls()
        .contains(&MediaCall::Seek(Duration::from_secs(80))));
}

#[tokio::test]
async fn test_skip_is_relative_and_clamped() {
    let h = harness();
    loaded(&h, episode("a"), 60).await;

    h.engine.skip(15.0).await;
    assert_eq!(h.engine.snapshot().position_seconds, 15.0);
    h.engine.skip(-30.0).await;
    assert_eq!(h.engine.snapshot().position_seconds, 0.0);
    h.engine.skip(90.0).await;
    assert_eq!(h.engine.snapshot().position_seconds, 60.0);
}

#[tokio::test]
async fn test_advance_stops_at_end_without_looping() {
    let h = harness();
    loaded(&h, episode("a"), 30).await;
    h.engine.play().await;
    let mut events = h.bus.subscribe();

    h.engine.advance(Duration::from_secs(20));
    assert_eq!(h.engine.snapshot().position_seconds, 20.0);

    h.engine.advance(Duration::from_secs(20));
    let state = h.engine.snapshot();
    assert!(!state.is_playing);
    assert_eq!(state.position_seconds, 30.0);

    h.engine.advance(Duration::from_secs(20));
    assert_eq!(h.engine.snapshot().position_seconds, 30.0);

    // A late `ended` notification does not announce completion twice.
    h.engine.handle_media_event(MediaEvent::Ended);

    let completions = playback_events(&mut events)
        .into_iter()
        .filter(|event| matches!(event, PlaybackEvent::Completed { .. }))
        .count();
    assert_eq!(completions, 1);
}

#[tokio::test]
async fn test_time_update_is_authoritative_and_clamped() {
    let h = harness();
    h.engine.load(episode("a")).await;

    // Unknown duration: nothing to clamp against yet.
    h.engine.handle_media_event(MediaEvent::TimeUpdate {
        position: Duration::from_secs(5),
    });
    assert_eq!(h.engine.snapshot().position_seconds, 0.0);

    h.engine.handle_media_event(MediaEvent::MetadataLoaded {
        duration: Duration::from_secs(100),
    });
    h.engine.handle_media_event(MediaEvent::TimeUpdate {
        position: Duration::from_millis(12_500),
    });
    assert_eq!(h.engine.snapshot().position_seconds, 12.5);

    h.engine.handle_media_event(MediaEvent::TimeUpdate {
        position: Duration::from_secs(150),
    });
    assert_eq!(h.engine.snapshot().position_seconds, 100.0);
}

// ============================================================================
// Output
// ============================================================================

#[tokio::test]
async fn test_set_volume_clamps_and_unmutes() {
    let h = harness();
    loaded(&h, episode("a"), 100).await;

    for (input, expected) in [(0.5, 0.5), (1.7, 1.0), (-0.2, 0.0), (0.0, 0.0)] {
        h.engine.set_volume(input).await;
        assert_eq!(h.engine.snapshot().volume, expected);
    }

    h.engine.toggle_mute().await;
    assert!(h.engine.snapshot().is_muted);
    h.engine.set_volume(0.0).await;
    assert!(h.engine.snapshot().is_muted, "zero volume keeps mute");

    h.engine.set_volume(0.25).await;
    let state = h.engine.snapshot();
    assert!(!state.is_muted);
    assert_eq!(state.volume, 0.25);
    assert!(h.media.calls().contains(&MediaCall::Muted(false)));

    h.engine.set_volume(f64::NAN).await;
    assert_eq!(h.engine.snapshot().volume, 0.25);
}

#[tokio::test]
async fn test_toggle_mute_keeps_volume() {
    let h = harness();
    loaded(&h, episode("a"), 100).await;
    h.engine.set_volume(0.6).await;

    h.engine.toggle_mute().await;
    let muted = h.engine.snapshot();
    assert!(muted.is_muted);
    assert_eq!(muted.volume, 0.6);
    assert_eq!(muted.effective_volume(), 0.0);

    h.engine.toggle_mute().await;
    assert!(!h.engine.snapshot().is_muted);
    assert_eq!(h.engine.snapshot().volume, 0.6);
}

#[tokio::test]
async fn test_unsupported_playback_rate_is_ignored() {
    let h = harness();
    loaded(&h, episode("a"), 100).await;

    h.engine.set_playback_rate(1.25).await;
    assert_eq!(h.engine.snapshot().playback_rate, PlaybackRate::OneAndQuarter);

    h.engine.set_playback_rate(1.33).await;
    assert_eq!(h.engine.snapshot().playback_rate, PlaybackRate::OneAndQuarter);
    assert!(!h.media.calls().contains(&MediaCall::Rate(1.33)));
}

#[tokio::test]
async fn test_output_changes_are_persisted() {
    let h = harness();
    loaded(&h, episode("a"), 100).await;

    h.engine.set_volume(0.4).await;
    h.engine.toggle_mute().await;
    h.engine.set_playback_rate(1.5).await;

    let raw = h.store.get_string("playback-state").await.unwrap().unwrap();
    let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(
        json,
        serde_json::json!({"volume": 0.4, "muted": true, "rate": 1.5})
    );
}

// ============================================================================
// Reset and restore
// ============================================================================

#[tokio::test]
async fn test_reset_restores_defaults_and_clears_storage() {
    let h = harness();
    loaded(&h, episode("a"), 100).await;
    h.engine.play().await;
    h.engine.seek_to(40.0).await;
    h.engine.set_volume(0.2).await;
    h.engine.set_playback_rate(2.0).await;
    let mut events = h.bus.subscribe();

    h.engine.reset().await;

    let state = h.engine.snapshot();
    assert!(state.current_track.is_none());
    assert!(!state.is_playing);
    assert_eq!(state.position_seconds, 0.0);
    assert_eq!(state.volume, 1.0);
    assert_eq!(state.playback_rate, PlaybackRate::Normal);
    assert_eq!(state.load_status, LoadStatus::Idle);
    assert!(h.store.list_keys().await.unwrap().is_empty());
    assert!(h.media.calls().ends_with(&[
        MediaCall::Pause,
        MediaCall::Unload,
        MediaCall::Volume(1.0),
        MediaCall::Muted(false),
        MediaCall::Rate(1.0),
    ]));
    assert_eq!(
        playback_events(&mut events),
        vec![PlaybackEvent::Stopped {
            track_id: "a".to_string()
        }]
    );

    // Idempotent on an empty player.
    h.engine.reset().await;
    assert!(h.engine.snapshot().current_track.is_none());
}

#[tokio::test]
async fn test_restore_after_reload() {
    let store = Arc::new(MemorySettingsStore::new());
    {
        let first = harness_with_store(store.clone());
        loaded(&first, episode("a"), 100).await;
        first.engine.play().await;
        first.engine.seek_to(55.0).await;
        first.engine.set_volume(0.7).await;
        first.engine.set_playback_rate(0.75).await;
    }

    let second = harness_with_store(store);
    second.engine.restore().await;

    let state = second.engine.snapshot();
    assert_eq!(state.current_track, Some(episode("a")));
    assert!(!state.is_playing);
    assert_eq!(state.position_seconds, 0.0);
    assert_eq!(state.volume, 0.7);
    assert_eq!(state.playback_rate, PlaybackRate::ThreeQuarters);
    assert_eq!(state.load_status, LoadStatus::Loading);
    assert_eq!(
        second.media.calls().first(),
        Some(&MediaCall::Load("https://cdn.example.com/a.mp3".to_string()))
    );
}

#[tokio::test]
async fn test_restore_with_corrupt_data_uses_defaults() {
    let store = Arc::new(MemorySettingsStore::with_entries([
        ("current-track", "{\"id\": 7"),
        ("playback-state", r#"{"volume": 4.0, "muted": false, "rate": 1.0}"#),
    ]));
    let h = harness_with_store(store);

    h.engine.restore().await;

    let state = h.engine.snapshot();
    assert!(state.current_track.is_none());
    assert_eq!(state.volume, 1.0);
    assert_eq!(state.load_status, LoadStatus::Idle);
}

#[tokio::test]
async fn test_unavailable_storage_never_surfaces() {
    let media = Arc::new(RecordingMedia::default());
    let engine = PlaybackEngine::new(media.clone(), Arc::new(FailingStore), PlaybackConfig::default());

    engine.restore().await;
    engine.load(episode("a")).await;
    engine.set_volume(0.5).await;
    engine.play().await;
    engine.reset().await;

    assert!(engine.snapshot().current_track.is_none());
    assert!(media.calls().contains(&MediaCall::Play));
}

// ============================================================================
// Observers and session
// ============================================================================

#[tokio::test]
async fn test_subscribers_observe_changes() {
    let h = harness();
    let mut first = h.engine.subscribe();
    let mut second = h.engine.subscribe();

    loaded(&h, episode("a"), 100).await;
    h.engine.play().await;

    assert!(first.has_changed().unwrap());
    assert!(second.has_changed().unwrap());
    assert!(first.borrow_and_update().is_playing);
    assert_eq!(second.borrow_and_update().track_id(), Some("a"));
}

#[tokio::test]
async fn test_sign_out_resets_player() {
    let h = harness();
    loaded(&h, episode("a"), 100).await;
    h.engine.play().await;

    let cancel = CancellationToken::new();
    let listener = spawn_session_listener(h.engine.clone(), &h.bus, cancel.clone());
    let mut state = h.engine.subscribe();

    h.bus
        .emit(CoreEvent::Session(SessionEvent::SignedOut {
            profile_id: "reader-1".to_string(),
        }))
        .unwrap();

    tokio::time::timeout(
        Duration::from_secs(1),
        state.wait_for(|state| state.current_track.is_none()),
    )
    .await
    .expect("reset within timeout")
    .unwrap();

    cancel.cancel();
    listener.await.unwrap();
}

#[tokio::test]
async fn test_non_session_events_do_not_touch_player() {
    let h = harness();
    loaded(&h, episode("a"), 100).await;

    let cancel = CancellationToken::new();
    let listener = spawn_session_listener(h.engine.clone(), &h.bus, cancel.clone());
    h.bus
        .emit(CoreEvent::Display(DisplayEvent::ModeChanged {
            mode: "collapsed".to_string(),
            manual_override: true,
        }))
        .unwrap();
    tokio::task::yield_now().await;

    cancel.cancel();
    listener.await.unwrap();
    assert_eq!(h.engine.snapshot().track_id(), Some("a"));
}

// ============================================================================
// Overlapping commands
// ============================================================================

fn gated_engine() -> (Arc<PlaybackEngine>, Arc<GatedMedia>) {
    let media = Arc::new(GatedMedia::default());
    let engine = PlaybackEngine::new(
        media.clone(),
        Arc::new(MemorySettingsStore::new()),
        PlaybackConfig::default(),
    );
    (Arc::new(engine), media)
}

async fn settle() {
    for _ in 0..8 {
        tokio::task::yield_now().await;
    }
}

#[tokio::test]
async fn test_pause_while_play_is_pending_leaves_player_paused() {
    let (engine, media) = gated_engine();
    engine.load(episode("a")).await;
    engine.handle_media_event(MediaEvent::MetadataLoaded {
        duration: Duration::from_secs(100),
    });

    let play = tokio::spawn({
        let engine = engine.clone();
        async move { engine.play().await }
    });
    settle().await;
    assert!(media.play_pending());

    let pause = tokio::spawn({
        let engine = engine.clone();
        async move { engine.pause().await }
    });
    settle().await;
    assert!(!engine.snapshot().is_playing);

    media.open();
    play.await.unwrap();
    pause.await.unwrap();

    assert!(!engine.snapshot().is_playing);
    assert_eq!(
        media.calls(),
        vec![
            MediaCall::Load("https://cdn.example.com/a.mp3".to_string()),
            MediaCall::Play,
            MediaCall::Pause,
        ]
    );
}

#[tokio::test]
async fn test_load_while_play_is_pending_leaves_new_track_paused() {
    let (engine, media) = gated_engine();
    engine.load(episode("a")).await;
    engine.handle_media_event(MediaEvent::MetadataLoaded {
        duration: Duration::from_secs(100),
    });

    let play = tokio::spawn({
        let engine = engine.clone();
        async move { engine.play().await }
    });
    settle().await;
    assert!(media.play_pending());

    let load = tokio::spawn({
        let engine = engine.clone();
        async move { engine.load(episode("b")).await }
    });
    settle().await;
    assert_eq!(engine.snapshot().track_id(), Some("a"));

    media.open();
    play.await.unwrap();
    load.await.unwrap();

    let state = engine.snapshot();
    assert_eq!(state.track_id(), Some("b"));
    assert!(!state.is_playing);
    assert_eq!(state.position_seconds, 0.0);
    assert_eq!(state.load_status, LoadStatus::Loading);
    assert_eq!(
        media.calls(),
        vec![
            MediaCall::Load("https://cdn.example.com/a.mp3".to_string()),
            MediaCall::Play,
            MediaCall::Unload,
            MediaCall::Load("https://cdn.example.com/b.mp3".to_string()),
        ]
    );
}

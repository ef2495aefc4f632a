//! The composition root handed to the view layer.

use std::sync::Arc;

use bridge_traits::MediaEvent;
use core_display::{DisplayMode, DisplayModeController, DisplayState, RouteClassifier};
use core_playback::{PlaybackConfig, PlaybackEngine, PlaybackState, Track};
use core_runtime::config::CoreConfig;
use core_runtime::events::{CoreEvent, EventBus};
use futures::{Stream, StreamExt};
use tokio::sync::{broadcast, watch};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument};

use crate::error::{CoreError, Result};

/// One playback engine and one display controller sharing an event bus.
///
/// Views read state through [`playback`](Self::playback) and
/// [`display`](Self::display) subscriptions and send commands back through
/// the engine, the controller, or the few façade methods that touch both.
pub struct PlayerService {
    engine: Arc<PlaybackEngine>,
    display: Arc<DisplayModeController>,
    events: EventBus,
    cancel: CancellationToken,
    #[cfg(not(target_arch = "wasm32"))]
    ticker: Option<core_playback::ProgressTicker>,
    #[cfg(not(target_arch = "wasm32"))]
    tasks: Vec<tokio::task::JoinHandle<()>>,
}

impl PlayerService {
    /// Build both components from `config` and start on `initial_path`.
    ///
    /// Restores the persisted track and output settings, reads the stored
    /// display mode, and starts the background tasks: the progress ticker
    /// (native only; browsers report progress through media events) and the
    /// sign-out listener.
    #[instrument(skip(config), fields(path = %initial_path))]
    pub async fn bootstrap(config: CoreConfig, initial_path: &str) -> Result<Self> {
        let playback_config = PlaybackConfig::from(&config.player);
        playback_config
            .validate()
            .map_err(CoreError::InitializationFailed)?;

        let engine = Arc::new(
            PlaybackEngine::new(
                config.media_element.clone(),
                config.settings_store.clone(),
                playback_config,
            )
            .with_event_bus(config.event_bus.clone()),
        );
        engine.restore().await;

        let display = Arc::new(
            DisplayModeController::bootstrap(
                config.settings_store.clone(),
                RouteClassifier::new(&config.routes),
                config.player.storage_keys.display_mode.clone(),
                initial_path,
            )
            .await
            .with_event_bus(config.event_bus.clone()),
        );

        let cancel = CancellationToken::new();

        #[cfg(not(target_arch = "wasm32"))]
        let service = {
            let ticker = core_playback::ProgressTicker::spawn(
                engine.clone(),
                config.clock.clone(),
                engine.config().progress_interval(),
            );
            let session = core_playback::session::spawn_session_listener(
                engine.clone(),
                &config.event_bus,
                cancel.child_token(),
            );

            Self {
                engine,
                display,
                events: config.event_bus,
                cancel,
                ticker: Some(ticker),
                tasks: vec![session],
            }
        };

        #[cfg(target_arch = "wasm32")]
        let service = {
            wasm_bindgen_futures::spawn_local(core_playback::session::run_session_listener(
                engine.clone(),
                config.event_bus.subscribe(),
                cancel.child_token(),
            ));

            Self {
                engine,
                display,
                events: config.event_bus,
                cancel,
            }
        };

        info!(
            has_track = service.engine.has_track(),
            mode = %service.display.mode(),
            "Player ready"
        );
        Ok(service)
    }

    pub fn engine(&self) -> &Arc<PlaybackEngine> {
        &self.engine
    }

    pub fn display(&self) -> &Arc<DisplayModeController> {
        &self.display
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<CoreEvent> {
        self.events.subscribe()
    }

    pub fn playback(&self) -> watch::Receiver<PlaybackState> {
        self.engine.subscribe()
    }

    pub fn display_state(&self) -> watch::Receiver<DisplayState> {
        self.display.subscribe()
    }

    /// Start a new track from a content surface.
    ///
    /// Once the track is in place the display mode is re-derived from the
    /// current route, unless the user chose one explicitly.
    pub async fn load(&self, track: Track) {
        self.engine.load(track).await;
        if self.engine.has_track() {
            self.display.reevaluate().await;
        }
    }

    /// Navigation notification from the host router.
    pub async fn on_route_change(&self, path: &str) {
        self.display.on_route_change(path).await;
    }

    /// Forward a notification from the media element.
    pub fn handle_media_event(&self, event: MediaEvent) {
        self.engine.handle_media_event(event);
    }

    /// Which surface renders the player, if any.
    ///
    /// `None` with no track loaded, or while hidden.
    pub fn visible_surface(&self) -> Option<DisplayMode> {
        if !self.engine.has_track() {
            return None;
        }
        match self.display.mode() {
            DisplayMode::Hidden => None,
            mode => Some(mode),
        }
    }

    /// Close the player: forget the track and stop playback.
    pub async fn close(&self) {
        self.engine.reset().await;
    }

    /// Stop the background tasks. Playback state is left as is.
    pub async fn shutdown(mut self) {
        self.cancel.cancel();

        #[cfg(not(target_arch = "wasm32"))]
        {
            if let Some(ticker) = self.ticker.take() {
                ticker.shutdown().await;
            }
            for task in self.tasks.drain(..) {
                let _ = task.await;
            }
        }

        debug!("Player service stopped");
    }
}

impl Drop for PlayerService {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// Feed media element notifications into `engine` until the stream ends.
pub async fn pump_media_events<S>(engine: Arc<PlaybackEngine>, mut events: S)
where
    S: Stream<Item = MediaEvent> + Unpin,
{
    while let Some(event) = events.next().await {
        engine.handle_media_event(event);
    }
    debug!("Media event stream ended");
}

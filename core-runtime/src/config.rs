//! # Core Configuration Module
//!
//! Provides configuration management for the player core.
//!
//! ## Overview
//!
//! The configuration system uses a builder pattern to construct a `CoreConfig`
//! instance that holds the host bridges and the tunables shared by the playback
//! engine and the display controller. Validation is fail-fast: a missing
//! capability is reported at build time with an actionable message instead of
//! surfacing later as a silent no-op.
//!
//! ## Required Dependencies
//!
//! - `MediaElement` - the platform audio element (always host-provided)
//! - `SettingsStore` - durable key-value storage for mode, track and output
//!   settings
//!
//! ## Optional Dependencies (with defaults)
//!
//! - `Clock` - time source for the progress ticker (default: `SystemClock`)
//! - `EventBus` - shared broadcast bus (default: a fresh bus)
//!
//! When the `desktop-shims` feature is enabled, a JSON-file `SettingsStore`
//! is opened automatically if none is provided.
//!
//! ## Usage
//!
//! ```ignore
//! use core_runtime::config::CoreConfig;
//! use std::sync::Arc;
//!
//! let config = CoreConfig::builder()
//!     .media_element(Arc::new(MyAudioElement::new()))
//!     .settings_store(Arc::new(MySettingsStore))
//!     .home_path("/podcasts")
//!     .detail_prefix("/podcasts/")
//!     .build()?;
//! ```
//!
//! ## Error Handling
//!
//! ```should_panic
//! use core_runtime::config::CoreConfig;
//!
//! // No media element: the builder refuses to produce a config.
//! let config = CoreConfig::builder()
//!     .build()
//!     .expect("Should fail - missing media element");
//! ```

use crate::error::{Error, Result};
use crate::events::EventBus;
use bridge_traits::{Clock, MediaElement, SettingsStore, SystemClock};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;

/// Lower bound for the progress tick period.
pub const MIN_PROGRESS_INTERVAL_MS: u64 = 10;
/// Upper bound for the progress tick period.
pub const MAX_PROGRESS_INTERVAL_MS: u64 = 5_000;

/// Route patterns that drive automatic display-mode selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteConfig {
    /// Listing route, matched exactly (e.g. `/podcasts`).
    pub home_path: String,
    /// Prefix of the detail route (e.g. `/podcasts/`), ending in a path
    /// separator; the remainder after the prefix must be non-empty.
    pub detail_prefix: String,
}

impl Default for RouteConfig {
    fn default() -> Self {
        Self {
            home_path: "/podcasts".to_string(),
            detail_prefix: "/podcasts/".to_string(),
        }
    }
}

impl RouteConfig {
    pub fn validate(&self) -> Result<()> {
        if !self.home_path.starts_with('/') {
            return Err(Error::Config(format!(
                "Home path must start with '/': {:?}",
                self.home_path
            )));
        }

        if !self.detail_prefix.starts_with('/')
            || !self.detail_prefix.ends_with('/')
            || self.detail_prefix.len() < 2
        {
            return Err(Error::Config(format!(
                "Detail prefix must start and end with '/' and name a route: {:?}",
                self.detail_prefix
            )));
        }

        Ok(())
    }
}

/// Names of the durable storage keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageKeys {
    pub display_mode: String,
    pub current_track: String,
    pub playback_state: String,
}

impl Default for StorageKeys {
    fn default() -> Self {
        Self {
            display_mode: "display-mode".to_string(),
            current_track: "current-track".to_string(),
            playback_state: "playback-state".to_string(),
        }
    }
}

impl StorageKeys {
    pub fn validate(&self) -> Result<()> {
        let keys = [
            ("display mode", &self.display_mode),
            ("current track", &self.current_track),
            ("playback state", &self.playback_state),
        ];

        for (label, key) in keys {
            if key.trim().is_empty() {
                return Err(Error::Config(format!(
                    "Storage key for {} cannot be empty",
                    label
                )));
            }
        }

        if self.display_mode == self.current_track
            || self.display_mode == self.playback_state
            || self.current_track == self.playback_state
        {
            return Err(Error::Config(
                "Storage keys must be distinct from each other".to_string(),
            ));
        }

        Ok(())
    }
}

/// Player tunables that are plain data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerSettings {
    /// Progress tick period in milliseconds.
    pub progress_interval_ms: u64,
    /// Volume used when nothing has been persisted yet.
    pub default_volume: f64,
    pub storage_keys: StorageKeys,
}

impl Default for PlayerSettings {
    fn default() -> Self {
        Self {
            progress_interval_ms: 250,
            default_volume: 1.0,
            storage_keys: StorageKeys::default(),
        }
    }
}

impl PlayerSettings {
    pub fn validate(&self) -> Result<()> {
        if !(MIN_PROGRESS_INTERVAL_MS..=MAX_PROGRESS_INTERVAL_MS)
            .contains(&self.progress_interval_ms)
        {
            return Err(Error::Config(format!(
                "Progress interval must be between {}ms and {}ms, got {}ms",
                MIN_PROGRESS_INTERVAL_MS, MAX_PROGRESS_INTERVAL_MS, self.progress_interval_ms
            )));
        }

        if !self.default_volume.is_finite() || !(0.0..=1.0).contains(&self.default_volume) {
            return Err(Error::Config(format!(
                "Default volume must be within [0, 1], got {}",
                self.default_volume
            )));
        }

        self.storage_keys.validate()
    }
}

/// Core configuration for the player.
///
/// Use [`CoreConfigBuilder`] to construct instances.
#[derive(Clone)]
pub struct CoreConfig {
    /// Platform audio element (required)
    pub media_element: Arc<dyn MediaElement>,

    /// Durable settings storage (required, desktop default available)
    pub settings_store: Arc<dyn SettingsStore>,

    pub clock: Arc<dyn Clock>,

    /// Bus shared by the engine, the display controller and the host
    pub event_bus: EventBus,

    pub routes: RouteConfig,

    pub player: PlayerSettings,
}

impl std::fmt::Debug for CoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoreConfig")
            .field("media_element", &"MediaElement { ... }")
            .field("settings_store", &"SettingsStore { ... }")
            .field("clock", &"Clock { ... }")
            .field("event_bus", &self.event_bus)
            .field("routes", &self.routes)
            .field("player", &self.player)
            .finish()
    }
}

impl CoreConfig {
    /// Creates a new builder for constructing a `CoreConfig`.
    pub fn builder() -> CoreConfigBuilder {
        CoreConfigBuilder::default()
    }

    /// Validates route patterns and player tunables.
    pub fn validate(&self) -> Result<()> {
        self.routes.validate()?;
        self.player.validate()
    }
}

fn media_element_missing_error() -> Error {
    Error::CapabilityMissing {
        capability: "MediaElement".to_string(),
        message: "MediaElement implementation is required for audio output. \
                 Web: inject bridge_wasm::HtmlAudioMediaElement. \
                 Native hosts: wrap the platform audio player behind the MediaElement trait."
            .to_string(),
    }
}

#[cfg(not(all(feature = "desktop-shims", not(target_arch = "wasm32"))))]
fn provide_default_settings_store(
    _settings_path: Option<&PathBuf>,
) -> Result<Arc<dyn SettingsStore>> {
    Err(Error::CapabilityMissing {
        capability: "SettingsStore".to_string(),
        message: "SettingsStore implementation is required to persist the display mode, \
                 current track and output settings. \
                 Desktop: enable the 'desktop-shims' feature to use the default FileSettingsStore. \
                 Web: inject the localStorage-backed WasmSettingsStore."
            .to_string(),
    })
}

#[cfg(all(feature = "desktop-shims", not(target_arch = "wasm32")))]
fn provide_default_settings_store(
    settings_path: Option<&PathBuf>,
) -> Result<Arc<dyn SettingsStore>> {
    use bridge_desktop::FileSettingsStore;

    let path = match settings_path {
        Some(path) => path.clone(),
        None => FileSettingsStore::default_path(DEFAULT_APP_DIR).ok_or_else(|| {
            Error::Config(
                "No platform data directory available for the default settings file. \
                 Use .settings_path() to choose one."
                    .to_string(),
            )
        })?,
    };

    let store: Arc<dyn SettingsStore> = Arc::new(FileSettingsStore::open(path)?);
    Ok(store)
}

#[cfg(all(feature = "desktop-shims", not(target_arch = "wasm32")))]
const DEFAULT_APP_DIR: &str = "persistent-player";

/// Builder for constructing [`CoreConfig`] instances.
#[derive(Default)]
pub struct CoreConfigBuilder {
    media_element: Option<Arc<dyn MediaElement>>,
    settings_store: Option<Arc<dyn SettingsStore>>,
    settings_path: Option<PathBuf>,
    clock: Option<Arc<dyn Clock>>,
    event_bus: Option<EventBus>,
    routes: RouteConfig,
    player: PlayerSettings,
}

impl CoreConfigBuilder {
    /// Sets the media element implementation (required).
    pub fn media_element(mut self, element: Arc<dyn MediaElement>) -> Self {
        self.media_element = Some(element);
        self
    }

    /// Sets the settings store implementation.
    ///
    /// Required unless the `desktop-shims` feature provides the file-backed
    /// default.
    pub fn settings_store(mut self, store: Arc<dyn SettingsStore>) -> Self {
        self.settings_store = Some(store);
        self
    }

    /// Location of the default desktop settings file.
    ///
    /// Ignored when a settings store is injected.
    ///
    /// ```
    /// use core_runtime::config::CoreConfig;
    ///
    /// let builder = CoreConfig::builder()
    ///     .settings_path("/tmp/player/settings.json");
    /// ```
    pub fn settings_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.settings_path = Some(path.into());
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Shares an existing event bus, e.g. one the host already listens on.
    pub fn event_bus(mut self, bus: EventBus) -> Self {
        self.event_bus = Some(bus);
        self
    }

    pub fn routes(mut self, routes: RouteConfig) -> Self {
        self.routes = routes;
        self
    }

    /// Sets the listing route.
    pub fn home_path(mut self, path: impl Into<String>) -> Self {
        self.routes.home_path = path.into();
        self
    }

    /// Sets the detail route prefix.
    pub fn detail_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.routes.detail_prefix = prefix.into();
        self
    }

    pub fn player_settings(mut self, settings: PlayerSettings) -> Self {
        self.player = settings;
        self
    }

    /// Sets the progress tick period.
    ///
    /// Default: 250 ms
    pub fn progress_interval_ms(mut self, interval_ms: u64) -> Self {
        self.player.progress_interval_ms = interval_ms;
        self
    }

    pub fn default_volume(mut self, volume: f64) -> Self {
        self.player.default_volume = volume;
        self
    }

    pub fn storage_keys(mut self, keys: StorageKeys) -> Self {
        self.player.storage_keys = keys;
        self
    }

    /// Builds the final `CoreConfig` instance.
    ///
    /// # Returns
    ///
    /// Returns `Ok(CoreConfig)` on success, or an error if:
    /// - The media element is missing
    /// - No settings store is available
    /// - Route patterns or player tunables are invalid
    pub fn build(self) -> Result<CoreConfig> {
        let media_element = self.media_element.ok_or_else(media_element_missing_error)?;

        let settings_store = match self.settings_store {
            Some(store) => store,
            None => provide_default_settings_store(self.settings_path.as_ref())?,
        };

        let config = CoreConfig {
            media_element,
            settings_store,
            clock: self.clock.unwrap_or_else(|| Arc::new(SystemClock)),
            event_bus: self.event_bus.unwrap_or_default(),
            routes: self.routes,
            player: self.player,
        };

        config.validate()?;

        Ok(config)
    }
}

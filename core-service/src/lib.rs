//! Core service façade and bootstrap helpers.
//!
//! This crate wires host-provided bridge implementations (settings storage,
//! media element, clock) into one [`PlayerService`]. Desktop apps typically
//! enable the `desktop-shims` feature, which lets the configuration fall back
//! to the JSON-file settings store from `bridge-desktop`, whereas WebAssembly
//! builds enable the `wasm` feature and rely on the adapters from
//! `bridge-wasm`.

pub mod error;
pub mod service;

pub use error::{CoreError, Result};
pub use service::{pump_media_events, PlayerService};

pub use core_display::{DisplayMode, DisplayState};
pub use core_playback::{PlaybackState, Track, TrackKind};
pub use core_runtime::config::CoreConfig;

#[cfg(all(feature = "desktop-shims", not(target_arch = "wasm32")))]
pub use bridge_desktop::FileSettingsStore;

#[cfg(all(feature = "wasm", target_arch = "wasm32"))]
pub use bridge_wasm::WasmBridgeConfig;

/// Convenience bootstrapper for WebAssembly hosts.
///
/// Builds the browser bridges, starts the player on `initial_path` and pumps
/// audio element notifications into the engine.
///
/// ```ignore
/// use core_service::{bootstrap_wasm, WasmBridgeConfig};
///
/// let config = WasmBridgeConfig::new("my-site");
/// let player = bootstrap_wasm(config, "/podcasts").await?;
/// ```
#[cfg(all(feature = "wasm", target_arch = "wasm32"))]
pub async fn bootstrap_wasm(config: WasmBridgeConfig, initial_path: &str) -> Result<PlayerService> {
    let bridges = bridge_wasm::build_wasm_bridges(config)?;

    let core_config = CoreConfig::builder()
        .settings_store(bridges.settings_store)
        .media_element(bridges.media_element)
        .build()?;

    let service = PlayerService::bootstrap(core_config, initial_path).await?;
    wasm_bindgen_futures::spawn_local(pump_media_events(
        service.engine().clone(),
        bridges.media_events,
    ));
    Ok(service)
}

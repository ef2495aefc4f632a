//! Convenience helpers for wiring the wasm bridge implementations together.
//!
//! Host shells call [`build_wasm_bridges`] to get the settings store and the
//! audio element ready for injection into the core configuration. Media
//! notifications are delivered on [`WasmBridgeSet::media_events`], to be
//! pumped into the playback engine once it exists.

use std::sync::Arc;

use bridge_traits::{
    error::Result as BridgeResult,
    media::{MediaElement, MediaEvent},
    storage::SettingsStore,
};
use futures::channel::mpsc;

use crate::{media::HtmlAudioMediaElement, storage::WasmSettingsStore};

/// Configuration for [`build_wasm_bridges`].
#[derive(Debug, Clone)]
pub struct WasmBridgeConfig {
    /// Logical namespace used for `localStorage` key prefixes.
    pub namespace: String,
}

impl WasmBridgeConfig {
    /// Create a new config using the provided namespace.
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
        }
    }
}

impl Default for WasmBridgeConfig {
    fn default() -> Self {
        Self::new("persistent-player")
    }
}

/// Fully constructed wasm bridge objects ready for injection into the core.
pub struct WasmBridgeSet {
    /// Plain settings store layered on `localStorage`.
    pub settings_store: Arc<dyn SettingsStore>,
    /// Detached `<audio>` element.
    pub media_element: Arc<dyn MediaElement>,
    /// Notifications raised by `media_element`.
    pub media_events: mpsc::UnboundedReceiver<MediaEvent>,
}

/// Build the browser bridges for `config`.
pub fn build_wasm_bridges(config: WasmBridgeConfig) -> BridgeResult<WasmBridgeSet> {
    let settings_store: Arc<dyn SettingsStore> = Arc::new(WasmSettingsStore::new(&config.namespace)?);

    let (tx, media_events) = mpsc::unbounded();
    let media_element: Arc<dyn MediaElement> = Arc::new(HtmlAudioMediaElement::new(move |event| {
        // The receiver is gone once the player shuts down.
        let _ = tx.unbounded_send(event);
    })?);

    Ok(WasmBridgeSet {
        settings_store,
        media_element,
        media_events,
    })
}

#[cfg(all(test, target_arch = "wasm32"))]
mod tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test::wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    async fn bridges_share_namespace() {
        let namespace = format!("bootstrap-{}", js_sys::Date::now());
        let bridges = build_wasm_bridges(WasmBridgeConfig::new(namespace.clone())).expect("bridges");

        bridges
            .settings_store
            .set_string("display-mode", "collapsed")
            .await
            .expect("set");

        let direct = WasmSettingsStore::new(&namespace).expect("store");
        assert_eq!(
            direct.get_string("display-mode").await.expect("get"),
            Some("collapsed".to_string())
        );
        direct.clear_all().await.expect("clear");
    }
}

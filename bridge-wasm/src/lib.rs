//! WebAssembly Bridge Implementations
//!
//! This crate provides browser implementations of the bridge traits defined
//! in `bridge-traits`, built on `web-sys` and `wasm-bindgen`.
//!
//! # Platform Support
//!
//! This crate is designed exclusively for the `wasm32-unknown-unknown` target.
//! It compiles to an empty crate elsewhere.
//!
//! # Implementations
//!
//! - `WasmSettingsStore`: namespaced `localStorage` key/value store
//! - `HtmlAudioMediaElement`: detached `HTMLAudioElement`
//!
//! # Examples
//!
//! ```ignore
//! use bridge_wasm::{build_wasm_bridges, WasmBridgeConfig};
//!
//! let bridges = build_wasm_bridges(WasmBridgeConfig::new("my-site"))?;
//! let config = CoreConfig::builder()
//!     .settings_store(bridges.settings_store.clone())
//!     .media_element(bridges.media_element.clone())
//!     .build()?;
//! ```

#![cfg(target_arch = "wasm32")]
#![warn(missing_docs)]

pub mod bootstrap;
pub mod error;
pub mod media;
pub mod storage;

// Re-export commonly used types
pub use bootstrap::{build_wasm_bridges, WasmBridgeConfig, WasmBridgeSet};
pub use error::{js_error, js_message};
pub use media::HtmlAudioMediaElement;
pub use storage::WasmSettingsStore;

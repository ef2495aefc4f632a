//! Workspace umbrella crate.
//!
//! Exposes feature flags that map onto the individual workspace crates so a
//! host front end can depend on `player-workspace` alone:
//!
//! - `desktop-shims` (default): the full [`core_service::PlayerService`]
//!   façade with the file-backed settings store.
//! - `wasm`: the façade wired for browser hosts (`localStorage`,
//!   `HTMLAudioElement`).
//! - `engine-only`: just the playback engine and display controller, for
//!   hosts that do their own wiring.

#[cfg(any(feature = "desktop-shims", feature = "wasm"))]
pub use core_service::{CoreError, PlayerService};

#[cfg(feature = "engine-only")]
pub use core_display::{DisplayMode, DisplayModeController};
#[cfg(feature = "engine-only")]
pub use core_playback::{PlaybackEngine, Track};

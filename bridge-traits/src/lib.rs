//! # Host Bridge Traits
//!
//! Platform abstraction traits that each host shell implements for the player
//! core.
//!
//! ## Overview
//!
//! The player core never talks to a browser or an operating system directly.
//! Every capability it needs is expressed here as a trait, and the host
//! injects a concrete adapter at bootstrap time:
//!
//! ### Storage
//! - [`SettingsStore`](storage::SettingsStore) - Durable key-value storage
//!   (localStorage on the web, a settings file on desktop)
//!
//! ### Media
//! - [`MediaElement`](media::MediaElement) - The platform media-element
//!   capability that actually renders audio
//!
//! ### Utilities
//! - [`Clock`](time::Clock) - Time source for deterministic testing
//! - [`LoggerSink`](time::LoggerSink) - Forward structured logs to host logging
//!
//! ## Platform Requirements
//!
//! | Platform | Implementation Crate | Settings | Media |
//! |----------|---------------------|----------|-------|
//! | Desktop  | `bridge-desktop`    | ✅ JSON file | host-provided |
//! | Web      | `bridge-wasm`       | ✅ localStorage | ✅ `HTMLAudioElement` |
//!
//! ## Error Handling
//!
//! All bridge traits use the [`BridgeError`](error::BridgeError) type. The
//! player core treats every bridge failure as recoverable: storage failures
//! degrade to in-memory defaults and media failures become a state flag.
//!
//! ## Thread Safety
//!
//! On native targets all bridge traits require `Send + Sync`. On `wasm32`
//! the bounds are relaxed through [`platform::PlatformSendSync`] because
//! browser objects are single-threaded.

pub mod error;
pub mod media;
pub mod platform;
pub mod storage;
pub mod time;

pub use error::BridgeError;

// Re-export commonly used types
pub use media::{MediaElement, MediaEvent};
pub use storage::{MemorySettingsStore, SettingsStore};
pub use time::{Clock, ConsoleLogger, LogEntry, LogLevel, LoggerSink, ManualClock, SystemClock};

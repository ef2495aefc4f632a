//! # Desktop Bridge Implementations
//!
//! Default implementations of bridge traits for desktop platforms
//! (macOS, Windows, Linux).
//!
//! ## Overview
//!
//! - `SettingsStore` using a JSON settings file in the user's data directory
//!
//! The media element is always supplied by the host shell; desktop hosts
//! wrap whatever audio backend they embed.
//!
//! ## Usage
//!
//! ```ignore
//! use bridge_desktop::FileSettingsStore;
//!
//! let path = FileSettingsStore::default_path("persistent-player")
//!     .expect("platform data directory");
//! let store = FileSettingsStore::open(path)?;
//! ```

mod settings;

pub use settings::FileSettingsStore;

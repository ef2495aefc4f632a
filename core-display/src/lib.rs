//! # Core Display
//!
//! Chooses which surface renders the persistent player: the mini bar, the
//! floating bubble, the collapsed edge tab, or nothing.
//!
//! The mode follows navigation until the user picks one explicitly. The
//! collapsed tab is the exception: it stays put across navigation.

pub mod controller;
pub mod error;
pub mod mode;
pub mod route;

pub use controller::{DisplayModeController, DisplayState};
pub use error::{DisplayError, Result};
pub use mode::DisplayMode;
pub use route::{RouteClass, RouteClassifier};

//! The four mutually exclusive presentations of the player.

use crate::error::DisplayError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which surface renders the player.
///
/// Persisted as the lowercase names `hidden`, `mini`, `floating` and
/// `collapsed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayMode {
    /// No surface; owned by the detail route.
    Hidden,
    /// Bottom bar.
    #[default]
    Mini,
    /// Floating bubble.
    Floating,
    /// Edge tab; survives navigation until explicitly expanded.
    Collapsed,
}

impl DisplayMode {
    pub const ALL: [DisplayMode; 4] = [
        DisplayMode::Hidden,
        DisplayMode::Mini,
        DisplayMode::Floating,
        DisplayMode::Collapsed,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            DisplayMode::Hidden => "hidden",
            DisplayMode::Mini => "mini",
            DisplayMode::Floating => "floating",
            DisplayMode::Collapsed => "collapsed",
        }
    }
}

impl FromStr for DisplayMode {
    type Err = DisplayError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|mode| mode.as_str() == value)
            .ok_or_else(|| DisplayError::UnknownMode(value.to_string()))
    }
}

impl fmt::Display for DisplayMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

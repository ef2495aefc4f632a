//! # Display Mode Controller
//!
//! Decides which presentation of the player is shown.
//!
//! ## Rules
//!
//! - Route changes derive the mode (detail route: `Hidden`, listing route:
//!   `Mini`, anything else: `Floating`) and clear the manual override.
//! - Leaving the detail route while `Hidden` resumes the stored mode.
//! - `Collapsed` survives every route change and forces the manual override
//!   on; only [`expand`](DisplayModeController::expand),
//!   [`show_mini`](DisplayModeController::show_mini) and
//!   [`show_floating`](DisplayModeController::show_floating) leave it.
//! - On the detail route every manual choice, `collapse` included, is
//!   recorded and persisted but the effective mode stays `Hidden` until the
//!   route is left.
//! - The forced `Hidden` of the detail route is never persisted.

use crate::mode::DisplayMode;
use crate::route::{normalize_path, RouteClass, RouteClassifier};
use bridge_traits::SettingsStore;
use core_runtime::events::{CoreEvent, DisplayEvent, EventBus};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, warn};

/// Observable state of the controller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayState {
    /// The effective mode.
    pub mode: DisplayMode,
    /// Set by explicit user choices, cleared by route changes (except while
    /// collapsed).
    pub manual_override: bool,
    pub last_known_path: String,
    /// The last real mode, i.e. what storage holds. Differs from `mode` only
    /// while the detail route forces `Hidden`.
    pub preferred_mode: DisplayMode,
}

impl DisplayState {
    /// Whether `Hidden` is imposed by the route rather than chosen.
    pub fn is_forced_hidden(&self) -> bool {
        self.mode == DisplayMode::Hidden && self.preferred_mode != DisplayMode::Hidden
    }
}

/// Owns the display mode.
pub struct DisplayModeController {
    store: Arc<dyn SettingsStore>,
    storage_key: String,
    routes: RouteClassifier,
    events: Option<EventBus>,
    state: watch::Sender<DisplayState>,
}

impl DisplayModeController {
    /// Read the stored mode once and start on `initial_path`.
    ///
    /// An absent, invalid or unreadable stored value means `Mini`. Starting on
    /// the detail route shows `Hidden` (unless collapsed) while keeping the
    /// stored mode as the preferred one.
    pub async fn bootstrap(
        store: Arc<dyn SettingsStore>,
        routes: RouteClassifier,
        storage_key: impl Into<String>,
        initial_path: &str,
    ) -> Self {
        let storage_key = storage_key.into();

        let stored = match store.get_string(&storage_key).await {
            Ok(Some(raw)) => match raw.parse::<DisplayMode>() {
                Ok(mode) => Some(mode),
                Err(err) => {
                    warn!(error = %err, "Ignoring stored display mode");
                    None
                }
            },
            Ok(None) => None,
            Err(err) => {
                warn!(error = %err, "Failed to read stored display mode");
                None
            }
        };

        let preferred_mode = stored.unwrap_or_default();
        let path = normalize_path(initial_path).to_string();
        let mode = if routes.is_detail(&path) && preferred_mode != DisplayMode::Collapsed {
            DisplayMode::Hidden
        } else {
            preferred_mode
        };

        debug!(mode = %mode, preferred = %preferred_mode, path = %path, "Display controller started");

        let (state, _) = watch::channel(DisplayState {
            mode,
            manual_override: false,
            last_known_path: path,
            preferred_mode,
        });

        Self {
            store,
            storage_key,
            routes,
            events: None,
            state,
        }
    }

    /// Publish mode changes on `bus`.
    pub fn with_event_bus(mut self, bus: EventBus) -> Self {
        self.events = Some(bus);
        self
    }

    pub fn subscribe(&self) -> watch::Receiver<DisplayState> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> DisplayState {
        self.state.borrow().clone()
    }

    pub fn mode(&self) -> DisplayMode {
        self.state.borrow().mode
    }

    pub fn route_class(&self) -> RouteClass {
        self.routes.classify(&self.state.borrow().last_known_path)
    }

    // ========================================================================
    // Automatic transitions
    // ========================================================================

    /// Navigation notification from the router.
    pub async fn on_route_change(&self, path: &str) {
        let path = normalize_path(path).to_string();
        let mut transition = None;

        self.state.send_if_modified(|state| {
            if state.last_known_path == path {
                return false;
            }
            let left_detail = self.routes.is_detail(&state.last_known_path);
            state.last_known_path = path.clone();

            if state.mode == DisplayMode::Collapsed {
                state.manual_override = true;
                return true;
            }

            state.manual_override = false;
            let before = (state.mode, state.preferred_mode);
            if left_detail && state.mode == DisplayMode::Hidden && !self.routes.is_detail(&path) {
                state.mode = state.preferred_mode;
                state.manual_override = state.mode == DisplayMode::Collapsed;
            } else {
                self.apply_route_rule(state);
            }
            transition = Some((before, (state.mode, state.preferred_mode)));
            true
        });

        debug!(path = %path, "Route changed");
        if let Some((before, after)) = transition {
            self.settle(before, after, false).await;
        }
    }

    /// Re-apply the route rule for the current path.
    ///
    /// Does nothing after a manual choice or while collapsed. Called when a
    /// track becomes loaded.
    pub async fn reevaluate(&self) {
        let mut transition = None;

        self.state.send_if_modified(|state| {
            if state.manual_override || state.mode == DisplayMode::Collapsed {
                return false;
            }
            let before = (state.mode, state.preferred_mode);
            self.apply_route_rule(state);
            let after = (state.mode, state.preferred_mode);
            transition = Some((before, after));
            before != after
        });

        if let Some((before, after)) = transition {
            self.settle(before, after, false).await;
        }
    }

    fn apply_route_rule(&self, state: &mut DisplayState) {
        match self.routes.classify(&state.last_known_path) {
            RouteClass::Detail => state.mode = DisplayMode::Hidden,
            RouteClass::Home => {
                state.mode = DisplayMode::Mini;
                state.preferred_mode = DisplayMode::Mini;
            }
            RouteClass::Other => {
                state.mode = DisplayMode::Floating;
                state.preferred_mode = DisplayMode::Floating;
            }
        }
    }

    // ========================================================================
    // Manual transitions
    // ========================================================================

    pub async fn show_mini(&self) {
        self.choose(DisplayMode::Mini, true).await;
    }

    pub async fn show_floating(&self) {
        self.choose(DisplayMode::Floating, true).await;
    }

    /// Ignored while collapsed.
    pub async fn hide(&self) {
        self.choose(DisplayMode::Hidden, false).await;
    }

    pub async fn collapse(&self) {
        self.choose(DisplayMode::Collapsed, false).await;
    }

    /// Leave the edge tab for the floating bubble.
    pub async fn expand(&self) {
        self.choose(DisplayMode::Floating, true).await;
    }

    /// `Mini` goes to `Floating`, anything else to `Mini`. Ignored while
    /// collapsed.
    pub async fn toggle(&self) {
        let target = {
            let state = self.state.borrow();
            match state.preferred_mode {
                DisplayMode::Mini => DisplayMode::Floating,
                _ => DisplayMode::Mini,
            }
        };
        self.choose(target, false).await;
    }

    /// Apply an explicit user choice.
    ///
    /// `exits_collapsed` marks the commands allowed to leave `Collapsed`.
    async fn choose(&self, target: DisplayMode, exits_collapsed: bool) {
        let mut transition = None;

        self.state.send_if_modified(|state| {
            if state.mode == DisplayMode::Collapsed
                && target != DisplayMode::Collapsed
                && !exits_collapsed
            {
                return false;
            }

            let before = (state.mode, state.preferred_mode);
            let on_detail = self.routes.is_detail(&state.last_known_path);

            state.preferred_mode = target;
            state.mode = if on_detail { DisplayMode::Hidden } else { target };

            let changed = !state.manual_override || before != (state.mode, state.preferred_mode);
            state.manual_override = true;
            transition = Some((before, (state.mode, state.preferred_mode)));
            changed
        });

        match transition {
            Some((before, after)) => self.settle(before, after, true).await,
            None => debug!(requested = %target, "Mode change ignored while collapsed"),
        }
    }

    // ========================================================================
    // Persistence and notification
    // ========================================================================

    /// Persist the preference if it changed or was chosen explicitly, and
    /// announce a changed effective mode.
    async fn settle(
        &self,
        (mode_before, preferred_before): (DisplayMode, DisplayMode),
        (mode_after, preferred_after): (DisplayMode, DisplayMode),
        manual: bool,
    ) {
        if manual || preferred_after != preferred_before {
            if let Err(err) = self
                .store
                .set_string(&self.storage_key, preferred_after.as_str())
                .await
            {
                warn!(error = %err, mode = %preferred_after, "Failed to persist display mode");
            }
        }

        if mode_after != mode_before {
            debug!(from = %mode_before, to = %mode_after, manual, "Display mode changed");
            if let Some(bus) = &self.events {
                let _ = bus.emit(CoreEvent::Display(DisplayEvent::ModeChanged {
                    mode: mode_after.as_str().to_string(),
                    manual_override: manual || mode_after == DisplayMode::Collapsed,
                }));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_traits::MemorySettingsStore;

    async fn controller(path: &str) -> DisplayModeController {
        DisplayModeController::bootstrap(
            Arc::new(MemorySettingsStore::new()),
            RouteClassifier::default(),
            "display-mode",
            path,
        )
        .await
    }

    #[tokio::test]
    async fn test_same_path_is_not_a_navigation() {
        let controller = controller("/articles").await;
        controller.show_floating().await;

        controller.on_route_change("/articles/").await;
        controller.on_route_change("/articles?ref=home").await;

        assert!(controller.snapshot().manual_override);
    }

    #[tokio::test]
    async fn test_forced_hidden_flag() {
        let controller = controller("/podcasts/ep-1").await;
        let state = controller.snapshot();
        assert_eq!(state.mode, DisplayMode::Hidden);
        assert!(state.is_forced_hidden());
        assert_eq!(controller.route_class(), RouteClass::Detail);
    }

    #[tokio::test]
    async fn test_toggle_on_detail_flips_preference() {
        let controller = controller("/podcasts/ep-1").await;
        controller.toggle().await;

        let state = controller.snapshot();
        assert_eq!(state.mode, DisplayMode::Hidden);
        assert_eq!(state.preferred_mode, DisplayMode::Floating);
    }
}

//! Sign-out handling: the player forgets its track when the reader signs out.

use crate::engine::PlaybackEngine;
use core_runtime::events::{CoreEvent, SessionEvent};
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::broadcast::Receiver;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Resets `engine` on every [`SessionEvent::SignedOut`] until `cancel` fires
/// or the bus closes.
pub async fn run_session_listener(
    engine: Arc<PlaybackEngine>,
    mut events: Receiver<CoreEvent>,
    cancel: CancellationToken,
) {
    loop {
        let event = tokio::select! {
            _ = cancel.cancelled() => break,
            event = events.recv() => event,
        };

        match event {
            Ok(CoreEvent::Session(SessionEvent::SignedOut { profile_id })) => {
                info!(profile_id = %profile_id, "Reader signed out; resetting player");
                engine.reset().await;
            }
            Ok(_) => {}
            Err(RecvError::Lagged(skipped)) => {
                warn!(skipped, "Session listener lagged behind the event bus");
            }
            Err(RecvError::Closed) => break,
        }
    }
}

/// Spawn [`run_session_listener`] on the current tokio runtime.
///
/// The subscription is taken before returning, so a sign-out emitted right
/// after this call is not missed.
#[cfg(not(target_arch = "wasm32"))]
pub fn spawn_session_listener(
    engine: Arc<PlaybackEngine>,
    bus: &core_runtime::events::EventBus,
    cancel: CancellationToken,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(run_session_listener(engine, bus.subscribe(), cancel))
}

//! Recurring progress tick.
//!
//! Measures real elapsed time with the injected [`Clock`] rather than trusting
//! the interval period, so a late tick still advances by the time that really
//! passed.

use crate::engine::PlaybackEngine;
use bridge_traits::Clock;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Handle to the background task calling [`PlaybackEngine::advance`].
///
/// Dropping the handle stops the task.
pub struct ProgressTicker {
    cancel: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

impl ProgressTicker {
    /// Spawn the tick loop on the current tokio runtime.
    pub fn spawn(engine: Arc<PlaybackEngine>, clock: Arc<dyn Clock>, period: Duration) -> Self {
        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let handle = tokio::spawn(run_ticker(engine, clock, period, token));

        Self {
            cancel,
            handle: Some(handle),
        }
    }

    pub fn is_running(&self) -> bool {
        !self.cancel.is_cancelled()
    }

    /// Stop ticking and wait for the task to finish.
    pub async fn shutdown(mut self) {
        self.cancel.cancel();
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
    }
}

impl Drop for ProgressTicker {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

async fn run_ticker(
    engine: Arc<PlaybackEngine>,
    clock: Arc<dyn Clock>,
    period: Duration,
    cancel: CancellationToken,
) {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    // The first tick completes immediately.
    interval.tick().await;
    let mut last = clock.now();

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                debug!("Progress ticker stopped");
                break;
            }
            _ = interval.tick() => {
                let now = clock.now();
                let elapsed = (now - last).to_std().unwrap_or_default();
                last = now;
                engine.advance(elapsed);
            }
        }
    }
}

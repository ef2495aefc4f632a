//! Media-element bridge trait and the notifications it reports back.
//!
//! The player core does not decode audio. It drives a platform media element
//! (an `HTMLAudioElement` in browsers, a native player elsewhere) through
//! [`MediaElement`] and receives asynchronous notifications as
//! [`MediaEvent`]s, which the host forwards to the playback engine.

use std::time::Duration;

use crate::{error::Result, platform::PlatformSendSync};

/// Asynchronous notification raised by a media element.
#[derive(Debug, Clone, PartialEq)]
pub enum MediaEvent {
    /// Enough of the resource was fetched to know its duration.
    MetadataLoaded { duration: Duration },
    /// Periodic position report while the element renders audio.
    TimeUpdate { position: Duration },
    /// Rendering reached the end of the resource.
    Ended,
    /// The resource could not be fetched or decoded.
    Failed { message: String },
}

/// Trait for the single platform audio-output resource.
///
/// Exactly one resource is attached at a time: [`load`](MediaElement::load)
/// replaces whatever was attached before, and [`unload`](MediaElement::unload)
/// releases it. Volume, mute and rate are element properties and survive
/// source changes.
#[cfg_attr(target_arch = "wasm32", async_trait::async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait::async_trait)]
pub trait MediaElement: PlatformSendSync {
    /// Attach a new resource. Returning an error means the element rejected
    /// the locator outright; later failures arrive as [`MediaEvent::Failed`].
    async fn load(&self, url: &str) -> Result<()>;

    /// Begin or resume rendering.
    async fn play(&self) -> Result<()>;

    /// Pause rendering without releasing the resource.
    async fn pause(&self) -> Result<()>;

    /// Move to an absolute position within the resource.
    async fn seek(&self, position: Duration) -> Result<()>;

    /// Output gain, normalized to `0.0..=1.0`.
    async fn set_volume(&self, volume: f32) -> Result<()>;

    /// Suppress output without touching the stored gain.
    async fn set_muted(&self, muted: bool) -> Result<()>;

    /// Rendering speed multiplier.
    async fn set_playback_rate(&self, rate: f32) -> Result<()>;

    /// Detach and release the current resource.
    async fn unload(&self) -> Result<()>;
}


//! `HTMLAudioElement`-backed media element.
//!
//! DOM media events are translated into [`MediaEvent`]s and handed to a sink
//! supplied by the host, which forwards them to the playback engine.

use crate::error::{js_error, js_message};
use async_trait::async_trait;
use bridge_traits::{
    error::{BridgeError, Result as BridgeResult},
    media::{MediaElement, MediaEvent},
};
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;
use tracing::debug;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Event, HtmlAudioElement};

type Listener = Closure<dyn FnMut(Event)>;

/// A detached `<audio>` element driven by the player.
pub struct HtmlAudioMediaElement {
    audio: HtmlAudioElement,
    listeners: RefCell<Vec<(&'static str, Listener)>>,
}

impl HtmlAudioMediaElement {
    /// Create the element and report its notifications to `sink`.
    pub fn new(sink: impl Fn(MediaEvent) + 'static) -> BridgeResult<Self> {
        let audio = HtmlAudioElement::new().map_err(|err| js_error("create audio", err))?;
        audio.set_preload("metadata");

        let element = Self {
            audio,
            listeners: RefCell::new(Vec::new()),
        };
        let sink: Rc<dyn Fn(MediaEvent)> = Rc::new(sink);

        element.listen("loadedmetadata", {
            let audio = element.audio.clone();
            let sink = sink.clone();
            move |_| {
                let duration = audio.duration();
                if duration.is_finite() && duration >= 0.0 {
                    sink(MediaEvent::MetadataLoaded {
                        duration: Duration::from_secs_f64(duration),
                    });
                }
            }
        })?;

        element.listen("timeupdate", {
            let audio = element.audio.clone();
            let sink = sink.clone();
            move |_| {
                let position = audio.current_time();
                if position.is_finite() && position >= 0.0 {
                    sink(MediaEvent::TimeUpdate {
                        position: Duration::from_secs_f64(position),
                    });
                }
            }
        })?;

        element.listen("ended", {
            let sink = sink.clone();
            move |_| sink(MediaEvent::Ended)
        })?;

        element.listen("error", {
            let audio = element.audio.clone();
            move |_| {
                // Clearing the source on unload is not a failure.
                if audio.current_src().is_empty() {
                    return;
                }
                let message = match audio.error().map(|err| err.code()) {
                    Some(1) => "playback aborted",
                    Some(2) => "network error",
                    Some(3) => "decode error",
                    Some(4) => "source not supported",
                    _ => "unknown media error",
                };
                sink(MediaEvent::Failed {
                    message: message.to_string(),
                });
            }
        })?;

        Ok(element)
    }

    fn listen(&self, event: &'static str, handler: impl FnMut(Event) + 'static) -> BridgeResult<()> {
        let closure = Closure::wrap(Box::new(handler) as Box<dyn FnMut(Event)>);
        self.audio
            .add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())
            .map_err(|err| js_error("add listener", err))?;
        self.listeners.borrow_mut().push((event, closure));
        Ok(())
    }

    /// The underlying DOM element.
    pub fn element(&self) -> &HtmlAudioElement {
        &self.audio
    }
}

impl Drop for HtmlAudioMediaElement {
    fn drop(&mut self) {
        let _ = self.audio.pause();
        for (event, closure) in self.listeners.borrow_mut().drain(..) {
            let _ = self
                .audio
                .remove_event_listener_with_callback(event, closure.as_ref().unchecked_ref());
        }
    }
}

#[async_trait(?Send)]
impl MediaElement for HtmlAudioMediaElement {
    async fn load(&self, url: &str) -> BridgeResult<()> {
        if url.is_empty() {
            return Err(BridgeError::MediaRejected("empty source".into()));
        }
        self.audio.set_src(url);
        self.audio.load();
        debug!(url = url, "Attached audio source");
        Ok(())
    }

    async fn play(&self) -> BridgeResult<()> {
        let promise = self.audio.play().map_err(|err| js_error("play", err))?;
        JsFuture::from(promise)
            .await
            .map(|_| ())
            .map_err(|err| BridgeError::MediaRejected(js_message(&err)))
    }

    async fn pause(&self) -> BridgeResult<()> {
        self.audio.pause().map_err(|err| js_error("pause", err))
    }

    async fn seek(&self, position: Duration) -> BridgeResult<()> {
        self.audio.set_current_time(position.as_secs_f64());
        Ok(())
    }

    async fn set_volume(&self, volume: f32) -> BridgeResult<()> {
        self.audio.set_volume(f64::from(volume.clamp(0.0, 1.0)));
        Ok(())
    }

    async fn set_muted(&self, muted: bool) -> BridgeResult<()> {
        self.audio.set_muted(muted);
        Ok(())
    }

    async fn set_playback_rate(&self, rate: f32) -> BridgeResult<()> {
        self.audio.set_playback_rate(f64::from(rate));
        Ok(())
    }

    async fn unload(&self) -> BridgeResult<()> {
        self.audio.pause().map_err(|err| js_error("pause", err))?;
        self.audio
            .remove_attribute("src")
            .map_err(|err| js_error("clear source", err))?;
        self.audio.load();
        Ok(())
    }
}

// Playback facade: forwards commands to the engine and relays its events
// to a single observer

use crate::callback::{CallbackEvent, CallbackSlot, EventRelay, PlayerCallback};
use crate::engine::MediaEngine;
use crate::error::Result;
use crate::media::{MediaSource, VideoTrack};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Sole app-facing entry point to a playback engine.
///
/// Holds no playback state of its own; play/pause/stop state lives in the
/// engine and is reported through the observer. Local state is limited to
/// the observer, the selected renderer, whether surfaces are attached and
/// whether the player has been released.
///
/// Once released, commands are dropped and queries answer as if nothing
/// were loaded.
pub struct PlaybackFacade<E: MediaEngine> {
    engine: Mutex<E>,
    callbacks: CallbackSlot,
    selected_renderer: Mutex<Option<E::Renderer>>,
    surfaces_attached: AtomicBool,
    released: AtomicBool,
}

impl<E: MediaEngine> PlaybackFacade<E> {
    /// Wrap an engine and subscribe to its events.
    /// If subscribing fails the engine is released before the error is returned.
    pub fn new(mut engine: E) -> Result<Self> {
        let callbacks = CallbackSlot::new();
        if let Err(e) = engine.subscribe(EventRelay::new(callbacks.clone())) {
            log::error!("Failed to subscribe to engine events: {}", e);
            if let Err(release_err) = engine.release() {
                log::error!("Failed to release engine after subscribe error: {}", release_err);
            }
            return Err(e);
        }
        log::info!("Playback facade created");

        Ok(Self {
            engine: Mutex::new(engine),
            callbacks,
            selected_renderer: Mutex::new(None),
            surfaces_attached: AtomicBool::new(false),
            released: AtomicBool::new(false),
        })
    }

    /// Relay handle for bindings that receive engine events out of band
    pub fn event_relay(&self) -> EventRelay {
        EventRelay::new(self.callbacks.clone())
    }

    /// Run `f` against the engine unless the facade has been released.
    /// The released flag is checked under the engine lock so a concurrent
    /// `release` can't slip in between.
    fn with_engine<R>(
        &self,
        op: &str,
        fallback: R,
        f: impl FnOnce(&mut E) -> Result<R>,
    ) -> Result<R> {
        let mut engine = self.engine.lock();
        if self.released.load(Ordering::SeqCst) {
            log::warn!("{} ignored: player already released", op);
            return Ok(fallback);
        }
        f(&mut *engine)
    }

    /// Bind a new media source, replacing the current one.
    /// An unresolvable source is reported later through `CallbackEvent::Error`.
    pub fn set_media(&self, source: &MediaSource) -> Result<()> {
        log::info!("set_media: {}", source);
        self.with_engine("set_media", (), |engine| engine.set_media(source))
    }

    /// Attach a subtitle track, or with `None` tell the observer subtitles
    /// were cleared. Clearing only notifies; existing tracks stay in the engine.
    pub fn set_subtitle(&self, location: Option<&str>) -> Result<()> {
        match location {
            Some(location) => {
                log::info!("set_subtitle: {}", location);
                self.with_engine("set_subtitle", (), |engine| {
                    engine.add_subtitle_slave(location)
                })
            }
            None => {
                let slaves = self.with_engine("set_subtitle", 0, |engine| {
                    engine.subtitle_slave_count()
                })?;
                if slaves > 0 {
                    log::info!("Clearing {} subtitle track(s)", slaves);
                    self.callbacks.notify(CallbackEvent::SubtitlesCleared);
                }
                Ok(())
            }
        }
    }

    pub fn play(&self) -> Result<()> {
        log::info!("play called");
        self.with_engine("play", (), |engine| engine.play())
    }

    pub fn pause(&self) -> Result<()> {
        log::info!("pause called");
        self.with_engine("pause", (), |engine| engine.pause())
    }

    pub fn stop(&self) -> Result<()> {
        log::info!("stop called");
        self.with_engine("stop", (), |engine| engine.stop())
    }

    /// Seek to `time_ms`. Silently ignored when the media isn't seekable.
    pub fn set_time(&self, time_ms: i64) -> Result<()> {
        self.with_engine("set_time", (), |engine| {
            if !engine.is_seekable()? {
                log::debug!("set_time {} ignored: media not seekable", time_ms);
                return Ok(());
            }
            log::info!("set_time -> {} ms", time_ms);
            engine.set_time(time_ms)
        })
    }

    /// Elapsed time in milliseconds, as the engine reports it
    pub fn time(&self) -> Result<i64> {
        self.with_engine("time", -1, |engine| engine.time())
    }

    /// Media length in milliseconds; negative when unknown (live streams)
    pub fn length(&self) -> Result<i64> {
        self.with_engine("length", -1, |engine| engine.length())
    }

    pub fn is_playing(&self) -> Result<bool> {
        self.with_engine("is_playing", false, |engine| engine.is_playing())
    }

    pub fn set_volume(&self, volume: i32) -> Result<()> {
        log::debug!("set_volume -> {}", volume);
        self.with_engine("set_volume", (), |engine| engine.set_volume(volume))
    }

    pub fn set_aspect_ratio(&self, aspect_ratio: Option<&str>) -> Result<()> {
        log::debug!("set_aspect_ratio -> {:?}", aspect_ratio);
        self.with_engine("set_aspect_ratio", (), |engine| {
            engine.set_aspect_ratio(aspect_ratio)
        })
    }

    pub fn set_scale(&self, scale: f32) -> Result<()> {
        log::debug!("set_scale -> {}", scale);
        self.with_engine("set_scale", (), |engine| engine.set_scale(scale))
    }

    /// Bind local rendering surfaces. Any selected remote renderer is
    /// forgotten: local output means no renderer is active.
    pub fn attach_surfaces(
        &self,
        media_surface: E::Surface,
        subtitle_surface: E::Surface,
        layout_listener: E::LayoutListener,
    ) -> Result<()> {
        log::info!("attach_surfaces called");
        *self.selected_renderer.lock() = None;
        self.with_engine("attach_surfaces", (), |engine| {
            engine.attach_views(media_surface, subtitle_surface, layout_listener)?;
            self.surfaces_attached.store(true, Ordering::SeqCst);
            Ok(())
        })
    }

    /// Release surface bindings. The selected renderer is left alone.
    pub fn detach_surfaces(&self) -> Result<()> {
        log::info!("detach_surfaces called");
        self.with_engine("detach_surfaces", (), |engine| {
            engine.detach_views()?;
            self.surfaces_attached.store(false, Ordering::SeqCst);
            Ok(())
        })
    }

    pub fn surfaces_attached(&self) -> bool {
        self.surfaces_attached.load(Ordering::SeqCst)
    }

    /// Select a remote renderer, or clear the selection with `None`
    pub fn set_renderer(&self, renderer: Option<E::Renderer>) -> Result<()> {
        log::info!(
            "set_renderer: {}",
            if renderer.is_some() { "remote" } else { "none" }
        );
        self.with_engine("set_renderer", (), |engine| {
            *self.selected_renderer.lock() = renderer.clone();
            engine.set_renderer(renderer.as_ref())
        })
    }

    pub fn selected_renderer(&self) -> Option<E::Renderer> {
        self.selected_renderer.lock().clone()
    }

    /// Register the observer, replacing any previous one. `None` unregisters.
    pub fn set_callback(&self, callback: Option<Arc<dyn PlayerCallback>>) {
        log::info!(
            "set_callback: {}",
            if callback.is_some() { "registered" } else { "cleared" }
        );
        self.callbacks.set(callback);
    }

    pub fn has_callback(&self) -> bool {
        self.callbacks.is_set()
    }

    pub fn current_video_track(&self) -> Result<Option<VideoTrack>> {
        self.with_engine("current_video_track", None, |engine| {
            engine.current_video_track()
        })
    }

    pub fn has_media(&self) -> Result<bool> {
        self.with_engine("has_media", false, |engine| engine.has_media())
    }

    /// Release the engine. Once it succeeds, later calls (including another
    /// `release`) do nothing. A failed release leaves the facade live so it
    /// can be retried, and `Drop` retries it.
    pub fn release(&self) -> Result<()> {
        let mut engine = self.engine.lock();
        if self.released.load(Ordering::SeqCst) {
            log::debug!("release: already released");
            return Ok(());
        }

        log::info!("release called");
        engine.release()?;

        self.released.store(true, Ordering::SeqCst);
        self.callbacks.set(None);
        *self.selected_renderer.lock() = None;
        self.surfaces_attached.store(false, Ordering::SeqCst);
        Ok(())
    }

    pub fn is_released(&self) -> bool {
        self.released.load(Ordering::SeqCst)
    }
}

impl<E: MediaEngine> Drop for PlaybackFacade<E> {
    fn drop(&mut self) {
        if !self.is_released() {
            if let Err(e) = self.release() {
                log::error!("Failed to release player on drop: {}", e);
            }
        }
    }
}

// Playback engine abstraction layer

use crate::callback::EventRelay;
use crate::error::Result;
use crate::media::{MediaSource, VideoTrack};

/// Native playback engine trait
/// Platform bindings (libVLC over JNI on Android) implement this trait.
/// The facade never validates arguments; legality and ranges are the engine's call.
pub trait MediaEngine: Send {
    /// Rendering target for video or subtitles
    type Surface: Send;

    /// Receiver of video layout changes
    type LayoutListener: Send;

    /// Opaque identity of a remote renderer (cast target)
    type Renderer: Clone + Send;

    /// Start emitting player events. Called once, from `PlaybackFacade::new`.
    ///
    /// Events may be dispatched on `relay` directly, or handed to a binding
    /// that dispatches them on `PlaybackFacade::event_relay`; both reach the
    /// same observer. Engines of the second kind can ignore `relay`.
    /// On error the facade releases the engine.
    fn subscribe(&mut self, relay: EventRelay) -> Result<()>;

    /// Bind a media source, replacing the current one.
    /// The engine-side media object is released once bound.
    fn set_media(&mut self, source: &MediaSource) -> Result<()>;

    /// Attach a subtitle slave track and select it
    fn add_subtitle_slave(&mut self, location: &str) -> Result<()>;

    /// Number of slave tracks on the current media (0 when no media is bound)
    fn subtitle_slave_count(&self) -> Result<usize>;

    fn play(&mut self) -> Result<()>;

    fn pause(&mut self) -> Result<()>;

    fn stop(&mut self) -> Result<()>;

    fn is_seekable(&self) -> Result<bool>;

    /// Seek to a time in milliseconds
    fn set_time(&mut self, time_ms: i64) -> Result<()>;

    /// Elapsed time in milliseconds
    fn time(&self) -> Result<i64>;

    /// Media length in milliseconds; -1 when unknown
    fn length(&self) -> Result<i64>;

    fn is_playing(&self) -> Result<bool>;

    fn set_volume(&mut self, volume: i32) -> Result<()>;

    /// `None` restores the default aspect ratio
    fn set_aspect_ratio(&mut self, aspect_ratio: Option<&str>) -> Result<()>;

    fn set_scale(&mut self, scale: f32) -> Result<()>;

    /// Bind video output to local surfaces
    fn attach_views(
        &mut self,
        media_surface: Self::Surface,
        subtitle_surface: Self::Surface,
        layout_listener: Self::LayoutListener,
    ) -> Result<()>;

    fn detach_views(&mut self) -> Result<()>;

    /// Route output to a remote renderer, or back to local output with `None`
    fn set_renderer(&mut self, renderer: Option<&Self::Renderer>) -> Result<()>;

    fn current_video_track(&self) -> Result<Option<VideoTrack>>;

    fn has_media(&self) -> Result<bool>;

    /// Release the player and then the engine context
    fn release(&mut self) -> Result<()>;
}

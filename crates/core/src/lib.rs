// Core types and traits for the libVLC playback facade

pub mod callback;
pub mod engine;
pub mod error;
pub mod event;
pub mod media;
pub mod player;

#[cfg(test)]
mod testing;

// Re-export commonly used types
pub use callback::{CallbackEvent, CallbackSlot, EventRelay, PlayerCallback};
pub use engine::MediaEngine;
pub use error::{PlayerError, Result};
pub use event::EngineEvent;
pub use media::{MediaSource, VideoTrack};
pub use player::PlaybackFacade;

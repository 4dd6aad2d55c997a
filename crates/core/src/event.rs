// Engine-side player events and their mapping onto observer callbacks

use crate::callback::CallbackEvent;

/// Raw libVLC media player event codes (`libvlc_event_type_t`)
pub mod codes {
    pub const MEDIA_CHANGED: i32 = 0x100;
    pub const OPENING: i32 = 0x102;
    pub const BUFFERING: i32 = 0x103;
    pub const PLAYING: i32 = 0x104;
    pub const PAUSED: i32 = 0x105;
    pub const STOPPED: i32 = 0x106;
    pub const END_REACHED: i32 = 0x109;
    pub const ENCOUNTERED_ERROR: i32 = 0x10a;
    pub const TIME_CHANGED: i32 = 0x10b;
    pub const POSITION_CHANGED: i32 = 0x10c;
    pub const SEEKABLE_CHANGED: i32 = 0x10d;
    pub const PAUSABLE_CHANGED: i32 = 0x10e;
    pub const LENGTH_CHANGED: i32 = 0x111;
    pub const VOUT: i32 = 0x112;
}

/// Event emitted by the playback engine
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EngineEvent {
    Opening,
    SeekableChanged { seekable: bool },
    Playing,
    Paused,
    Stopped,
    EndReached,
    EncounteredError,
    TimeChanged { time_ms: i64 },
    PositionChanged { position: f32 },
    Buffering { percent: f32 },
    /// Any event kind the facade does not relay, keyed by its raw code
    Other(i32),
}

impl EngineEvent {
    /// Decode a libVLC event from its `(type, arg1, arg2)` triple.
    ///
    /// libVLC packs every payload into the two args: time and the seekable
    /// flag travel in `arg1`, position and buffering percent in `arg2`.
    pub fn from_raw(kind: i32, arg1: i64, arg2: f32) -> Self {
        match kind {
            codes::OPENING => EngineEvent::Opening,
            codes::SEEKABLE_CHANGED => EngineEvent::SeekableChanged { seekable: arg1 != 0 },
            codes::PLAYING => EngineEvent::Playing,
            codes::PAUSED => EngineEvent::Paused,
            codes::STOPPED => EngineEvent::Stopped,
            codes::END_REACHED => EngineEvent::EndReached,
            codes::ENCOUNTERED_ERROR => EngineEvent::EncounteredError,
            codes::TIME_CHANGED => EngineEvent::TimeChanged { time_ms: arg1 },
            codes::POSITION_CHANGED => EngineEvent::PositionChanged { position: arg2 },
            codes::BUFFERING => EngineEvent::Buffering { percent: arg2 },
            other => EngineEvent::Other(other),
        }
    }

    /// The observer callback this event maps to, if any.
    pub fn to_callback_event(&self) -> Option<CallbackEvent> {
        match *self {
            EngineEvent::Opening => Some(CallbackEvent::Opening),
            EngineEvent::SeekableChanged { seekable } => {
                Some(CallbackEvent::SeekStateChanged { seekable })
            }
            EngineEvent::Playing => Some(CallbackEvent::Playing),
            EngineEvent::Paused => Some(CallbackEvent::Paused),
            EngineEvent::Stopped => Some(CallbackEvent::Stopped),
            EngineEvent::EndReached => Some(CallbackEvent::EndReached),
            EngineEvent::EncounteredError => Some(CallbackEvent::Error),
            EngineEvent::TimeChanged { time_ms } => Some(CallbackEvent::TimeChanged { time_ms }),
            EngineEvent::PositionChanged { position } => {
                Some(CallbackEvent::PositionChanged { position })
            }
            EngineEvent::Buffering { percent } => Some(CallbackEvent::Buffering { percent }),
            EngineEvent::Other(_) => None,
        }
    }
}

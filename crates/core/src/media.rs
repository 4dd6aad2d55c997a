// Media sources and track descriptions

use std::fmt;

/// Where the engine should read media from.
///
/// The facade hands the source to the engine and keeps nothing afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaSource {
    /// A location the engine can resolve (file path, `file://`, `http://`, `content://`, ...)
    Location(String),
    /// An already-open file descriptor
    Descriptor(i32),
}

impl MediaSource {
    pub fn location(location: impl Into<String>) -> Self {
        MediaSource::Location(location.into())
    }

    pub fn descriptor(fd: i32) -> Self {
        MediaSource::Descriptor(fd)
    }

    /// Location string the engine understands for this source.
    /// Descriptors use VLC's `fd://` access.
    pub fn to_location(&self) -> String {
        match self {
            MediaSource::Location(location) => location.clone(),
            MediaSource::Descriptor(fd) => format!("fd://{}", fd),
        }
    }
}

impl fmt::Display for MediaSource {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            MediaSource::Location(location) => write!(f, "location {}", location),
            MediaSource::Descriptor(fd) => write!(f, "descriptor {}", fd),
        }
    }
}

/// Description of the video track currently being played
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct VideoTrack {
    pub width: u32,
    pub height: u32,
    /// Sample aspect ratio numerator
    pub sar_num: u32,
    /// Sample aspect ratio denominator
    pub sar_den: u32,
    pub frame_rate_num: u32,
    pub frame_rate_den: u32,
}

impl VideoTrack {
    /// Frames per second, if the engine reported a frame rate
    pub fn frame_rate(&self) -> Option<f64> {
        if self.frame_rate_den == 0 {
            None
        } else {
            Some(self.frame_rate_num as f64 / self.frame_rate_den as f64)
        }
    }
}

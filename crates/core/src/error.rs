// Error handling for the playback facade

use std::fmt;

/// Playback facade error types
///
/// The facade never produces these on its own; they come from the engine
/// binding underneath it and are passed through unchanged.
#[derive(Debug, Clone, PartialEq)]
pub enum PlayerError {
    /// The engine rejected or failed a command
    EngineError(String),

    /// A media source could not be turned into an engine media object
    InvalidSource(String),

    /// JNI call failed (Android bindings)
    JniError(String),

    /// No player is registered under this handle
    InvalidHandle(i64),

    /// Generic error
    Other(String),
}

impl fmt::Display for PlayerError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            PlayerError::EngineError(msg) => write!(f, "Engine error: {}", msg),
            PlayerError::InvalidSource(msg) => write!(f, "Invalid media source: {}", msg),
            PlayerError::JniError(msg) => write!(f, "JNI error: {}", msg),
            PlayerError::InvalidHandle(id) => write!(f, "Invalid player handle: {}", id),
            PlayerError::Other(msg) => write!(f, "Error: {}", msg),
        }
    }
}

impl std::error::Error for PlayerError {}

/// Result type alias for facade operations
pub type Result<T> = std::result::Result<T, PlayerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_context() {
        let err = PlayerError::InvalidHandle(42);
        assert_eq!(err.to_string(), "Invalid player handle: 42");

        let err = PlayerError::JniError("class not found".into());
        assert_eq!(err.to_string(), "JNI error: class not found");
    }
}

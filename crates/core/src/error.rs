// Error handling for the playback session and media engines

use std::fmt;

/// Player error types
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AudioError {
    /// The engine could not load or prepare the requested source
    Source(String),

    /// The requested locator is empty or malformed
    InvalidUrl(String),

    /// Operation not allowed in the current state
    InvalidState(String),

    /// The session or engine has already been released
    Released,

    /// Network error (connect, status, body read)
    Network(String),

    /// Decoding error
    Decoding(String),

    /// Audio format not supported
    UnsupportedFormat(String),

    /// Output device error
    Device(String),

    /// IO error
    Io(String),

    /// JNI error (Android / JVM bindings)
    Jni(String),
}

impl fmt::Display for AudioError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AudioError::Source(msg) => write!(f, "Source error: {}", msg),
            AudioError::InvalidUrl(msg) => write!(f, "Invalid URL: {}", msg),
            AudioError::InvalidState(msg) => write!(f, "Invalid state: {}", msg),
            AudioError::Released => write!(f, "Player already released"),
            AudioError::Network(msg) => write!(f, "Network error: {}", msg),
            AudioError::Decoding(msg) => write!(f, "Decoding error: {}", msg),
            AudioError::UnsupportedFormat(msg) => write!(f, "Unsupported format: {}", msg),
            AudioError::Device(msg) => write!(f, "Device error: {}", msg),
            AudioError::Io(msg) => write!(f, "IO error: {}", msg),
            AudioError::Jni(msg) => write!(f, "JNI error: {}", msg),
        }
    }
}

impl std::error::Error for AudioError {}

/// Result type alias for player operations
pub type Result<T> = std::result::Result<T, AudioError>;

impl From<std::io::Error> for AudioError {
    fn from(err: std::io::Error) -> Self {
        AudioError::Io(err.to_string())
    }
}

// Session configuration

use crate::engine::StreamType;

/// Settings applied by the session to its engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Loop the track when it ends; a track is played once by default
    pub looping: bool,
    /// Audio stream the engine output is routed to
    pub stream_type: StreamType,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            looping: false,
            stream_type: StreamType::Music,
        }
    }
}

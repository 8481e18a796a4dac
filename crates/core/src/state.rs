// Playback session state

use std::fmt;

/// Session state
///
/// Holds the locator of the one track associated with the session, if any.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionState {
    /// Nothing loaded
    #[default]
    Idle,
    /// Source handed to the engine, waiting for the prepared signal
    Preparing(String),
    /// Engine is producing output
    Playing(String),
}

impl SessionState {
    /// Locator of the active track
    pub fn url(&self) -> Option<&str> {
        match self {
            SessionState::Idle => None,
            SessionState::Preparing(url) | SessionState::Playing(url) => Some(url),
        }
    }

    /// Whether a track is associated with the session (preparing or playing)
    pub fn is_active(&self) -> bool {
        !matches!(self, SessionState::Idle)
    }

    pub fn is_playing(&self) -> bool {
        matches!(self, SessionState::Playing(_))
    }

    /// True when the session is preparing exactly `url`
    pub fn is_preparing(&self, url: &str) -> bool {
        matches!(self, SessionState::Preparing(current) if current == url)
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SessionState::Idle => write!(f, "Idle"),
            SessionState::Preparing(url) => write!(f, "Preparing({})", url),
            SessionState::Playing(url) => write!(f, "Playing({})", url),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_idle() {
        let state = SessionState::default();
        assert_eq!(state, SessionState::Idle);
        assert!(!state.is_active());
        assert_eq!(state.url(), None);
    }

    #[test]
    fn test_preparing_matches_only_its_url() {
        let state = SessionState::Preparing("http://a/1.mp3".into());
        assert!(state.is_active());
        assert!(!state.is_playing());
        assert!(state.is_preparing("http://a/1.mp3"));
        assert!(!state.is_preparing("http://a/2.mp3"));
    }

    #[test]
    fn test_display() {
        assert_eq!(SessionState::Playing("x".into()).to_string(), "Playing(x)");
        assert_eq!(SessionState::Idle.to_string(), "Idle");
    }
}

// Player configuration

use musicplayer_core::SessionConfig;
use musicplayer_transport_http::HttpConfig;

/// Song played when the user leaves the URL field empty
pub const DEFAULT_SONG_URL: &str = "http://www.dre.vanderbilt.edu/~schmidt/braincandy.m4a";

/// Top-level settings for the service and its controller
#[derive(Debug, Clone)]
pub struct PlayerConfig {
    pub default_url: String,
    /// Tag shown in the platform log (logcat on Android)
    pub log_tag: String,
    pub log_level: log::LevelFilter,
    pub session: SessionConfig,
    pub http: HttpConfig,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            default_url: DEFAULT_SONG_URL.to_string(),
            log_tag: "MusicPlayer".to_string(),
            log_level: log::LevelFilter::Debug,
            session: SessionConfig::default(),
            http: HttpConfig::default(),
        }
    }
}

// Music service: lifecycle adapter around a playback session, plus the
// presentation-side controller that feeds it

pub mod config;
pub mod controller;
pub mod intent;
pub mod logging;
pub mod service;

pub use config::{PlayerConfig, DEFAULT_SONG_URL};
pub use controller::{resolve_song_url, PlayerController, NOTHING_PLAYING_MESSAGE};
pub use intent::{make_intent, PlayIntent, ACTION_PLAY};
pub use logging::init_logging;
pub use service::{streaming_engine_factory, EngineFactory, MusicService, StartMode};

// Core types for the music player: session state machine and engine capability

pub mod callback;
pub mod config;
pub mod engine;
pub mod error;
pub mod session;
pub mod state;

#[cfg(any(test, feature = "test-support"))]
pub mod testing;

// Re-export commonly used types
pub use callback::{CallbackManager, SessionCallback, SessionEvent};
pub use config::SessionConfig;
pub use engine::{ErrorCallback, MediaEngine, PreparedCallback, StreamType};
pub use error::{AudioError, Result};
pub use session::{PlaybackSession, StopOutcome};
pub use state::SessionState;

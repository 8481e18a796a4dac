// Media engine capability
// All platform-specific engines implement this trait

use crate::error::{AudioError, Result};

/// Signal delivered by the engine when asynchronous preparation finishes.
///
/// `Ok(())` means the engine is ready to `start`; an `Err` is a source failure.
pub type PreparedCallback = Box<dyn FnOnce(Result<()>) + Send + 'static>;

/// Listener for a failure after `start` (the stream dropped, the output
/// device went away). Fires at most once per start.
pub type ErrorCallback = Box<dyn FnOnce(AudioError) + Send + 'static>;

/// Audio stream the engine output is routed to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StreamType {
    #[default]
    Music,
    Alarm,
    Notification,
    VoiceCall,
}

/// Media engine trait
///
/// The session serializes every call under its own lock, so implementations
/// never see concurrent calls from one session. `prepare_async` must return
/// before the prepared signal is delivered: the signal runs on a context owned
/// by the engine and takes the session lock.
pub trait MediaEngine: Send {
    /// Route output to the given audio stream
    fn set_audio_stream_type(&mut self, stream_type: StreamType) -> Result<()>;

    /// Set the locator of the track to play
    fn set_source(&mut self, url: &str) -> Result<()>;

    /// Begin preparing the source without blocking the caller
    fn prepare_async(&mut self, on_prepared: PreparedCallback) -> Result<()>;

    /// Install the listener for failures of the next `start`, replacing any
    /// previous one. Like the prepared signal it is never invoked from inside
    /// an engine call.
    fn set_on_error(&mut self, on_error: ErrorCallback);

    /// Start output of a prepared source
    fn start(&mut self) -> Result<()>;

    /// Stop output (blocking until the engine has stopped)
    fn stop(&mut self) -> Result<()>;

    /// Return to the uninitialized state, dropping the source
    fn reset(&mut self) -> Result<()>;

    fn set_looping(&mut self, looping: bool) -> Result<()>;

    /// Release all resources; the engine is unusable afterwards
    fn release(&mut self) -> Result<()>;
}

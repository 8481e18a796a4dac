// Playback session: serialized play/stop lifecycle over one media engine

use crate::callback::{CallbackManager, SessionCallback, SessionEvent};
use crate::config::SessionConfig;
use crate::engine::{ErrorCallback, MediaEngine, PreparedCallback};
use crate::error::{AudioError, Result};
use crate::state::SessionState;
use parking_lot::Mutex;
use std::sync::{Arc, Weak};

/// Result of a stop request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopOutcome {
    /// The active track was stopped and the engine reset
    Stopped,
    /// Nothing was loaded; the engine was not touched
    NothingPlaying,
}

struct SessionInner {
    state: SessionState,
    engine: Box<dyn MediaEngine>,
    config: SessionConfig,
    /// Identifies the current preparation; bumped whenever it is superseded
    token: u64,
    released: bool,
}

impl SessionInner {
    fn ensure_alive(&self) -> Result<()> {
        if self.released {
            Err(AudioError::Released)
        } else {
            Ok(())
        }
    }

    fn set_state(&mut self, new_state: SessionState, events: &mut Vec<SessionEvent>) {
        if self.state == new_state {
            return;
        }
        let old_state = std::mem::replace(&mut self.state, new_state.clone());
        log::debug!("[session] state {} -> {}", old_state, new_state);
        events.push(SessionEvent::StateChanged {
            old_state,
            new_state,
        });
    }

    /// Stop and reset the engine if a track is loaded, then go idle.
    fn halt(&mut self, events: &mut Vec<SessionEvent>) -> Result<()> {
        self.token = self.token.wrapping_add(1);
        if !self.state.is_active() {
            return Ok(());
        }

        log::info!("[session] stopping {}", self.state);
        let stopped = self.engine.stop();
        let reset = self.engine.reset();
        self.set_state(SessionState::Idle, events);
        stopped.and(reset)
    }

    fn fail_source(&mut self, url: &str, err: &AudioError, events: &mut Vec<SessionEvent>) {
        log::error!("[session] failed to play {}: {}", url, err);
        self.token = self.token.wrapping_add(1);
        if let Err(reset_err) = self.engine.reset() {
            log::warn!("[session] reset after source failure failed: {}", reset_err);
        }
        self.set_state(SessionState::Idle, events);
        events.push(SessionEvent::SourceError {
            url: url.to_string(),
            message: err.to_string(),
        });
    }

    fn on_prepared(
        &mut self,
        token: u64,
        url: &str,
        result: Result<()>,
        on_error: ErrorCallback,
        events: &mut Vec<SessionEvent>,
    ) {
        if self.released || token != self.token || !self.state.is_preparing(url) {
            log::debug!(
                "[session] ignoring stale prepared signal for {} (state {})",
                url,
                self.state
            );
            return;
        }

        log::info!("[session] prepared {}", url);
        let looping = self.config.looping;
        let started = result.and_then(|()| {
            self.engine.set_looping(looping)?;
            self.engine.set_on_error(on_error);
            self.set_state(SessionState::Playing(url.to_string()), events);
            self.engine.start()
        });

        if let Err(err) = started {
            self.fail_source(url, &err, events);
        }
    }

    fn on_playback_error(
        &mut self,
        token: u64,
        url: &str,
        err: AudioError,
        events: &mut Vec<SessionEvent>,
    ) {
        let playing = SessionState::Playing(url.to_string());
        if self.released || token != self.token || self.state != playing {
            log::debug!("[session] ignoring stale playback error for {}: {}", url, err);
            return;
        }
        self.fail_source(url, &err, events);
    }
}

/// Playback session
///
/// Owns the current state and the single engine handle. Requests come from the
/// presentation side; the prepared signal arrives on a context owned by the
/// engine. Both take the same lock, so engine calls are never concurrent.
/// Dropping the session tears it down.
pub struct PlaybackSession {
    inner: Arc<Mutex<SessionInner>>,
    callbacks: Arc<CallbackManager>,
}

impl PlaybackSession {
    /// Create a session around a freshly constructed engine.
    pub fn new(mut engine: Box<dyn MediaEngine>, config: SessionConfig) -> Result<Self> {
        log::info!("[session] created (stream type {:?})", config.stream_type);
        engine.set_audio_stream_type(config.stream_type)?;

        Ok(Self {
            inner: Arc::new(Mutex::new(SessionInner {
                state: SessionState::Idle,
                engine,
                config,
                token: 0,
                released: false,
            })),
            callbacks: Arc::new(CallbackManager::new()),
        })
    }

    pub fn add_callback(&self, callback: Arc<dyn SessionCallback>) {
        self.callbacks.add_callback(callback);
    }

    pub fn state(&self) -> SessionState {
        self.inner.lock().state.clone()
    }

    pub fn is_playing(&self) -> bool {
        self.inner.lock().state.is_playing()
    }

    pub fn is_released(&self) -> bool {
        self.inner.lock().released
    }

    /// Play `url`, replacing whatever is loaded.
    ///
    /// A source the engine rejects is reported through
    /// [`SessionEvent::SourceError`] and leaves the session idle; only an
    /// empty locator or a released session is returned as an error.
    pub fn request_play(&self, url: &str) -> Result<()> {
        if url.is_empty() {
            return Err(AudioError::InvalidUrl("empty locator".to_string()));
        }

        let mut events = Vec::new();
        {
            let mut inner = self.inner.lock();
            inner.ensure_alive()?;

            if inner.state.is_active() {
                if let Err(err) = inner.halt(&mut events) {
                    log::warn!("[session] stopping previous track failed: {}", err);
                }
            }

            inner.token = inner.token.wrapping_add(1);
            let token = inner.token;
            inner.set_state(SessionState::Preparing(url.to_string()), &mut events);

            log::info!("[session] preparing {}", url);
            let signal = self.prepared_signal(token, url);
            let loaded = match inner.engine.set_source(url) {
                Ok(()) => inner.engine.prepare_async(signal),
                Err(err) => Err(err),
            };

            if let Err(err) = loaded {
                inner.fail_source(url, &err, &mut events);
            }
        }

        self.callbacks.dispatch_all(events);
        Ok(())
    }

    /// Stop the active track. Stopping an idle session is informational only.
    pub fn request_stop(&self) -> Result<StopOutcome> {
        let mut events = Vec::new();
        let outcome = {
            let mut inner = self.inner.lock();
            inner.ensure_alive()?;

            if inner.state.is_active() {
                inner.halt(&mut events).map(|()| StopOutcome::Stopped)
            } else {
                log::info!("[session] stop requested but nothing is playing");
                events.push(SessionEvent::NothingPlaying);
                Ok(StopOutcome::NothingPlaying)
            }
        };

        self.callbacks.dispatch_all(events);
        outcome
    }

    /// Stop anything loaded and release the engine. Later calls do nothing.
    pub fn teardown(&self) -> Result<()> {
        let mut events = Vec::new();
        let result = {
            let mut inner = self.inner.lock();
            if inner.released {
                return Ok(());
            }

            log::info!("[session] teardown");
            let halted = inner.halt(&mut events);
            let released = inner.engine.release();
            inner.released = true;
            events.push(SessionEvent::Released);
            halted.and(released)
        };

        self.callbacks.dispatch_all(events);
        result
    }

    fn prepared_signal(&self, token: u64, url: &str) -> PreparedCallback {
        let inner: Weak<Mutex<SessionInner>> = Arc::downgrade(&self.inner);
        let callbacks = Arc::clone(&self.callbacks);
        let url = url.to_string();

        Box::new(move |result| {
            let Some(strong) = inner.upgrade() else {
                log::debug!("[session] prepared signal for {} after session drop", url);
                return;
            };

            let on_error = error_signal(inner, callbacks.clone(), token, url.clone());
            let mut events = Vec::new();
            strong
                .lock()
                .on_prepared(token, &url, result, on_error, &mut events);
            callbacks.dispatch_all(events);
        })
    }
}

/// Listener for a failure of the playback started under `token`
fn error_signal(
    inner: Weak<Mutex<SessionInner>>,
    callbacks: Arc<CallbackManager>,
    token: u64,
    url: String,
) -> ErrorCallback {
    Box::new(move |err| {
        let Some(inner) = inner.upgrade() else {
            return;
        };

        let mut events = Vec::new();
        inner.lock().on_playback_error(token, &url, err, &mut events);
        callbacks.dispatch_all(events);
    })
}

impl Drop for PlaybackSession {
    fn drop(&mut self) {
        if let Err(err) = self.teardown() {
            log::warn!("[session] teardown on drop failed: {}", err);
        }
    }
}

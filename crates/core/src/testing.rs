// Test doubles: a scripted engine that records every call, and a recording callback

use crate::callback::{SessionCallback, SessionEvent};
use crate::engine::{ErrorCallback, MediaEngine, PreparedCallback, StreamType};
use crate::error::{AudioError, Result};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;

/// Locators with this prefix are rejected by `MockEngine::set_source`
pub const REJECTED_SCHEME: &str = "bad://";

/// One call made on the engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineCall {
    SetStreamType(StreamType),
    SetSource(String),
    PrepareAsync,
    Start,
    Stop,
    Reset,
    SetLooping(bool),
    Release,
}

#[derive(Default)]
struct MockShared {
    calls: Vec<EngineCall>,
    pending: VecDeque<PreparedCallback>,
    on_error: Option<ErrorCallback>,
    source: Option<String>,
    playing: Option<String>,
    started: Vec<String>,
    overlapping_start: bool,
}

/// Engine that never produces audio; prepared signals are fired by the test
pub struct MockEngine {
    shared: Arc<Mutex<MockShared>>,
}

/// Test-side view of a [`MockEngine`] that has been moved into a session
#[derive(Clone)]
pub struct MockHandle {
    shared: Arc<Mutex<MockShared>>,
}

impl MockEngine {
    pub fn new() -> (Self, MockHandle) {
        let shared = Arc::new(Mutex::new(MockShared::default()));
        (
            Self {
                shared: shared.clone(),
            },
            MockHandle { shared },
        )
    }

    fn record(&self, call: EngineCall) {
        self.shared.lock().calls.push(call);
    }
}

impl MediaEngine for MockEngine {
    fn set_audio_stream_type(&mut self, stream_type: StreamType) -> Result<()> {
        self.record(EngineCall::SetStreamType(stream_type));
        Ok(())
    }

    fn set_source(&mut self, url: &str) -> Result<()> {
        let mut shared = self.shared.lock();
        shared.calls.push(EngineCall::SetSource(url.to_string()));
        if url.starts_with(REJECTED_SCHEME) {
            return Err(AudioError::Source(format!("unsupported locator: {}", url)));
        }
        shared.source = Some(url.to_string());
        Ok(())
    }

    fn prepare_async(&mut self, on_prepared: PreparedCallback) -> Result<()> {
        let mut shared = self.shared.lock();
        shared.calls.push(EngineCall::PrepareAsync);
        if shared.source.is_none() {
            return Err(AudioError::InvalidState("prepare without source".into()));
        }
        // Kept even across reset so tests can deliver late signals
        shared.pending.push_back(on_prepared);
        Ok(())
    }

    fn set_on_error(&mut self, on_error: ErrorCallback) {
        self.shared.lock().on_error = Some(on_error);
    }

    fn start(&mut self) -> Result<()> {
        let mut shared = self.shared.lock();
        shared.calls.push(EngineCall::Start);
        let source = shared
            .source
            .clone()
            .ok_or_else(|| AudioError::InvalidState("start without source".into()))?;
        if shared.playing.is_some() {
            shared.overlapping_start = true;
        }
        shared.started.push(source.clone());
        shared.playing = Some(source);
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        let mut shared = self.shared.lock();
        shared.calls.push(EngineCall::Stop);
        shared.playing = None;
        Ok(())
    }

    fn reset(&mut self) -> Result<()> {
        let mut shared = self.shared.lock();
        shared.calls.push(EngineCall::Reset);
        shared.playing = None;
        shared.source = None;
        Ok(())
    }

    fn set_looping(&mut self, looping: bool) -> Result<()> {
        self.record(EngineCall::SetLooping(looping));
        Ok(())
    }

    fn release(&mut self) -> Result<()> {
        let mut shared = self.shared.lock();
        shared.calls.push(EngineCall::Release);
        shared.playing = None;
        shared.source = None;
        Ok(())
    }
}

impl MockHandle {
    pub fn calls(&self) -> Vec<EngineCall> {
        self.shared.lock().calls.clone()
    }

    /// Sources passed to `start`, in order
    pub fn started_sources(&self) -> Vec<String> {
        self.shared.lock().started.clone()
    }

    /// Source currently producing output
    pub fn playing(&self) -> Option<String> {
        self.shared.lock().playing.clone()
    }

    /// Whether `start` was ever called while another source was still playing
    pub fn overlapping_start(&self) -> bool {
        self.shared.lock().overlapping_start
    }

    /// Report a failure of the running playback through the installed
    /// listener. Returns false if none was installed.
    pub fn fail_playback(&self, err: AudioError) -> bool {
        let on_error = self.shared.lock().on_error.take();
        match on_error {
            Some(on_error) => {
                on_error(err);
                true
            }
            None => false,
        }
    }

    /// Deliver the oldest outstanding prepared signal. Returns false if none.
    pub fn fire_prepared(&self, result: Result<()>) -> bool {
        // Taken out first: the signal locks the session, which may call back in here
        let next = self.shared.lock().pending.pop_front();
        match next {
            Some(signal) => {
                signal(result);
                true
            }
            None => false,
        }
    }

    /// Deliver every outstanding prepared signal in order
    pub fn fire_all_prepared(&self, mut result: impl FnMut() -> Result<()>) {
        while self.fire_prepared(result()) {}
    }
}

/// Callback that stores every event it receives
pub struct RecordingCallback {
    events: Mutex<Vec<SessionEvent>>,
}

impl RecordingCallback {
    pub fn new() -> Self {
        Self {
            events: Mutex::new(Vec::new()),
        }
    }

    pub fn get_events(&self) -> Vec<SessionEvent> {
        self.events.lock().clone()
    }

    pub fn clear(&self) {
        self.events.lock().clear();
    }
}

impl Default for RecordingCallback {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionCallback for RecordingCallback {
    fn on_event(&self, event: SessionEvent) {
        self.events.lock().push(event);
    }
}

// Session event notification
// Listeners are invoked after the session lock is released, so they may call back into the session

use crate::state::SessionState;
use parking_lot::Mutex;
use std::sync::Arc;

/// Session event types
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// Session state changed
    StateChanged {
        old_state: SessionState,
        new_state: SessionState,
    },

    /// Stop was requested while nothing was loaded
    NothingPlaying,

    /// The engine rejected a source or lost it while playing; the session is back to idle
    SourceError { url: String, message: String },

    /// The engine handle has been released
    Released,
}

/// Session callback trait
/// Implementations should be lightweight and non-blocking
pub trait SessionCallback: Send + Sync {
    fn on_event(&self, event: SessionEvent);
}

/// Fan-out of session events to every registered callback
pub struct CallbackManager {
    callbacks: Mutex<Vec<Arc<dyn SessionCallback>>>,
}

impl CallbackManager {
    pub fn new() -> Self {
        Self {
            callbacks: Mutex::new(Vec::new()),
        }
    }

    pub fn add_callback(&self, callback: Arc<dyn SessionCallback>) {
        self.callbacks.lock().push(callback);
    }

    pub fn dispatch_event(&self, event: SessionEvent) {
        // Snapshot so a listener can register another one without deadlocking
        let callbacks = self.callbacks.lock().clone();
        for callback in callbacks.iter() {
            callback.on_event(event.clone());
        }
    }

    pub fn dispatch_all(&self, events: Vec<SessionEvent>) {
        for event in events {
            self.dispatch_event(event);
        }
    }
}

impl Default for CallbackManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingCallback;

    #[test]
    fn test_dispatch_reaches_every_callback() {
        let manager = CallbackManager::new();
        let first = Arc::new(RecordingCallback::new());
        let second = Arc::new(RecordingCallback::new());
        manager.add_callback(first.clone());
        manager.add_callback(second.clone());

        manager.dispatch_event(SessionEvent::NothingPlaying);

        assert_eq!(first.get_events(), vec![SessionEvent::NothingPlaying]);
        assert_eq!(second.get_events(), vec![SessionEvent::NothingPlaying]);
    }
}

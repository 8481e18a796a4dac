// Lifecycle adapter: maps platform service callbacks onto a PlaybackSession

use crate::intent::PlayIntent;
use musicplayer_core::{
    AudioError, MediaEngine, PlaybackSession, Result, SessionCallback, SessionConfig, StopOutcome,
};
use musicplayer_engine::StreamingEngine;
use musicplayer_transport_http::HttpConfig;
use std::sync::Arc;

/// Builds the engine when the service is activated
pub type EngineFactory = Box<dyn Fn() -> Result<Box<dyn MediaEngine>> + Send + Sync>;

/// What the platform should do if it kills the service after a request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartMode {
    /// Leave the service dead until the next explicit request
    NotSticky,
}

/// Factory producing the streaming engine with the platform's default output
pub fn streaming_engine_factory(http: HttpConfig) -> EngineFactory {
    Box::new(move || {
        Ok(Box::new(StreamingEngine::with_default_output(&http)) as Box<dyn MediaEngine>)
    })
}

/// Background music service
///
/// Holds at most one session. The platform drives it through the four
/// lifecycle triggers; requests before activation are rejected.
pub struct MusicService {
    session_config: SessionConfig,
    engine_factory: EngineFactory,
    session: Option<PlaybackSession>,
    callbacks: Vec<Arc<dyn SessionCallback>>,
}

impl MusicService {
    pub fn new(session_config: SessionConfig, engine_factory: EngineFactory) -> Self {
        Self {
            session_config,
            engine_factory,
            session: None,
            callbacks: Vec::new(),
        }
    }

    /// Register a listener; applies to the current and future sessions
    pub fn add_callback(&mut self, callback: Arc<dyn SessionCallback>) {
        if let Some(session) = &self.session {
            session.add_callback(callback.clone());
        }
        self.callbacks.push(callback);
    }

    pub fn session(&self) -> Option<&PlaybackSession> {
        self.session.as_ref()
    }

    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    /// Create the session and its engine. Does nothing if already active.
    pub fn on_activate(&mut self) -> Result<()> {
        if self.session.is_some() {
            return Ok(());
        }
        log::info!("[service] on_activate");

        let engine = (self.engine_factory)()?;
        let session = PlaybackSession::new(engine, self.session_config.clone())?;
        for callback in &self.callbacks {
            session.add_callback(callback.clone());
        }
        self.session = Some(session);
        Ok(())
    }

    /// Handle a play request
    pub fn on_request(&self, intent: &PlayIntent) -> Result<StartMode> {
        log::info!("[service] on_request {}", intent.data_string());
        if !intent.is_play() {
            return Err(AudioError::InvalidState(format!(
                "unsupported action {}",
                intent.action
            )));
        }

        self.active_session()?.request_play(intent.data_string())?;
        Ok(StartMode::NotSticky)
    }

    /// Handle a stop request
    pub fn on_deactivate_request(&self) -> Result<StopOutcome> {
        log::info!("[service] on_deactivate_request");
        self.active_session()?.request_stop()
    }

    /// Stop playback and release the engine. Safe to call more than once.
    pub fn on_teardown(&mut self) -> Result<()> {
        match self.session.take() {
            Some(session) => {
                log::info!("[service] on_teardown");
                session.teardown()
            }
            None => Ok(()),
        }
    }

    fn active_session(&self) -> Result<&PlaybackSession> {
        self.session
            .as_ref()
            .ok_or_else(|| AudioError::InvalidState("service is not active".to_string()))
    }
}

impl Drop for MusicService {
    fn drop(&mut self) {
        if let Err(err) = self.on_teardown() {
            log::warn!("[service] teardown on drop failed: {}", err);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intent::make_intent;
    use musicplayer_core::testing::{EngineCall, MockEngine, MockHandle};
    use musicplayer_core::SessionState;
    use parking_lot::Mutex;

    type HandleSlot = Arc<Mutex<Vec<MockHandle>>>;

    /// Service whose factory hands out mock engines; their handles land in the slot
    fn service() -> (MusicService, HandleSlot) {
        let slot: HandleSlot = Arc::new(Mutex::new(Vec::new()));
        let factory_slot = slot.clone();
        let factory: EngineFactory = Box::new(move || {
            let (engine, handle) = MockEngine::new();
            factory_slot.lock().push(handle);
            Ok(Box::new(engine) as Box<dyn MediaEngine>)
        });
        (MusicService::new(SessionConfig::default(), factory), slot)
    }

    fn engine(slot: &HandleSlot) -> MockHandle {
        slot.lock().last().cloned().expect("no engine created")
    }

    #[test]
    fn test_requests_before_activation_fail() {
        let (service, slot) = service();
        assert!(matches!(
            service.on_request(&make_intent("http://host/a.mp3")),
            Err(AudioError::InvalidState(_))
        ));
        assert!(matches!(
            service.on_deactivate_request(),
            Err(AudioError::InvalidState(_))
        ));
        assert!(slot.lock().is_empty());
    }

    #[test]
    fn test_activate_creates_engine_once() {
        let (mut service, slot) = service();
        service.on_activate().unwrap();
        service.on_activate().unwrap();

        assert_eq!(slot.lock().len(), 1);
        assert_eq!(service.session().map(|s| s.state()), Some(SessionState::Idle));
    }

    #[test]
    fn test_request_plays_intent_data() {
        let (mut service, slot) = service();
        service.on_activate().unwrap();

        let mode = service.on_request(&make_intent("http://host/a.mp3")).unwrap();
        engine(&slot).fire_prepared(Ok(()));

        assert_eq!(mode, StartMode::NotSticky);
        assert_eq!(
            service.session().unwrap().state(),
            SessionState::Playing("http://host/a.mp3".into())
        );
    }

    #[test]
    fn test_unknown_action_is_rejected() {
        let (mut service, slot) = service();
        service.on_activate().unwrap();
        let intent = PlayIntent {
            action: "musicplayer.action.PAUSE".into(),
            data: "http://host/a.mp3".into(),
        };

        assert!(service.on_request(&intent).is_err());
        assert!(!engine(&slot)
            .calls()
            .iter()
            .any(|c| matches!(c, EngineCall::SetSource(_))));
    }

    #[test]
    fn test_deactivate_maps_to_stop() {
        let (mut service, slot) = service();
        service.on_activate().unwrap();
        assert_eq!(
            service.on_deactivate_request().unwrap(),
            StopOutcome::NothingPlaying
        );

        service.on_request(&make_intent("http://host/a.mp3")).unwrap();
        assert_eq!(service.on_deactivate_request().unwrap(), StopOutcome::Stopped);
        assert!(engine(&slot).calls().contains(&EngineCall::Stop));
    }

    #[test]
    fn test_teardown_releases_and_allows_reactivation() {
        let (mut service, slot) = service();
        service.on_activate().unwrap();
        service.on_request(&make_intent("http://host/a.mp3")).unwrap();

        service.on_teardown().unwrap();
        service.on_teardown().unwrap();

        let first = engine(&slot);
        let releases = first
            .calls()
            .iter()
            .filter(|c| **c == EngineCall::Release)
            .count();
        assert_eq!(releases, 1);
        assert!(!service.is_active());

        service.on_activate().unwrap();
        assert_eq!(slot.lock().len(), 2);
    }

    #[test]
    fn test_drop_tears_down() {
        let (mut service, slot) = service();
        service.on_activate().unwrap();
        drop(service);

        assert_eq!(engine(&slot).calls().last(), Some(&EngineCall::Release));
    }
}

// Process-wide registry of service instances handed to Java as handles

use musicplayer_core::{AudioError, Result, SessionCallback};
use musicplayer_service::{init_logging, streaming_engine_factory, MusicService, PlayerConfig};
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

// Services are shared, not locked: every request path takes `&MusicService`,
// so a listener may call back into the service that raised the event.
static SERVICE_REGISTRY: Lazy<Mutex<HashMap<i64, Arc<MusicService>>>> =
    Lazy::new(|| Mutex::new(HashMap::new()));
static NEXT_SERVICE_ID: Lazy<Mutex<i64>> = Lazy::new(|| Mutex::new(1));

/// Store a service and return its handle
pub fn register_service(service: MusicService) -> i64 {
    let mut next = NEXT_SERVICE_ID.lock();
    let id = *next;
    *next += 1;
    drop(next);

    SERVICE_REGISTRY
        .lock()
        .insert(id, Arc::new(service));
    log::info!("[jni] service registered with id {}", id);
    id
}

/// Build and activate a streaming service (the platform's onCreate)
pub fn create_service(
    config: &PlayerConfig,
    callback: Option<Arc<dyn SessionCallback>>,
) -> Result<i64> {
    init_logging(config);

    let mut service = MusicService::new(
        config.session.clone(),
        streaming_engine_factory(config.http.clone()),
    );
    if let Some(callback) = callback {
        service.add_callback(callback);
    }
    service.on_activate()?;
    Ok(register_service(service))
}

/// Run `f` on a registered service.
///
/// No lock is held while `f` runs, so session events raised inside `f` may
/// call `with_service` again, for this service or another.
pub fn with_service<R>(id: i64, f: impl FnOnce(&MusicService) -> Result<R>) -> Result<R> {
    let service = SERVICE_REGISTRY
        .lock()
        .get(&id)
        .cloned()
        .ok_or_else(|| AudioError::InvalidState(format!("invalid service id {}", id)))?;
    f(&service)
}

/// Tear down and forget a service (the platform's onDestroy)
pub fn destroy_service(id: i64) -> Result<()> {
    let service = SERVICE_REGISTRY
        .lock()
        .remove(&id)
        .ok_or_else(|| AudioError::InvalidState(format!("invalid service id {}", id)))?;
    // Calls already in flight keep the service alive; its session is
    // released now and later requests on it fail with Released.
    let result = match service.session() {
        Some(session) => session.teardown(),
        None => Ok(()),
    };
    log::info!("[jni] service {} destroyed", id);
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use musicplayer_core::testing::{EngineCall, MockEngine, MockHandle};
    use musicplayer_core::{
        MediaEngine, SessionConfig, SessionEvent, SessionState, StopOutcome,
    };
    use musicplayer_service::{make_intent, StartMode};
    use std::sync::mpsc;
    use std::thread;
    use std::time::Duration;

    /// Listener that looks up the service's state on every state change,
    /// the way a UI refreshes from inside its event handler
    #[derive(Default)]
    struct StateReader {
        id: Mutex<Option<i64>>,
        seen: Mutex<Vec<Option<SessionState>>>,
    }

    impl SessionCallback for StateReader {
        fn on_event(&self, event: SessionEvent) {
            if !matches!(event, SessionEvent::StateChanged { .. }) {
                return;
            }
            let id = *self.id.lock();
            if let Some(id) = id {
                let state = with_service(id, |s| Ok(s.session().map(|x| x.state())));
                self.seen.lock().push(state.ok().flatten());
            }
        }
    }

    fn mock_service() -> (MusicService, Arc<Mutex<Option<MockHandle>>>) {
        let slot = Arc::new(Mutex::new(None));
        let factory_slot = slot.clone();
        let service = MusicService::new(
            SessionConfig::default(),
            Box::new(move || {
                let (engine, handle) = MockEngine::new();
                *factory_slot.lock() = Some(handle);
                Ok(Box::new(engine) as Box<dyn MediaEngine>)
            }),
        );
        (service, slot)
    }

    #[test]
    fn test_lifecycle_through_registry() {
        let (mut service, slot) = mock_service();
        service.on_activate().unwrap();
        let id = register_service(service);

        with_service(id, |s| s.on_request(&make_intent("http://host/a.mp3"))).unwrap();
        slot.lock().clone().unwrap().fire_prepared(Ok(()));

        let state = with_service(id, |s| Ok(s.session().map(|x| x.state()))).unwrap();
        assert_eq!(state, Some(SessionState::Playing("http://host/a.mp3".into())));

        assert_eq!(
            with_service(id, |s| s.on_deactivate_request()).unwrap(),
            StopOutcome::Stopped
        );

        destroy_service(id).unwrap();
        assert_eq!(
            slot.lock().clone().unwrap().calls().last(),
            Some(&EngineCall::Release)
        );
        assert!(with_service(id, |_| Ok(())).is_err());
        assert!(destroy_service(id).is_err());
    }

    #[test]
    fn test_ids_are_unique() {
        let (first, _) = mock_service();
        let (second, _) = mock_service();
        let a = register_service(first);
        let b = register_service(second);
        assert_ne!(a, b);
        destroy_service(a).unwrap();
        destroy_service(b).unwrap();
    }

    #[test]
    fn test_listener_can_query_service_during_request() {
        let (mut service, slot) = mock_service();
        let reader = Arc::new(StateReader::default());
        service.add_callback(reader.clone());
        service.on_activate().unwrap();
        let id = register_service(service);
        *reader.id.lock() = Some(id);

        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            let _ = tx.send(with_service(id, |s| {
                s.on_request(&make_intent("http://host/a.mp3"))
            }));
        });
        let mode = rx.recv_timeout(Duration::from_secs(3)).unwrap();
        assert_eq!(mode, Ok(StartMode::NotSticky));

        slot.lock().clone().unwrap().fire_prepared(Ok(()));
        assert_eq!(
            *reader.seen.lock(),
            vec![
                Some(SessionState::Preparing("http://host/a.mp3".into())),
                Some(SessionState::Playing("http://host/a.mp3".into())),
            ]
        );
        destroy_service(id).unwrap();
    }

    #[test]
    fn test_destroy_during_call_releases_session() {
        let (mut service, slot) = mock_service();
        service.on_activate().unwrap();
        let id = register_service(service);

        let result = with_service(id, |s| {
            destroy_service(id)?;
            s.on_request(&make_intent("http://host/a.mp3"))
        });

        assert_eq!(result, Err(AudioError::Released));
        assert_eq!(
            slot.lock().clone().unwrap().calls().last(),
            Some(&EngineCall::Release)
        );
    }
}

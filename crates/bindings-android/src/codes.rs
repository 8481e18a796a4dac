// Integer codes exchanged with the Java side

use musicplayer_core::{AudioError, Result, SessionEvent, SessionState, StopOutcome};
use musicplayer_service::StartMode;

/// Returned by every native call that failed
pub const ERROR: i32 = -1;

/// Value of android.app.Service.START_NOT_STICKY
pub fn start_mode_code(mode: StartMode) -> i32 {
    match mode {
        StartMode::NotSticky => 2,
    }
}

pub fn jni_error(err: jni::errors::Error) -> AudioError {
    AudioError::Jni(err.to_string())
}

pub fn stop_code(outcome: StopOutcome) -> i32 {
    match outcome {
        StopOutcome::Stopped => 0,
        StopOutcome::NothingPlaying => 1,
    }
}

pub fn state_code(state: &SessionState) -> i32 {
    match state {
        SessionState::Idle => 0,
        SessionState::Preparing(_) => 1,
        SessionState::Playing(_) => 2,
    }
}

/// Event kind and detail string passed to `onSessionEvent(int, String)`
pub fn event_code(event: &SessionEvent) -> (i32, String) {
    match event {
        SessionEvent::StateChanged { new_state, .. } => {
            (state_code(new_state), new_state.url().unwrap_or_default().to_string())
        }
        SessionEvent::NothingPlaying => (10, String::new()),
        SessionEvent::SourceError { url, message } => (11, format!("{}: {}", url, message)),
        SessionEvent::Released => (12, String::new()),
    }
}

/// Collapse a result to a code, logging the error
pub fn to_code<T>(result: Result<T>, code: impl FnOnce(T) -> i32) -> i32 {
    match result {
        Ok(value) => code(value),
        Err(err) => {
            log::error!("[jni] native call failed: {}", err);
            ERROR
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_mode_matches_platform_constants() {
        assert_eq!(start_mode_code(StartMode::NotSticky), 2);
    }

    #[test]
    fn test_jni_failures_become_jni_errors() {
        let err = jni_error(jni::errors::Error::NullPtr("listener"));
        assert!(matches!(err, AudioError::Jni(ref m) if m.contains("listener")));
        assert_eq!(to_code::<()>(Err(err), |_| 0), ERROR);
    }

    #[test]
    fn test_event_codes() {
        let event = SessionEvent::StateChanged {
            old_state: SessionState::Idle,
            new_state: SessionState::Preparing("http://a".into()),
        };
        assert_eq!(event_code(&event), (1, "http://a".to_string()));
        assert_eq!(event_code(&SessionEvent::NothingPlaying).0, 10);

        let (code, detail) = event_code(&SessionEvent::SourceError {
            url: "bad://x".into(),
            message: "unsupported".into(),
        });
        assert_eq!(code, 11);
        assert!(detail.starts_with("bad://x"));
    }

    #[test]
    fn test_to_code() {
        assert_eq!(to_code(Ok(StopOutcome::NothingPlaying), stop_code), 1);
        assert_eq!(to_code::<()>(Err(AudioError::Released), |_| 0), ERROR);
    }
}

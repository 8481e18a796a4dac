// JNI entry points for org.musicplayer.MusicService and MainActivity

use jni::objects::{GlobalRef, JClass, JObject, JString, JValue};
use jni::sys::{jint, jlong, jstring};
use jni::{JNIEnv, JavaVM};
use std::sync::Arc;

use crate::codes::{self, jni_error, ERROR};
use crate::registry;
use musicplayer_core::{Result, SessionCallback, SessionEvent};
use musicplayer_service::{make_intent, resolve_song_url, PlayerConfig};

/// Forwards session events to `listener.onSessionEvent(int, String)`
///
/// Events arrive on arbitrary native threads (the preparation worker among
/// them), so each call attaches to the VM first.
struct JniCallback {
    vm: JavaVM,
    listener: GlobalRef,
}

impl JniCallback {
    fn new(env: &JNIEnv, listener: &JObject) -> Result<Self> {
        Ok(Self {
            vm: env.get_java_vm().map_err(jni_error)?,
            listener: env.new_global_ref(listener).map_err(jni_error)?,
        })
    }

    fn deliver(&self, code: jint, detail: &str) -> Result<()> {
        let mut env = self.vm.attach_current_thread().map_err(jni_error)?;
        let detail = env.new_string(detail).map_err(jni_error)?;
        let result = env.call_method(
            &self.listener,
            "onSessionEvent",
            "(ILjava/lang/String;)V",
            &[JValue::Int(code), JValue::Object(&detail)],
        );
        if env.exception_check().map_err(jni_error)? {
            env.exception_clear().map_err(jni_error)?;
        }
        result.map(|_| ()).map_err(jni_error)
    }
}

impl SessionCallback for JniCallback {
    fn on_event(&self, event: SessionEvent) {
        let (code, detail) = codes::event_code(&event);
        if let Err(e) = self.deliver(code, &detail) {
            log::warn!("[jni] failed to deliver {:?}: {}", event, e);
        }
    }
}

fn jstring_to_string(env: &mut JNIEnv, jstr: &JString) -> Result<String> {
    let java_str = env.get_string(jstr).map_err(jni_error)?;
    Ok(java_str.into())
}

/// Service onCreate. `listener` may be null.
/// Returns a service handle, or -1.
#[no_mangle]
pub extern "system" fn Java_org_musicplayer_MusicService_nativeCreate(
    env: JNIEnv,
    _class: JClass,
    listener: JObject,
) -> jlong {
    let callback: Option<Arc<dyn SessionCallback>> = if listener.is_null() {
        None
    } else {
        match JniCallback::new(&env, &listener) {
            Ok(cb) => Some(Arc::new(cb)),
            Err(e) => {
                log::error!("[jni] failed to wrap listener: {}", e);
                return ERROR as jlong;
            }
        }
    };

    match registry::create_service(&PlayerConfig::default(), callback) {
        Ok(id) => id,
        Err(e) => {
            log::error!("[jni] failed to create service: {}", e);
            ERROR as jlong
        }
    }
}

/// Service onStartCommand with a play intent carrying `url`.
/// Returns START_NOT_STICKY, or -1.
#[no_mangle]
pub extern "system" fn Java_org_musicplayer_MusicService_nativeStartCommand(
    mut env: JNIEnv,
    _class: JClass,
    service_id: jlong,
    url: JString,
) -> jint {
    let result = jstring_to_string(&mut env, &url).and_then(|url| {
        registry::with_service(service_id, |service| service.on_request(&make_intent(&url)))
    });
    codes::to_code(result, codes::start_mode_code)
}

/// Service stop request. Returns 0 when stopped, 1 when nothing was playing, or -1.
#[no_mangle]
pub extern "system" fn Java_org_musicplayer_MusicService_nativeStop(
    _env: JNIEnv,
    _class: JClass,
    service_id: jlong,
) -> jint {
    codes::to_code(
        registry::with_service(service_id, |service| service.on_deactivate_request()),
        codes::stop_code,
    )
}

/// 0 idle, 1 preparing, 2 playing, or -1
#[no_mangle]
pub extern "system" fn Java_org_musicplayer_MusicService_nativeGetState(
    _env: JNIEnv,
    _class: JClass,
    service_id: jlong,
) -> jint {
    codes::to_code(
        registry::with_service(service_id, |service| {
            Ok(service.session().map(|session| codes::state_code(&session.state())))
        }),
        |state| state.unwrap_or(0),
    )
}

/// Service onDestroy
#[no_mangle]
pub extern "system" fn Java_org_musicplayer_MusicService_nativeDestroy(
    _env: JNIEnv,
    _class: JClass,
    service_id: jlong,
) {
    if let Err(e) = registry::destroy_service(service_id) {
        log::error!("[jni] failed to destroy service {}: {}", service_id, e);
    }
}

/// URL to send with the play intent: the field text, or the default song.
/// Returns null on failure.
#[no_mangle]
pub extern "system" fn Java_org_musicplayer_MainActivity_nativeResolveUrl(
    mut env: JNIEnv,
    _class: JClass,
    input: JString,
) -> jstring {
    let input = if input.is_null() {
        String::new()
    } else {
        match jstring_to_string(&mut env, &input) {
            Ok(s) => s,
            Err(e) => {
                log::error!("[jni] failed to convert input: {}", e);
                return std::ptr::null_mut();
            }
        }
    };

    let url = resolve_song_url(&input, &PlayerConfig::default().default_url);
    match env.new_string(url).map_err(jni_error) {
        Ok(s) => s.into_raw(),
        Err(e) => {
            log::error!("[jni] failed to create string: {}", e);
            std::ptr::null_mut()
        }
    }
}

// JNI bridge for the Android (or desktop JVM) front end
//
// Java side: org.musicplayer.MusicService (service lifecycle) and
// org.musicplayer.MainActivity (URL field helper).

pub mod codes;
#[cfg(any(target_os = "android", feature = "android", feature = "desktop"))]
pub mod jni_bridge;
pub mod registry;

pub use registry::{create_service, destroy_service, register_service, with_service};

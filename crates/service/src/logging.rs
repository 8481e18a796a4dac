// Logging backend selection

use crate::config::PlayerConfig;
use std::sync::Once;

static INIT_LOGGER: Once = Once::new();

/// Install the platform logger once per process
pub fn init_logging(config: &PlayerConfig) {
    INIT_LOGGER.call_once(|| {
        #[cfg(target_os = "android")]
        {
            android_logger::init_once(
                android_logger::Config::default()
                    .with_max_level(config.log_level)
                    .with_tag(config.log_tag.as_str()),
            );
        }

        #[cfg(not(target_os = "android"))]
        {
            let _ = env_logger::builder()
                .is_test(cfg!(test))
                .filter_level(config.log_level)
                .parse_default_env()
                .try_init();
        }

        log::info!("[{}] logging initialized", config.log_tag);
    });
}

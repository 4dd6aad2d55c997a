// Android bindings for the libVLC playback facade
// Exposes JNI entry points to the Kotlin peer class

pub mod callback;
pub mod engine;
pub mod error;
pub mod jni_bindings;
pub mod registry;

use once_cell::sync::Lazy;
use std::sync::Once;
use vlc_facade_core::PlaybackFacade;

pub use callback::JniCallback;
pub use engine::JniEngine;
pub use registry::PlayerRegistry;

/// Facade instance handed out to Java
pub type AndroidPlayer = PlaybackFacade<JniEngine>;

/// Process-wide player handles
pub(crate) static PLAYERS: Lazy<PlayerRegistry<AndroidPlayer>> = Lazy::new(PlayerRegistry::new);

const LOG_TAG: &str = "VlcFacade";

static INIT_LOGGER: Once = Once::new();

/// Initialize logging based on platform
pub fn init_logging() {
    INIT_LOGGER.call_once(|| {
        #[cfg(target_os = "android")]
        {
            android_logger::init_once(
                android_logger::Config::default()
                    .with_max_level(log::LevelFilter::Debug)
                    .with_tag(LOG_TAG),
            );
        }

        #[cfg(not(target_os = "android"))]
        {
            let _ = env_logger::builder()
                .is_test(false)
                .filter_level(log::LevelFilter::Info)
                .try_init();
        }

        log::debug!("{} logging initialized", LOG_TAG);
    });
}

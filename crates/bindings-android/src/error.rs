// JNI error conversion

use vlc_facade_core::{PlayerError, Result};

/// Lift `jni` results into facade results
pub trait JniResultExt<T> {
    fn map_jni(self) -> Result<T>;
}

impl<T> JniResultExt<T> for jni::errors::Result<T> {
    fn map_jni(self) -> Result<T> {
        self.map_err(|e| PlayerError::JniError(e.to_string()))
    }
}

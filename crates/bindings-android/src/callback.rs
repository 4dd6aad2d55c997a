// JNI observer
// Bridges facade events to the Java/Kotlin callback object

use jni::objects::{GlobalRef, JObject, JValue};
use jni::{JNIEnv, JavaVM};
use vlc_facade_core::{CallbackEvent, PlayerCallback, Result};

use crate::error::JniResultExt;

/// Java method signature and argument for an observer callback
fn java_call(event: &CallbackEvent) -> (&'static str, Option<JValue<'static, 'static>>) {
    match *event {
        CallbackEvent::SeekStateChanged { seekable } => ("(Z)V", Some(JValue::Bool(seekable as u8))),
        CallbackEvent::TimeChanged { time_ms } => ("(J)V", Some(JValue::Long(time_ms))),
        CallbackEvent::PositionChanged { position } => ("(F)V", Some(JValue::Float(position))),
        CallbackEvent::Buffering { percent } => ("(F)V", Some(JValue::Float(percent))),
        _ => ("()V", None),
    }
}

/// Observer backed by a Java object implementing the player callback interface.
///
/// Events arrive on the engine's thread, so every call attaches that thread
/// to the VM first.
pub struct JniCallback {
    vm: JavaVM,
    callback_object: GlobalRef,
}

impl JniCallback {
    pub fn new(env: &JNIEnv, callback_object: &JObject) -> Result<Self> {
        Ok(Self {
            vm: env.get_java_vm().map_jni()?,
            callback_object: env.new_global_ref(callback_object).map_jni()?,
        })
    }

    fn invoke(&self, event: &CallbackEvent) -> jni::errors::Result<()> {
        let mut env = self.vm.attach_current_thread()?;
        let (signature, arg) = java_call(event);
        let args: &[JValue] = match arg.as_ref() {
            Some(value) => std::slice::from_ref(value),
            None => &[],
        };

        let result = env.call_method(&self.callback_object, event.callback_name(), signature, args);
        if result.is_err() && env.exception_check()? {
            env.exception_describe()?;
            env.exception_clear()?;
        }
        result.map(|_| ())
    }
}

impl PlayerCallback for JniCallback {
    fn on_event(&self, event: CallbackEvent) {
        if let Err(e) = self.invoke(&event) {
            log::error!("Failed to deliver {}: {}", event.callback_name(), e);
        }
    }
}

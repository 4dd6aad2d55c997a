// libVLC engine driven through its Java bindings (org.videolan.libvlc)

use jni::objects::{GlobalRef, JObject, JObjectArray, JValue};
use jni::{JNIEnv, JavaVM};
use vlc_facade_core::{EventRelay, MediaEngine, MediaSource, PlayerError, Result, VideoTrack};

use crate::error::JniResultExt;

const MEDIA_PLAYER_CLASS: &str = "org/videolan/libvlc/MediaPlayer";
const MEDIA_CLASS: &str = "org/videolan/libvlc/Media";
const URI_CLASS: &str = "android/net/Uri";

const MEDIA_PLAYER_CTOR_SIG: &str = "(Lorg/videolan/libvlc/LibVLC;)V";
const MEDIA_CTOR_SIG: &str = "(Lorg/videolan/libvlc/LibVLC;Landroid/net/Uri;)V";
const URI_PARSE_SIG: &str = "(Ljava/lang/String;)Landroid/net/Uri;";
const SET_EVENT_LISTENER_SIG: &str = "(Lorg/videolan/libvlc/MediaPlayer$EventListener;)V";
const SET_MEDIA_SIG: &str = "(Lorg/videolan/libvlc/Media;)V";
const GET_MEDIA_SIG: &str = "()Lorg/videolan/libvlc/Media;";
const GET_SLAVES_SIG: &str = "()[Lorg/videolan/libvlc/Media$Slave;";
const ADD_SLAVE_SIG: &str = "(ILandroid/net/Uri;Z)Z";
const GET_VOUT_SIG: &str = "()Lorg/videolan/libvlc/IVLCVout;";
const SET_VIEW_SIG: &str = "(Landroid/view/SurfaceView;)V";
const ATTACH_VIEWS_SIG: &str = "(Lorg/videolan/libvlc/IVLCVout$OnNewVideoLayoutListener;)V";
const SET_RENDERER_SIG: &str = "(Lorg/videolan/libvlc/RendererItem;)I";
const GET_VIDEO_TRACK_SIG: &str = "()Lorg/videolan/libvlc/Media$VideoTrack;";

/// `Media.Slave.Type.Subtitle`
const SLAVE_TYPE_SUBTITLE: i32 = 0;

const LOCAL_FRAME_CAPACITY: i32 = 16;

/// Engine backed by an `org.videolan.libvlc.MediaPlayer`.
///
/// Holds its own reference on the `LibVLC` context (retained on creation,
/// released after the player) so the context outlives the player.
/// Release steps that completed are remembered; a retried release or the
/// drop only runs the ones that are still outstanding.
pub struct JniEngine {
    vm: JavaVM,
    lib_vlc: GlobalRef,
    player: GlobalRef,
    /// Java peer implementing `MediaPlayer.EventListener`
    listener: GlobalRef,
    player_released: bool,
    context_released: bool,
}

/// Clear a pending Java exception so the env stays usable
fn clear_exception(env: &mut JNIEnv) {
    if env.exception_check().unwrap_or(false) {
        let _ = env.exception_describe();
        let _ = env.exception_clear();
    }
}

/// Record the outcome of one release step. The first failure is kept for
/// the caller; later ones are only logged. Returns whether the step completed.
fn note_step(first_err: &mut Option<PlayerError>, step: &str, result: Result<()>) -> bool {
    match result {
        Ok(()) => true,
        Err(e) => {
            log::error!("{} failed: {}", step, e);
            first_err.get_or_insert(e);
            false
        }
    }
}

impl JniEngine {
    pub fn new(env: &mut JNIEnv, lib_vlc: &JObject, listener: &JObject) -> Result<Self> {
        if lib_vlc.is_null() {
            return Err(PlayerError::InvalidSource("LibVLC instance is null".into()));
        }

        // Everything that can fail without side effects goes first
        let vm = env.get_java_vm().map_jni()?;
        let lib_vlc_ref = env.new_global_ref(lib_vlc).map_jni()?;
        let listener = env.new_global_ref(listener).map_jni()?;

        if let Err(e) = env.call_method(lib_vlc, "retain", "()Z", &[]) {
            clear_exception(env);
            return Err(PlayerError::JniError(e.to_string()));
        }

        let player = match Self::create_player(env, lib_vlc) {
            Ok(player) => player,
            Err(e) => {
                clear_exception(env);
                if let Err(release_err) = env.call_method(lib_vlc, "release", "()V", &[]) {
                    clear_exception(env);
                    log::error!("Failed to release LibVLC after create error: {}", release_err);
                }
                return Err(PlayerError::JniError(e.to_string()));
            }
        };

        log::info!("libVLC media player created");
        Ok(Self {
            vm,
            lib_vlc: lib_vlc_ref,
            player,
            listener,
            player_released: false,
            context_released: false,
        })
    }

    /// Construct the Java player and pin it; the player is released again
    /// if it can't be pinned
    fn create_player(env: &mut JNIEnv, lib_vlc: &JObject) -> jni::errors::Result<GlobalRef> {
        let player =
            env.new_object(MEDIA_PLAYER_CLASS, MEDIA_PLAYER_CTOR_SIG, &[JValue::Object(lib_vlc)])?;
        match env.new_global_ref(&player) {
            Ok(global) => Ok(global),
            Err(e) => {
                clear_exception(env);
                if env.call_method(&player, "release", "()V", &[]).is_err() {
                    clear_exception(env);
                    log::error!("Failed to release unpinned media player");
                }
                Err(e)
            }
        }
    }

    /// Run `f` on an attached env inside its own local frame.
    /// A Java exception thrown by libVLC is logged, cleared and returned as an error.
    fn call<T>(&self, f: impl FnOnce(&mut JNIEnv) -> jni::errors::Result<T>) -> Result<T> {
        let mut env = self.vm.attach_current_thread().map_jni()?;
        let result = env.with_local_frame(LOCAL_FRAME_CAPACITY, |env| f(env));

        if result.is_err() {
            clear_exception(&mut env);
        }
        result.map_jni()
    }

    fn parse_uri<'local>(env: &mut JNIEnv<'local>, location: &str) -> jni::errors::Result<JObject<'local>> {
        let location = env.new_string(location)?;
        env.call_static_method(URI_CLASS, "parse", URI_PARSE_SIG, &[JValue::Object(&location)])?
            .l()
    }

    fn vout<'local>(&self, env: &mut JNIEnv<'local>) -> jni::errors::Result<JObject<'local>> {
        env.call_method(&self.player, "getVLCVout", GET_VOUT_SIG, &[])?.l()
    }
}

impl MediaEngine for JniEngine {
    type Surface = GlobalRef;
    type LayoutListener = Option<GlobalRef>;
    type Renderer = GlobalRef;

    fn subscribe(&mut self, _relay: EventRelay) -> Result<()> {
        // Events don't flow through this relay: the Java peer forwards them
        // to nativeOnEvent, which dispatches on `PlaybackFacade::event_relay`.
        self.call(|env| {
            env.call_method(
                &self.player,
                "setEventListener",
                SET_EVENT_LISTENER_SIG,
                &[JValue::Object(self.listener.as_obj())],
            )?;
            Ok(())
        })
    }

    fn set_media(&mut self, source: &MediaSource) -> Result<()> {
        let location = source.to_location();
        self.call(|env| {
            let uri = Self::parse_uri(env, &location)?;
            let media = env.new_object(
                MEDIA_CLASS,
                MEDIA_CTOR_SIG,
                &[JValue::Object(self.lib_vlc.as_obj()), JValue::Object(&uri)],
            )?;
            env.call_method(&self.player, "setMedia", SET_MEDIA_SIG, &[JValue::Object(&media)])?;
            // The player holds its own reference now
            env.call_method(&media, "release", "()V", &[])?;
            Ok(())
        })
    }

    fn add_subtitle_slave(&mut self, location: &str) -> Result<()> {
        let added = self.call(|env| {
            let uri = Self::parse_uri(env, location)?;
            env.call_method(
                &self.player,
                "addSlave",
                ADD_SLAVE_SIG,
                &[
                    JValue::Int(SLAVE_TYPE_SUBTITLE),
                    JValue::Object(&uri),
                    JValue::Bool(1),
                ],
            )?
            .z()
        })?;

        if !added {
            log::warn!("libVLC refused subtitle slave {}", location);
        }
        Ok(())
    }

    fn subtitle_slave_count(&self) -> Result<usize> {
        self.call(|env| {
            let media = env.call_method(&self.player, "getMedia", GET_MEDIA_SIG, &[])?.l()?;
            if media.is_null() {
                return Ok(0);
            }

            let slaves = env.call_method(&media, "getSlaves", GET_SLAVES_SIG, &[])?.l()?;
            let count = if slaves.is_null() {
                0
            } else {
                let slaves = JObjectArray::from(slaves);
                env.get_array_length(&slaves)? as usize
            };

            // getMedia hands back a retained reference
            env.call_method(&media, "release", "()V", &[])?;
            Ok(count)
        })
    }

    fn play(&mut self) -> Result<()> {
        self.call(|env| env.call_method(&self.player, "play", "()V", &[]).map(|_| ()))
    }

    fn pause(&mut self) -> Result<()> {
        self.call(|env| env.call_method(&self.player, "pause", "()V", &[]).map(|_| ()))
    }

    fn stop(&mut self) -> Result<()> {
        self.call(|env| env.call_method(&self.player, "stop", "()V", &[]).map(|_| ()))
    }

    fn is_seekable(&self) -> Result<bool> {
        self.call(|env| env.call_method(&self.player, "isSeekable", "()Z", &[])?.z())
    }

    fn set_time(&mut self, time_ms: i64) -> Result<()> {
        self.call(|env| {
            env.call_method(&self.player, "setTime", "(J)V", &[JValue::Long(time_ms)])
                .map(|_| ())
        })
    }

    fn time(&self) -> Result<i64> {
        self.call(|env| env.call_method(&self.player, "getTime", "()J", &[])?.j())
    }

    fn length(&self) -> Result<i64> {
        self.call(|env| env.call_method(&self.player, "getLength", "()J", &[])?.j())
    }

    fn is_playing(&self) -> Result<bool> {
        self.call(|env| env.call_method(&self.player, "isPlaying", "()Z", &[])?.z())
    }

    fn set_volume(&mut self, volume: i32) -> Result<()> {
        let status = self.call(|env| {
            env.call_method(&self.player, "setVolume", "(I)I", &[JValue::Int(volume)])?
                .i()
        })?;
        if status != 0 {
            log::warn!("libVLC rejected volume {}", volume);
        }
        Ok(())
    }

    fn set_aspect_ratio(&mut self, aspect_ratio: Option<&str>) -> Result<()> {
        self.call(|env| {
            let value = match aspect_ratio {
                Some(ratio) => JObject::from(env.new_string(ratio)?),
                None => JObject::null(),
            };
            env.call_method(
                &self.player,
                "setAspectRatio",
                "(Ljava/lang/String;)V",
                &[JValue::Object(&value)],
            )
            .map(|_| ())
        })
    }

    fn set_scale(&mut self, scale: f32) -> Result<()> {
        self.call(|env| {
            env.call_method(&self.player, "setScale", "(F)V", &[JValue::Float(scale)])
                .map(|_| ())
        })
    }

    fn attach_views(
        &mut self,
        media_surface: GlobalRef,
        subtitle_surface: GlobalRef,
        layout_listener: Option<GlobalRef>,
    ) -> Result<()> {
        self.call(|env| {
            let vout = self.vout(env)?;
            env.call_method(
                &vout,
                "setVideoView",
                SET_VIEW_SIG,
                &[JValue::Object(media_surface.as_obj())],
            )?;
            env.call_method(
                &vout,
                "setSubtitlesView",
                SET_VIEW_SIG,
                &[JValue::Object(subtitle_surface.as_obj())],
            )?;

            let null = JObject::null();
            let listener = layout_listener.as_ref().map_or(&null, |l| l.as_obj());
            env.call_method(&vout, "attachViews", ATTACH_VIEWS_SIG, &[JValue::Object(listener)])?;
            Ok(())
        })
    }

    fn detach_views(&mut self) -> Result<()> {
        self.call(|env| {
            let vout = self.vout(env)?;
            env.call_method(&vout, "detachViews", "()V", &[])?;
            Ok(())
        })
    }

    fn set_renderer(&mut self, renderer: Option<&GlobalRef>) -> Result<()> {
        let status = self.call(|env| {
            let null = JObject::null();
            let item = renderer.map_or(&null, |r| r.as_obj());
            env.call_method(&self.player, "setRenderer", SET_RENDERER_SIG, &[JValue::Object(item)])?
                .i()
        })?;
        if status != 0 {
            log::warn!("libVLC setRenderer returned {}", status);
        }
        Ok(())
    }

    fn current_video_track(&self) -> Result<Option<VideoTrack>> {
        self.call(|env| {
            let track = env
                .call_method(&self.player, "getCurrentVideoTrack", GET_VIDEO_TRACK_SIG, &[])?
                .l()?;
            if track.is_null() {
                return Ok(None);
            }

            let mut field = |name: &str| -> jni::errors::Result<u32> {
                Ok(env.get_field(&track, name, "I")?.i()?.max(0) as u32)
            };
            Ok(Some(VideoTrack {
                width: field("width")?,
                height: field("height")?,
                sar_num: field("sarNum")?,
                sar_den: field("sarDen")?,
                frame_rate_num: field("frameRateNum")?,
                frame_rate_den: field("frameRateDen")?,
            }))
        })
    }

    fn has_media(&self) -> Result<bool> {
        self.call(|env| env.call_method(&self.player, "hasMedia", "()Z", &[])?.z())
    }

    /// Every outstanding step is attempted even when an earlier one throws;
    /// the first error is returned.
    fn release(&mut self) -> Result<()> {
        log::info!("Releasing libVLC media player");
        let mut first_err = None;

        if !self.player_released {
            let detached = self.call(|env| {
                let null = JObject::null();
                env.call_method(
                    &self.player,
                    "setEventListener",
                    SET_EVENT_LISTENER_SIG,
                    &[JValue::Object(&null)],
                )
                .map(|_| ())
            });
            note_step(&mut first_err, "Detaching event listener", detached);

            let released =
                self.call(|env| env.call_method(&self.player, "release", "()V", &[]).map(|_| ()));
            self.player_released = note_step(&mut first_err, "Releasing media player", released);
        }

        if !self.context_released {
            let released =
                self.call(|env| env.call_method(&self.lib_vlc, "release", "()V", &[]).map(|_| ()));
            self.context_released = note_step(&mut first_err, "Releasing LibVLC", released);
        }

        first_err.map_or(Ok(()), Err)
    }
}

impl Drop for JniEngine {
    fn drop(&mut self) {
        if self.player_released && self.context_released {
            return;
        }
        log::warn!("libVLC media player dropped without a complete release");
        if let Err(e) = MediaEngine::release(self) {
            log::error!("Release on drop failed: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_release_steps_keep_first_error() {
        let mut first_err = None;

        let detached = note_step(
            &mut first_err,
            "detach",
            Err(PlayerError::JniError("listener threw".into())),
        );
        let player = note_step(&mut first_err, "player", Ok(()));
        let context = note_step(
            &mut first_err,
            "context",
            Err(PlayerError::JniError("context threw".into())),
        );

        assert!(!detached);
        assert!(player);
        assert!(!context);
        assert_eq!(first_err, Some(PlayerError::JniError("listener threw".into())));
    }

    #[test]
    fn test_release_steps_without_errors() {
        let mut first_err = None;

        assert!(note_step(&mut first_err, "player", Ok(())));
        assert!(note_step(&mut first_err, "context", Ok(())));
        assert_eq!(first_err, None);
    }
}

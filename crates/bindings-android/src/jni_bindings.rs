// JNI entry points for com.vlcfacade.player.NativeVlcPlayer
// Commands return 0 on success and -1 on failure; queries return -1 / false / null
// for an unknown handle.

use jni::objects::{JObject, JString};
use jni::sys::{jboolean, jfloat, jint, jintArray, jlong, jobject, JNI_FALSE, JNI_TRUE};
use jni::JNIEnv;
use std::sync::Arc;
use vlc_facade_core::{EngineEvent, MediaSource, PlaybackFacade, PlayerCallback, Result};

use crate::callback::JniCallback;
use crate::engine::JniEngine;
use crate::error::JniResultExt;
use crate::{init_logging, AndroidPlayer, PLAYERS};

fn to_code(result: Result<()>) -> jint {
    match result {
        Ok(_) => 0,
        Err(err) => {
            log::error!("JNI call failed: {}", err);
            -1
        }
    }
}

fn with_player<R>(id: jlong, f: impl FnOnce(&AndroidPlayer) -> Result<R>) -> Result<R> {
    PLAYERS.with_player(id, f)
}

/// Read an optional Java string; `null` maps to `None`.
fn optional_string(env: &mut JNIEnv, value: &JString) -> Result<Option<String>> {
    if value.is_null() {
        return Ok(None);
    }
    let value = env.get_string(value).map_jni()?;
    Ok(Some(value.into()))
}

fn create_player(env: &mut JNIEnv, peer: &JObject, lib_vlc: &JObject) -> Result<jlong> {
    let engine = JniEngine::new(env, lib_vlc, peer)?;
    let facade = PlaybackFacade::new(engine)?;
    Ok(PLAYERS.register(facade))
}

/// Create a player bound to the given `LibVLC` instance.
/// The calling object becomes the libVLC event listener.
/// JNI signature: (Lorg/videolan/libvlc/LibVLC;)J
#[no_mangle]
pub extern "system" fn Java_com_vlcfacade_player_NativeVlcPlayer_nativeCreate(
    mut env: JNIEnv,
    peer: JObject,
    lib_vlc: JObject,
) -> jlong {
    init_logging();
    log::info!("Creating native player");

    match create_player(&mut env, &peer, &lib_vlc) {
        Ok(id) => id,
        Err(e) => {
            log::error!("Failed to create player: {}", e);
            -1
        }
    }
}

/// Forwarded from `MediaPlayer.EventListener.onEvent` as
/// `(event.type, event.getTimeChanged(), event.getPositionChanged())`,
/// which is libVLC's raw `(type, arg1, arg2)`.
/// JNI signature: (JIJF)V
#[no_mangle]
pub extern "system" fn Java_com_vlcfacade_player_NativeVlcPlayer_nativeOnEvent(
    _env: JNIEnv,
    _peer: JObject,
    player_id: jlong,
    event_type: jint,
    arg1: jlong,
    arg2: jfloat,
) {
    let event = EngineEvent::from_raw(event_type, arg1, arg2);
    match PLAYERS.get(player_id) {
        Ok(player) => player.event_relay().dispatch(event),
        Err(_) => log::debug!("Dropping {:?} for unknown player {}", event, player_id),
    }
}

/// JNI signature: (JLjava/lang/String;)I
#[no_mangle]
pub extern "system" fn Java_com_vlcfacade_player_NativeVlcPlayer_nativeSetMediaUri(
    mut env: JNIEnv,
    _peer: JObject,
    player_id: jlong,
    uri: JString,
) -> jint {
    match optional_string(&mut env, &uri) {
        Ok(Some(uri)) => to_code(with_player(player_id, |p| {
            p.set_media(&MediaSource::location(uri))
        })),
        Ok(None) => {
            log::error!("nativeSetMediaUri: null uri");
            -1
        }
        Err(e) => {
            log::error!("Failed to read uri: {}", e);
            -1
        }
    }
}

/// JNI signature: (JI)I
#[no_mangle]
pub extern "system" fn Java_com_vlcfacade_player_NativeVlcPlayer_nativeSetMediaFd(
    _env: JNIEnv,
    _peer: JObject,
    player_id: jlong,
    fd: jint,
) -> jint {
    to_code(with_player(player_id, |p| {
        p.set_media(&MediaSource::descriptor(fd))
    }))
}

/// A null location clears subtitles.
/// JNI signature: (JLjava/lang/String;)I
#[no_mangle]
pub extern "system" fn Java_com_vlcfacade_player_NativeVlcPlayer_nativeSetSubtitle(
    mut env: JNIEnv,
    _peer: JObject,
    player_id: jlong,
    location: JString,
) -> jint {
    match optional_string(&mut env, &location) {
        Ok(location) => to_code(with_player(player_id, |p| {
            p.set_subtitle(location.as_deref())
        })),
        Err(e) => {
            log::error!("Failed to read subtitle location: {}", e);
            -1
        }
    }
}

/// JNI signature: (J)I
#[no_mangle]
pub extern "system" fn Java_com_vlcfacade_player_NativeVlcPlayer_nativePlay(
    _env: JNIEnv,
    _peer: JObject,
    player_id: jlong,
) -> jint {
    to_code(with_player(player_id, |p| p.play()))
}

/// JNI signature: (J)I
#[no_mangle]
pub extern "system" fn Java_com_vlcfacade_player_NativeVlcPlayer_nativePause(
    _env: JNIEnv,
    _peer: JObject,
    player_id: jlong,
) -> jint {
    to_code(with_player(player_id, |p| p.pause()))
}

/// JNI signature: (J)I
#[no_mangle]
pub extern "system" fn Java_com_vlcfacade_player_NativeVlcPlayer_nativeStop(
    _env: JNIEnv,
    _peer: JObject,
    player_id: jlong,
) -> jint {
    to_code(with_player(player_id, |p| p.stop()))
}

/// JNI signature: (JJ)I
#[no_mangle]
pub extern "system" fn Java_com_vlcfacade_player_NativeVlcPlayer_nativeSetTime(
    _env: JNIEnv,
    _peer: JObject,
    player_id: jlong,
    time_ms: jlong,
) -> jint {
    to_code(with_player(player_id, |p| p.set_time(time_ms)))
}

/// JNI signature: (J)J
#[no_mangle]
pub extern "system" fn Java_com_vlcfacade_player_NativeVlcPlayer_nativeGetTime(
    _env: JNIEnv,
    _peer: JObject,
    player_id: jlong,
) -> jlong {
    with_player(player_id, |p| p.time()).unwrap_or(-1)
}

/// JNI signature: (J)J
#[no_mangle]
pub extern "system" fn Java_com_vlcfacade_player_NativeVlcPlayer_nativeGetLength(
    _env: JNIEnv,
    _peer: JObject,
    player_id: jlong,
) -> jlong {
    with_player(player_id, |p| p.length()).unwrap_or(-1)
}

/// JNI signature: (J)Z
#[no_mangle]
pub extern "system" fn Java_com_vlcfacade_player_NativeVlcPlayer_nativeIsPlaying(
    _env: JNIEnv,
    _peer: JObject,
    player_id: jlong,
) -> jboolean {
    match with_player(player_id, |p| p.is_playing()) {
        Ok(true) => JNI_TRUE,
        _ => JNI_FALSE,
    }
}

/// JNI signature: (JI)I
#[no_mangle]
pub extern "system" fn Java_com_vlcfacade_player_NativeVlcPlayer_nativeSetVolume(
    _env: JNIEnv,
    _peer: JObject,
    player_id: jlong,
    volume: jint,
) -> jint {
    to_code(with_player(player_id, |p| p.set_volume(volume)))
}

/// A null ratio restores the default.
/// JNI signature: (JLjava/lang/String;)I
#[no_mangle]
pub extern "system" fn Java_com_vlcfacade_player_NativeVlcPlayer_nativeSetAspectRatio(
    mut env: JNIEnv,
    _peer: JObject,
    player_id: jlong,
    aspect_ratio: JString,
) -> jint {
    match optional_string(&mut env, &aspect_ratio) {
        Ok(ratio) => to_code(with_player(player_id, |p| {
            p.set_aspect_ratio(ratio.as_deref())
        })),
        Err(e) => {
            log::error!("Failed to read aspect ratio: {}", e);
            -1
        }
    }
}

/// JNI signature: (JF)I
#[no_mangle]
pub extern "system" fn Java_com_vlcfacade_player_NativeVlcPlayer_nativeSetScale(
    _env: JNIEnv,
    _peer: JObject,
    player_id: jlong,
    scale: jfloat,
) -> jint {
    to_code(with_player(player_id, |p| p.set_scale(scale)))
}

/// JNI signature:
/// (JLandroid/view/SurfaceView;Landroid/view/SurfaceView;Lorg/videolan/libvlc/IVLCVout$OnNewVideoLayoutListener;)I
#[no_mangle]
pub extern "system" fn Java_com_vlcfacade_player_NativeVlcPlayer_nativeAttachSurfaces(
    env: JNIEnv,
    _peer: JObject,
    player_id: jlong,
    media_surface: JObject,
    subtitle_surface: JObject,
    layout_listener: JObject,
) -> jint {
    let refs = (|| -> Result<_> {
        let media = env.new_global_ref(&media_surface).map_jni()?;
        let subtitles = env.new_global_ref(&subtitle_surface).map_jni()?;
        let listener = if layout_listener.is_null() {
            None
        } else {
            Some(env.new_global_ref(&layout_listener).map_jni()?)
        };
        Ok((media, subtitles, listener))
    })();

    to_code(refs.and_then(|(media, subtitles, listener)| {
        with_player(player_id, |p| p.attach_surfaces(media, subtitles, listener))
    }))
}

/// JNI signature: (J)I
#[no_mangle]
pub extern "system" fn Java_com_vlcfacade_player_NativeVlcPlayer_nativeDetachSurfaces(
    _env: JNIEnv,
    _peer: JObject,
    player_id: jlong,
) -> jint {
    to_code(with_player(player_id, |p| p.detach_surfaces()))
}

/// A null item switches back to local output.
/// JNI signature: (JLorg/videolan/libvlc/RendererItem;)I
#[no_mangle]
pub extern "system" fn Java_com_vlcfacade_player_NativeVlcPlayer_nativeSetRenderer(
    env: JNIEnv,
    _peer: JObject,
    player_id: jlong,
    renderer: JObject,
) -> jint {
    let renderer = if renderer.is_null() {
        Ok(None)
    } else {
        env.new_global_ref(&renderer).map(Some).map_jni()
    };

    to_code(renderer.and_then(|renderer| with_player(player_id, |p| p.set_renderer(renderer))))
}

/// JNI signature: (J)Lorg/videolan/libvlc/RendererItem;
#[no_mangle]
pub extern "system" fn Java_com_vlcfacade_player_NativeVlcPlayer_nativeGetSelectedRenderer(
    env: JNIEnv,
    _peer: JObject,
    player_id: jlong,
) -> jobject {
    let selected = with_player(player_id, |p| Ok(p.selected_renderer()));
    match selected {
        Ok(Some(renderer)) => env
            .new_local_ref(&renderer)
            .map(|local| local.into_raw())
            .unwrap_or(std::ptr::null_mut()),
        _ => std::ptr::null_mut(),
    }
}

/// A null callback unregisters the current one.
/// JNI signature: (JLcom/vlcfacade/player/PlayerCallback;)I
#[no_mangle]
pub extern "system" fn Java_com_vlcfacade_player_NativeVlcPlayer_nativeSetCallback(
    env: JNIEnv,
    _peer: JObject,
    player_id: jlong,
    callback: JObject,
) -> jint {
    let callback: Result<Option<Arc<dyn PlayerCallback>>> = if callback.is_null() {
        Ok(None)
    } else {
        JniCallback::new(&env, &callback).map(|c| Some(Arc::new(c) as Arc<dyn PlayerCallback>))
    };

    to_code(callback.and_then(|callback| {
        with_player(player_id, |p| {
            p.set_callback(callback);
            Ok(())
        })
    }))
}

/// Current video track as
/// `[width, height, sarNum, sarDen, frameRateNum, frameRateDen]`, or null.
/// JNI signature: (J)[I
#[no_mangle]
pub extern "system" fn Java_com_vlcfacade_player_NativeVlcPlayer_nativeGetVideoTrack(
    env: JNIEnv,
    _peer: JObject,
    player_id: jlong,
) -> jintArray {
    let track = match with_player(player_id, |p| p.current_video_track()) {
        Ok(Some(track)) => track,
        Ok(None) => return std::ptr::null_mut(),
        Err(e) => {
            log::error!("Failed to query video track: {}", e);
            return std::ptr::null_mut();
        }
    };

    let values = [
        track.width,
        track.height,
        track.sar_num,
        track.sar_den,
        track.frame_rate_num,
        track.frame_rate_den,
    ]
    .map(|v| v as jint);

    let array = env.new_int_array(values.len() as i32).and_then(|array| {
        env.set_int_array_region(&array, 0, &values)?;
        Ok(array)
    });
    match array {
        Ok(array) => array.into_raw(),
        Err(e) => {
            log::error!("Failed to build video track array: {}", e);
            std::ptr::null_mut()
        }
    }
}

/// Release the player and forget its handle.
/// JNI signature: (J)I
#[no_mangle]
pub extern "system" fn Java_com_vlcfacade_player_NativeVlcPlayer_nativeRelease(
    _env: JNIEnv,
    _peer: JObject,
    player_id: jlong,
) -> jint {
    log::info!("Releasing player {}", player_id);
    to_code(PLAYERS.remove(player_id).and_then(|player| player.release()))
}

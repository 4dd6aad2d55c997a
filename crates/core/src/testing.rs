// In-memory engine for facade tests

use crate::callback::EventRelay;
use crate::engine::MediaEngine;
use crate::error::{PlayerError, Result};
use crate::event::EngineEvent;
use crate::media::{MediaSource, VideoTrack};
use parking_lot::Mutex;
use std::sync::Arc;

/// Commands the fake engine has received, in order
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    SetMedia(MediaSource),
    AddSubtitle(String),
    Play,
    Pause,
    Stop,
    SetTime(i64),
    SetVolume(i32),
    SetAspectRatio(Option<String>),
    SetScale(f32),
    AttachViews(u32, u32, u32),
    DetachViews,
    SetRenderer(Option<String>),
    Release,
}

#[derive(Default)]
struct FakeState {
    commands: Vec<Command>,
    relay: Option<EventRelay>,
    seekable: bool,
    slave_count: usize,
    time_ms: i64,
    length_ms: i64,
    playing: bool,
    has_media: bool,
    video_track: Option<VideoTrack>,
    fail_with: Option<PlayerError>,
    fail_subscribe_with: Option<PlayerError>,
}

/// Engine double: records commands and plays back events through the relay
pub struct FakeEngine {
    state: Arc<Mutex<FakeState>>,
}

/// Test-side view of a [`FakeEngine`] that has been moved into a facade
#[derive(Clone)]
pub struct FakeEngineHandle {
    state: Arc<Mutex<FakeState>>,
}

impl FakeEngine {
    pub fn new() -> (Self, FakeEngineHandle) {
        let state = Arc::new(Mutex::new(FakeState {
            length_ms: -1,
            ..Default::default()
        }));
        (
            Self {
                state: state.clone(),
            },
            FakeEngineHandle { state },
        )
    }

    fn record(&self, command: Command) -> Result<()> {
        let mut state = self.state.lock();
        if let Some(err) = state.fail_with.clone() {
            return Err(err);
        }
        state.commands.push(command);
        Ok(())
    }
}

impl FakeEngineHandle {
    pub fn commands(&self) -> Vec<Command> {
        self.state.lock().commands.clone()
    }

    pub fn clear_commands(&self) {
        self.state.lock().commands.clear();
    }

    pub fn is_subscribed(&self) -> bool {
        self.state.lock().relay.is_some()
    }

    pub fn set_slave_count(&self, count: usize) {
        self.state.lock().slave_count = count;
    }

    pub fn set_video_track(&self, track: Option<VideoTrack>) {
        self.state.lock().video_track = track;
    }

    pub fn fail_with(&self, err: Option<PlayerError>) {
        self.state.lock().fail_with = err;
    }

    pub fn fail_subscribe_with(&self, err: Option<PlayerError>) {
        self.state.lock().fail_subscribe_with = err;
    }

    /// Emit an event the way the engine would, on the caller's thread
    pub fn emit(&self, event: EngineEvent) {
        let relay = {
            let mut state = self.state.lock();
            match event {
                EngineEvent::SeekableChanged { seekable } => state.seekable = seekable,
                EngineEvent::TimeChanged { time_ms } => state.time_ms = time_ms,
                EngineEvent::Playing => state.playing = true,
                EngineEvent::Paused | EngineEvent::Stopped | EngineEvent::EndReached => {
                    state.playing = false
                }
                _ => {}
            }
            state.relay.clone()
        };

        if let Some(relay) = relay {
            relay.dispatch(event);
        }
    }
}

impl MediaEngine for FakeEngine {
    type Surface = u32;
    type LayoutListener = u32;
    type Renderer = String;

    fn subscribe(&mut self, relay: EventRelay) -> Result<()> {
        let mut state = self.state.lock();
        if let Some(err) = state.fail_subscribe_with.clone() {
            return Err(err);
        }
        state.relay = Some(relay);
        Ok(())
    }

    fn set_media(&mut self, source: &MediaSource) -> Result<()> {
        self.record(Command::SetMedia(source.clone()))?;
        let mut state = self.state.lock();
        state.has_media = true;
        state.slave_count = 0;
        Ok(())
    }

    fn add_subtitle_slave(&mut self, location: &str) -> Result<()> {
        self.record(Command::AddSubtitle(location.to_string()))?;
        self.state.lock().slave_count += 1;
        Ok(())
    }

    fn subtitle_slave_count(&self) -> Result<usize> {
        let state = self.state.lock();
        Ok(if state.has_media { state.slave_count } else { 0 })
    }

    fn play(&mut self) -> Result<()> {
        self.record(Command::Play)
    }

    fn pause(&mut self) -> Result<()> {
        self.record(Command::Pause)
    }

    fn stop(&mut self) -> Result<()> {
        self.record(Command::Stop)
    }

    fn is_seekable(&self) -> Result<bool> {
        Ok(self.state.lock().seekable)
    }

    fn set_time(&mut self, time_ms: i64) -> Result<()> {
        self.record(Command::SetTime(time_ms))
    }

    fn time(&self) -> Result<i64> {
        Ok(self.state.lock().time_ms)
    }

    fn length(&self) -> Result<i64> {
        Ok(self.state.lock().length_ms)
    }

    fn is_playing(&self) -> Result<bool> {
        Ok(self.state.lock().playing)
    }

    fn set_volume(&mut self, volume: i32) -> Result<()> {
        self.record(Command::SetVolume(volume))
    }

    fn set_aspect_ratio(&mut self, aspect_ratio: Option<&str>) -> Result<()> {
        self.record(Command::SetAspectRatio(aspect_ratio.map(str::to_string)))
    }

    fn set_scale(&mut self, scale: f32) -> Result<()> {
        self.record(Command::SetScale(scale))
    }

    fn attach_views(&mut self, media: u32, subtitles: u32, listener: u32) -> Result<()> {
        self.record(Command::AttachViews(media, subtitles, listener))
    }

    fn detach_views(&mut self) -> Result<()> {
        self.record(Command::DetachViews)
    }

    fn set_renderer(&mut self, renderer: Option<&String>) -> Result<()> {
        self.record(Command::SetRenderer(renderer.cloned()))
    }

    fn current_video_track(&self) -> Result<Option<VideoTrack>> {
        Ok(self.state.lock().video_track)
    }

    fn has_media(&self) -> Result<bool> {
        Ok(self.state.lock().has_media)
    }

    fn release(&mut self) -> Result<()> {
        self.record(Command::Release)?;
        self.state.lock().relay = None;
        Ok(())
    }
}

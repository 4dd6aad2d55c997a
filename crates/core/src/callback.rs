// Single-observer callback slot and the engine-facing event relay
// The relay runs on an engine-owned thread, never assume it is the UI thread

use crate::event::EngineEvent;
use parking_lot::RwLock;
use std::sync::Arc;

/// Normalized player events delivered to the observer
#[derive(Debug, Clone, PartialEq)]
pub enum CallbackEvent {
    /// Media is being opened
    Opening,

    /// Seekability of the current media changed
    SeekStateChanged { seekable: bool },

    /// Playback started
    Playing,

    /// Playback paused
    Paused,

    /// Playback stopped
    Stopped,

    /// End of media reached
    EndReached,

    /// The engine reported an error; no detail is carried
    Error,

    /// Elapsed time updated (milliseconds)
    TimeChanged { time_ms: i64 },

    /// Fractional position updated (0.0 - 1.0)
    PositionChanged { position: f32 },

    /// Buffering progress (percent)
    Buffering { percent: f32 },

    /// Subtitle tracks were asked to be cleared
    SubtitlesCleared,
}

impl CallbackEvent {
    /// Name of the observer callback this event is delivered as
    pub fn callback_name(&self) -> &'static str {
        match self {
            CallbackEvent::Opening => "onPlayerOpening",
            CallbackEvent::SeekStateChanged { .. } => "onPlayerSeekStateChange",
            CallbackEvent::Playing => "onPlayerPlaying",
            CallbackEvent::Paused => "onPlayerPaused",
            CallbackEvent::Stopped => "onPlayerStopped",
            CallbackEvent::EndReached => "onPlayerEndReached",
            CallbackEvent::Error => "onPlayerError",
            CallbackEvent::TimeChanged { .. } => "onPlayerTimeChange",
            CallbackEvent::PositionChanged { .. } => "onPlayerPositionChanged",
            CallbackEvent::Buffering { .. } => "onBuffering",
            CallbackEvent::SubtitlesCleared => "onSubtitlesCleared",
        }
    }
}

/// Player observer trait
/// Implementations should be lightweight and non-blocking
pub trait PlayerCallback: Send + Sync {
    /// Called when an event occurs
    /// This runs on the engine's callback thread and should return quickly
    fn on_event(&self, event: CallbackEvent);
}

/// Holds at most one observer; the last registration wins
#[derive(Clone, Default)]
pub struct CallbackSlot {
    inner: Arc<RwLock<Option<Arc<dyn PlayerCallback>>>>,
}

impl CallbackSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the observer. `None` unregisters.
    pub fn set(&self, callback: Option<Arc<dyn PlayerCallback>>) {
        *self.inner.write() = callback;
    }

    pub fn is_set(&self) -> bool {
        self.inner.read().is_some()
    }

    pub fn current(&self) -> Option<Arc<dyn PlayerCallback>> {
        self.inner.read().clone()
    }

    /// Deliver an event to the current observer, if any.
    pub fn notify(&self, event: CallbackEvent) {
        // The lock is released before dispatch so a slow observer can't
        // block registration.
        if let Some(callback) = self.current() {
            callback.on_event(event);
        }
    }
}

/// Entry point the engine calls for every event it emits
#[derive(Clone)]
pub struct EventRelay {
    slot: CallbackSlot,
}

impl EventRelay {
    pub(crate) fn new(slot: CallbackSlot) -> Self {
        Self { slot }
    }

    /// Map an engine event onto the observer. Unmapped kinds are dropped,
    /// and so is everything when no observer is registered.
    pub fn dispatch(&self, event: EngineEvent) {
        let Some(callback_event) = event.to_callback_event() else {
            log::trace!("Ignoring engine event {:?}", event);
            return;
        };

        let Some(callback) = self.slot.current() else {
            return;
        };

        log::debug!("Relaying {}", callback_event.callback_name());
        callback.on_event(callback_event);
    }
}

/// Recording callback for tests
#[cfg(test)]
pub struct TestCallback {
    events: parking_lot::Mutex<Vec<CallbackEvent>>,
}

#[cfg(test)]
impl TestCallback {
    pub fn new() -> Self {
        Self {
            events: parking_lot::Mutex::new(Vec::new()),
        }
    }

    pub fn get_events(&self) -> Vec<CallbackEvent> {
        self.events.lock().clone()
    }

    pub fn clear(&self) {
        self.events.lock().clear();
    }
}

#[cfg(test)]
impl PlayerCallback for TestCallback {
    fn on_event(&self, event: CallbackEvent) {
        self.events.lock().push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    fn relay_with(callback: Option<Arc<dyn PlayerCallback>>) -> (CallbackSlot, EventRelay) {
        let slot = CallbackSlot::new();
        slot.set(callback);
        let relay = EventRelay::new(slot.clone());
        (slot, relay)
    }

    #[test]
    fn test_relays_in_engine_order_and_drops_unmapped() {
        let test_callback = Arc::new(TestCallback::new());
        let (_slot, relay) = relay_with(Some(test_callback.clone()));

        relay.dispatch(EngineEvent::Opening);
        relay.dispatch(EngineEvent::Other(0x111));
        relay.dispatch(EngineEvent::Buffering { percent: 50.0 });
        relay.dispatch(EngineEvent::Playing);
        relay.dispatch(EngineEvent::Other(0x112));
        relay.dispatch(EngineEvent::TimeChanged { time_ms: 1500 });
        relay.dispatch(EngineEvent::TimeChanged { time_ms: 1500 });
        relay.dispatch(EngineEvent::EncounteredError);

        assert_eq!(
            test_callback.get_events(),
            vec![
                CallbackEvent::Opening,
                CallbackEvent::Buffering { percent: 50.0 },
                CallbackEvent::Playing,
                CallbackEvent::TimeChanged { time_ms: 1500 },
                CallbackEvent::TimeChanged { time_ms: 1500 },
                CallbackEvent::Error,
            ]
        );
    }

    #[test]
    fn test_no_observer_means_no_delivery() {
        let callback = Arc::new(TestCallback::new());
        let (slot, relay) = relay_with(Some(callback.clone()));
        slot.set(None);

        relay.dispatch(EngineEvent::Playing);
        relay.dispatch(EngineEvent::EndReached);

        assert!(!slot.is_set());
        assert!(callback.get_events().is_empty());

        // Re-registering starts from nothing; the dropped events aren't replayed
        slot.set(Some(callback.clone()));
        relay.dispatch(EngineEvent::Paused);
        assert_eq!(callback.get_events(), vec![CallbackEvent::Paused]);
    }

    #[test]
    fn test_last_registration_wins() {
        let first = Arc::new(TestCallback::new());
        let second = Arc::new(TestCallback::new());
        let (slot, relay) = relay_with(Some(first.clone()));

        relay.dispatch(EngineEvent::Playing);
        slot.set(Some(second.clone()));
        relay.dispatch(EngineEvent::Paused);
        slot.set(None);
        relay.dispatch(EngineEvent::Stopped);

        assert_eq!(first.get_events(), vec![CallbackEvent::Playing]);
        assert_eq!(second.get_events(), vec![CallbackEvent::Paused]);
        assert!(!slot.is_set());
    }

    #[test]
    fn test_observer_can_reregister_from_inside_a_callback() {
        // A callback that unregisters itself must not deadlock the relay.
        struct Unregistering {
            slot: CallbackSlot,
            calls: parking_lot::Mutex<usize>,
        }

        impl PlayerCallback for Unregistering {
            fn on_event(&self, _event: CallbackEvent) {
                *self.calls.lock() += 1;
                self.slot.set(None);
            }
        }

        let slot = CallbackSlot::new();
        let callback = Arc::new(Unregistering {
            slot: slot.clone(),
            calls: parking_lot::Mutex::new(0),
        });
        slot.set(Some(callback.clone()));
        let relay = EventRelay::new(slot.clone());

        relay.dispatch(EngineEvent::Playing);
        relay.dispatch(EngineEvent::Paused);

        assert_eq!(*callback.calls.lock(), 1);
    }

    #[test]
    fn test_concurrent_registration_during_relay() {
        let test_callback = Arc::new(TestCallback::new());
        let (slot, relay) = relay_with(Some(test_callback.clone()));

        let engine_thread = thread::spawn(move || {
            for i in 0..1000 {
                relay.dispatch(EngineEvent::TimeChanged { time_ms: i });
            }
        });

        for i in 0..1000 {
            if i % 2 == 0 {
                slot.set(None);
            } else {
                slot.set(Some(test_callback.clone()));
            }
        }
        slot.set(Some(test_callback.clone()));
        engine_thread.join().unwrap();

        // Whatever got through arrived in emission order.
        let times: Vec<i64> = test_callback
            .get_events()
            .into_iter()
            .map(|event| match event {
                CallbackEvent::TimeChanged { time_ms } => time_ms,
                other => panic!("unexpected event {:?}", other),
            })
            .collect();
        assert!(times.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_callback_names_match_observer_contract() {
        assert_eq!(CallbackEvent::Opening.callback_name(), "onPlayerOpening");
        assert_eq!(
            CallbackEvent::SeekStateChanged { seekable: false }.callback_name(),
            "onPlayerSeekStateChange"
        );
        assert_eq!(CallbackEvent::Error.callback_name(), "onPlayerError");
        assert_eq!(
            CallbackEvent::Buffering { percent: 0.0 }.callback_name(),
            "onBuffering"
        );
        assert_eq!(
            CallbackEvent::SubtitlesCleared.callback_name(),
            "onSubtitlesCleared"
        );
    }
}

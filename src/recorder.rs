// Input capture: turns native pointer, wheel and key notifications into normalized log entries.
// Driven by the platform's event callbacks; the host only advances the frame counter.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use tracing::{debug, trace, warn};

use crate::error::InputError;
use crate::recording::RecordingLog;
use crate::surface::{Clock, KeyboardSource, Surface, SystemClock};
use crate::types::*;

/// Callback run with each freshly appended entry.
pub type EventCallback = Box<dyn FnMut(&RecordedEvent)>;

struct RecorderState {
    log: RecordingLog,
    frame_number: FrameNumber,
    init_time_ms: f64,
}

/// State shared between the recorder handle and the listeners it attaches.
struct RecorderShared {
    config: RecorderConfig,
    clock: Box<dyn Clock>,
    state: RefCell<RecorderState>,
    on_new_event: RefCell<Option<EventCallback>>,
}

impl RecorderShared {
    /// Single writer into the log.
    fn add_event(&self, input: RecordedInput) {
        let entry = {
            let mut state = self.state.borrow_mut();
            let entry = if self.config.use_time {
                RecordedEvent::at_elapsed(input, self.clock.now_ms() - state.init_time_ms)
            } else {
                RecordedEvent::at_frame(input, state.frame_number)
            };
            state.log.push(entry.clone());
            entry
        };
        trace!(?entry, "recorded input event");

        // Log borrow is released first so the callback may read the recorder. The callback is
        // taken out while it runs: it may raise input that lands back here.
        let taken = self.on_new_event.borrow_mut().take();
        if let Some(mut callback) = taken {
            callback(&entry);
            let mut slot = self.on_new_event.borrow_mut();
            if slot.is_none() {
                *slot = Some(callback);
            }
        }
    }
}

/// Records input directed at one surface plus the injected keyboard source.
pub struct InputRecorder<S, K> {
    surface: S,
    keyboard: K,
    shared: Rc<RecorderShared>,
    enable_count: Cell<u32>,
}

impl<S, K> InputRecorder<S, K>
where
    S: Surface + Clone + 'static,
    K: KeyboardSource,
{
    pub fn new(surface: S, keyboard: K, config: RecorderConfig) -> Self {
        Self::with_clock(surface, keyboard, config, SystemClock::new())
    }

    pub fn with_clock(
        surface: S,
        keyboard: K,
        config: RecorderConfig,
        clock: impl Clock + 'static,
    ) -> Self {
        InputRecorder {
            surface,
            keyboard,
            shared: Rc::new(RecorderShared {
                config,
                clock: Box::new(clock),
                state: RefCell::new(RecorderState {
                    log: RecordingLog::new(),
                    frame_number: FrameNumber::default(),
                    init_time_ms: 0.0,
                }),
                on_new_event: RefCell::new(None),
            }),
            enable_count: Cell::new(0),
        }
    }

    /// Install the per-entry notification callback, replacing any previous one.
    pub fn on_new_event(&self, callback: impl FnMut(&RecordedEvent) + 'static) {
        *self.shared.on_new_event.borrow_mut() = Some(Box::new(callback));
    }

    /// Start capturing. Captures the time origin, optionally clears, then attaches listeners.
    ///
    /// Listeners are never detached. Calling this twice attaches a second set and every
    /// event is then recorded twice.
    pub fn enable(&self, force_reset: bool) {
        self.shared.state.borrow_mut().init_time_ms = self.shared.clock.now_ms();
        if force_reset {
            self.clear();
        }

        let count = self.enable_count.get() + 1;
        self.enable_count.set(count);
        if count > 1 {
            warn!(
                listener_sets = count,
                "input recorder enabled again; listeners are attached once more"
            );
        }

        for phase in [PointerPhase::Down, PointerPhase::Up, PointerPhase::Move] {
            let shared = Rc::clone(&self.shared);
            let surface = self.surface.clone();
            self.surface.add_pointer_listener(
                phase,
                Box::new(move |event| {
                    let position = surface.geometry().normalize(event.client_x, event.client_y);
                    shared.add_event(RecordedInput::Pointer(PointerInput::from_phase(
                        phase,
                        PointerPosition::new(position, event.button),
                    )));
                }),
            );
        }

        let shared = Rc::clone(&self.shared);
        self.surface.add_wheel_listener(Box::new(move |event| {
            shared.add_event(RecordedInput::Pointer(PointerInput::Wheel(WheelDelta {
                delta_x: event.delta_x,
                delta_y: event.delta_y,
                delta_z: event.delta_z,
                delta_mode: event.delta_mode,
            })));
        }));

        for phase in [KeyPhase::Down, KeyPhase::Up] {
            let shared = Rc::clone(&self.shared);
            self.keyboard.add_key_listener(
                phase,
                Box::new(move |event| {
                    shared.add_event(RecordedInput::Key(KeyInput::from_phase(
                        phase,
                        KeyPayload {
                            key_code: event.key_code,
                            char_code: event.char_code,
                            key: event.key.clone(),
                        },
                    )));
                }),
            );
        }

        debug!(
            force_reset,
            use_time = self.shared.config.use_time,
            "input recorder enabled"
        );
    }

    /// Reset the frame counter and empty the log. Listeners stay attached.
    pub fn clear(&self) {
        let mut state = self.shared.state.borrow_mut();
        state.frame_number = FrameNumber::default();
        state.log.clear();
    }

    pub fn frame_number(&self) -> FrameNumber {
        self.shared.state.borrow().frame_number
    }

    pub fn set_frame_number(&self, frame: FrameNumber) {
        self.shared.state.borrow_mut().frame_number = frame;
    }

    /// Called by the host once per rendered frame.
    pub fn advance_frame(&self) -> FrameNumber {
        let mut state = self.shared.state.borrow_mut();
        state.frame_number = state.frame_number.next();
        state.frame_number
    }

    /// Snapshot of everything recorded so far.
    pub fn log(&self) -> RecordingLog {
        self.shared.state.borrow().log.clone()
    }

    pub fn len(&self) -> usize {
        self.shared.state.borrow().log.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shared.state.borrow().log.is_empty()
    }

    pub fn to_json(&self) -> Result<String, InputError> {
        self.shared.state.borrow().log.to_json()
    }

    pub fn config(&self) -> &RecorderConfig {
        &self.shared.config
    }
}

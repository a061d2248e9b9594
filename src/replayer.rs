// Frame-driven replay: each tick synthesizes the entries recorded for that frame, in log order.
// Pointer positions adapt to the surface geometry at replay time, not at record time.

use std::cmp::Ordering;

use tracing::{debug, warn};

use crate::dispatch::{DispatchTarget, RegisteredListener};
use crate::error::InputError;
use crate::recording::RecordingLog;
use crate::surface::{Clock, Surface, SystemClock};
use crate::synth::*;
use crate::types::*;

/// Replays one complete log against a surface. Single use: the cursor never rewinds.
pub struct InputReplayer<S, C = ()> {
    surface: S,
    recording: RecordingLog,
    cursor: usize,
    target: DispatchTarget<C>,
    config: ReplayerConfig,
    clock: Box<dyn Clock>,
}

impl<S, C> InputReplayer<S, C>
where
    S: Surface,
    C: Clone,
{
    pub fn new(
        surface: S,
        recording: RecordingLog,
        target: DispatchTarget<C>,
        config: ReplayerConfig,
    ) -> Self {
        InputReplayer {
            surface,
            recording,
            cursor: 0,
            target,
            config,
            clock: Box::new(SystemClock::new()),
        }
    }

    /// Replace the clock used for `CompleteMouseEvent::time_stamp`.
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    /// Index of the next entry to replay.
    pub fn position(&self) -> usize {
        self.cursor
    }

    pub fn remaining(&self) -> usize {
        self.recording.len() - self.cursor
    }

    pub fn is_exhausted(&self) -> bool {
        self.cursor >= self.recording.len()
    }

    pub fn recording(&self) -> &RecordingLog {
        &self.recording
    }

    /// Replay every entry recorded for `frame` and return how many were dispatched.
    ///
    /// Entries for later frames wait. Entries for earlier frames are dropped: a frame the host
    /// never ticks is never replayed. On error the failing entry stays at the cursor.
    pub fn tick(&mut self, frame: FrameNumber) -> Result<usize, InputError> {
        let mut dispatched = 0;

        while let Some(entry) = self.recording.get(self.cursor) {
            let entry_frame = match entry.timing {
                Timing::Frame { logical_frame } => logical_frame,
                Timing::Elapsed { elapsed_ms } => {
                    warn!(
                        index = self.cursor,
                        elapsed_ms, "skipping time-stamped entry; replay is frame-driven"
                    );
                    self.cursor += 1;
                    continue;
                }
            };

            match entry_frame.cmp(&frame) {
                Ordering::Greater => break,
                Ordering::Less => {
                    debug!(
                        index = self.cursor,
                        entry_frame = entry_frame.as_u32(),
                        frame = frame.as_u32(),
                        "dropping entry for a frame that was never ticked"
                    );
                }
                Ordering::Equal => {
                    if self.replay_entry(self.cursor, &entry.input)? {
                        dispatched += 1;
                    }
                }
            }
            self.cursor += 1;
        }

        Ok(dispatched)
    }

    fn replay_entry(&self, index: usize, input: &RecordedInput) -> Result<bool, InputError> {
        match input {
            RecordedInput::Pointer(PointerInput::Down(position)) => {
                self.replay_mouse(PointerPhase::Down, position)?
            }
            RecordedInput::Pointer(PointerInput::Up(position)) => {
                self.replay_mouse(PointerPhase::Up, position)?
            }
            RecordedInput::Pointer(PointerInput::Move(position)) => {
                self.replay_mouse(PointerPhase::Move, position)?
            }
            RecordedInput::Pointer(PointerInput::Wheel(delta)) => self.replay_wheel(delta)?,
            RecordedInput::Key(KeyInput::Down(payload)) => {
                self.replay_key(KeyPhase::Down, payload)?
            }
            RecordedInput::Key(KeyInput::Up(payload)) => self.replay_key(KeyPhase::Up, payload)?,
            RecordedInput::Unrecognized => {
                warn!(index, "skipping entry with unrecognized category");
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn replay_mouse(&self, phase: PointerPhase, position: &PointerPosition) -> Result<(), InputError> {
        let geometry = self.surface.geometry();
        let event = SyntheticMouseEvent::from_recorded(phase, position, &geometry);

        let Some(listeners) = self.target.direct(self.config.dispatch_mouse_events_via_dom) else {
            return self.surface.dispatch_event(&SyntheticEvent::Mouse(event));
        };

        if geometry.has_border() {
            return Err(InputError::BorderedSurface {
                client_width: geometry.client_width,
                client_height: geometry.client_height,
                offset_width: geometry.offset_width,
                offset_height: geometry.offset_height,
            });
        }

        for listener in matching(listeners, event.event_type) {
            if self.config.needs_complete_custom_mouse_event_fields {
                let complete = CompleteMouseEvent::from_synthetic(
                    &event,
                    &listener.context,
                    &geometry,
                    self.clock.now_ms(),
                );
                listener.invoke(&ListenerEvent::CompleteMouse(&complete));
            } else {
                listener.invoke(&ListenerEvent::Mouse(&event));
            }
        }
        Ok(())
    }

    fn replay_wheel(&self, delta: &WheelDelta) -> Result<(), InputError> {
        let event = SyntheticWheelEvent::from_recorded(delta);

        match self.target.direct(self.config.dispatch_mouse_events_via_dom) {
            Some(listeners) => {
                for listener in matching(listeners, event.event_type()) {
                    listener.invoke(&ListenerEvent::Wheel(&event));
                }
                Ok(())
            }
            None => self.surface.dispatch_event(&SyntheticEvent::Wheel(event)),
        }
    }

    fn replay_key(&self, phase: KeyPhase, payload: &KeyPayload) -> Result<(), InputError> {
        let event = SyntheticKeyEvent::from_recorded(phase, payload);

        match self.target.direct(self.config.dispatch_key_events_via_dom) {
            Some(listeners) => {
                for listener in matching(listeners, event.event_type) {
                    listener.invoke(&ListenerEvent::Key(&event));
                }
                Ok(())
            }
            None => self.surface.dispatch_event(&SyntheticEvent::Key(event)),
        }
    }
}

fn matching<C>(
    listeners: &[RegisteredListener<C>],
    event_type: SyntheticEventType,
) -> impl Iterator<Item = &RegisteredListener<C>> {
    listeners.iter().filter(move |l| l.matches(event_type))
}

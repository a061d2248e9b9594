// Synthetic event shapes rebuilt from recorded entries.
// Mouse positions are denormalized against the surface geometry at replay time.

use std::fmt;

use crate::types::{KeyPayload, KeyPhase, PointerPhase, PointerPosition, SurfaceGeometry, WheelDelta};

/// `Event.AT_TARGET`.
const EVENT_PHASE_AT_TARGET: u16 = 2;

/// DOM event type string of a synthetic event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyntheticEventType {
    MouseDown,
    MouseUp,
    MouseMove,
    MouseWheel,
    KeyDown,
    KeyUp,
}

impl SyntheticEventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SyntheticEventType::MouseDown => "mousedown",
            SyntheticEventType::MouseUp => "mouseup",
            SyntheticEventType::MouseMove => "mousemove",
            SyntheticEventType::MouseWheel => "mousewheel",
            SyntheticEventType::KeyDown => "keydown",
            SyntheticEventType::KeyUp => "keyup",
        }
    }
}

impl From<PointerPhase> for SyntheticEventType {
    fn from(phase: PointerPhase) -> Self {
        match phase {
            PointerPhase::Down => SyntheticEventType::MouseDown,
            PointerPhase::Up => SyntheticEventType::MouseUp,
            PointerPhase::Move => SyntheticEventType::MouseMove,
        }
    }
}

impl From<KeyPhase> for SyntheticEventType {
    fn from(phase: KeyPhase) -> Self {
        match phase {
            KeyPhase::Down => SyntheticEventType::KeyDown,
            KeyPhase::Up => SyntheticEventType::KeyUp,
        }
    }
}

impl fmt::Display for SyntheticEventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Minimal mouse event, the fields `initMouseEvent` populates.
#[derive(Debug, Clone, PartialEq)]
pub struct SyntheticMouseEvent {
    pub event_type: SyntheticEventType,
    pub bubbles: bool,
    pub cancelable: bool,
    /// Click count: 0 for moves, 1 otherwise.
    pub detail: i32,
    pub screen_x: i32,
    pub screen_y: i32,
    pub client_x: i32,
    pub client_y: i32,
    pub button: i16,
    /// Marks the event as replayed rather than user-originated.
    pub programmatic: bool,
}

impl SyntheticMouseEvent {
    pub fn from_recorded(
        phase: PointerPhase,
        position: &PointerPosition,
        geometry: &SurfaceGeometry,
    ) -> Self {
        let pixel = geometry.denormalize(position.position());
        SyntheticMouseEvent {
            event_type: phase.into(),
            bubbles: true,
            cancelable: true,
            detail: if phase == PointerPhase::Move { 0 } else { 1 },
            screen_x: pixel.x,
            screen_y: pixel.y,
            client_x: pixel.x,
            client_y: pixel.y,
            button: position.button,
            programmatic: true,
        }
    }

    /// Legacy `which`: button index plus one.
    pub fn which(&self) -> u32 {
        (i32::from(self.button) + 1).max(0) as u32
    }
}

/// Wheel event with the legacy `wheelDelta*` fields mirrored from the deltas.
#[derive(Debug, Clone, PartialEq)]
pub struct SyntheticWheelEvent {
    pub bubbles: bool,
    pub delta_x: f64,
    pub delta_y: f64,
    pub delta_z: f64,
    pub delta_mode: u32,
    pub wheel_delta_x: f64,
    pub wheel_delta_y: f64,
    pub wheel_delta: f64,
}

impl SyntheticWheelEvent {
    pub fn from_recorded(delta: &WheelDelta) -> Self {
        SyntheticWheelEvent {
            bubbles: true,
            delta_x: delta.delta_x,
            delta_y: delta.delta_y,
            delta_z: delta.delta_z,
            delta_mode: delta.delta_mode,
            wheel_delta_x: delta.delta_x,
            wheel_delta_y: delta.delta_y,
            wheel_delta: delta.delta_y,
        }
    }

    pub fn event_type(&self) -> SyntheticEventType {
        SyntheticEventType::MouseWheel
    }
}

/// Keyboard event. `which` mirrors `key_code`.
#[derive(Debug, Clone, PartialEq)]
pub struct SyntheticKeyEvent {
    pub event_type: SyntheticEventType,
    pub bubbles: bool,
    pub cancelable: bool,
    pub key_code: u32,
    pub which: u32,
    pub char_code: u32,
    pub key: String,
    pub programmatic: bool,
}

impl SyntheticKeyEvent {
    pub fn from_recorded(phase: KeyPhase, payload: &KeyPayload) -> Self {
        SyntheticKeyEvent {
            event_type: phase.into(),
            bubbles: true,
            cancelable: true,
            key_code: payload.key_code,
            which: payload.key_code,
            char_code: payload.char_code,
            key: payload.key.clone(),
            programmatic: true,
        }
    }
}

/// Event handed to a surface's native dispatch.
#[derive(Debug, Clone, PartialEq)]
pub enum SyntheticEvent {
    Mouse(SyntheticMouseEvent),
    Wheel(SyntheticWheelEvent),
    Key(SyntheticKeyEvent),
}

impl SyntheticEvent {
    pub fn event_type(&self) -> SyntheticEventType {
        match self {
            SyntheticEvent::Mouse(event) => event.event_type,
            SyntheticEvent::Wheel(event) => event.event_type(),
            SyntheticEvent::Key(event) => event.event_type,
        }
    }
}

/// Every field a native mouse event exposes, for consumers that read more than
/// `initMouseEvent` fills in. Target fields hold the receiving listener's context.
#[derive(Debug, Clone, PartialEq)]
pub struct CompleteMouseEvent<C> {
    pub event_type: SyntheticEventType,
    pub current_target: C,
    pub src_element: C,
    pub target: C,
    pub from_element: C,
    pub to_element: C,
    pub event_phase: u16,
    pub buttons: u16,
    pub button: i16,
    pub alt_key: bool,
    pub ctrl_key: bool,
    pub meta_key: bool,
    pub shift_key: bool,
    pub bubbles: bool,
    pub cancelable: bool,
    pub cancel_bubble: bool,
    pub default_prevented: bool,
    pub detail: i32,
    pub is_trusted: bool,
    pub client_x: i32,
    pub client_y: i32,
    pub screen_x: i32,
    pub screen_y: i32,
    pub page_x: i32,
    pub page_y: i32,
    pub layer_x: i32,
    pub layer_y: i32,
    pub offset_x: i32,
    pub offset_y: i32,
    pub movement_x: i32,
    pub movement_y: i32,
    pub x: i32,
    pub y: i32,
    pub which: u32,
    pub time_stamp: f64,
}

impl<C: Clone> CompleteMouseEvent<C> {
    pub fn from_synthetic(
        event: &SyntheticMouseEvent,
        context: &C,
        geometry: &SurfaceGeometry,
        time_stamp: f64,
    ) -> Self {
        // Target-relative position. Only meaningful on a borderless surface, which direct
        // dispatch already requires.
        let offset_x = event.client_x - geometry.rect.left.round() as i32;
        let offset_y = event.client_y - geometry.rect.top.round() as i32;

        CompleteMouseEvent {
            event_type: event.event_type,
            current_target: context.clone(),
            src_element: context.clone(),
            target: context.clone(),
            from_element: context.clone(),
            to_element: context.clone(),
            event_phase: EVENT_PHASE_AT_TARGET,
            buttons: if event.event_type == SyntheticEventType::MouseDown {
                1
            } else {
                0
            },
            button: event.button,
            alt_key: false,
            ctrl_key: false,
            meta_key: false,
            shift_key: false,
            bubbles: event.bubbles,
            cancelable: event.cancelable,
            cancel_bubble: false,
            default_prevented: false,
            detail: event.detail,
            is_trusted: false,
            client_x: event.client_x,
            client_y: event.client_y,
            screen_x: event.screen_x,
            screen_y: event.screen_y,
            page_x: event.client_x,
            page_y: event.client_y,
            layer_x: offset_x,
            layer_y: offset_y,
            offset_x,
            offset_y,
            movement_x: 0,
            movement_y: 0,
            x: event.client_x,
            y: event.client_y,
            which: event.which(),
            time_stamp,
        }
    }
}

/// What a directly registered listener receives.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ListenerEvent<'a, C> {
    Mouse(&'a SyntheticMouseEvent),
    CompleteMouse(&'a CompleteMouseEvent<C>),
    Wheel(&'a SyntheticWheelEvent),
    Key(&'a SyntheticKeyEvent),
}

impl<C> ListenerEvent<'_, C> {
    pub fn event_type(&self) -> SyntheticEventType {
        match self {
            ListenerEvent::Mouse(event) => event.event_type,
            ListenerEvent::CompleteMouse(event) => event.event_type,
            ListenerEvent::Wheel(event) => event.event_type(),
            ListenerEvent::Key(event) => event.event_type,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::NormalizedCoord;

    fn position(x: f64, y: f64, button: i16) -> PointerPosition {
        PointerPosition::new(NormalizedCoord::new(x, y), button)
    }

    #[test]
    fn mouse_event_uses_current_geometry() {
        let geometry = SurfaceGeometry::borderless(10.0, 20.0, 200.0, 100.0);
        let event =
            SyntheticMouseEvent::from_recorded(PointerPhase::Down, &position(0.5, 0.5, 0), &geometry);
        assert_eq!(event.event_type, SyntheticEventType::MouseDown);
        assert_eq!((event.client_x, event.client_y), (110, 70));
        assert_eq!((event.screen_x, event.screen_y), (110, 70));
        assert_eq!(event.detail, 1);
        assert!(event.programmatic);
    }

    #[test]
    fn move_has_zero_detail() {
        let geometry = SurfaceGeometry::borderless(0.0, 0.0, 100.0, 100.0);
        let event =
            SyntheticMouseEvent::from_recorded(PointerPhase::Move, &position(0.1, 0.2, 0), &geometry);
        assert_eq!(event.detail, 0);
        assert_eq!(event.event_type.as_str(), "mousemove");
    }

    #[test]
    fn wheel_mirrors_legacy_deltas() {
        let event = SyntheticWheelEvent::from_recorded(&WheelDelta {
            delta_x: -3.0,
            delta_y: 120.0,
            delta_z: 0.0,
            delta_mode: 0,
        });
        assert_eq!(event.delta_y, 120.0);
        assert_eq!(event.wheel_delta_y, 120.0);
        assert_eq!(event.wheel_delta, 120.0);
        assert_eq!(event.wheel_delta_x, -3.0);
        assert_eq!(event.event_type().as_str(), "mousewheel");
    }

    #[test]
    fn key_which_mirrors_key_code() {
        let event = SyntheticKeyEvent::from_recorded(
            KeyPhase::Up,
            &KeyPayload {
                key_code: 65,
                char_code: 0,
                key: "a".to_string(),
            },
        );
        assert_eq!(event.which, 65);
        assert_eq!(event.event_type, SyntheticEventType::KeyUp);
        assert!(event.programmatic);
    }

    #[test]
    fn complete_event_derives_buttons_and_targets() {
        let geometry = SurfaceGeometry::borderless(10.0, 20.0, 200.0, 100.0);
        let down =
            SyntheticMouseEvent::from_recorded(PointerPhase::Down, &position(0.5, 0.5, 0), &geometry);
        let complete = CompleteMouseEvent::from_synthetic(&down, &"canvas", &geometry, 42.0);
        assert_eq!(complete.buttons, 1);
        assert_eq!(complete.target, "canvas");
        assert_eq!(complete.current_target, "canvas");
        assert_eq!(complete.event_phase, 2);
        assert_eq!((complete.offset_x, complete.offset_y), (100, 50));
        assert_eq!(complete.which, 1);
        assert_eq!(complete.time_stamp, 42.0);

        let up =
            SyntheticMouseEvent::from_recorded(PointerPhase::Up, &position(0.5, 0.5, 0), &geometry);
        let complete = CompleteMouseEvent::from_synthetic(&up, &"canvas", &geometry, 43.0);
        assert_eq!(complete.buttons, 0);
    }
}

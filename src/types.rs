// Strong typing over strings. Newtypes for frame numbers and coordinates, plus the recorded-event model.
// Pointer positions are stored normalized so a log replays against any surface size.

use serde::{Deserialize, Serialize};

use crate::error::InputError;

/// Logical frame number supplied by the host. Newtype for type safety.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct FrameNumber(u32);

impl FrameNumber {
    pub fn new(frame: u32) -> Self {
        FrameNumber(frame)
    }

    pub fn as_u32(&self) -> u32 {
        self.0
    }

    pub fn next(&self) -> Self {
        FrameNumber(self.0.saturating_add(1))
    }
}

/// Pixel coordinate in viewport space. Signed: a relocated surface may sit at a negative offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct PixelCoord {
    pub x: i32,
    pub y: i32,
}

impl PixelCoord {
    pub fn new(x: i32, y: i32) -> Self {
        PixelCoord { x, y }
    }
}

/// Normalized coordinate, a fraction of the surface content size.
///
/// Not clamped: a position outside the surface is kept exactly as recorded.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct NormalizedCoord {
    pub x: f64,
    pub y: f64,
}

impl NormalizedCoord {
    pub fn new(x: f64, y: f64) -> Self {
        NormalizedCoord { x, y }
    }

    pub fn is_inside(&self) -> bool {
        (0.0..=1.0).contains(&self.x) && (0.0..=1.0).contains(&self.y)
    }
}

/// Bounding rectangle in viewport pixels (the outer box of the surface).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct ClientRect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

/// Snapshot of a surface's placement and size, read at the moment an event is captured or replayed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct SurfaceGeometry {
    pub rect: ClientRect,
    /// Content box size.
    pub client_width: f64,
    pub client_height: f64,
    /// Outer size including borders.
    pub offset_width: f64,
    pub offset_height: f64,
}

impl SurfaceGeometry {
    /// Geometry of a surface without border or padding at the given position.
    pub fn borderless(left: f64, top: f64, width: f64, height: f64) -> Self {
        SurfaceGeometry {
            rect: ClientRect {
                left,
                top,
                width,
                height,
            },
            client_width: width,
            client_height: height,
            offset_width: width,
            offset_height: height,
        }
    }

    /// True when the content box differs from the outer box.
    pub fn has_border(&self) -> bool {
        self.client_width != self.offset_width || self.client_height != self.offset_height
    }

    /// Map a viewport position to content-relative [0, 1] coordinates.
    pub fn normalize(&self, client_x: f64, client_y: f64) -> NormalizedCoord {
        NormalizedCoord {
            x: (client_x - self.rect.left) / self.client_width,
            y: (client_y - self.rect.top) / self.client_height,
        }
    }

    /// Map normalized coordinates back to viewport pixels using this geometry.
    pub fn denormalize(&self, coord: NormalizedCoord) -> PixelCoord {
        let x = self.rect.left + coord.x * self.client_width;
        let y = self.rect.top + coord.y * self.client_height;
        PixelCoord::new(x.round() as i32, y.round() as i32)
    }
}

/// Pointer button transitions that carry a position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerPhase {
    Down,
    Up,
    Move,
}

impl PointerPhase {
    pub fn dom_event_type(&self) -> &'static str {
        match self {
            PointerPhase::Down => "mousedown",
            PointerPhase::Up => "mouseup",
            PointerPhase::Move => "mousemove",
        }
    }
}

/// Key transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyPhase {
    Down,
    Up,
}

impl KeyPhase {
    pub fn dom_event_type(&self) -> &'static str {
        match self {
            KeyPhase::Down => "keydown",
            KeyPhase::Up => "keyup",
        }
    }
}

/// Payload of pointer down/up/move entries.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PointerPosition {
    #[serde(alias = "x")]
    pub normalized_x: f64,
    #[serde(alias = "y")]
    pub normalized_y: f64,
    #[serde(default)]
    pub button: i16,
}

impl PointerPosition {
    pub fn new(position: NormalizedCoord, button: i16) -> Self {
        PointerPosition {
            normalized_x: position.x,
            normalized_y: position.y,
            button,
        }
    }

    pub fn position(&self) -> NormalizedCoord {
        NormalizedCoord::new(self.normalized_x, self.normalized_y)
    }
}

/// Payload of wheel entries. Platform deltas, passed through untouched.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct WheelDelta {
    pub delta_x: f64,
    pub delta_y: f64,
    pub delta_z: f64,
    pub delta_mode: u32,
}

/// Payload of key entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct KeyPayload {
    pub key_code: u32,
    pub char_code: u32,
    pub key: String,
}

/// Pointer entries, tagged by action with the payload alongside.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", content = "payload", rename_all = "camelCase")]
pub enum PointerInput {
    Down(PointerPosition),
    Up(PointerPosition),
    Move(PointerPosition),
    Wheel(WheelDelta),
}

impl PointerInput {
    pub fn from_phase(phase: PointerPhase, position: PointerPosition) -> Self {
        match phase {
            PointerPhase::Down => PointerInput::Down(position),
            PointerPhase::Up => PointerInput::Up(position),
            PointerPhase::Move => PointerInput::Move(position),
        }
    }
}

/// Key entries, tagged by action with the payload alongside.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", content = "payload", rename_all = "camelCase")]
pub enum KeyInput {
    Down(KeyPayload),
    Up(KeyPayload),
}

impl KeyInput {
    pub fn from_phase(phase: KeyPhase, payload: KeyPayload) -> Self {
        match phase {
            KeyPhase::Down => KeyInput::Down(payload),
            KeyPhase::Up => KeyInput::Up(payload),
        }
    }
}

/// Category of a recorded entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "category", rename_all = "camelCase")]
pub enum RecordedInput {
    #[serde(alias = "mouse")]
    Pointer(PointerInput),
    Key(KeyInput),
    /// Any category this crate does not replay. Kept so one foreign entry doesn't reject a whole log.
    #[serde(other)]
    Unrecognized,
}

/// When an entry happened: a host frame number or milliseconds since the recorder was enabled.
/// One recording session uses one variant throughout.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Timing {
    Frame {
        #[serde(rename = "logicalFrame", alias = "frameNumber")]
        logical_frame: FrameNumber,
    },
    Elapsed {
        #[serde(rename = "elapsedTimeMs", alias = "time")]
        elapsed_ms: f64,
    },
}

impl Timing {
    pub fn frame(&self) -> Option<FrameNumber> {
        match self {
            Timing::Frame { logical_frame } => Some(*logical_frame),
            Timing::Elapsed { .. } => None,
        }
    }
}

/// One entry of the ordered log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordedEvent {
    #[serde(flatten)]
    pub input: RecordedInput,
    #[serde(flatten)]
    pub timing: Timing,
}

impl RecordedEvent {
    pub fn at_frame(input: RecordedInput, frame: FrameNumber) -> Self {
        RecordedEvent {
            input,
            timing: Timing::Frame {
                logical_frame: frame,
            },
        }
    }

    pub fn at_elapsed(input: RecordedInput, elapsed_ms: f64) -> Self {
        RecordedEvent {
            input,
            timing: Timing::Elapsed { elapsed_ms },
        }
    }
}

/// Recorder configuration passed from JS.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct RecorderConfig {
    /// Stamp entries with elapsed milliseconds instead of the frame counter.
    #[serde(default)]
    pub use_time: bool,
}

impl RecorderConfig {
    pub fn from_json(json: &str) -> Result<Self, InputError> {
        serde_json::from_str(json).map_err(|e| InputError::InvalidConfig(e.to_string()))
    }
}

/// Replayer configuration passed from JS.
///
/// The `*_via_dom` flags only take effect when a registered-listener set was supplied:
/// enabled means "deliver to those listeners directly".
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplayerConfig {
    #[serde(default = "default_true", rename = "dispatchKeyEventsViaDOM")]
    pub dispatch_key_events_via_dom: bool,
    #[serde(default = "default_true", rename = "dispatchMouseEventsViaDOM")]
    pub dispatch_mouse_events_via_dom: bool,
    /// Deliver `CompleteMouseEvent` records instead of minimal synthetic mouse events.
    #[serde(default)]
    pub needs_complete_custom_mouse_event_fields: bool,
}

fn default_true() -> bool {
    true
}

impl Default for ReplayerConfig {
    fn default() -> Self {
        ReplayerConfig {
            dispatch_key_events_via_dom: true,
            dispatch_mouse_events_via_dom: true,
            needs_complete_custom_mouse_event_fields: false,
        }
    }
}

impl ReplayerConfig {
    pub fn from_json(json: &str) -> Result<Self, InputError> {
        serde_json::from_str(json).map_err(|e| InputError::InvalidConfig(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_subtracts_offset_and_divides_by_content_size() {
        let geometry = SurfaceGeometry::borderless(10.0, 20.0, 200.0, 100.0);
        let coord = geometry.normalize(110.0, 70.0);
        assert!((coord.x - 0.5).abs() < 1e-9);
        assert!((coord.y - 0.5).abs() < 1e-9);
    }

    #[test]
    fn normalized_coord_is_not_clamped() {
        let geometry = SurfaceGeometry::borderless(100.0, 100.0, 50.0, 50.0);
        let coord = geometry.normalize(50.0, 200.0);
        assert_eq!(coord.x, -1.0);
        assert_eq!(coord.y, 2.0);
        assert!(!coord.is_inside());
    }

    #[test]
    fn denormalize_rounds_to_nearest_pixel() {
        let geometry = SurfaceGeometry::borderless(10.0, 20.0, 200.0, 100.0);
        assert_eq!(
            geometry.denormalize(NormalizedCoord::new(0.5, 0.5)),
            PixelCoord::new(110, 70)
        );
        assert_eq!(
            geometry.denormalize(NormalizedCoord::new(0.333, 0.666)),
            PixelCoord::new(77, 87)
        );
    }

    #[test]
    fn border_detection() {
        let mut geometry = SurfaceGeometry::borderless(0.0, 0.0, 320.0, 240.0);
        assert!(!geometry.has_border());
        geometry.offset_width = 322.0;
        assert!(geometry.has_border());
    }

    #[test]
    fn frame_number_next_saturates() {
        assert_eq!(FrameNumber::new(4).next(), FrameNumber::new(5));
        assert_eq!(FrameNumber::new(u32::MAX).next(), FrameNumber::new(u32::MAX));
    }

    #[test]
    fn replayer_config_defaults() {
        let config = ReplayerConfig::from_json("{}").unwrap();
        assert!(config.dispatch_key_events_via_dom);
        assert!(config.dispatch_mouse_events_via_dom);
        assert!(!config.needs_complete_custom_mouse_event_fields);
    }

    #[test]
    fn replayer_config_reads_js_option_names() {
        let config = ReplayerConfig::from_json(
            r#"{"dispatchMouseEventsViaDOM":false,"needsCompleteCustomMouseEventFields":true}"#,
        )
        .unwrap();
        assert!(config.dispatch_key_events_via_dom);
        assert!(!config.dispatch_mouse_events_via_dom);
        assert!(config.needs_complete_custom_mouse_event_fields);
    }

    #[test]
    fn recorder_config_rejects_garbage() {
        assert!(matches!(
            RecorderConfig::from_json("not json"),
            Err(InputError::InvalidConfig(_))
        ));
        assert!(RecorderConfig::from_json(r#"{"useTime":true}"#).unwrap().use_time);
    }
}

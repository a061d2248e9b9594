// Capabilities the recorder and replayer are built on: a surface, a keyboard source, a clock.
// Browser implementations live in `web`; tests use in-memory doubles.

use web_time::Instant;

use crate::error::InputError;
use crate::synth::SyntheticEvent;
use crate::types::{KeyPhase, PointerPhase, SurfaceGeometry};

/// Callback attached to a native event source. Lives as long as the source.
pub type Listener<E> = Box<dyn FnMut(&E)>;

/// Pointer notification as delivered by the platform, in viewport pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NativePointerEvent {
    pub client_x: f64,
    pub client_y: f64,
    pub button: i16,
}

/// Wheel notification as delivered by the platform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NativeWheelEvent {
    pub delta_x: f64,
    pub delta_y: f64,
    pub delta_z: f64,
    pub delta_mode: u32,
}

/// Keyboard notification as delivered by the platform.
#[derive(Debug, Clone, PartialEq)]
pub struct NativeKeyEvent {
    pub key_code: u32,
    pub char_code: u32,
    pub key: String,
}

/// A rectangular interactive region input is captured from and replayed against.
///
/// Methods take `&self`: like DOM elements, implementations are handles with interior state.
pub trait Surface {
    /// Current placement and size. Read per event, never cached.
    fn geometry(&self) -> SurfaceGeometry;

    fn add_pointer_listener(&self, phase: PointerPhase, listener: Listener<NativePointerEvent>);

    fn add_wheel_listener(&self, listener: Listener<NativeWheelEvent>);

    /// Hand a synthetic event to the platform's own dispatch, which runs whatever listeners are
    /// really attached.
    fn dispatch_event(&self, event: &SyntheticEvent) -> Result<(), InputError>;
}

/// Ambient keyboard input, not scoped to any surface.
pub trait KeyboardSource {
    fn add_key_listener(&self, phase: KeyPhase, listener: Listener<NativeKeyEvent>);
}

/// Millisecond time source.
pub trait Clock {
    fn now_ms(&self) -> f64;
}

/// Monotonic clock backed by `web_time::Instant` (`performance.now()` on wasm32).
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        SystemClock {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now_ms(&self) -> f64 {
        self.origin.elapsed().as_secs_f64() * 1000.0
    }
}

// In-memory surface, keyboard and clock used by the unit tests.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::error::InputError;
use crate::surface::{
    Clock, KeyboardSource, Listener, NativeKeyEvent, NativePointerEvent, NativeWheelEvent, Surface,
};
use crate::synth::SyntheticEvent;
use crate::types::{KeyPhase, PointerPhase, SurfaceGeometry};

#[derive(Default)]
struct FakeSurfaceInner {
    geometry: Cell<SurfaceGeometry>,
    pointer_listeners: RefCell<Vec<(PointerPhase, Listener<NativePointerEvent>)>>,
    wheel_listeners: RefCell<Vec<Listener<NativeWheelEvent>>>,
    dispatched: RefCell<Vec<SyntheticEvent>>,
    rejecting: Cell<bool>,
}

/// Surface handle whose clones share listeners, geometry and the native dispatch record.
#[derive(Clone, Default)]
pub(crate) struct FakeSurface {
    inner: Rc<FakeSurfaceInner>,
}

impl FakeSurface {
    pub fn new(geometry: SurfaceGeometry) -> Self {
        let surface = FakeSurface::default();
        surface.set_geometry(geometry);
        surface
    }

    pub fn set_geometry(&self, geometry: SurfaceGeometry) {
        self.inner.geometry.set(geometry);
    }

    pub fn fire_pointer(&self, phase: PointerPhase, event: NativePointerEvent) {
        for (listener_phase, listener) in self.inner.pointer_listeners.borrow_mut().iter_mut() {
            if *listener_phase == phase {
                listener(&event);
            }
        }
    }

    pub fn fire_wheel(&self, event: NativeWheelEvent) {
        for listener in self.inner.wheel_listeners.borrow_mut().iter_mut() {
            listener(&event);
        }
    }

    pub fn pointer_listener_count(&self) -> usize {
        self.inner.pointer_listeners.borrow().len()
    }

    /// Make native dispatch fail until turned off again.
    pub fn reject_dispatch(&self, rejecting: bool) {
        self.inner.rejecting.set(rejecting);
    }

    /// Events that went through native dispatch, in order.
    pub fn dispatched(&self) -> Vec<SyntheticEvent> {
        self.inner.dispatched.borrow().clone()
    }
}

impl Surface for FakeSurface {
    fn geometry(&self) -> SurfaceGeometry {
        self.inner.geometry.get()
    }

    fn add_pointer_listener(&self, phase: PointerPhase, listener: Listener<NativePointerEvent>) {
        self.inner.pointer_listeners.borrow_mut().push((phase, listener));
    }

    fn add_wheel_listener(&self, listener: Listener<NativeWheelEvent>) {
        self.inner.wheel_listeners.borrow_mut().push(listener);
    }

    fn dispatch_event(&self, event: &SyntheticEvent) -> Result<(), InputError> {
        if self.inner.rejecting.get() {
            return Err(InputError::Dispatch {
                event_type: event.event_type().to_string(),
                message: "surface rejected the event".to_string(),
            });
        }
        self.inner.dispatched.borrow_mut().push(event.clone());
        Ok(())
    }
}

#[derive(Clone, Default)]
pub(crate) struct FakeKeyboard {
    listeners: Rc<RefCell<Vec<(KeyPhase, Listener<NativeKeyEvent>)>>>,
}

impl FakeKeyboard {
    pub fn fire(&self, phase: KeyPhase, event: NativeKeyEvent) {
        for (listener_phase, listener) in self.listeners.borrow_mut().iter_mut() {
            if *listener_phase == phase {
                listener(&event);
            }
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }
}

impl KeyboardSource for FakeKeyboard {
    fn add_key_listener(&self, phase: KeyPhase, listener: Listener<NativeKeyEvent>) {
        self.listeners.borrow_mut().push((phase, listener));
    }
}

/// Clock that only moves when told to.
#[derive(Clone, Default)]
pub(crate) struct ManualClock {
    now: Rc<Cell<f64>>,
}

impl ManualClock {
    pub fn set(&self, now_ms: f64) {
        self.now.set(now_ms);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> f64 {
        self.now.get()
    }
}

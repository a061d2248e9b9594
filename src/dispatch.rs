// Where replayed events go: the surface's native dispatch, or a host-supplied listener set.

use std::fmt;

use crate::synth::{ListenerEvent, SyntheticEventType};

type ListenerFn<C> = Box<dyn Fn(&C, &ListenerEvent<'_, C>)>;

/// One `{context, type, listener}` entry of a host's listener registry.
pub struct RegisteredListener<C> {
    pub context: C,
    pub event_type: String,
    callback: ListenerFn<C>,
}

impl<C> RegisteredListener<C> {
    pub fn new<F>(context: C, event_type: impl Into<String>, callback: F) -> Self
    where
        F: Fn(&C, &ListenerEvent<'_, C>) + 'static,
    {
        RegisteredListener {
            context,
            event_type: event_type.into(),
            callback: Box::new(callback),
        }
    }

    pub fn matches(&self, event_type: SyntheticEventType) -> bool {
        self.event_type == event_type.as_str()
    }

    pub(crate) fn invoke(&self, event: &ListenerEvent<'_, C>) {
        (self.callback)(&self.context, event)
    }
}

impl<C: fmt::Debug> fmt::Debug for RegisteredListener<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisteredListener")
            .field("context", &self.context)
            .field("event_type", &self.event_type)
            .finish_non_exhaustive()
    }
}

/// Chosen once when the replayer is built.
#[derive(Debug)]
pub enum DispatchTarget<C> {
    NativeDispatch,
    /// Delivered in registration order, bypassing platform dispatch. Never mutated by the replayer.
    DirectListeners(Vec<RegisteredListener<C>>),
}

impl<C> DispatchTarget<C> {
    /// Listeners to deliver to directly, if any and if the per-kind flag allows it.
    pub(crate) fn direct(&self, enabled: bool) -> Option<&[RegisteredListener<C>]> {
        match self {
            DispatchTarget::DirectListeners(listeners) if enabled => Some(listeners),
            _ => None,
        }
    }
}

impl<C> Default for DispatchTarget<C> {
    fn default() -> Self {
        DispatchTarget::NativeDispatch
    }
}

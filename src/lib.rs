// input_events_core: record pointer and keyboard input on a surface, replay it frame by frame.
// Capture normalizes positions to the surface content box; replay maps them back onto whatever
// geometry the surface has at replay time.

mod dispatch;
mod error;
mod recording;
mod recorder;
mod replayer;
mod surface;
mod synth;
mod types;

#[cfg(test)]
mod testing;

#[cfg(target_arch = "wasm32")]
mod web;

use wasm_bindgen::prelude::*;

pub use dispatch::{DispatchTarget, RegisteredListener};
pub use error::InputError;
pub use recording::RecordingLog;
pub use recorder::{EventCallback, InputRecorder};
pub use replayer::InputReplayer;
pub use surface::{
    Clock, KeyboardSource, Listener, NativeKeyEvent, NativePointerEvent, NativeWheelEvent,
    Surface, SystemClock,
};
pub use synth::{
    CompleteMouseEvent, ListenerEvent, SyntheticEvent, SyntheticEventType, SyntheticKeyEvent,
    SyntheticMouseEvent, SyntheticWheelEvent,
};
pub use types::*;

#[cfg(target_arch = "wasm32")]
pub use web::{DomSurface, WasmInputRecorder, WasmInputReplayer, WindowKeyboard};

/// Initialize panic hook and console logging for the browser.
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();

    // A host that already installed a subscriber keeps it.
    #[cfg(all(feature = "tracing-wasm", target_arch = "wasm32"))]
    let _ = tracing_wasm::try_set_as_global_default();
}

// Browser bindings: DOM element surfaces, window keyboard capture, and the JS-facing wrappers.
// Only built for wasm32; everything else in the crate is platform-neutral.

use js_sys::{Array, Function, Object, Reflect, JSON};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{
    Event, EventInit, EventTarget, HtmlElement, KeyboardEvent, MouseEvent, MouseEventInit,
    WheelEvent, Window,
};

use crate::dispatch::{DispatchTarget, RegisteredListener};
use crate::error::InputError;
use crate::recording::RecordingLog;
use crate::recorder::InputRecorder;
use crate::replayer::InputReplayer;
use crate::surface::*;
use crate::synth::*;
use crate::types::*;

fn to_js_error(err: InputError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

fn set_field(target: &JsValue, name: &str, value: impl Into<JsValue>) -> Result<(), JsValue> {
    Reflect::set(target, &JsValue::from_str(name), &value.into()).map(|_| ())
}

/// Attach a listener for the lifetime of the page. The closure is leaked on purpose: no
/// teardown is modeled.
fn listen<E>(target: &EventTarget, event_type: &str, mut handler: impl FnMut(E) + 'static)
where
    E: JsCast + 'static,
{
    let closure = Closure::<dyn FnMut(Event)>::new(move |event: Event| {
        if let Ok(event) = event.dyn_into::<E>() {
            handler(event);
        }
    });
    if let Err(err) =
        target.add_event_listener_with_callback(event_type, closure.as_ref().unchecked_ref())
    {
        tracing::warn!(event_type, error = ?err, "failed to attach listener");
    }
    closure.forget();
}

fn mouse_event(event: &SyntheticMouseEvent) -> Result<Event, JsValue> {
    let init = MouseEventInit::new();
    init.set_bubbles(event.bubbles);
    init.set_cancelable(event.cancelable);
    init.set_detail(event.detail);
    init.set_screen_x(event.screen_x);
    init.set_screen_y(event.screen_y);
    init.set_client_x(event.client_x);
    init.set_client_y(event.client_y);
    init.set_button(event.button);

    let dom = MouseEvent::new_with_mouse_event_init_dict(event.event_type.as_str(), &init)?;
    set_field(&dom, "programmatic", event.programmatic)?;
    Ok(dom.unchecked_into())
}

fn wheel_event(event: &SyntheticWheelEvent) -> Result<Event, JsValue> {
    let init = EventInit::new();
    init.set_bubbles(event.bubbles);

    let dom = Event::new_with_event_init_dict(event.event_type().as_str(), &init)?;
    set_field(&dom, "deltaX", event.delta_x)?;
    set_field(&dom, "deltaY", event.delta_y)?;
    set_field(&dom, "deltaZ", event.delta_z)?;
    set_field(&dom, "deltaMode", event.delta_mode)?;
    set_field(&dom, "wheelDeltaX", event.wheel_delta_x)?;
    set_field(&dom, "wheelDeltaY", event.wheel_delta_y)?;
    set_field(&dom, "wheelDelta", event.wheel_delta)?;
    Ok(dom)
}

/// Plain `Event` with key fields set as properties; `KeyboardEvent` keeps `keyCode` read-only.
fn key_event(event: &SyntheticKeyEvent) -> Result<Event, JsValue> {
    let init = EventInit::new();
    init.set_bubbles(event.bubbles);
    init.set_cancelable(event.cancelable);

    let dom = Event::new_with_event_init_dict(event.event_type.as_str(), &init)?;
    set_field(&dom, "keyCode", event.key_code)?;
    set_field(&dom, "which", event.which)?;
    set_field(&dom, "charCode", event.char_code)?;
    set_field(&dom, "programmatic", event.programmatic)?;
    set_field(&dom, "key", event.key.as_str())?;
    Ok(dom)
}

fn dom_event(event: &SyntheticEvent) -> Result<Event, JsValue> {
    match event {
        SyntheticEvent::Mouse(event) => mouse_event(event),
        SyntheticEvent::Wheel(event) => wheel_event(event),
        SyntheticEvent::Key(event) => key_event(event),
    }
}

/// Prototype-less record carrying every mouse field, for pages that read beyond `initMouseEvent`.
fn complete_mouse_object(event: &CompleteMouseEvent<JsValue>) -> Result<JsValue, JsValue> {
    let record: JsValue = Object::new().into();
    set_field(&record, "type", event.event_type.as_str())?;
    set_field(&record, "currentTarget", event.current_target.clone())?;
    set_field(&record, "srcElement", event.src_element.clone())?;
    set_field(&record, "target", event.target.clone())?;
    set_field(&record, "fromElement", event.from_element.clone())?;
    set_field(&record, "toElement", event.to_element.clone())?;
    set_field(&record, "relatedTarget", JsValue::NULL)?;
    set_field(&record, "eventPhase", event.event_phase)?;
    set_field(&record, "buttons", event.buttons)?;
    set_field(&record, "button", event.button)?;
    set_field(&record, "altKey", event.alt_key)?;
    set_field(&record, "ctrlKey", event.ctrl_key)?;
    set_field(&record, "metaKey", event.meta_key)?;
    set_field(&record, "shiftKey", event.shift_key)?;
    set_field(&record, "bubbles", event.bubbles)?;
    set_field(&record, "cancelable", event.cancelable)?;
    set_field(&record, "cancelBubble", event.cancel_bubble)?;
    set_field(&record, "defaultPrevented", event.default_prevented)?;
    set_field(&record, "detail", event.detail)?;
    set_field(&record, "isTrusted", event.is_trusted)?;
    set_field(&record, "clientX", event.client_x)?;
    set_field(&record, "clientY", event.client_y)?;
    set_field(&record, "screenX", event.screen_x)?;
    set_field(&record, "screenY", event.screen_y)?;
    set_field(&record, "pageX", event.page_x)?;
    set_field(&record, "pageY", event.page_y)?;
    set_field(&record, "layerX", event.layer_x)?;
    set_field(&record, "layerY", event.layer_y)?;
    set_field(&record, "offsetX", event.offset_x)?;
    set_field(&record, "offsetY", event.offset_y)?;
    set_field(&record, "movementX", event.movement_x)?;
    set_field(&record, "movementY", event.movement_y)?;
    set_field(&record, "x", event.x)?;
    set_field(&record, "y", event.y)?;
    set_field(&record, "which", event.which)?;
    set_field(&record, "timeStamp", event.time_stamp)?;
    set_field(&record, "returnValue", !event.default_prevented)?;
    set_field(&record, "identifier", JsValue::UNDEFINED)?;
    set_field(&record, "path", Array::new())?;
    set_field(&record, "sourceCapabilities", JsValue::NULL)?;
    let view = web_sys::window().map_or(JsValue::NULL, JsValue::from);
    set_field(&record, "view", view)?;
    Ok(record)
}

fn listener_event_to_js(event: &ListenerEvent<'_, JsValue>) -> Result<JsValue, JsValue> {
    match event {
        ListenerEvent::Mouse(event) => mouse_event(event).map(JsValue::from),
        ListenerEvent::CompleteMouse(event) => complete_mouse_object(event),
        ListenerEvent::Wheel(event) => wheel_event(event).map(JsValue::from),
        ListenerEvent::Key(event) => key_event(event).map(JsValue::from),
    }
}

/// An `HtmlElement` (usually a canvas) as a record/replay surface.
#[derive(Debug, Clone)]
pub struct DomSurface {
    element: HtmlElement,
}

impl DomSurface {
    pub fn new(element: HtmlElement) -> Self {
        DomSurface { element }
    }

    pub fn element(&self) -> &HtmlElement {
        &self.element
    }
}

impl Surface for DomSurface {
    fn geometry(&self) -> SurfaceGeometry {
        let rect = self.element.get_bounding_client_rect();
        SurfaceGeometry {
            rect: ClientRect {
                left: rect.left(),
                top: rect.top(),
                width: rect.width(),
                height: rect.height(),
            },
            client_width: f64::from(self.element.client_width()),
            client_height: f64::from(self.element.client_height()),
            offset_width: f64::from(self.element.offset_width()),
            offset_height: f64::from(self.element.offset_height()),
        }
    }

    fn add_pointer_listener(&self, phase: PointerPhase, mut listener: Listener<NativePointerEvent>) {
        listen(&self.element, phase.dom_event_type(), move |event: MouseEvent| {
            listener(&NativePointerEvent {
                client_x: f64::from(event.client_x()),
                client_y: f64::from(event.client_y()),
                button: event.button(),
            });
        });
    }

    fn add_wheel_listener(&self, mut listener: Listener<NativeWheelEvent>) {
        listen(&self.element, "wheel", move |event: WheelEvent| {
            listener(&NativeWheelEvent {
                delta_x: event.delta_x(),
                delta_y: event.delta_y(),
                delta_z: event.delta_z(),
                delta_mode: event.delta_mode(),
            });
        });
    }

    fn dispatch_event(&self, event: &SyntheticEvent) -> Result<(), InputError> {
        let dispatch_error = |err: JsValue| InputError::Dispatch {
            event_type: event.event_type().to_string(),
            message: format!("{:?}", err),
        };
        let dom = dom_event(event).map_err(dispatch_error)?;
        self.element.dispatch_event(&dom).map_err(dispatch_error)?;
        Ok(())
    }
}

/// Keyboard capture on `window`, matching the browser's ambient keyboard focus.
#[derive(Debug, Clone)]
pub struct WindowKeyboard {
    window: Window,
}

impl WindowKeyboard {
    pub fn new(window: Window) -> Self {
        WindowKeyboard { window }
    }

    pub fn current() -> Option<Self> {
        web_sys::window().map(Self::new)
    }
}

impl KeyboardSource for WindowKeyboard {
    fn add_key_listener(&self, phase: KeyPhase, mut listener: Listener<NativeKeyEvent>) {
        listen(&self.window, phase.dom_event_type(), move |event: KeyboardEvent| {
            listener(&NativeKeyEvent {
                key_code: event.key_code(),
                char_code: event.char_code(),
                key: event.key(),
            });
        });
    }
}

/// Reads `[{context, type, fun}, ...]` as handed over by the host page.
fn registered_listeners_from_js(array: &Array) -> Result<Vec<RegisteredListener<JsValue>>, JsValue> {
    array
        .iter()
        .map(|entry| {
            let context = Reflect::get(&entry, &JsValue::from_str("context"))?;
            let event_type = Reflect::get(&entry, &JsValue::from_str("type"))?
                .as_string()
                .ok_or_else(|| JsValue::from_str("Registered listener is missing a string `type`"))?;
            let fun: Function = Reflect::get(&entry, &JsValue::from_str("fun"))?.dyn_into()?;

            Ok(RegisteredListener::new(
                context,
                event_type,
                move |context: &JsValue, event: &ListenerEvent<'_, JsValue>| {
                    let result = listener_event_to_js(event)
                        .and_then(|js_event| fun.call1(context, &js_event));
                    if let Err(err) = result {
                        tracing::warn!(
                            event_type = event.event_type().as_str(),
                            error = ?err,
                            "registered listener threw"
                        );
                    }
                },
            ))
        })
        .collect()
}

/// WASM-exposed recorder bound to an element and the global window's keyboard.
///
/// # Example Options JSON
/// ```json
/// { "useTime": false }
/// ```
#[wasm_bindgen]
pub struct WasmInputRecorder {
    inner: InputRecorder<DomSurface, WindowKeyboard>,
}

#[wasm_bindgen]
impl WasmInputRecorder {
    #[wasm_bindgen(constructor)]
    pub fn new(
        element: HtmlElement,
        options_json: Option<String>,
    ) -> Result<WasmInputRecorder, JsValue> {
        let config = match options_json {
            Some(json) => RecorderConfig::from_json(&json).map_err(to_js_error)?,
            None => RecorderConfig::default(),
        };
        let keyboard = WindowKeyboard::current()
            .ok_or_else(|| JsValue::from_str("No global window for keyboard capture"))?;

        Ok(WasmInputRecorder {
            inner: InputRecorder::new(DomSurface::new(element), keyboard, config),
        })
    }

    pub fn enable(&self, force_reset: bool) {
        self.inner.enable(force_reset);
    }

    pub fn clear(&self) {
        self.inner.clear();
    }

    #[wasm_bindgen(getter = frameNumber)]
    pub fn frame_number(&self) -> u32 {
        self.inner.frame_number().as_u32()
    }

    #[wasm_bindgen(setter = frameNumber)]
    pub fn set_frame_number(&self, frame: u32) {
        self.inner.set_frame_number(FrameNumber::new(frame));
    }

    /// Advance the frame counter; call once per rendered frame.
    #[wasm_bindgen(js_name = nextFrame)]
    pub fn next_frame(&self) -> u32 {
        self.inner.advance_frame().as_u32()
    }

    /// Called with each new entry as a plain JS object.
    #[wasm_bindgen(js_name = setNewEventCallback)]
    pub fn set_new_event_callback(&self, callback: Function) {
        self.inner.on_new_event(move |entry| {
            let result = serde_json::to_string(entry)
                .map_err(|e| JsValue::from_str(&e.to_string()))
                .and_then(|json| JSON::parse(&json))
                .and_then(|value| callback.call1(&JsValue::NULL, &value));
            if let Err(err) = result {
                tracing::warn!(error = ?err, "new event callback failed");
            }
        });
    }

    /// Number of recorded entries.
    #[wasm_bindgen(getter)]
    pub fn length(&self) -> u32 {
        u32::try_from(self.inner.len()).unwrap_or(u32::MAX)
    }

    /// The log as a JSON array string.
    #[wasm_bindgen(js_name = toJSON)]
    pub fn to_json(&self) -> Result<String, JsValue> {
        self.inner.to_json().map_err(to_js_error)
    }
}

/// WASM-exposed replayer.
///
/// `registered_listeners` is the host's `[{context, type, fun}]` registry; pass `undefined`
/// to dispatch through the DOM.
///
/// # Example Options JSON
/// ```json
/// {
///   "dispatchKeyEventsViaDOM": true,
///   "dispatchMouseEventsViaDOM": true,
///   "needsCompleteCustomMouseEventFields": false
/// }
/// ```
#[wasm_bindgen]
pub struct WasmInputReplayer {
    inner: InputReplayer<DomSurface, JsValue>,
}

#[wasm_bindgen]
impl WasmInputReplayer {
    #[wasm_bindgen(constructor)]
    pub fn new(
        element: HtmlElement,
        recording_json: &str,
        registered_listeners: Option<Array>,
        options_json: Option<String>,
    ) -> Result<WasmInputReplayer, JsValue> {
        let recording = RecordingLog::from_json(recording_json).map_err(to_js_error)?;
        let config = match options_json {
            Some(json) => ReplayerConfig::from_json(&json).map_err(to_js_error)?,
            None => ReplayerConfig::default(),
        };
        let target = match registered_listeners {
            Some(array) => DispatchTarget::DirectListeners(registered_listeners_from_js(&array)?),
            None => DispatchTarget::NativeDispatch,
        };

        Ok(WasmInputReplayer {
            inner: InputReplayer::new(DomSurface::new(element), recording, target, config),
        })
    }

    /// Replay everything recorded for `frame_number`. Returns the number of entries dispatched.
    pub fn tick(&mut self, frame_number: u32) -> Result<u32, JsValue> {
        self.inner
            .tick(FrameNumber::new(frame_number))
            .map(|count| u32::try_from(count).unwrap_or(u32::MAX))
            .map_err(to_js_error)
    }

    #[wasm_bindgen(js_name = isExhausted)]
    pub fn is_exhausted(&self) -> bool {
        self.inner.is_exhausted()
    }

    #[wasm_bindgen(getter)]
    pub fn position(&self) -> u32 {
        u32::try_from(self.inner.position()).unwrap_or(u32::MAX)
    }
}

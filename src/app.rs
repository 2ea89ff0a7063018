use wasm_bindgen::JsValue;
use yew::prelude::*;

use crate::components::GhostCanvas;
use crate::config::GhostConfig;
use crate::events::{CanvasEvent, EventBus};
use crate::trigger::HttpTrigger;

thread_local! {
    static SOCKET_BUS: EventBus<CanvasEvent> = EventBus::new();
}

/// Handle to the bus fed by the socket bridge
pub fn socket_bus() -> EventBus<CanvasEvent> {
    SOCKET_BUS.with(|bus| bus.clone())
}

/// Canvas id from the last path segment, e.g. `/canvas/abc` -> `abc`
fn canvas_id_from_location() -> String {
    web_sys::window()
        .and_then(|w| w.location().pathname().ok())
        .and_then(|path| {
            path.rsplit('/')
                .find(|segment| !segment.is_empty())
                .map(str::to_string)
        })
        .unwrap_or_else(|| "default".to_string())
}

#[function_component(App)]
pub fn app() -> Html {
    let config = use_memo((), |_| GhostConfig::load());
    let canvas_id = use_memo((), |_| AttrValue::from(canvas_id_from_location()));
    let bus = use_memo((), |_| socket_bus());
    let trigger = HttpTrigger::new(config.generate_endpoint.clone());

    let (width, height) = web_sys::window()
        .map(|w| {
            let dim = |v: Result<JsValue, JsValue>| v.ok().and_then(|v| v.as_f64());
            (
                dim(w.inner_width()).unwrap_or(1280.0),
                dim(w.inner_height()).unwrap_or(800.0),
            )
        })
        .unwrap_or((1280.0, 800.0));

    html! {
        <GhostCanvas
            canvas_id={(*canvas_id).clone()}
            bus={(*bus).clone()}
            config={(*config).clone()}
            {trigger}
            {width}
            {height}
        />
    }
}

mod app;
pub mod completion;
pub mod components;
pub mod config;
pub mod error;
pub mod events;
pub mod ghost;
pub mod projection;
pub mod scene;
pub mod trigger;
pub mod types;
pub mod utils;
pub mod workspace;

use app::App;
use events::CanvasEvent;
use wasm_bindgen::prelude::*;

pub use app::socket_bus;
pub use error::{CanvasError, Result};

#[wasm_bindgen(start)]
pub fn run_app() {
    wasm_logger::init(wasm_logger::Config::default());
    yew::Renderer::<App>::new().render();
}

/// Entry point for the socket client: decode one JSON event and publish it
/// to every mounted canvas. Returns false when the payload does not decode.
#[wasm_bindgen]
pub fn dispatch_socket_event(json: &str) -> bool {
    match CanvasEvent::from_json(json) {
        Ok(event) => {
            log::debug!("socket event for {}", event.scope());
            app::socket_bus().emit(&event);
            true
        }
        Err(e) => {
            log::warn!("dropping socket event: {}", e);
            false
        }
    }
}

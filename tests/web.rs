#![cfg(target_arch = "wasm32")]

use std::time::Duration;

use ghost_canvas::components::{GhostCanvas, GhostCanvasProps};
use ghost_canvas::config::GhostConfig;
use ghost_canvas::events::{CanvasEvent, EventBus};
use ghost_canvas::scene::SceneApi;
use ghost_canvas::trigger::HttpTrigger;
use ghost_canvas::workspace::CanvasWorkspace;
use ghost_canvas::{dispatch_socket_event, socket_bus};
use wasm_bindgen_test::{wasm_bindgen_test, wasm_bindgen_test_configure};
use web_sys::Element;

wasm_bindgen_test_configure!(run_in_browser);

const STARTED: &str = r#"{
    "type": "generation_started",
    "ghostId": "g1",
    "canvasId": "web",
    "prompt": "a lighthouse",
    "x": 40, "y": 60, "width": 512, "height": 512
}"#;

const IMAGE: &str = r#"{
    "type": "image_generated",
    "canvas_id": "web",
    "element": { "id": "g1", "x": 40, "y": 60, "width": 512, "height": 512, "fileId": "F1" },
    "file": { "id": "F1", "mimeType": "image/png", "dataURL": "data:image/png;base64,AAAA" }
}"#;

#[wasm_bindgen_test]
fn socket_payload_decodes() {
    let event = CanvasEvent::from_json(IMAGE).expect("image event should decode");
    assert_eq!(event.scope(), "web");
    assert!(CanvasEvent::from_json("{\"type\":\"unknown\"}").is_err());
}

#[wasm_bindgen_test]
fn socket_bridge_resolves_ghost() {
    let workspace = CanvasWorkspace::new("web", GhostConfig::default()).shared();
    let subscription = CanvasWorkspace::attach(&workspace, &socket_bus(), || {});

    assert!(dispatch_socket_event(STARTED));
    assert!(workspace.borrow().session().is_pending("g1"));
    assert!(workspace.borrow().scene().get_shape("g1").is_some_and(|s| s.locked));

    assert!(dispatch_socket_event(IMAGE));
    {
        let workspace = workspace.borrow();
        assert!(!workspace.session().is_pending("g1"));
        let shapes = workspace.scene().shapes();
        assert_eq!(shapes.len(), 1);
        assert!(!shapes[0].locked);
        assert!(workspace.scene().file("F1").is_some());
    }

    drop(subscription);
    assert!(!dispatch_socket_event("not json"));
}

#[wasm_bindgen_test]
fn ghost_ids_are_unique_in_browser() {
    let mut workspace = CanvasWorkspace::new("web", GhostConfig::default());
    workspace.handle_event(&CanvasEvent::from_json(IMAGE).expect("image event"));

    let a = workspace.start_generation(Some("g1"), None).expect("first ghost");
    let b = workspace.start_generation(Some("g1"), None).expect("second ghost");

    assert_ne!(a.file_id, b.file_id);
    assert!(a.timestamp > 0.0);
    assert_eq!(a.base64.as_deref(), Some("data:image/png;base64,AAAA"));
    assert_eq!(workspace.overlays().len(), 2);
}

fn started_on(canvas_id: &str, ghost_id: &str) -> CanvasEvent {
    CanvasEvent::from_json(&format!(
        r#"{{"type": "generation_started", "ghostId": "{ghost_id}", "canvasId": "{canvas_id}",
            "x": 0, "y": 0, "width": 64, "height": 64}}"#
    ))
    .expect("started event should decode")
}

fn has_shape(root: &Element, id: &str) -> bool {
    root.query_selector(&format!("[data-shape-id=\"{id}\"]"))
        .ok()
        .flatten()
        .is_some()
}

async fn settle() {
    yew::platform::time::sleep(Duration::from_millis(20)).await;
}

#[wasm_bindgen_test]
async fn canvas_follows_canvas_id_prop() {
    let document = web_sys::window()
        .and_then(|w| w.document())
        .expect("browser document");
    let root = document.create_element("div").expect("root element");
    document
        .body()
        .expect("document body")
        .append_child(&root)
        .expect("attach root");

    let bus = EventBus::new();
    let props = |canvas_id: &'static str| GhostCanvasProps {
        canvas_id: canvas_id.into(),
        bus: bus.clone(),
        config: GhostConfig::default(),
        trigger: HttpTrigger::new("/api/magic"),
        width: 640.0,
        height: 480.0,
    };

    let mut app = yew::Renderer::<GhostCanvas>::with_root_and_props(root.clone(), props("a")).render();
    settle().await;
    bus.emit(&started_on("a", "ga"));
    settle().await;
    assert!(has_shape(&root, "ga"));

    app.update(props("b"));
    settle().await;
    assert_eq!(bus.listener_count(), 1);

    bus.emit(&started_on("b", "gb"));
    bus.emit(&started_on("a", "stale"));
    settle().await;

    assert!(has_shape(&root, "gb"));
    assert!(!has_shape(&root, "ga"));
    assert!(!has_shape(&root, "stale"));

    app.destroy();
    settle().await;
    assert_eq!(bus.listener_count(), 0);
}

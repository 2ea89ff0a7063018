use std::cell::RefCell;
use std::rc::Rc;

use gloo::events::EventListener;
use gloo::timers::callback::Interval;
use wasm_bindgen::JsCast;
use web_sys::{KeyboardEvent, WheelEvent};
use yew::prelude::*;

use crate::components::ghost_overlay::GhostOverlayLayer;
use crate::components::scene_view::{SceneItem, SceneView};
use crate::config::GhostConfig;
use crate::error::CanvasError;
use crate::events::{CanvasEvent, EventBus};
use crate::scene::{DVec2, SceneApi, ShapeKind};
use crate::trigger::{GenerationTrigger, HttpTrigger};
use crate::utils::now_ms;
use crate::workspace::{CanvasWorkspace, SharedWorkspace};

/// Zoom step per wheel notch while Ctrl/Cmd is held
const ZOOM_STEP: f64 = 1.1;

/// Arrow-key nudge in pixels; Shift multiplies by ten
const NUDGE_STEP: f64 = 1.0;

const OPACITY_STEP: f32 = 0.1;

/// How often pending ghosts are checked against `ghost_max_age_ms`
const STALE_SWEEP_MS: u32 = 5_000;

#[derive(Properties, Clone, PartialEq)]
pub struct GhostCanvasProps {
    /// Scope identifier; events for other canvases are ignored
    pub canvas_id: AttrValue,

    pub bus: EventBus<CanvasEvent>,

    #[prop_or_default]
    pub config: GhostConfig,

    pub trigger: HttpTrigger,

    #[prop_or(1280.0)]
    pub width: f64,

    #[prop_or(800.0)]
    pub height: f64,
}

fn scene_items(workspace: &CanvasWorkspace) -> Vec<SceneItem> {
    let scene = workspace.scene();
    scene
        .shapes()
        .iter()
        .map(|shape| {
            let src = match &shape.kind {
                ShapeKind::Image { file_id, .. } => scene.file(file_id).map(|f| f.data_url.clone()),
                ShapeKind::Embed { link } => Some(link.clone()),
            };
            SceneItem {
                shape: shape.clone(),
                src,
            }
        })
        .collect()
}

fn arrow_delta(key: &str, step: f64) -> Option<DVec2> {
    match key {
        "ArrowLeft" => Some(DVec2::new(-step, 0.0)),
        "ArrowRight" => Some(DVec2::new(step, 0.0)),
        "ArrowUp" => Some(DVec2::new(0.0, -step)),
        "ArrowDown" => Some(DVec2::new(0.0, step)),
        _ => None,
    }
}

/// Apply one keyboard shortcut. Returns false for keys that are not shortcuts.
fn handle_key(
    event: &KeyboardEvent,
    workspace: &mut CanvasWorkspace,
    selected: &RefCell<Option<String>>,
    trigger: &HttpTrigger,
) -> bool {
    let key = event.key();
    let current = selected.borrow().clone();

    if (event.meta_key() || event.ctrl_key()) && key == "b" {
        event.prevent_default();
        match workspace.start_generation(current.as_deref(), None) {
            Ok(request) => {
                trigger.dispatch(request);
                *selected.borrow_mut() = None;
            }
            Err(CanvasError::NothingSelected) => log::debug!("select a shape to generate from"),
            Err(e) => log::warn!("generation not started: {}", e),
        }
    } else if key == "Escape" && event.shift_key() {
        let discarded = workspace.discard_all_ghosts();
        log::info!("discarded {} pending ghosts", discarded);
    } else if key == "Escape" {
        if let Some(id) = selected.borrow_mut().take() {
            workspace.discard_ghost(&id);
        }
    } else if key == "Delete" || key == "Backspace" {
        let Some(id) = current else { return true };
        match workspace.delete_shape(&id) {
            Ok(_) => *selected.borrow_mut() = None,
            Err(e) => log::info!("delete refused: {}", e),
        }
    } else if let Some(delta) = arrow_delta(&key, NUDGE_STEP) {
        let Some(id) = current else { return false };
        event.prevent_default();
        let delta = if event.shift_key() { delta * 10.0 } else { delta };
        if let Err(e) = workspace.nudge_shape(&id, delta) {
            log::info!("move refused: {}", e);
        }
    } else if key == "[" || key == "]" {
        let Some(id) = current else { return true };
        let step = if key == "[" { -OPACITY_STEP } else { OPACITY_STEP };
        if let Err(e) = workspace.adjust_opacity(&id, step) {
            log::info!("style change refused: {}", e);
        }
    } else {
        return false;
    }
    true
}

/// Canvas with generation ghosts.
///
/// Ctrl/Cmd+B starts a generation from the selected shape, centered in the
/// view. Escape discards the selected ghost (Shift+Escape all of them),
/// Delete/Backspace deletes the selected shape, arrows move it and `[` `]`
/// change its opacity. Locked shapes refuse every edit.
#[function_component(GhostCanvas)]
pub fn ghost_canvas(props: &GhostCanvasProps) -> Html {
    // One workspace per open canvas; a new id or config starts a fresh one
    let workspace_key = (props.canvas_id.clone(), props.config.clone());
    let workspace: SharedWorkspace = {
        let (width, height) = (props.width, props.height);
        let shared = use_memo(workspace_key.clone(), move |(canvas_id, config)| {
            let mut workspace = CanvasWorkspace::new(canvas_id.to_string(), config.clone());
            workspace.resize(width, height);
            workspace.shared()
        });
        Rc::clone(&*shared)
    };
    let selected = use_mut_ref(|| None::<String>);
    let force_update = use_force_update();

    {
        let workspace = workspace.clone();
        use_effect_with((props.width, props.height), move |&(width, height)| {
            workspace.borrow_mut().resize(width, height);
        });
    }

    {
        let selected = selected.clone();
        use_effect_with(workspace_key.clone(), move |_| {
            *selected.borrow_mut() = None;
        });
    }

    // Completion events for this canvas; re-subscribed whenever the bus or
    // the workspace changes
    {
        let workspace = workspace.clone();
        let force_update = force_update.clone();
        use_effect_with(
            (props.bus.clone(), workspace_key.clone()),
            move |(bus, _)| {
                let subscription =
                    CanvasWorkspace::attach(&workspace, bus, move || force_update.force_update());
                move || drop(subscription)
            },
        );
    }

    // Keyboard shortcuts
    {
        let workspace = workspace.clone();
        let selected = selected.clone();
        let force_update = force_update.clone();
        let trigger = props.trigger.clone();
        use_effect_with((props.trigger.clone(), workspace_key.clone()), move |_| {
            let listener = web_sys::window().and_then(|w| w.document()).map(|document| {
                EventListener::new(&document, "keydown", move |event| {
                    let Some(keyboard_event) = event.dyn_ref::<KeyboardEvent>() else {
                        return;
                    };
                    let handled = match workspace.try_borrow_mut() {
                        Ok(mut workspace) => {
                            handle_key(keyboard_event, &mut workspace, &selected, &trigger)
                        }
                        Err(_) => false,
                    };
                    if handled {
                        force_update.force_update();
                    }
                })
            });
            if listener.is_none() {
                log::warn!("no document, keyboard shortcuts disabled");
            }
            move || drop(listener)
        });
    }

    // Stale ghost sweep, only when a max age is configured
    {
        let workspace = workspace.clone();
        let force_update = force_update.clone();
        let max_age = props.config.ghost_max_age_ms;
        use_effect_with(workspace_key.clone(), move |_| {
            let interval = max_age.map(|_| {
                Interval::new(STALE_SWEEP_MS, move || {
                    let swept = match workspace.try_borrow_mut() {
                        Ok(mut workspace) => workspace.discard_stale_ghosts(now_ms()),
                        Err(_) => 0,
                    };
                    if swept > 0 {
                        force_update.force_update();
                    }
                })
            });
            move || drop(interval)
        });
    }

    let on_pointer_down = {
        let workspace = workspace.clone();
        let selected = selected.clone();
        let force_update = force_update.clone();
        Callback::from(move |point: DVec2| {
            let hit = workspace.borrow().shape_at(point).map(|s| s.id.clone());
            *selected.borrow_mut() = hit;
            force_update.force_update();
        })
    };

    // Pan on wheel, zoom around the cursor with Ctrl/Cmd held
    let on_wheel = {
        let workspace = workspace.clone();
        let force_update = force_update.clone();
        Callback::from(move |(e, anchor): (WheelEvent, DVec2)| {
            let mut workspace = workspace.borrow_mut();
            if e.ctrl_key() || e.meta_key() {
                let factor = if e.delta_y() < 0.0 { ZOOM_STEP } else { 1.0 / ZOOM_STEP };
                workspace.zoom_at(anchor, factor);
            } else {
                workspace.pan_by(-e.delta_x(), -e.delta_y());
            }
            drop(workspace);
            force_update.force_update();
        })
    };

    let (items, overlays, viewport) = {
        let mut workspace = workspace.borrow_mut();
        workspace.take_dirty();
        (scene_items(&workspace), workspace.overlays(), *workspace.viewport())
    };
    let selected_id = selected.borrow().clone();

    html! {
        <div
            class="relative overflow-hidden"
            data-canvas-id={props.canvas_id.clone()}
            style={format!("width: {}px; height: {}px;", viewport.width, viewport.height)}
        >
            <SceneView
                {items}
                {viewport}
                selected={selected_id}
                {on_pointer_down}
                {on_wheel}
            />
            <GhostOverlayLayer {overlays} />
        </div>
    }
}

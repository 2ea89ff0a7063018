use crate::scene::{DVec2, Shape, ShapeKind};
use crate::types::ViewportState;
use wasm_bindgen::JsCast;
use web_sys::{Element, MouseEvent, WheelEvent};
use yew::prelude::*;

/// A shape plus the URL of whatever it displays
#[derive(Clone, Debug, PartialEq)]
pub struct SceneItem {
    pub shape: Shape,
    pub src: Option<String>,
}

#[derive(Properties, Clone, PartialEq)]
pub struct SceneViewProps {
    #[prop_or_default]
    pub items: Vec<SceneItem>,

    pub viewport: ViewportState,

    #[prop_or_default]
    pub selected: Option<String>,

    /// Mouse down, in pixels relative to the view
    #[prop_or_default]
    pub on_pointer_down: Callback<DVec2>,

    /// Wheel event with its position relative to the view
    #[prop_or_default]
    pub on_wheel: Callback<(WheelEvent, DVec2)>,
}

/// Cursor position relative to the element the handler is attached to
fn local_point(e: &MouseEvent) -> DVec2 {
    let origin = e
        .current_target()
        .and_then(|t| t.dyn_into::<Element>().ok())
        .map(|el| {
            let rect = el.get_bounding_client_rect();
            DVec2::new(rect.left(), rect.top())
        })
        .unwrap_or(DVec2::ZERO);
    DVec2::new(e.client_x() as f64, e.client_y() as f64) - origin
}

fn render_item(item: &SceneItem, is_selected: bool) -> Html {
    let shape = &item.shape;
    let bounds = shape.bounds;
    let style = shape.style;

    let stroke = style
        .stroke
        .map(|s| s.color.to_css())
        .unwrap_or_else(|| "none".to_string());
    let stroke_width = style.stroke.map(|s| s.width).unwrap_or(0.0);
    let dash = style.stroke.and_then(|s| s.dash_array());
    let fill = style
        .fill
        .map(|c| c.to_css())
        .unwrap_or_else(|| "none".to_string());

    let x = bounds.min.x.to_string();
    let y = bounds.min.y.to_string();
    let width = bounds.width().to_string();
    let height = bounds.height().to_string();

    let body = match (&shape.kind, &item.src) {
        (ShapeKind::Image { .. }, Some(src)) => html! {
            <image href={src.clone()} x={x.clone()} y={y.clone()} width={width.clone()} height={height.clone()} preserveAspectRatio="xMidYMid meet" />
        },
        (ShapeKind::Embed { link }, _) => html! {
            <foreignObject x={x.clone()} y={y.clone()} width={width.clone()} height={height.clone()}>
                <video src={link.clone()} controls={true} style="width: 100%; height: 100%;" />
            </foreignObject>
        },
        // Pending image: the outline below is all there is
        (ShapeKind::Image { .. }, None) => html! {},
    };

    html! {
        <g
            key={shape.id.clone()}
            data-shape-id={shape.id.clone()}
            data-locked={shape.locked.to_string()}
            data-ghost={shape.is_ghost().to_string()}
            opacity={style.opacity.to_string()}
            style={if shape.locked { "cursor: not-allowed;" } else { "cursor: pointer;" }}
        >
            {body}
            <rect
                x={x}
                y={y}
                width={width}
                height={height}
                fill={fill}
                stroke={if is_selected { "#3b82f6".to_string() } else { stroke }}
                stroke-width={if is_selected { "2".to_string() } else { stroke_width.to_string() }}
                stroke-dasharray={dash.unwrap_or_default()}
            />
        </g>
    }
}

/// SVG rendering of the document under the current pan/zoom
#[function_component(SceneView)]
pub fn scene_view(props: &SceneViewProps) -> Html {
    let viewport = props.viewport;

    let shapes: Html = props
        .items
        .iter()
        .map(|item| {
            let is_selected = props.selected.as_deref() == Some(item.shape.id.as_str());
            render_item(item, is_selected)
        })
        .collect();

    let onmousedown = {
        let on_pointer_down = props.on_pointer_down.clone();
        Callback::from(move |e: MouseEvent| on_pointer_down.emit(local_point(&e)))
    };

    let onwheel = {
        let on_wheel = props.on_wheel.clone();
        Callback::from(move |e: WheelEvent| {
            e.prevent_default();
            let point = local_point(&e);
            on_wheel.emit((e, point));
        })
    };

    html! {
        <svg
            data-testid="scene-view"
            class="canvas-dots"
            width={viewport.width.to_string()}
            height={viewport.height.to_string()}
            style="position: absolute; top: 0; left: 0; background-color: white;"
            {onmousedown}
            {onwheel}
        >
            <g transform={format!(
                "translate({} {}) scale({})",
                viewport.scroll_x, viewport.scroll_y, viewport.zoom
            )}>
                {shapes}
            </g>
        </svg>
    }
}

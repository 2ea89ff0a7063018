pub mod ghost_canvas;
pub mod ghost_overlay;
pub mod scene_view;

pub use ghost_canvas::{GhostCanvas, GhostCanvasProps};
pub use ghost_overlay::GhostOverlayLayer;
pub use scene_view::{SceneItem, SceneView};

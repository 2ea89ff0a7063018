use super::registry::GhostEntry;
use crate::config::GhostConfig;
use crate::scene::{Color, ImageStatus, Shape, ShapeKind, ShapeMeta, ShapeStyle, StrokeStyle};

/// File id carried by placeholder images; no such file is ever registered.
pub const PLACEHOLDER_FILE_ID: &str = "ghost-placeholder";

const FALLBACK_STROKE: Color = Color::rgb(0.816, 0.0, 0.0);

/// Look of the locked stand-in shape
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlaceholderStyle {
    pub stroke: Color,
    pub stroke_width: f32,
    pub opacity: f32,
}

impl PlaceholderStyle {
    pub fn from_config(config: &GhostConfig) -> Self {
        let stroke = Color::from_hex(&config.placeholder_stroke).unwrap_or_else(|| {
            log::warn!(
                "invalid placeholder stroke `{}`, using default",
                config.placeholder_stroke
            );
            FALLBACK_STROKE
        });
        Self {
            stroke,
            stroke_width: 2.0,
            opacity: config.placeholder_opacity,
        }
    }

    fn shape_style(&self) -> ShapeStyle {
        ShapeStyle::stroke_only(StrokeStyle::dashed(self.stroke, self.stroke_width))
            .with_opacity(self.opacity)
    }
}

impl Default for PlaceholderStyle {
    fn default() -> Self {
        Self::from_config(&GhostConfig::default())
    }
}

/// Build the locked placeholder for a pending ghost. Its id is the ghost id.
pub fn placeholder_shape(entry: &GhostEntry, style: &PlaceholderStyle) -> Shape {
    Shape::new(
        entry.id.clone(),
        ShapeKind::Image {
            file_id: PLACEHOLDER_FILE_ID.to_string(),
            status: ImageStatus::Pending,
        },
        entry.rect(),
    )
    .with_style(style.shape_style())
    .with_locked(true)
    .with_meta(ShapeMeta {
        is_ghost: true,
        prompt: entry.prompt.clone(),
    })
}

/// Whether `shape` is the placeholder for ghost `id`, not just any shape
/// that happens to share the id.
pub fn is_placeholder_for(shape: &Shape, id: &str) -> bool {
    shape.id == id && shape.meta.is_ghost
}

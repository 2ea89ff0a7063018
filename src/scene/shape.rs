use super::types::{BBox, DVec2, ShapeStyle};
use crate::types::SceneRect;

/// Load state of an image shape's backing file
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ImageStatus {
    /// File not available yet
    Pending,
    /// File registered with the scene
    Saved,
}

/// What a shape displays
#[derive(Clone, Debug, PartialEq)]
pub enum ShapeKind {
    /// Raster image backed by a file in the scene's file table
    Image { file_id: String, status: ImageStatus },

    /// Embedded media referenced by URL (videos)
    Embed { link: String },
}

impl ShapeKind {
    pub fn image(file_id: impl Into<String>) -> Self {
        Self::Image {
            file_id: file_id.into(),
            status: ImageStatus::Saved,
        }
    }

    pub fn embed(link: impl Into<String>) -> Self {
        Self::Embed { link: link.into() }
    }

    pub fn file_id(&self) -> Option<&str> {
        match self {
            ShapeKind::Image { file_id, .. } => Some(file_id),
            ShapeKind::Embed { .. } => None,
        }
    }
}

/// Free-form metadata attached to a shape
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ShapeMeta {
    /// Placeholder standing in for an in-flight generation
    pub is_ghost: bool,
    pub prompt: Option<String>,
}

/// A shape in the canvas document
#[derive(Clone, Debug, PartialEq)]
pub struct Shape {
    /// Unique identifier, shared with the generation request that produced it
    pub id: String,

    pub kind: ShapeKind,

    /// Scene-space bounds
    pub bounds: BBox,

    pub style: ShapeStyle,

    /// Locked shapes cannot be edited or deleted by the user
    pub locked: bool,

    pub meta: ShapeMeta,

    /// Bumped on every edit
    pub version: u32,
}

impl Shape {
    /// Create an unlocked shape at the given scene rectangle
    pub fn new(id: impl Into<String>, kind: ShapeKind, rect: SceneRect) -> Self {
        Self {
            id: id.into(),
            kind,
            bounds: rect.to_bbox(),
            style: ShapeStyle::default(),
            locked: false,
            meta: ShapeMeta::default(),
            version: 1,
        }
    }

    /// Set the style
    pub fn with_style(mut self, style: ShapeStyle) -> Self {
        self.style = style;
        self
    }

    /// Set the lock flag
    pub fn with_locked(mut self, locked: bool) -> Self {
        self.locked = locked;
        self
    }

    /// Set metadata
    pub fn with_meta(mut self, meta: ShapeMeta) -> Self {
        self.meta = meta;
        self
    }

    pub fn rect(&self) -> SceneRect {
        SceneRect::from(self.bounds)
    }

    pub fn is_ghost(&self) -> bool {
        self.meta.is_ghost
    }

    pub fn contains_point(&self, point: DVec2) -> bool {
        self.bounds.contains(point)
    }

    pub(crate) fn touch(&mut self) {
        self.version = self.version.wrapping_add(1);
    }
}

use serde::{Deserialize, Serialize};

use crate::scene::{BBox, DVec2};

/// Axis-aligned rectangle in scene coordinates, as sent over the wire.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SceneRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl SceneRect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn origin(&self) -> DVec2 {
        DVec2::new(self.x, self.y)
    }

    pub fn size(&self) -> DVec2 {
        DVec2::new(self.width, self.height)
    }

    pub fn to_bbox(&self) -> BBox {
        BBox::from_origin_size(self.origin(), self.size())
    }
}

impl From<BBox> for SceneRect {
    fn from(bbox: BBox) -> Self {
        Self::new(bbox.min.x, bbox.min.y, bbox.width(), bbox.height())
    }
}

/// Pixel dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: f64,
    pub height: f64,
}

impl Dimensions {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Kind of generated media carried by a completion event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    Image,
    Video,
}

impl MediaKind {
    /// Classify a MIME type. Unknown top-level types yield `None`.
    pub fn from_mime(mime: &str) -> Option<Self> {
        let top = mime.split('/').next()?.trim();
        if top.eq_ignore_ascii_case("image") {
            Some(MediaKind::Image)
        } else if top.eq_ignore_ascii_case("video") {
            Some(MediaKind::Video)
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Image => "image",
            MediaKind::Video => "video",
        }
    }
}

/// Pan/zoom state of the canvas view.
///
/// `scroll_x`/`scroll_y` are the viewport-pixel offset of the scene origin,
/// `width`/`height` the size of the visible area in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewportState {
    pub zoom: f64,
    pub scroll_x: f64,
    pub scroll_y: f64,
    pub width: f64,
    pub height: f64,
}

impl ViewportState {
    pub const MIN_ZOOM: f64 = 0.1;
    pub const MAX_ZOOM: f64 = 30.0;

    pub fn new(width: f64, height: f64) -> Self {
        Self {
            zoom: 1.0,
            scroll_x: 0.0,
            scroll_y: 0.0,
            width,
            height,
        }
    }

    pub fn scroll(&self) -> DVec2 {
        DVec2::new(self.scroll_x, self.scroll_y)
    }

    /// Builder method to set zoom
    pub fn with_zoom(mut self, zoom: f64) -> Self {
        self.zoom = zoom.clamp(Self::MIN_ZOOM, Self::MAX_ZOOM);
        self
    }

    /// Builder method to set the scroll offset
    pub fn with_scroll(mut self, scroll_x: f64, scroll_y: f64) -> Self {
        self.scroll_x = scroll_x;
        self.scroll_y = scroll_y;
        self
    }

    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        self.scroll_x += dx;
        self.scroll_y += dy;
    }

    /// Zoom around a fixed viewport-pixel anchor, keeping the scene point under
    /// the anchor stationary.
    pub fn zoom_at(&mut self, anchor: DVec2, factor: f64) {
        let new_zoom = (self.zoom * factor).clamp(Self::MIN_ZOOM, Self::MAX_ZOOM);
        let scene = (anchor - self.scroll()) / self.zoom;
        let scroll = anchor - scene * new_zoom;
        self.zoom = new_zoom;
        self.scroll_x = scroll.x;
        self.scroll_y = scroll.y;
    }
}

impl Default for ViewportState {
    fn default() -> Self {
        Self::new(1280.0, 800.0)
    }
}

//! Scene ↔ viewport mapping for the loading overlay drawn over pending ghosts.
//!
//! `viewport = scene * zoom + scroll`, independently per axis.

use crate::ghost::GhostEntry;
use crate::scene::DVec2;
use crate::types::{Dimensions, SceneRect, ViewportState};

/// Rectangle in viewport pixels
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewportRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Everything the overlay layer needs to draw one pending ghost
#[derive(Clone, Debug, PartialEq)]
pub struct GhostOverlay {
    pub id: String,
    pub rect: ViewportRect,
    pub prompt: Option<String>,
}

pub fn viewport_point(scene: DVec2, viewport: &ViewportState) -> DVec2 {
    scene * viewport.zoom + viewport.scroll()
}

pub fn scene_point(point: DVec2, viewport: &ViewportState) -> DVec2 {
    (point - viewport.scroll()) / viewport.zoom
}

pub fn project_rect(rect: &SceneRect, viewport: &ViewportState) -> ViewportRect {
    let origin = viewport_point(rect.origin(), viewport);
    let size = rect.size() * viewport.zoom;
    ViewportRect {
        x: origin.x,
        y: origin.y,
        width: size.x,
        height: size.y,
    }
}

pub fn project(entry: &GhostEntry, viewport: &ViewportState) -> GhostOverlay {
    GhostOverlay {
        id: entry.id.clone(),
        rect: project_rect(&entry.rect(), viewport),
        prompt: entry.prompt.clone(),
    }
}

pub fn project_all(entries: &[GhostEntry], viewport: &ViewportState) -> Vec<GhostOverlay> {
    entries.iter().map(|e| project(e, viewport)).collect()
}

/// Scene rectangle of a ghost of `size` centered in the visible area
pub fn centered_ghost_rect(viewport: &ViewportState, size: Dimensions) -> SceneRect {
    let center = DVec2::new(viewport.width / 2.0, viewport.height / 2.0);
    let half = DVec2::new(size.width / 2.0, size.height / 2.0);
    let origin = -viewport.scroll() / viewport.zoom + (center - half) / viewport.zoom;
    SceneRect::new(origin.x, origin.y, size.width, size.height)
}

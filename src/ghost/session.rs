use std::collections::{HashSet, VecDeque};

use super::placeholder::{is_placeholder_for, placeholder_shape, PlaceholderStyle};
use super::registry::{GhostEntry, GhostRegistry};
use crate::config::GhostConfig;
use crate::error::Result;
use crate::events::{Asset, Completion};
use crate::projection::{project_all, GhostOverlay};
use crate::scene::{SceneApi, Shape, ShapeKind};
use crate::types::{Dimensions, SceneRect, ViewportState};
use crate::utils::fit_width;

/// How a completion was applied to the scene
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Resolution {
    /// A pending ghost was swapped for the real shape
    Replaced,
    /// No ghost was pending; the shape was added as new
    Appended,
    /// The id already received a completion; nothing changed
    AlreadyResolved,
}

/// Completed ids remembered for duplicate detection
const RESOLVED_CAPACITY: usize = 256;

/// Bounded record of ids that already received a completion. The oldest id is
/// forgotten once the capacity is reached.
#[derive(Clone, Debug, Default)]
struct ResolvedIds {
    ids: HashSet<String>,
    order: VecDeque<String>,
}

impl ResolvedIds {
    fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    fn insert(&mut self, id: String) {
        if !self.ids.insert(id.clone()) {
            return;
        }
        self.order.push_back(id);
        while self.order.len() > RESOLVED_CAPACITY {
            if let Some(oldest) = self.order.pop_front() {
                self.ids.remove(&oldest);
            }
        }
    }

    fn remove(&mut self, id: &str) {
        if self.ids.remove(id) {
            self.order.retain(|r| r != id);
        }
    }

    fn clear(&mut self) {
        self.ids.clear();
        self.order.clear();
    }

    fn len(&self) -> usize {
        self.order.len()
    }
}

/// Owner of both halves of a pending generation: the registry entry and the
/// placeholder shape in the scene. Every mutation goes through here so the
/// two are always created and removed together.
#[derive(Clone, Debug)]
pub struct GhostSession {
    registry: GhostRegistry,
    resolved: ResolvedIds,
    placeholder: PlaceholderStyle,
    video_fallback: Dimensions,
    video_max_width: f64,
}

impl GhostSession {
    pub fn new(config: &GhostConfig) -> Self {
        Self {
            registry: GhostRegistry::new(config.duplicate_policy),
            resolved: ResolvedIds::default(),
            placeholder: PlaceholderStyle::from_config(config),
            video_fallback: config.video_fallback_size,
            video_max_width: config.video_max_width,
        }
    }

    pub fn registry(&self) -> &GhostRegistry {
        &self.registry
    }

    pub fn pending(&self) -> Vec<GhostEntry> {
        self.registry.list()
    }

    pub fn is_pending(&self, id: &str) -> bool {
        self.registry.contains(id)
    }

    /// Register a ghost and insert its placeholder.
    ///
    /// Under the overwrite policy a duplicate id swaps the placeholder in place.
    pub fn begin(&mut self, entry: GhostEntry, scene: &mut impl SceneApi) -> Result<()> {
        let id = entry.id.clone();
        let placeholder = placeholder_shape(&entry, &self.placeholder);
        let replaced = self.registry.add(entry)?;
        self.resolved.remove(&id);

        let mut shapes = scene.shapes().to_vec();
        let slot = if replaced.is_some() {
            shapes.iter_mut().find(|s| is_placeholder_for(s, &id))
        } else {
            None
        };
        match slot {
            Some(slot) => *slot = placeholder,
            None => shapes.push(placeholder),
        }
        scene.update_scene(shapes);

        log::info!("ghost {} created", id);
        Ok(())
    }

    /// Drop a pending ghost and its placeholder. The backend job keeps
    /// running; a later completion for this id is appended as new.
    pub fn discard(&mut self, id: &str, scene: &mut impl SceneApi) -> Option<GhostEntry> {
        let entry = self.registry.remove(id)?;
        remove_placeholders(scene, |s| is_placeholder_for(s, id));
        log::info!("ghost {} discarded", id);
        Some(entry)
    }

    /// Drop every pending ghost and forget resolved ids
    pub fn discard_all(&mut self, scene: &mut impl SceneApi) -> usize {
        self.resolved.clear();
        let entries = self.registry.clear();
        if !entries.is_empty() {
            remove_placeholders(scene, |s| {
                entries.iter().any(|e| is_placeholder_for(s, &e.id))
            });
        }
        entries.len()
    }

    /// Discard ghosts older than `max_age_ms`. Only runs when called.
    pub fn discard_stale(
        &mut self,
        scene: &mut impl SceneApi,
        now: f64,
        max_age_ms: f64,
    ) -> Vec<GhostEntry> {
        let mut discarded = Vec::new();
        for stale in self.registry.older_than(now - max_age_ms) {
            if let Some(entry) = self.discard(&stale.id, scene) {
                discarded.push(entry);
            }
        }
        discarded
    }

    /// Remove ghost-tagged shapes that have no pending entry, e.g. placeholders
    /// persisted with a document from an earlier session.
    pub fn purge_orphans(&self, scene: &mut impl SceneApi) -> usize {
        let registry = &self.registry;
        remove_placeholders(scene, |s| s.is_ghost() && !registry.contains(&s.id))
    }

    /// Apply a validated completion.
    pub fn complete(&mut self, completion: Completion, scene: &mut impl SceneApi) -> Resolution {
        let id = completion.correlation_id.clone();
        if self.resolved.contains(&id) {
            log::debug!("completion for {} already applied, ignoring", id);
            return Resolution::AlreadyResolved;
        }

        let ghost = self.registry.remove(&id);
        let rect = self.completion_rect(&completion, ghost.as_ref());

        let mut shapes: Vec<Shape> = if ghost.is_some() {
            scene
                .shapes()
                .iter()
                .filter(|s| !is_placeholder_for(s, &id))
                .cloned()
                .collect()
        } else {
            scene.shapes().to_vec()
        };

        let kind = match completion.asset {
            Asset::Image(file) => {
                let kind = ShapeKind::image(file.id.clone());
                scene.add_files(vec![file]);
                kind
            }
            Asset::Video { url } => ShapeKind::embed(url),
        };
        shapes.push(Shape::new(id.clone(), kind, rect).with_locked(false));
        scene.update_scene(shapes);
        self.resolved.insert(id.clone());

        if ghost.is_some() {
            log::info!("ghost {} replaced by generated asset", id);
            Resolution::Replaced
        } else {
            log::info!("generated asset {} appended", id);
            Resolution::Appended
        }
    }

    /// Event size, else the ghost's size, both as-is. Only the fallback size
    /// is fitted to the video width limit.
    fn completion_rect(&self, completion: &Completion, ghost: Option<&GhostEntry>) -> SceneRect {
        let size = completion
            .size
            .or_else(|| ghost.map(|g| Dimensions::new(g.width, g.height)))
            .unwrap_or_else(|| fit_width(self.video_fallback, self.video_max_width));
        SceneRect::new(completion.origin.x, completion.origin.y, size.width, size.height)
    }

    pub fn overlays(&self, viewport: &ViewportState) -> Vec<GhostOverlay> {
        project_all(&self.registry.list(), viewport)
    }
}

impl Default for GhostSession {
    fn default() -> Self {
        Self::new(&GhostConfig::default())
    }
}

fn remove_placeholders(scene: &mut impl SceneApi, doomed: impl Fn(&Shape) -> bool) -> usize {
    let before = scene.shapes().len();
    let kept: Vec<Shape> = scene.shapes().iter().filter(|s| !doomed(s)).cloned().collect();
    let removed = before - kept.len();
    if removed > 0 {
        scene.update_scene(kept);
    }
    removed
}

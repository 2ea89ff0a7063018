use std::cell::RefCell;
use std::rc::Rc;

use crate::completion::{CompletionListener, CompletionOutcome};
use crate::config::GhostConfig;
use crate::error::{CanvasError, Result};
use crate::events::{CanvasEvent, EventBus, GenerationStarted, Subscription};
use crate::ghost::{GhostEntry, GhostSession};
use crate::projection::{centered_ghost_rect, scene_point, GhostOverlay};
use crate::scene::{DVec2, SceneApi, SceneGraph, Shape, ShapeKind};
use crate::trigger::GenerationRequest;
use crate::types::ViewportState;
use crate::utils::{new_ghost_id, now_ms};

pub type SharedWorkspace = Rc<RefCell<CanvasWorkspace>>;

/// One open canvas: its document, pending ghosts, and view.
#[derive(Debug)]
pub struct CanvasWorkspace {
    canvas_id: String,
    config: GhostConfig,
    scene: SceneGraph,
    session: GhostSession,
    viewport: ViewportState,
    images: CompletionListener,
    videos: CompletionListener,
}

impl CanvasWorkspace {
    pub fn new(canvas_id: impl Into<String>, config: GhostConfig) -> Self {
        let canvas_id = canvas_id.into();
        Self {
            session: GhostSession::new(&config),
            images: CompletionListener::images(canvas_id.clone()),
            videos: CompletionListener::videos(canvas_id.clone()),
            scene: SceneGraph::new(),
            viewport: ViewportState::default(),
            canvas_id,
            config,
        }
    }

    /// Builder method to start from an existing document
    pub fn with_shapes(mut self, shapes: Vec<Shape>) -> Self {
        self.scene.update_scene(shapes);
        let purged = self.session.purge_orphans(&mut self.scene);
        if purged > 0 {
            log::info!("removed {} stale placeholders from {}", purged, self.canvas_id);
        }
        self
    }

    pub fn shared(self) -> SharedWorkspace {
        Rc::new(RefCell::new(self))
    }

    pub fn canvas_id(&self) -> &str {
        &self.canvas_id
    }

    pub fn config(&self) -> &GhostConfig {
        &self.config
    }

    pub fn scene(&self) -> &SceneGraph {
        &self.scene
    }

    pub fn session(&self) -> &GhostSession {
        &self.session
    }

    pub fn viewport(&self) -> &ViewportState {
        &self.viewport
    }

    pub fn set_viewport(&mut self, viewport: ViewportState) {
        self.viewport = viewport;
    }

    pub fn resize(&mut self, width: f64, height: f64) {
        self.viewport.width = width;
        self.viewport.height = height;
    }

    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        self.viewport.pan_by(dx, dy);
    }

    pub fn zoom_at(&mut self, anchor: DVec2, factor: f64) {
        self.viewport.zoom_at(anchor, factor);
    }

    /// Ghost overlays in current viewport pixels
    pub fn overlays(&self) -> Vec<GhostOverlay> {
        self.session.overlays(&self.viewport)
    }

    /// Create a ghost centered in the view for a generation that works from
    /// the selected shape, and return the request to dispatch for it.
    ///
    /// Refuses when nothing is selected. An image selection sends its data
    /// URL along as `base64`.
    pub fn start_generation(
        &mut self,
        selected: Option<&str>,
        prompt: Option<String>,
    ) -> Result<GenerationRequest> {
        let selected = selected.ok_or(CanvasError::NothingSelected)?;
        let source = self
            .scene
            .get_shape(selected)
            .ok_or_else(|| CanvasError::ShapeNotFound(selected.to_string()))?;
        let base64 = match &source.kind {
            ShapeKind::Image { file_id, .. } => {
                self.scene.file(file_id).map(|f| f.data_url.clone())
            }
            ShapeKind::Embed { .. } => None,
        };
        let source_rect = source.rect();

        let rect = centered_ghost_rect(&self.viewport, self.config.ghost_size);
        let prompt = prompt.or_else(|| Some(self.config.default_prompt.clone()));
        let now = now_ms();
        let entry = GhostEntry::new(new_ghost_id(), rect, prompt.clone(), now);
        let request = GenerationRequest::new(entry.id.clone(), self.canvas_id.clone(), &source_rect)
            .with_prompt(prompt)
            .with_base64(base64)
            .with_timestamp(now);

        self.session.begin(entry, &mut self.scene)?;
        Ok(request)
    }

    pub fn discard_ghost(&mut self, id: &str) -> bool {
        self.session.discard(id, &mut self.scene).is_some()
    }

    pub fn discard_all_ghosts(&mut self) -> usize {
        self.session.discard_all(&mut self.scene)
    }

    /// Sweep ghosts past `ghost_max_age_ms`; a no-op when no age is configured
    pub fn discard_stale_ghosts(&mut self, now: f64) -> usize {
        let Some(max_age) = self.config.ghost_max_age_ms else {
            return 0;
        };
        let stale = self.session.discard_stale(&mut self.scene, now, max_age);
        if !stale.is_empty() {
            log::info!("discarded {} stale ghosts on {}", stale.len(), self.canvas_id);
        }
        stale.len()
    }

    /// Delete through the user edit path; placeholders refuse.
    pub fn delete_shape(&mut self, id: &str) -> Result<Shape> {
        self.scene.delete_shape(id)
    }

    /// Move a shape by a delta in viewport pixels
    pub fn nudge_shape(&mut self, id: &str, delta: DVec2) -> Result<()> {
        self.scene.move_shape(id, delta / self.viewport.zoom)
    }

    pub fn adjust_opacity(&mut self, id: &str, step: f32) -> Result<()> {
        let style = self
            .scene
            .get_shape(id)
            .ok_or_else(|| CanvasError::ShapeNotFound(id.to_string()))?
            .style;
        let opacity = (style.opacity + step).clamp(0.1, 1.0);
        self.scene.set_style(id, style.with_opacity(opacity))
    }

    /// Topmost shape under a viewport point
    pub fn shape_at(&self, point: DVec2) -> Option<&Shape> {
        self.scene.hit_test(scene_point(point, &self.viewport))
    }

    pub fn take_dirty(&mut self) -> bool {
        let dirty = self.scene.is_dirty();
        self.scene.clear_dirty();
        dirty
    }

    fn on_generation_started(&mut self, event: &GenerationStarted) -> bool {
        if event.canvas_id != self.canvas_id {
            return false;
        }
        let entry = GhostEntry::new(
            event.ghost_id.clone(),
            event.rect(),
            event.prompt.clone(),
            now_ms(),
        );
        match self.session.begin(entry, &mut self.scene) {
            Ok(()) => true,
            Err(e) => {
                log::warn!("ghost not created: {}", e);
                false
            }
        }
    }

    /// Route one bus event. Returns whether the document changed.
    pub fn handle_event(&mut self, event: &CanvasEvent) -> bool {
        let outcome = match event {
            CanvasEvent::GenerationStarted(started) => return self.on_generation_started(started),
            CanvasEvent::ImageGenerated(image) => {
                self.images.handle(image, &mut self.session, &mut self.scene)
            }
            CanvasEvent::VideoGenerated(video) => {
                self.videos.handle(video, &mut self.session, &mut self.scene)
            }
        };
        matches!(
            outcome,
            CompletionOutcome::Replaced | CompletionOutcome::Appended
        )
    }

    /// Register this workspace on `bus`. Events stop arriving once the
    /// returned subscription is dropped.
    pub fn attach(
        workspace: &SharedWorkspace,
        bus: &EventBus<CanvasEvent>,
        on_change: impl Fn() + 'static,
    ) -> Subscription<CanvasEvent> {
        let workspace = Rc::clone(workspace);
        bus.subscribe(move |event| {
            let changed = match workspace.try_borrow_mut() {
                Ok(mut workspace) => workspace.handle_event(event),
                Err(_) => {
                    log::warn!("canvas busy, dropping {} event", event.scope());
                    false
                }
            };
            if changed {
                on_change();
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{ElementPayload, FilePayload, ImageGenerated};
    use crate::types::SceneRect;
    use std::cell::Cell;

    fn started(ghost_id: &str, canvas_id: &str) -> CanvasEvent {
        CanvasEvent::GenerationStarted(GenerationStarted {
            ghost_id: ghost_id.to_string(),
            canvas_id: canvas_id.to_string(),
            prompt: Some("a ship".to_string()),
            x: 100.0,
            y: 100.0,
            width: 512.0,
            height: 512.0,
        })
    }

    fn image_generated(id: &str, canvas_id: &str) -> CanvasEvent {
        CanvasEvent::ImageGenerated(ImageGenerated {
            canvas_id: canvas_id.to_string(),
            element: Some(ElementPayload {
                id: Some(id.to_string()),
                x: Some(100.0),
                y: Some(100.0),
                width: Some(512.0),
                height: Some(512.0),
                file_id: Some("F".to_string()),
            }),
            file: Some(FilePayload {
                id: Some("F".to_string()),
                mime_type: Some("image/png".to_string()),
                data_url: Some("data:image/png;base64,AAAA".to_string()),
                created: None,
            }),
        })
    }

    /// Workspace holding one saved image `src` backed by file `F`
    fn with_source_image() -> CanvasWorkspace {
        let mut workspace = CanvasWorkspace::new("c1", GhostConfig::default());
        workspace.handle_event(&image_generated("src", "c1"));
        workspace
    }

    #[test]
    fn test_start_generation_creates_matching_ghost() {
        let mut workspace = with_source_image();
        workspace.set_viewport(ViewportState::new(1024.0, 768.0));

        let request = workspace.start_generation(Some("src"), None).unwrap();

        assert!(request.file_id.starts_with("ghost-"));
        assert_eq!(request.canvas_id, "c1");
        assert_eq!(
            request.prompt.as_deref(),
            Some("Magic generation in progress...")
        );
        let entry = workspace.session().registry().get(&request.file_id).unwrap();
        assert_eq!(entry.rect(), SceneRect::new(256.0, 128.0, 512.0, 512.0));
        let shape = workspace.scene().get_shape(&request.file_id).unwrap();
        assert!(shape.locked && shape.is_ghost());
    }

    #[test]
    fn test_start_generation_sends_selected_image() {
        let mut workspace = with_source_image();

        let request = workspace.start_generation(Some("src"), None).unwrap();

        assert_eq!(request.base64.as_deref(), Some("data:image/png;base64,AAAA"));
        assert_eq!((request.width, request.height), (512.0, 512.0));
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["base64"], "data:image/png;base64,AAAA");
        assert_eq!(json["fileId"], request.file_id.as_str());
    }

    #[test]
    fn test_start_generation_requires_selection() {
        let mut workspace = with_source_image();

        let err = workspace.start_generation(None, None).unwrap_err();
        assert!(matches!(err, CanvasError::NothingSelected));
        let err = workspace.start_generation(Some("gone"), None).unwrap_err();
        assert!(matches!(err, CanvasError::ShapeNotFound(_)));
        assert!(workspace.session().registry().is_empty());
        assert_eq!(workspace.scene().len(), 1);
    }

    #[test]
    fn test_user_edits_respect_locks() {
        let mut workspace = with_source_image();
        let request = workspace.start_generation(Some("src"), None).unwrap();
        let ghost_rect = workspace.scene().get_shape(&request.file_id).unwrap().rect();

        workspace.nudge_shape("src", DVec2::new(10.0, 0.0)).unwrap();
        workspace.adjust_opacity("src", -0.5).unwrap();
        let source = workspace.scene().get_shape("src").unwrap();
        assert_eq!(source.rect().x, 110.0);
        assert_eq!(source.style.opacity, 0.5);

        assert!(matches!(
            workspace.nudge_shape(&request.file_id, DVec2::new(10.0, 0.0)),
            Err(CanvasError::ShapeLocked(_))
        ));
        assert!(matches!(
            workspace.adjust_opacity(&request.file_id, 0.1),
            Err(CanvasError::ShapeLocked(_))
        ));
        assert_eq!(
            workspace.scene().get_shape(&request.file_id).unwrap().rect(),
            ghost_rect
        );
    }

    #[test]
    fn test_shape_at_uses_viewport_transform() {
        let mut workspace = with_source_image();
        workspace.set_viewport(ViewportState::new(800.0, 600.0).with_zoom(2.0).with_scroll(-100.0, 0.0));

        // scene (100, 100) lands at viewport (100, 200)
        assert_eq!(workspace.shape_at(DVec2::new(100.0, 200.0)).unwrap().id, "src");
        assert!(workspace.shape_at(DVec2::new(50.0, 50.0)).is_none());
    }

    #[test]
    fn test_discard_all_and_stale_ghosts() {
        let config = GhostConfig {
            ghost_max_age_ms: Some(60_000.0),
            ..GhostConfig::default()
        };
        let mut workspace = CanvasWorkspace::new("c1", config);
        workspace.handle_event(&started("g1", "c1"));
        workspace.handle_event(&started("g2", "c1"));

        assert_eq!(workspace.discard_stale_ghosts(now_ms()), 0);
        assert_eq!(workspace.discard_stale_ghosts(now_ms() + 120_000.0), 2);
        assert!(workspace.scene().is_empty());

        workspace.handle_event(&started("g3", "c1"));
        assert_eq!(workspace.discard_all_ghosts(), 1);
        assert!(workspace.session().registry().is_empty());
    }

    #[test]
    fn test_stale_sweep_off_by_default() {
        let mut workspace = CanvasWorkspace::new("c1", GhostConfig::default());
        workspace.handle_event(&started("g1", "c1"));
        assert_eq!(workspace.discard_stale_ghosts(f64::MAX), 0);
        assert!(workspace.session().is_pending("g1"));
    }

    #[test]
    fn test_placeholder_cannot_be_deleted_by_user() {
        let mut workspace = with_source_image();
        let request = workspace.start_generation(Some("src"), None).unwrap();

        assert!(workspace.delete_shape(&request.file_id).is_err());
        assert!(workspace.session().is_pending(&request.file_id));
    }

    #[test]
    fn test_bus_round_trip() {
        let workspace = CanvasWorkspace::new("c1", GhostConfig::default()).shared();
        let bus = EventBus::new();
        let changes = Rc::new(Cell::new(0));
        let counter = Rc::clone(&changes);
        let subscription = CanvasWorkspace::attach(&workspace, &bus, move || {
            counter.set(counter.get() + 1)
        });

        bus.emit(&started("g1", "c1"));
        assert_eq!(workspace.borrow().session().registry().len(), 1);

        bus.emit(&image_generated("g1", "c1"));
        {
            let workspace = workspace.borrow();
            assert!(workspace.session().registry().is_empty());
            assert_eq!(workspace.scene().len(), 1);
            let shape = workspace.scene().get_shape("g1").unwrap();
            assert!(!shape.locked);
            assert_eq!(shape.rect(), SceneRect::new(100.0, 100.0, 512.0, 512.0));
        }
        assert_eq!(changes.get(), 2);

        drop(subscription);
        bus.emit(&started("g2", "c1"));
        assert!(workspace.borrow().session().registry().is_empty());
    }

    #[test]
    fn test_foreign_canvas_events_change_nothing() {
        let mut workspace = CanvasWorkspace::new("c1", GhostConfig::default());
        workspace.handle_event(&started("g1", "c1"));
        let before = workspace.scene().shapes().to_vec();

        assert!(!workspace.handle_event(&started("g9", "c2")));
        assert!(!workspace.handle_event(&image_generated("g1", "c2")));

        assert_eq!(workspace.scene().shapes(), before.as_slice());
        assert!(workspace.session().is_pending("g1"));
        assert!(!workspace.session().is_pending("g9"));
    }

    #[test]
    fn test_discard_then_late_completion_appends() {
        let mut workspace = CanvasWorkspace::new("c1", GhostConfig::default());
        workspace.handle_event(&started("g2", "c1"));
        assert!(workspace.discard_ghost("g2"));
        assert!(workspace.scene().is_empty());

        assert!(workspace.handle_event(&image_generated("g2", "c1")));
        assert_eq!(workspace.scene().len(), 1);
        assert!(!workspace.scene().shapes()[0].locked);
    }

    #[test]
    fn test_reentrant_dispatch_is_dropped() {
        let workspace = CanvasWorkspace::new("c1", GhostConfig::default()).shared();
        let bus = EventBus::new();
        let _subscription = CanvasWorkspace::attach(&workspace, &bus, || {});

        let _held = workspace.borrow_mut();
        bus.emit(&started("g1", "c1"));
        drop(_held);

        assert!(workspace.borrow().session().registry().is_empty());
    }

    #[test]
    fn test_with_shapes_purges_stale_placeholders() {
        let mut source = CanvasWorkspace::new("c1", GhostConfig::default());
        source.handle_event(&started("old", "c1"));
        let saved = source.scene().shapes().to_vec();

        let workspace = CanvasWorkspace::new("c1", GhostConfig::default()).with_shapes(saved);
        assert!(workspace.scene().shapes().is_empty());
    }
}

use gloo::storage::{LocalStorage, Storage};
use serde::{Deserialize, Serialize};

use crate::error::{CanvasError, Result};
use crate::scene::Color;
use crate::types::Dimensions;

/// LocalStorage key holding an optional JSON override of [`GhostConfig`].
pub const CONFIG_STORAGE_KEY: &str = "ghost-canvas-config";

/// What to do when a ghost is added under an id that is already pending.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    /// Keep the existing ghost and report `DuplicateGhost`
    #[default]
    Reject,
    /// Replace the pending entry and its placeholder in place
    Overwrite,
}

/// Runtime settings for the ghost lifecycle. Every field has a default, so a
/// partial JSON object is a valid configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GhostConfig {
    pub duplicate_policy: DuplicatePolicy,
    /// Scene size of a ghost created from the keyboard shortcut
    pub ghost_size: Dimensions,
    pub default_prompt: String,
    /// Where generation requests are POSTed
    pub generate_endpoint: String,
    /// Used when a video arrives without dimensions and no ghost to copy them from
    pub video_fallback_size: Dimensions,
    pub video_max_width: f64,
    pub placeholder_stroke: String,
    pub placeholder_opacity: f32,
    /// Pending ghosts older than this are swept away; `None` keeps them
    /// until they complete or are discarded
    pub ghost_max_age_ms: Option<f64>,
}

impl Default for GhostConfig {
    fn default() -> Self {
        Self {
            duplicate_policy: DuplicatePolicy::Reject,
            ghost_size: Dimensions::new(512.0, 512.0),
            default_prompt: "Magic generation in progress...".to_string(),
            generate_endpoint: "/api/magic".to_string(),
            video_fallback_size: Dimensions::new(320.0, 180.0),
            video_max_width: 800.0,
            placeholder_stroke: "#D00000".to_string(),
            placeholder_opacity: 0.5,
            ghost_max_age_ms: None,
        }
    }
}

impl GhostConfig {
    /// Parse and validate a JSON configuration
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load the override from LocalStorage, falling back to defaults
    pub fn load() -> Self {
        match LocalStorage::get::<Self>(CONFIG_STORAGE_KEY) {
            Ok(config) => match config.validate() {
                Ok(()) => config,
                Err(e) => {
                    log::warn!("ignoring stored ghost config: {}", e);
                    Self::default()
                }
            },
            Err(_) => Self::default(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        let positive = |d: &Dimensions| d.width > 0.0 && d.height > 0.0;
        if !positive(&self.ghost_size) {
            return Err(CanvasError::Config("ghost_size must be positive".into()));
        }
        if !positive(&self.video_fallback_size) {
            return Err(CanvasError::Config(
                "video_fallback_size must be positive".into(),
            ));
        }
        if self.video_max_width <= 0.0 {
            return Err(CanvasError::Config("video_max_width must be positive".into()));
        }
        if !(0.0..=1.0).contains(&self.placeholder_opacity) {
            return Err(CanvasError::Config(
                "placeholder_opacity must be within 0..=1".into(),
            ));
        }
        if Color::from_hex(&self.placeholder_stroke).is_none() {
            return Err(CanvasError::Config(format!(
                "placeholder_stroke `{}` is not a #rrggbb color",
                self.placeholder_stroke
            )));
        }
        if self.ghost_max_age_ms.is_some_and(|age| age <= 0.0) {
            return Err(CanvasError::Config("ghost_max_age_ms must be positive".into()));
        }
        Ok(())
    }
}

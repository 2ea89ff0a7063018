//! Events delivered to the canvas: locally emitted generation starts and the
//! socket's `image_generated` / `video_generated` completions.

mod bus;

pub use bus::{EventBus, Subscription};

use serde::{Deserialize, Serialize};

use crate::error::{CanvasError, Result};
use crate::scene::{BinaryFile, DVec2};
use crate::types::{Dimensions, MediaKind, SceneRect};

/// Element part of a completion payload
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ElementPayload {
    pub id: Option<String>,
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    #[serde(rename = "fileId")]
    pub file_id: Option<String>,
}

/// File part of an image completion
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilePayload {
    pub id: Option<String>,
    pub mime_type: Option<String>,
    #[serde(rename = "dataURL")]
    pub data_url: Option<String>,
    pub created: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageGenerated {
    pub canvas_id: String,
    pub element: Option<ElementPayload>,
    pub file: Option<FilePayload>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoGenerated {
    pub canvas_id: String,
    pub element: Option<ElementPayload>,
    pub video_url: Option<String>,
    #[serde(default)]
    pub mime_type: Option<String>,
}

/// A generation request was dispatched and wants a ghost
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationStarted {
    pub ghost_id: String,
    pub canvas_id: String,
    pub prompt: Option<String>,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl GenerationStarted {
    pub fn rect(&self) -> SceneRect {
        SceneRect::new(self.x, self.y, self.width, self.height)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CanvasEvent {
    GenerationStarted(GenerationStarted),
    ImageGenerated(ImageGenerated),
    VideoGenerated(VideoGenerated),
}

impl CanvasEvent {
    /// Decode a socket message
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn scope(&self) -> &str {
        match self {
            CanvasEvent::GenerationStarted(e) => &e.canvas_id,
            CanvasEvent::ImageGenerated(e) => &e.canvas_id,
            CanvasEvent::VideoGenerated(e) => &e.canvas_id,
        }
    }
}

/// Generated asset ready to be placed in the scene
#[derive(Debug, Clone, PartialEq)]
pub enum Asset {
    Image(BinaryFile),
    Video { url: String },
}

/// A validated completion, correlated to a ghost by `correlation_id`
#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    pub correlation_id: String,
    pub origin: DVec2,
    /// Missing only for videos, which can borrow the ghost's size
    pub size: Option<Dimensions>,
    pub asset: Asset,
}

impl Completion {
    pub fn kind(&self) -> MediaKind {
        match self.asset {
            Asset::Image(_) => MediaKind::Image,
            Asset::Video { .. } => MediaKind::Video,
        }
    }
}

/// A completion payload as it arrives, before validation.
pub trait CompletionPayload {
    /// Canvas the event belongs to
    fn scope(&self) -> &str;

    /// Media actually carried, which may disagree with the channel it came on
    fn media_kind(&self) -> MediaKind;

    fn correlation_id(&self) -> Option<&str>;

    fn to_completion(&self) -> Result<Completion>;
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

fn element_id(element: &ElementPayload) -> Result<String> {
    non_empty(&element.id)
        .map(str::to_owned)
        .ok_or_else(|| CanvasError::malformed(None, "element has no id"))
}

fn element_origin(element: &ElementPayload, id: &str) -> Result<DVec2> {
    match (element.x, element.y) {
        (Some(x), Some(y)) if x.is_finite() && y.is_finite() => Ok(DVec2::new(x, y)),
        _ => Err(CanvasError::malformed(Some(id), "missing element position")),
    }
}

fn element_size(element: &ElementPayload) -> Option<Dimensions> {
    match (element.width, element.height) {
        (Some(w), Some(h)) if w > 0.0 && h > 0.0 => Some(Dimensions::new(w, h)),
        _ => None,
    }
}

impl CompletionPayload for ImageGenerated {
    fn scope(&self) -> &str {
        &self.canvas_id
    }

    fn media_kind(&self) -> MediaKind {
        self.file
            .as_ref()
            .and_then(|f| f.mime_type.as_deref())
            .and_then(MediaKind::from_mime)
            .unwrap_or(MediaKind::Image)
    }

    fn correlation_id(&self) -> Option<&str> {
        self.element.as_ref().and_then(|e| non_empty(&e.id))
    }

    fn to_completion(&self) -> Result<Completion> {
        let element = self
            .element
            .as_ref()
            .ok_or_else(|| CanvasError::malformed(None, "missing element"))?;
        let id = element_id(element)?;
        let origin = element_origin(element, &id)?;
        let size = element_size(element)
            .ok_or_else(|| CanvasError::malformed(Some(&id), "missing element size"))?;
        let file = self
            .file
            .as_ref()
            .ok_or_else(|| CanvasError::malformed(Some(&id), "missing file payload"))?;
        let data_url = non_empty(&file.data_url)
            .ok_or_else(|| CanvasError::malformed(Some(&id), "file has no data"))?;
        let file_id = non_empty(&file.id)
            .or_else(|| non_empty(&element.file_id))
            .ok_or_else(|| CanvasError::malformed(Some(&id), "file has no id"))?;

        Ok(Completion {
            correlation_id: id,
            origin,
            size: Some(size),
            asset: Asset::Image(BinaryFile {
                id: file_id.to_string(),
                mime_type: file
                    .mime_type
                    .clone()
                    .unwrap_or_else(|| "image/png".to_string()),
                data_url: data_url.to_string(),
                created: file.created.unwrap_or_default(),
            }),
        })
    }
}

impl CompletionPayload for VideoGenerated {
    fn scope(&self) -> &str {
        &self.canvas_id
    }

    fn media_kind(&self) -> MediaKind {
        self.mime_type
            .as_deref()
            .and_then(MediaKind::from_mime)
            .unwrap_or(MediaKind::Video)
    }

    fn correlation_id(&self) -> Option<&str> {
        self.element.as_ref().and_then(|e| non_empty(&e.id))
    }

    fn to_completion(&self) -> Result<Completion> {
        let element = self
            .element
            .as_ref()
            .ok_or_else(|| CanvasError::malformed(None, "missing element"))?;
        let id = element_id(element)?;
        let origin = element_origin(element, &id)?;
        let url = non_empty(&self.video_url)
            .ok_or_else(|| CanvasError::malformed(Some(&id), "missing video url"))?;

        Ok(Completion {
            correlation_id: id,
            origin,
            size: element_size(element),
            asset: Asset::Video {
                url: url.to_string(),
            },
        })
    }
}

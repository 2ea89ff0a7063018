use gloo::net::http::Request;
use serde::{Deserialize, Serialize};

use crate::types::SceneRect;

/// Request that starts a generation job. `file_id` is the ghost id the
/// completion event will carry back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRequest {
    pub file_id: String,
    pub canvas_id: String,
    pub prompt: Option<String>,
    pub width: f64,
    pub height: f64,
    /// Data URL of the selected image the job works from
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base64: Option<String>,
    /// Milliseconds since the Unix epoch
    pub timestamp: f64,
}

impl GenerationRequest {
    pub fn new(file_id: impl Into<String>, canvas_id: impl Into<String>, rect: &SceneRect) -> Self {
        Self {
            file_id: file_id.into(),
            canvas_id: canvas_id.into(),
            prompt: None,
            width: rect.width,
            height: rect.height,
            base64: None,
            timestamp: 0.0,
        }
    }

    pub fn with_prompt(mut self, prompt: Option<String>) -> Self {
        self.prompt = prompt;
        self
    }

    pub fn with_base64(mut self, base64: Option<String>) -> Self {
        self.base64 = base64;
        self
    }

    pub fn with_timestamp(mut self, timestamp: f64) -> Self {
        self.timestamp = timestamp;
        self
    }
}

/// Starts a generation job without waiting for it.
pub trait GenerationTrigger {
    fn dispatch(&self, request: GenerationRequest);
}

/// POSTs the request as JSON; failures are logged and the ghost stays up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpTrigger {
    endpoint: String,
}

impl HttpTrigger {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl GenerationTrigger for HttpTrigger {
    fn dispatch(&self, request: GenerationRequest) {
        let endpoint = self.endpoint.clone();
        wasm_bindgen_futures::spawn_local(async move {
            let id = request.file_id.clone();
            let sent = match Request::post(&endpoint).json(&request) {
                Ok(req) => req.send().await,
                Err(e) => Err(e),
            };
            match sent {
                Ok(resp) if resp.ok() => log::debug!("generation {} accepted", id),
                Ok(resp) => log::warn!(
                    "generation {} rejected by {}: HTTP {}",
                    id,
                    endpoint,
                    resp.status()
                ),
                Err(e) => log::warn!("generation {} not sent: {}", id, e),
            }
        });
    }
}

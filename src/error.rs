use thiserror::Error;

/// Errors produced by the canvas document and the ghost lifecycle.
///
/// None of these are fatal to the host page: callers log them and carry on
/// with the ghost still visible or the result appended as a new shape.
#[derive(Debug, Error)]
pub enum CanvasError {
    #[error("a ghost with id `{0}` is already pending")]
    DuplicateGhost(String),

    #[error("shape `{0}` is locked")]
    ShapeLocked(String),

    #[error("shape `{0}` not found")]
    ShapeNotFound(String),

    #[error("nothing is selected")]
    NothingSelected,

    #[error("malformed completion event{suffix}: {reason}", suffix = id_suffix(.id))]
    MalformedEvent {
        id: Option<String>,
        reason: &'static str,
    },

    #[error("failed to decode event: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl CanvasError {
    pub(crate) fn malformed(id: Option<&str>, reason: &'static str) -> Self {
        Self::MalformedEvent {
            id: id.map(str::to_owned),
            reason,
        }
    }
}

fn id_suffix(id: &Option<String>) -> String {
    id.as_deref()
        .map(|id| format!(" for `{id}`"))
        .unwrap_or_default()
}

pub type Result<T, E = CanvasError> = std::result::Result<T, E>;

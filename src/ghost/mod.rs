//! Provisional placeholders for in-flight generations.

mod placeholder;
mod registry;
mod session;

pub use placeholder::{is_placeholder_for, placeholder_shape, PlaceholderStyle, PLACEHOLDER_FILE_ID};
pub use registry::{GhostEntry, GhostPatch, GhostRegistry};
pub use session::{GhostSession, Resolution};

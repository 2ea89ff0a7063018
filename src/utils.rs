use uuid::Uuid;
use web_time::{SystemTime, UNIX_EPOCH};

use crate::types::Dimensions;

/// Wall-clock milliseconds since the Unix epoch
pub fn now_ms() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64() * 1000.0)
        .unwrap_or_default()
}

/// Fresh correlation id for a generation request
pub fn new_ghost_id() -> String {
    format!("ghost-{}", Uuid::new_v4())
}

/// Scale `size` down to `max_width`, preserving aspect ratio
pub fn fit_width(size: Dimensions, max_width: f64) -> Dimensions {
    if size.width <= max_width {
        return size;
    }
    let scale = max_width / size.width;
    Dimensions::new(max_width, size.height * scale)
}

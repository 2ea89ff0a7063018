pub use glam::DVec2;

/// RGBA color with f32 components (0.0 - 1.0)
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub const fn black() -> Self {
        Self::rgb(0.0, 0.0, 0.0)
    }

    /// Parse a hex color string (e.g., "#d00000" or "d00000")
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim_start_matches('#');
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }

        let r = u8::from_str_radix(&hex[0..2], 16).ok()? as f32 / 255.0;
        let g = u8::from_str_radix(&hex[2..4], 16).ok()? as f32 / 255.0;
        let b = u8::from_str_radix(&hex[4..6], 16).ok()? as f32 / 255.0;

        Some(Self::rgb(r, g, b))
    }

    /// Convert to hex string (e.g., "#d00000"), alpha is dropped
    pub fn to_hex(&self) -> String {
        let r = (self.r * 255.0).round() as u8;
        let g = (self.g * 255.0).round() as u8;
        let b = (self.b * 255.0).round() as u8;
        format!("#{:02x}{:02x}{:02x}", r, g, b)
    }

    /// CSS color value, `none` when fully transparent
    pub fn to_css(&self) -> String {
        if self.a <= 0.0 {
            "none".to_string()
        } else if self.a >= 1.0 {
            self.to_hex()
        } else {
            let r = (self.r * 255.0).round() as u8;
            let g = (self.g * 255.0).round() as u8;
            let b = (self.b * 255.0).round() as u8;
            format!("rgba({}, {}, {}, {})", r, g, b, self.a)
        }
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::black()
    }
}

/// Stroke styling for shape outlines
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StrokeStyle {
    pub color: Color,
    pub width: f32,
    pub dashed: bool,
}

impl StrokeStyle {
    pub fn new(color: Color, width: f32) -> Self {
        Self {
            color,
            width,
            dashed: false,
        }
    }

    pub fn dashed(color: Color, width: f32) -> Self {
        Self {
            color,
            width,
            dashed: true,
        }
    }

    /// SVG `stroke-dasharray` value
    pub fn dash_array(&self) -> Option<String> {
        self.dashed
            .then(|| format!("{},{}", self.width * 4.0, self.width * 3.0))
    }
}

impl Default for StrokeStyle {
    fn default() -> Self {
        Self::new(Color::black(), 1.0)
    }
}

/// Complete styling for a shape
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ShapeStyle {
    pub fill: Option<Color>,
    pub stroke: Option<StrokeStyle>,
    /// 0.0 - 1.0
    pub opacity: f32,
}

impl ShapeStyle {
    pub fn new(fill: Option<Color>, stroke: Option<StrokeStyle>) -> Self {
        Self {
            fill,
            stroke,
            opacity: 1.0,
        }
    }

    pub fn stroke_only(stroke: StrokeStyle) -> Self {
        Self::new(None, Some(stroke))
    }

    /// Builder method to set opacity
    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.opacity = opacity.clamp(0.0, 1.0);
        self
    }
}

impl Default for ShapeStyle {
    fn default() -> Self {
        Self::new(None, None)
    }
}

/// Axis-aligned bounding box in scene coordinates
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BBox {
    pub min: DVec2,
    pub max: DVec2,
}

impl BBox {
    pub fn from_origin_size(origin: DVec2, size: DVec2) -> Self {
        Self {
            min: origin,
            max: origin + size,
        }
    }

    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    pub fn size(&self) -> DVec2 {
        self.max - self.min
    }

    pub fn center(&self) -> DVec2 {
        (self.min + self.max) * 0.5
    }

    pub fn contains(&self, point: DVec2) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
    }

    pub fn translate(&self, delta: DVec2) -> Self {
        Self {
            min: self.min + delta,
            max: self.max + delta,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_hex_parsing() {
        let color = Color::from_hex("#d00000").unwrap();
        assert!((color.r - 0.816).abs() < 0.01);
        assert_eq!(color.g, 0.0);
        assert_eq!(color.b, 0.0);
        assert!(Color::from_hex("#fff").is_none());
    }

    #[test]
    fn test_color_hex_rejects_multibyte_input() {
        // six bytes, but 'é' straddles the first channel
        assert!(Color::from_hex("#a\u{e9}bcd").is_none());
        assert!(Color::from_hex("\u{e9}\u{e9}\u{e9}").is_none());
    }

    #[test]
    fn test_color_css() {
        assert_eq!(Color::new(0.0, 0.0, 0.0, 0.0).to_css(), "none");
        assert_eq!(Color::rgb(1.0, 0.0, 0.0).to_css(), "#ff0000");
        assert_eq!(Color::new(1.0, 1.0, 1.0, 0.5).to_css(), "rgba(255, 255, 255, 0.5)");
    }

    #[test]
    fn test_dash_array_only_when_dashed() {
        assert_eq!(StrokeStyle::new(Color::black(), 2.0).dash_array(), None);
        assert_eq!(
            StrokeStyle::dashed(Color::black(), 2.0).dash_array().as_deref(),
            Some("8,6")
        );
    }

    #[test]
    fn test_bbox_from_origin_size() {
        let bbox = BBox::from_origin_size(DVec2::new(100.0, 50.0), DVec2::new(20.0, 10.0));
        assert_eq!(bbox.max, DVec2::new(120.0, 60.0));
        assert_eq!(bbox.center(), DVec2::new(110.0, 55.0));
        assert!(bbox.contains(DVec2::new(120.0, 60.0)));
        assert!(!bbox.contains(DVec2::new(121.0, 60.0)));
    }
}

use crate::{ShapeKind, DEFAULT_COLOR};

pub const DEFAULT_TRIANGLE_SIZE: f64 = 20.0;
pub const DEFAULT_LINE_WIDTH: f64 = 2.0;

#[derive(Clone, Debug, PartialEq)]
pub struct BoardConfig {
    /// Size a triangle starts at before the pointer moves.
    pub triangle_size: f64,
    pub line_width: f64,
    pub default_kind: ShapeKind,
    pub default_color: String,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            triangle_size: DEFAULT_TRIANGLE_SIZE,
            line_width: DEFAULT_LINE_WIDTH,
            default_kind: ShapeKind::FreeDraw,
            default_color: DEFAULT_COLOR.to_string(),
        }
    }
}

impl BoardConfig {
    /// Applies string overrides, keeping the default for anything missing or invalid.
    pub fn with_overrides(triangle_size: Option<&str>, line_width: Option<&str>) -> Self {
        let defaults = Self::default();
        Self {
            triangle_size: parse_positive(triangle_size).unwrap_or(defaults.triangle_size),
            line_width: parse_positive(line_width).unwrap_or(defaults.line_width),
            ..defaults
        }
    }
}

fn parse_positive(value: Option<&str>) -> Option<f64> {
    let value = value?.trim().parse::<f64>().ok()?;
    (value.is_finite() && value > 0.0).then_some(value)
}

use serde::{Deserialize, Serialize};

mod board;
mod board_file;
mod codec;
mod config;
mod rescale;
mod shape;
mod storage;
mod surface;

pub use board::{Board, Gesture};
pub use board_file::{
    decode_board_file, encode_board_file, encode_save_json, parse_load_payload_bytes,
    parse_load_payload_text, BoardFileData, BoardFileDecodeError, SaveData, BOARD_FILE_MAGIC,
    BOARD_FILE_VERSION,
};
pub use codec::{decode_shapes, encode_shapes};
pub use config::BoardConfig;
pub use rescale::{rescale_shape, rescale_shapes, scale_factors};
pub use shape::{Circle, Line, Rectangle, Shape, ShapeKind, Triangle};
pub use storage::{
    MemoryStorage, Preferences, Storage, StorageError, SELECTED_COLOR_KEY, SELECTED_SHAPE_KEY,
    SHAPES_KEY,
};
pub use surface::Surface;

pub const DEFAULT_COLOR: &str = "#000000";
pub const MAX_COLOR_LEN: usize = 32;

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(self, other: Point) -> f64 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// A size that geometry can be scaled from or to.
    pub fn is_drawable(self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }
}

pub fn normalize_point(point: Point) -> Option<Point> {
    if !point.x.is_finite() || !point.y.is_finite() {
        return None;
    }
    Some(point)
}

/// Translates a raw input position into the surface's own coordinate space.
pub fn surface_local(raw: Point, surface_origin: Point) -> Option<Point> {
    normalize_point(Point {
        x: raw.x - surface_origin.x,
        y: raw.y - surface_origin.y,
    })
}

pub fn sanitize_color(color: &str) -> String {
    let color = color.trim();
    if color.is_empty() {
        return DEFAULT_COLOR.to_string();
    }
    color.chars().take(MAX_COLOR_LEN).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn surface_local_subtracts_origin() {
        let point = surface_local(Point::new(110.0, 45.0), Point::new(100.0, 40.0));
        assert_eq!(point, Some(Point::new(10.0, 5.0)));
    }

    #[test]
    fn non_finite_points_are_rejected() {
        assert_eq!(normalize_point(Point::new(f64::NAN, 1.0)), None);
        assert_eq!(
            surface_local(Point::new(f64::INFINITY, 0.0), Point::new(0.0, 0.0)),
            None
        );
    }

    #[test]
    fn colors_are_sanitized() {
        assert_eq!(sanitize_color(""), DEFAULT_COLOR);
        assert_eq!(sanitize_color("  "), DEFAULT_COLOR);
        assert_eq!(sanitize_color("#ff0000"), "#ff0000");
        let long = "x".repeat(40);
        assert_eq!(sanitize_color(&long).len(), MAX_COLOR_LEN);
    }

    #[test]
    fn degenerate_sizes_are_not_drawable() {
        assert!(Size::new(800.0, 600.0).is_drawable());
        assert!(!Size::new(0.0, 600.0).is_drawable());
        assert!(!Size::new(800.0, f64::NAN).is_drawable());
    }
}

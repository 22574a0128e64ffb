use bincode::{Decode, Encode};
use serde::{Deserialize, Serialize};

use crate::surface::Surface;
use crate::{BoardConfig, Point};

const HALF_SQRT_3: f64 = 0.866_025_403_784_438_6;

/// The shape type picked in the toolbar. `FreeDraw` produces chained lines.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShapeKind {
    Rectangle,
    Circle,
    Line,
    Triangle,
    #[serde(rename = "Free Draw")]
    FreeDraw,
}

impl ShapeKind {
    pub const ALL: [ShapeKind; 5] = [
        ShapeKind::Rectangle,
        ShapeKind::Circle,
        ShapeKind::Line,
        ShapeKind::Triangle,
        ShapeKind::FreeDraw,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ShapeKind::Rectangle => "Rectangle",
            ShapeKind::Circle => "Circle",
            ShapeKind::Line => "Line",
            ShapeKind::Triangle => "Triangle",
            ShapeKind::FreeDraw => "Free Draw",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == value)
    }

    /// A fresh shape anchored at `anchor` with degenerate extent.
    pub fn start_shape(self, anchor: Point, color: &str, config: &BoardConfig) -> Shape {
        let (x, y, color) = (anchor.x, anchor.y, color.to_string());
        match self {
            ShapeKind::Rectangle => Shape::Rectangle(Rectangle {
                x,
                y,
                width: 0.0,
                height: 0.0,
                color,
            }),
            ShapeKind::Circle => Shape::Circle(Circle {
                x,
                y,
                radius: 0.0,
                color,
            }),
            ShapeKind::Triangle => Shape::Triangle(Triangle {
                x,
                y,
                size: config.triangle_size,
                color,
            }),
            ShapeKind::Line | ShapeKind::FreeDraw => Shape::Line(Line::at(anchor, color)),
        }
    }
}

#[derive(Serialize, Deserialize, Encode, Decode, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Line {
    pub x: f64,
    pub y: f64,
    pub end_x: f64,
    pub end_y: f64,
    pub color: String,
}

impl Line {
    /// A zero-length segment at `point`.
    pub fn at(point: Point, color: String) -> Self {
        Self {
            x: point.x,
            y: point.y,
            end_x: point.x,
            end_y: point.y,
            color,
        }
    }

    pub fn end(&self) -> Point {
        Point::new(self.end_x, self.end_y)
    }

    pub fn set_end(&mut self, point: Point) {
        self.end_x = point.x;
        self.end_y = point.y;
    }

    /// Endpoints scale per axis, so angles change under non-uniform factors.
    pub fn rescale(&mut self, x_scale: f64, y_scale: f64) {
        self.x *= x_scale;
        self.y *= y_scale;
        self.end_x *= x_scale;
        self.end_y *= y_scale;
    }

    pub fn is_finite(&self) -> bool {
        [self.x, self.y, self.end_x, self.end_y]
            .iter()
            .all(|value| value.is_finite())
    }
}

#[derive(Serialize, Deserialize, Encode, Decode, Clone, Debug, PartialEq)]
pub struct Rectangle {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub color: String,
}

impl Rectangle {
    /// Moves the anchor to the top-left corner so both extents are non-negative.
    pub fn normalize(&mut self) {
        if self.width < 0.0 {
            self.x += self.width;
            self.width = -self.width;
        }
        if self.height < 0.0 {
            self.y += self.height;
            self.height = -self.height;
        }
    }
}

#[derive(Serialize, Deserialize, Encode, Decode, Clone, Debug, PartialEq)]
pub struct Circle {
    pub x: f64,
    pub y: f64,
    pub radius: f64,
    pub color: String,
}

/// Equilateral, apex up. `size` scales the fixed vertex offsets.
#[derive(Serialize, Deserialize, Encode, Decode, Clone, Debug, PartialEq)]
pub struct Triangle {
    pub x: f64,
    pub y: f64,
    pub size: f64,
    pub color: String,
}

impl Triangle {
    pub fn vertices(&self) -> [Point; 3] {
        let half_width = self.size * HALF_SQRT_3;
        let base = self.y + self.size / 2.0;
        [
            Point::new(self.x, self.y - self.size),
            Point::new(self.x - half_width, base),
            Point::new(self.x + half_width, base),
        ]
    }
}

#[derive(Serialize, Deserialize, Encode, Decode, Clone, Debug, PartialEq)]
#[serde(tag = "type")]
pub enum Shape {
    Line(Line),
    Rectangle(Rectangle),
    Circle(Circle),
    Triangle(Triangle),
}

impl Shape {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Shape::Line(_) => "Line",
            Shape::Rectangle(_) => "Rectangle",
            Shape::Circle(_) => "Circle",
            Shape::Triangle(_) => "Triangle",
        }
    }

    pub fn anchor(&self) -> Point {
        match self {
            Shape::Line(Line { x, y, .. })
            | Shape::Rectangle(Rectangle { x, y, .. })
            | Shape::Circle(Circle { x, y, .. })
            | Shape::Triangle(Triangle { x, y, .. }) => Point::new(*x, *y),
        }
    }

    pub fn color(&self) -> &str {
        match self {
            Shape::Line(line) => &line.color,
            Shape::Rectangle(rect) => &rect.color,
            Shape::Circle(circle) => &circle.color,
            Shape::Triangle(triangle) => &triangle.color,
        }
    }

    pub fn draw(&self, surface: &mut dyn Surface) {
        match self {
            Shape::Line(line) => {
                surface.line(Point::new(line.x, line.y), line.end(), &line.color);
            }
            Shape::Rectangle(rect) => {
                surface.fill_rect(
                    Point::new(rect.x, rect.y),
                    rect.width,
                    rect.height,
                    &rect.color,
                );
            }
            Shape::Circle(circle) => {
                surface.fill_arc(Point::new(circle.x, circle.y), circle.radius, &circle.color);
            }
            Shape::Triangle(triangle) => {
                surface.fill_polygon(&triangle.vertices(), &triangle.color);
            }
        }
    }

    /// Drags the shape's extent from its anchor to `point`.
    pub fn extend_to(&mut self, point: Point) {
        match self {
            Shape::Line(line) => line.set_end(point),
            Shape::Rectangle(rect) => {
                rect.width = point.x - rect.x;
                rect.height = point.y - rect.y;
            }
            Shape::Circle(circle) => {
                circle.radius = Point::new(circle.x, circle.y).distance(point);
            }
            Shape::Triangle(triangle) => {
                triangle.size = Point::new(triangle.x, triangle.y).distance(point);
            }
        }
    }

    pub fn rescale(&mut self, x_scale: f64, y_scale: f64) {
        let uniform = x_scale.min(y_scale);
        match self {
            Shape::Line(line) => line.rescale(x_scale, y_scale),
            Shape::Rectangle(rect) => {
                rect.x *= x_scale;
                rect.y *= y_scale;
                rect.width *= x_scale;
                rect.height *= y_scale;
            }
            Shape::Circle(circle) => {
                circle.x *= x_scale;
                circle.y *= y_scale;
                circle.radius *= uniform;
            }
            Shape::Triangle(triangle) => {
                triangle.x *= x_scale;
                triangle.y *= y_scale;
                triangle.size *= uniform;
            }
        }
    }

    /// True when every coordinate and extent is finite, and so survives JSON.
    pub fn is_finite(&self) -> bool {
        match self {
            Shape::Line(line) => line.is_finite(),
            Shape::Rectangle(rect) => [rect.x, rect.y, rect.width, rect.height]
                .iter()
                .all(|value| value.is_finite()),
            Shape::Circle(circle) => [circle.x, circle.y, circle.radius]
                .iter()
                .all(|value| value.is_finite()),
            Shape::Triangle(triangle) => [triangle.x, triangle.y, triangle.size]
                .iter()
                .all(|value| value.is_finite()),
        }
    }

    /// Final fix-ups applied when a pending shape is committed.
    pub(crate) fn finish(&mut self) {
        if let Shape::Rectangle(rect) = self {
            rect.normalize();
        }
    }
}

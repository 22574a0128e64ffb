use crate::codec::{decode_shapes, encode_shapes};
use crate::rescale::{rescale_shape, rescale_shapes};
use crate::shape::{Line, Shape, ShapeKind};
use crate::storage::{Preferences, Storage, SHAPES_KEY};
use crate::surface::Surface;
use crate::{normalize_point, sanitize_color, BoardConfig, Point, Size};

/// Pointer gesture state. At most one shape is pending at a time and it never
/// appears in the committed list until the gesture ends.
#[derive(Clone, Debug, PartialEq)]
pub enum Gesture {
    Idle,
    Drawing { pending: Shape },
    /// Free-draw commits a segment on every move; `segment` is the next one,
    /// still zero-length at the current point.
    FreeDrawing { segment: Line },
}

/// Owns the committed shape list and writes it through to storage after
/// every mutation.
pub struct Board<S> {
    shapes: Vec<Shape>,
    gesture: Gesture,
    kind: ShapeKind,
    color: String,
    config: BoardConfig,
    storage: S,
}

impl<S: Storage> Board<S> {
    /// Restores shapes and preferences from `storage`. Unreadable state is dropped.
    pub fn load(storage: S, config: BoardConfig) -> Self {
        let shapes = storage
            .get(SHAPES_KEY)
            .map(|text| decode_shapes(&text))
            .unwrap_or_default();
        let Preferences { kind, color } = Preferences::load(&storage, &config);
        log::debug!(
            "Loaded {} shapes, tool={} color={color}",
            shapes.len(),
            kind.as_str()
        );
        Self {
            shapes,
            gesture: Gesture::Idle,
            kind,
            color,
            config,
            storage,
        }
    }

    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    pub fn gesture(&self) -> &Gesture {
        &self.gesture
    }

    /// The shape painted on top of the committed list, if any.
    pub fn pending(&self) -> Option<&Shape> {
        match &self.gesture {
            Gesture::Drawing { pending } => Some(pending),
            _ => None,
        }
    }

    pub fn is_drawing(&self) -> bool {
        !matches!(self.gesture, Gesture::Idle)
    }

    pub fn kind(&self) -> ShapeKind {
        self.kind
    }

    pub fn color(&self) -> &str {
        &self.color
    }

    pub fn config(&self) -> &BoardConfig {
        &self.config
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Takes effect from the next gesture.
    pub fn set_shape_kind(&mut self, kind: ShapeKind) {
        self.kind = kind;
        Preferences::store_kind(&mut self.storage, kind);
    }

    pub fn set_color(&mut self, color: &str) {
        self.color = sanitize_color(color);
        Preferences::store_color(&mut self.storage, &self.color);
    }

    /// Starts a gesture at a surface-local point. Ignored while a gesture is
    /// active or when the point is not finite.
    pub fn gesture_start(&mut self, point: Point, surface: &mut dyn Surface) -> bool {
        if self.is_drawing() {
            return false;
        }
        let Some(point) = normalize_point(point) else {
            return false;
        };
        self.gesture = match self.kind {
            ShapeKind::FreeDraw => Gesture::FreeDrawing {
                segment: Line::at(point, self.color.clone()),
            },
            kind => Gesture::Drawing {
                pending: kind.start_shape(point, &self.color, &self.config),
            },
        };
        log::debug!(
            "Gesture start tool={} at ({}, {})",
            self.kind.as_str(),
            point.x,
            point.y
        );
        self.render_all(surface);
        true
    }

    pub fn gesture_move(&mut self, point: Point, surface: &mut dyn Surface) {
        let Some(point) = normalize_point(point) else {
            return;
        };
        match &mut self.gesture {
            Gesture::Idle => return,
            Gesture::Drawing { pending } => pending.extend_to(point),
            Gesture::FreeDrawing { segment } => {
                segment.set_end(point);
                let next = Line::at(point, segment.color.clone());
                let finished = std::mem::replace(segment, next);
                self.shapes.push(Shape::Line(finished));
            }
        }
        self.render_all(surface);
    }

    /// Commits the pending shape, if any, and persists the list.
    pub fn gesture_end(&mut self, surface: &mut dyn Surface) {
        match std::mem::replace(&mut self.gesture, Gesture::Idle) {
            Gesture::Idle => return,
            Gesture::Drawing { mut pending } => {
                pending.finish();
                self.shapes.push(pending);
            }
            Gesture::FreeDrawing { .. } => {}
        }
        log::debug!("Gesture end, {} shapes committed", self.shapes.len());
        self.persist();
        self.render_all(surface);
    }

    /// Rescales all geometry from `old` to `new` before re-rendering.
    pub fn resize(&mut self, old: Size, new: Size, surface: &mut dyn Surface) {
        if let Some((x_scale, y_scale)) = rescale_shapes(&mut self.shapes, old, new) {
            match &mut self.gesture {
                Gesture::Idle => {}
                Gesture::Drawing { pending } => {
                    rescale_shape(pending, x_scale, y_scale);
                }
                Gesture::FreeDrawing { segment } => {
                    let mut scaled = segment.clone();
                    scaled.rescale(x_scale, y_scale);
                    if scaled.is_finite() {
                        *segment = scaled;
                    }
                }
            }
            log::debug!(
                "Rescaled {} shapes by ({x_scale}, {y_scale})",
                self.shapes.len()
            );
            self.persist();
        }
        self.render_all(surface);
    }

    pub fn undo(&mut self, surface: &mut dyn Surface) {
        if self.shapes.pop().is_none() {
            return;
        }
        log::debug!("Undo, {} shapes remain", self.shapes.len());
        self.persist();
        self.render_all(surface);
    }

    /// Empties the board and deletes the stored blob.
    pub fn clear(&mut self, surface: &mut dyn Surface) {
        self.shapes.clear();
        self.gesture = Gesture::Idle;
        if let Err(error) = self.storage.remove(SHAPES_KEY) {
            log::warn!("Failed to remove stored shapes: {error}");
        }
        log::debug!("Board cleared");
        self.render_all(surface);
    }

    /// Adopts a loaded drawing, dropping any active gesture.
    pub fn replace_shapes(&mut self, shapes: Vec<Shape>, surface: &mut dyn Surface) {
        self.gesture = Gesture::Idle;
        self.shapes = shapes;
        log::debug!("Adopted {} shapes", self.shapes.len());
        self.persist();
        self.render_all(surface);
    }

    pub fn render_all(&self, surface: &mut dyn Surface) {
        surface.clear();
        for shape in &self.shapes {
            shape.draw(surface);
        }
        if let Some(pending) = self.pending() {
            pending.draw(surface);
        }
    }

    fn persist(&mut self) {
        match encode_shapes(&self.shapes) {
            Ok(text) => {
                if let Err(error) = self.storage.set(SHAPES_KEY, &text) {
                    log::warn!("Failed to store shapes: {error}");
                }
            }
            Err(error) => log::warn!("Failed to encode shapes: {error}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::shape::strategy;
    use crate::storage::{MemoryStorage, SELECTED_COLOR_KEY, SELECTED_SHAPE_KEY};
    use crate::surface::recording::{DrawOp, RecordingSurface};
    use crate::{Circle, Rectangle};

    fn board_with(kind: ShapeKind) -> Board<MemoryStorage> {
        let mut board = Board::load(MemoryStorage::new(), BoardConfig::default());
        board.set_shape_kind(kind);
        board
    }

    fn line(from: (f64, f64), to: (f64, f64), color: &str) -> Shape {
        Shape::Line(Line {
            x: from.0,
            y: from.1,
            end_x: to.0,
            end_y: to.1,
            color: color.into(),
        })
    }

    #[test]
    fn rectangle_gesture_commits_dragged_extent() {
        let mut board = board_with(ShapeKind::Rectangle);
        let mut surface = RecordingSurface::default();
        board.gesture_start(Point::new(10.0, 10.0), &mut surface);
        board.gesture_move(Point::new(60.0, 40.0), &mut surface);
        assert_eq!(
            board.pending(),
            Some(&Shape::Rectangle(Rectangle {
                x: 10.0,
                y: 10.0,
                width: 50.0,
                height: 30.0,
                color: "#000000".into(),
            }))
        );
        assert!(board.shapes().is_empty());
        board.gesture_end(&mut surface);
        assert_eq!(
            board.shapes(),
            &[Shape::Rectangle(Rectangle {
                x: 10.0,
                y: 10.0,
                width: 50.0,
                height: 30.0,
                color: "#000000".into(),
            })]
        );
        assert_eq!(board.pending(), None);
        assert!(!board.is_drawing());
        let stored = board.storage().get(SHAPES_KEY).unwrap();
        assert_eq!(decode_shapes(&stored), board.shapes());
    }

    #[test]
    fn circle_gesture_uses_distance_as_radius() {
        let mut board = board_with(ShapeKind::Circle);
        let mut surface = RecordingSurface::default();
        board.gesture_start(Point::new(0.0, 0.0), &mut surface);
        board.gesture_move(Point::new(3.0, 4.0), &mut surface);
        assert!(matches!(
            board.pending(),
            Some(Shape::Circle(Circle { radius, .. })) if (*radius - 5.0).abs() < 1e-12
        ));
        board.gesture_end(&mut surface);
        assert_eq!(
            board.shapes(),
            &[Shape::Circle(Circle {
                x: 0.0,
                y: 0.0,
                radius: 5.0,
                color: "#000000".into(),
            })]
        );
    }

    #[test]
    fn free_draw_chains_committed_segments() {
        let mut board = board_with(ShapeKind::FreeDraw);
        board.set_color("#ff0000");
        let mut surface = RecordingSurface::default();
        board.gesture_start(Point::new(0.0, 0.0), &mut surface);
        board.gesture_move(Point::new(5.0, 0.0), &mut surface);
        assert_eq!(board.shapes().len(), 1);
        board.gesture_move(Point::new(5.0, 5.0), &mut surface);
        assert_eq!(board.pending(), None);
        board.gesture_end(&mut surface);
        assert_eq!(
            board.shapes(),
            &[
                line((0.0, 0.0), (5.0, 0.0), "#ff0000"),
                line((5.0, 0.0), (5.0, 5.0), "#ff0000"),
            ]
        );
        assert_eq!(*board.gesture(), Gesture::Idle);
    }

    #[test]
    fn free_draw_without_movement_commits_nothing() {
        let mut board = board_with(ShapeKind::FreeDraw);
        let mut surface = RecordingSurface::default();
        board.gesture_start(Point::new(3.0, 3.0), &mut surface);
        board.gesture_end(&mut surface);
        assert!(board.shapes().is_empty());
    }

    #[test]
    fn preview_draws_committed_then_pending() {
        let mut board = board_with(ShapeKind::Line);
        board.set_color("#111111");
        let mut surface = RecordingSurface::default();
        board.gesture_start(Point::new(0.0, 0.0), &mut surface);
        board.gesture_move(Point::new(10.0, 0.0), &mut surface);
        board.gesture_end(&mut surface);

        board.set_shape_kind(ShapeKind::Rectangle);
        board.set_color("#222222");
        board.gesture_start(Point::new(1.0, 1.0), &mut surface);
        board.gesture_move(Point::new(4.0, 5.0), &mut surface);
        assert_eq!(
            surface.last_frame(),
            &[
                DrawOp::Line {
                    from: Point::new(0.0, 0.0),
                    to: Point::new(10.0, 0.0),
                    color: "#111111".into(),
                },
                DrawOp::Rect {
                    origin: Point::new(1.0, 1.0),
                    width: 3.0,
                    height: 4.0,
                    color: "#222222".into(),
                },
            ]
        );
    }

    #[test]
    fn triangle_preview_is_visible_at_start() {
        let mut board = board_with(ShapeKind::Triangle);
        let mut surface = RecordingSurface::default();
        board.gesture_start(Point::new(50.0, 50.0), &mut surface);
        match surface.last_frame() {
            [DrawOp::Polygon { points, .. }] => assert_eq!(points[0], Point::new(50.0, 30.0)),
            other => panic!("unexpected frame {other:?}"),
        }
    }

    #[test]
    fn move_and_end_without_gesture_are_ignored() {
        let mut board = board_with(ShapeKind::Rectangle);
        let mut surface = RecordingSurface::default();
        board.gesture_move(Point::new(5.0, 5.0), &mut surface);
        board.gesture_end(&mut surface);
        assert!(board.shapes().is_empty());
        assert!(surface.ops.is_empty());
        assert!(!board.storage().contains(SHAPES_KEY));
    }

    #[test]
    fn second_start_during_gesture_is_ignored() {
        let mut board = board_with(ShapeKind::Circle);
        let mut surface = RecordingSurface::default();
        assert!(board.gesture_start(Point::new(0.0, 0.0), &mut surface));
        assert!(!board.gesture_start(Point::new(9.0, 9.0), &mut surface));
        assert_eq!(board.pending().map(Shape::anchor), Some(Point::new(0.0, 0.0)));
        assert!(!board.gesture_start(Point::new(f64::NAN, 0.0), &mut surface));
    }

    #[test]
    fn dragging_up_left_commits_normalized_rectangle() {
        let mut board = board_with(ShapeKind::Rectangle);
        let mut surface = RecordingSurface::default();
        board.gesture_start(Point::new(60.0, 40.0), &mut surface);
        board.gesture_move(Point::new(10.0, 10.0), &mut surface);
        board.gesture_end(&mut surface);
        assert_eq!(
            board.shapes(),
            &[Shape::Rectangle(Rectangle {
                x: 10.0,
                y: 10.0,
                width: 50.0,
                height: 30.0,
                color: "#000000".into(),
            })]
        );
    }

    #[test]
    fn undo_removes_only_the_last_shape() {
        let mut board = board_with(ShapeKind::FreeDraw);
        let mut surface = RecordingSurface::default();
        board.gesture_start(Point::new(0.0, 0.0), &mut surface);
        for x in 1..=3 {
            board.gesture_move(Point::new(x as f64, 0.0), &mut surface);
        }
        board.gesture_end(&mut surface);
        let before = board.shapes().to_vec();

        board.undo(&mut surface);
        assert_eq!(board.shapes(), &before[..2]);
        let stored = board.storage().get(SHAPES_KEY).unwrap();
        assert_eq!(decode_shapes(&stored), &before[..2]);

        board.undo(&mut surface);
        board.undo(&mut surface);
        assert!(board.shapes().is_empty());
        let clears = surface.clears();
        board.undo(&mut surface);
        assert!(board.shapes().is_empty());
        assert_eq!(surface.clears(), clears);
    }

    #[test]
    fn clear_deletes_the_stored_blob() {
        let mut board = board_with(ShapeKind::Circle);
        let mut surface = RecordingSurface::default();
        board.gesture_start(Point::new(0.0, 0.0), &mut surface);
        board.gesture_move(Point::new(1.0, 1.0), &mut surface);
        board.gesture_end(&mut surface);
        assert!(board.storage().contains(SHAPES_KEY));

        board.clear(&mut surface);
        assert!(board.shapes().is_empty());
        assert!(!board.storage().contains(SHAPES_KEY));
        assert!(surface.last_frame().is_empty());

        let storage = board.storage().clone();
        let reloaded = Board::load(storage, BoardConfig::default());
        assert!(reloaded.shapes().is_empty());
    }

    #[test]
    fn reload_restores_shapes_and_preferences() {
        let mut board = board_with(ShapeKind::Line);
        board.set_color("#abcdef");
        let mut surface = RecordingSurface::default();
        board.gesture_start(Point::new(1.0, 2.0), &mut surface);
        board.gesture_move(Point::new(3.0, 4.0), &mut surface);
        board.gesture_end(&mut surface);

        let storage = board.storage().clone();
        assert_eq!(storage.get(SELECTED_SHAPE_KEY).as_deref(), Some("Line"));
        assert_eq!(storage.get(SELECTED_COLOR_KEY).as_deref(), Some("#abcdef"));
        let reloaded = Board::load(storage, BoardConfig::default());
        assert_eq!(reloaded.shapes(), board.shapes());
        assert_eq!(reloaded.kind(), ShapeKind::Line);
        assert_eq!(reloaded.color(), "#abcdef");
    }

    #[test]
    fn corrupt_storage_loads_empty_board() {
        let mut storage = MemoryStorage::new();
        storage.set(SHAPES_KEY, "{broken").unwrap();
        let board = Board::load(storage, BoardConfig::default());
        assert!(board.shapes().is_empty());
        assert_eq!(board.kind(), ShapeKind::FreeDraw);
        assert_eq!(board.color(), "#000000");
    }

    #[test]
    fn resize_rescales_before_rendering() {
        let mut board = board_with(ShapeKind::Rectangle);
        let mut surface = RecordingSurface::default();
        board.gesture_start(Point::new(100.0, 100.0), &mut surface);
        board.gesture_move(Point::new(150.0, 150.0), &mut surface);
        board.gesture_end(&mut surface);

        board.resize(
            Size::new(800.0, 600.0),
            Size::new(400.0, 600.0),
            &mut surface,
        );
        let expected = Shape::Rectangle(Rectangle {
            x: 50.0,
            y: 100.0,
            width: 25.0,
            height: 50.0,
            color: "#000000".into(),
        });
        assert_eq!(board.shapes(), &[expected.clone()]);
        assert_eq!(
            surface.last_frame(),
            &[DrawOp::Rect {
                origin: Point::new(50.0, 100.0),
                width: 25.0,
                height: 50.0,
                color: "#000000".into(),
            }]
        );
        let stored = board.storage().get(SHAPES_KEY).unwrap();
        assert_eq!(decode_shapes(&stored), vec![expected]);
    }

    #[test]
    fn resize_overflow_keeps_shape_and_reloads_it() {
        let mut board = board_with(ShapeKind::Circle);
        let mut surface = RecordingSurface::default();
        let far = Shape::Circle(Circle {
            x: 1e308,
            y: 0.5,
            radius: 0.25,
            color: "#000".into(),
        });
        board.replace_shapes(vec![far.clone()], &mut surface);

        board.resize(Size::new(1.0, 1.0), Size::new(10.0, 10.0), &mut surface);
        assert_eq!(board.shapes(), &[far.clone()]);
        let stored = board.storage().get(SHAPES_KEY).unwrap();
        assert!(!stored.contains("null"));

        let reloaded = Board::load(board.storage().clone(), BoardConfig::default());
        assert_eq!(reloaded.shapes(), &[far]);
    }

    #[test]
    fn replace_shapes_cancels_gesture_and_persists() {
        let mut board = board_with(ShapeKind::Circle);
        let mut surface = RecordingSurface::default();
        board.gesture_start(Point::new(0.0, 0.0), &mut surface);
        let loaded = vec![line((0.0, 0.0), (1.0, 1.0), "#000")];
        board.replace_shapes(loaded.clone(), &mut surface);
        assert!(!board.is_drawing());
        assert_eq!(board.shapes(), &loaded[..]);
        let stored = board.storage().get(SHAPES_KEY).unwrap();
        assert_eq!(decode_shapes(&stored), loaded);
    }

    #[test]
    fn render_all_is_idempotent() {
        let mut board = board_with(ShapeKind::Line);
        let mut surface = RecordingSurface::default();
        board.gesture_start(Point::new(0.0, 0.0), &mut surface);
        board.gesture_move(Point::new(2.0, 2.0), &mut surface);
        board.gesture_end(&mut surface);

        let mut first = RecordingSurface::default();
        let mut second = RecordingSurface::default();
        board.render_all(&mut first);
        board.render_all(&mut second);
        board.render_all(&mut second);
        assert_eq!(first.last_frame(), second.last_frame());
        assert_eq!(first.ops[0], DrawOp::Clear);
    }

    proptest! {
        #[test]
        fn each_undo_drops_exactly_the_last_shape(shapes in strategy::shapes()) {
            let mut board = board_with(ShapeKind::Line);
            let mut surface = RecordingSurface::default();
            board.replace_shapes(shapes.clone(), &mut surface);
            for remaining in (0..shapes.len()).rev() {
                board.undo(&mut surface);
                prop_assert_eq!(board.shapes(), &shapes[..remaining]);
                let stored = board.storage().get(SHAPES_KEY).unwrap();
                prop_assert_eq!(decode_shapes(&stored), &shapes[..remaining]);
            }
            board.undo(&mut surface);
            prop_assert!(board.shapes().is_empty());
        }
    }
}

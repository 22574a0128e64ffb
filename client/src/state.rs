use wasm_bindgen::prelude::Closure;
use web_sys::{FileReader, HtmlCanvasElement, ProgressEvent};

use shapeboard_shared::{Board, Point, Shape, Size};

use crate::persistence::LocalStorage;
use crate::render::CanvasSurface;

/// Keeps an in-flight file read and its callback alive.
pub struct LoadingState {
    pub reader: FileReader,
    pub onload: Closure<dyn FnMut(ProgressEvent)>,
}

pub struct State {
    pub canvas: HtmlCanvasElement,
    pub surface: CanvasSurface,
    pub board: Board<LocalStorage>,
    /// Last drawable CSS size, the reference for the next rescale.
    pub board_size: Size,
    /// Pointer that owns the active gesture.
    pub active_pointer: Option<i32>,
    pub loading: Option<LoadingState>,
}

impl State {
    pub fn redraw(&mut self) {
        self.board.render_all(&mut self.surface);
    }

    pub fn gesture_start(&mut self, pointer_id: i32, point: Point) -> bool {
        if self.active_pointer.is_some() || self.loading.is_some() {
            return false;
        }
        if !self.board.gesture_start(point, &mut self.surface) {
            return false;
        }
        self.active_pointer = Some(pointer_id);
        true
    }

    pub fn gesture_move(&mut self, pointer_id: i32, point: Point) {
        if self.active_pointer != Some(pointer_id) {
            return;
        }
        self.board.gesture_move(point, &mut self.surface);
    }

    /// Ends the gesture owned by `pointer_id`; other pointers are ignored.
    pub fn gesture_end(&mut self, pointer_id: i32) -> bool {
        if self.active_pointer != Some(pointer_id) {
            return false;
        }
        self.active_pointer = None;
        self.board.gesture_end(&mut self.surface);
        true
    }

    pub fn undo(&mut self) {
        self.board.undo(&mut self.surface);
    }

    pub fn clear(&mut self) {
        self.active_pointer = None;
        self.board.clear(&mut self.surface);
    }

    pub fn adopt_shapes(&mut self, shapes: Vec<Shape>) {
        self.active_pointer = None;
        self.board.replace_shapes(shapes, &mut self.surface);
    }
}

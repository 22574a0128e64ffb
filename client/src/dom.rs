use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, HtmlCanvasElement, HtmlSelectElement, PointerEvent, Window};

use shapeboard_shared::{surface_local, BoardConfig, Point, ShapeKind, Size};

use crate::state::State;

pub fn get_element<T: JsCast>(document: &Document, id: &str) -> Result<T, JsValue> {
    let element = document
        .get_element_by_id(id)
        .ok_or_else(|| JsValue::from_str(&format!("Missing element: {id}")))?;
    element
        .dyn_into::<T>()
        .map_err(|_| JsValue::from_str(&format!("Invalid element type: {id}")))
}

pub fn debug_enabled(window: &Window) -> bool {
    let search = window.location().search().ok().unwrap_or_default();
    search.contains("debug=1")
        || search.contains("debug=true")
        || search.contains("log=1")
        || search.contains("log=true")
}

pub fn board_config(canvas: &HtmlCanvasElement) -> BoardConfig {
    BoardConfig::with_overrides(
        canvas.get_attribute("data-triangle-size").as_deref(),
        canvas.get_attribute("data-line-width").as_deref(),
    )
}

pub fn fill_shape_select(document: &Document, select: &HtmlSelectElement, selected: ShapeKind) {
    select.set_inner_html("");
    for kind in ShapeKind::ALL {
        let Ok(option) = document.create_element("option") else {
            continue;
        };
        let _ = option.set_attribute("value", kind.as_str());
        option.set_text_content(Some(kind.as_str()));
        let _ = select.append_child(&option);
    }
    select.set_value(selected.as_str());
}

/// Re-measures the canvas and rescales the board from the previous size.
pub fn resize_canvas(window: &Window, state: &mut State) {
    let rect = state.canvas.get_bounding_client_rect();
    let next = Size::new(rect.width(), rect.height());
    let dpr = window.device_pixel_ratio();
    state.canvas.set_width((next.width * dpr) as u32);
    state.canvas.set_height((next.height * dpr) as u32);
    let _ = state
        .surface
        .ctx()
        .set_transform(dpr, 0.0, 0.0, dpr, 0.0, 0.0);
    state.surface.set_size(next);

    if !next.is_drawable() {
        log::debug!("Canvas collapsed to {}x{}, keeping geometry", next.width, next.height);
        return;
    }
    let previous = state.board_size;
    state.board_size = next;
    if !previous.is_drawable() {
        log::debug!("Initial canvas size {}x{}", next.width, next.height);
        state.redraw();
        return;
    }
    log::debug!(
        "Resizing canvas from {}x{} to {}x{}",
        previous.width,
        previous.height,
        next.width,
        next.height
    );
    state.board.resize(previous, next, &mut state.surface);
}

pub fn event_to_point(canvas: &HtmlCanvasElement, event: &PointerEvent) -> Option<Point> {
    let rect = canvas.get_bounding_client_rect();
    if rect.width() <= 0.0 || rect.height() <= 0.0 {
        return None;
    }
    surface_local(
        Point::new(event.client_x() as f64, event.client_y() as f64),
        Point::new(rect.left(), rect.top()),
    )
}

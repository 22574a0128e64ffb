use std::cell::{Cell, RefCell};
use std::rc::Rc;

use js_sys::Reflect;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{
    CanvasRenderingContext2d, Event, FileReader, HtmlButtonElement, HtmlCanvasElement,
    HtmlInputElement, HtmlSelectElement, KeyboardEvent, PointerEvent, ProgressEvent,
};

use shapeboard_shared::{Board, ShapeKind, Size};

use crate::dom::{
    board_config, debug_enabled, event_to_point, fill_shape_select, get_element, resize_canvas,
};
use crate::persistence::{read_load_payload, save_board_file, save_json, LocalStorage};
use crate::render::CanvasSurface;
use crate::state::{LoadingState, State};

fn document_ready_state(document: &web_sys::Document) -> Option<String> {
    Reflect::get(document.as_ref(), &JsValue::from_str("readyState"))
        .ok()?
        .as_string()
}

fn set_load_busy(load_button: &HtmlButtonElement, busy: bool) {
    let value = if busy { "true" } else { "false" };
    let _ = load_button.set_attribute("aria-busy", value);
}

fn init_logging(window: &web_sys::Window) {
    let level = if debug_enabled(window) {
        log::Level::Debug
    } else {
        log::Level::Info
    };
    // A second call only fails because a logger is already installed.
    let _ = console_log::init_with_level(level);
}

#[wasm_bindgen(start)]
pub fn run() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();

    let window = web_sys::window().ok_or_else(|| JsValue::from_str("Missing window"))?;
    init_logging(&window);
    let document = window
        .document()
        .ok_or_else(|| JsValue::from_str("Missing document"))?;
    let started = Rc::new(Cell::new(false));

    if document_ready_state(&document).as_deref() == Some("complete") {
        started.set(true);
        return start_app();
    }

    let onload_started = started.clone();
    let onload = Closure::<dyn FnMut(Event)>::new(move |_| {
        if onload_started.replace(true) {
            return;
        }
        if let Err(err) = start_app() {
            log::error!("Failed to start shapeboard: {err:?}");
        }
    });
    window.add_event_listener_with_callback("load", onload.as_ref().unchecked_ref())?;
    onload.forget();

    Ok(())
}

fn start_app() -> Result<(), JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("Missing window"))?;
    let document = window
        .document()
        .ok_or_else(|| JsValue::from_str("Missing document"))?;

    let canvas: HtmlCanvasElement = get_element(&document, "board")?;
    let ctx = canvas
        .get_context("2d")?
        .ok_or_else(|| JsValue::from_str("Missing canvas context"))?
        .dyn_into::<CanvasRenderingContext2d>()?;

    let shape_select: HtmlSelectElement = get_element(&document, "shape")?;
    let color_input: HtmlInputElement = get_element(&document, "color")?;
    let undo_button: HtmlButtonElement = get_element(&document, "undo")?;
    let clear_button: HtmlButtonElement = get_element(&document, "clear")?;
    let save_json_button: HtmlButtonElement = get_element(&document, "saveJson")?;
    let save_board_button: HtmlButtonElement = get_element(&document, "saveBoard")?;
    let load_button: HtmlButtonElement = get_element(&document, "load")?;
    let load_file: HtmlInputElement = get_element(&document, "loadFile")?;

    let config = board_config(&canvas);
    let surface = CanvasSurface::new(ctx, config.line_width);
    let board = Board::load(LocalStorage::new(&window), config);
    log::info!(
        "Shapeboard ready with {} shapes, tool={}",
        board.shapes().len(),
        board.kind().as_str()
    );

    fill_shape_select(&document, &shape_select, board.kind());
    color_input.set_value(board.color());

    let state = Rc::new(RefCell::new(State {
        canvas: canvas.clone(),
        surface,
        board,
        board_size: Size::default(),
        active_pointer: None,
        loading: None,
    }));

    {
        let mut state = state.borrow_mut();
        resize_canvas(&window, &mut state);
    }

    {
        let resize_state = state.clone();
        let window_cb = window.clone();
        let onresize = Closure::<dyn FnMut()>::new(move || {
            let mut state = resize_state.borrow_mut();
            resize_canvas(&window_cb, &mut state);
        });
        window.add_event_listener_with_callback("resize", onresize.as_ref().unchecked_ref())?;
        onresize.forget();
    }

    {
        let select_state = state.clone();
        let select_cb = shape_select.clone();
        let onchange = Closure::<dyn FnMut(Event)>::new(move |_| {
            let value = select_cb.value();
            let Some(kind) = ShapeKind::parse(&value) else {
                log::warn!("Unknown shape type {value:?}");
                return;
            };
            select_state.borrow_mut().board.set_shape_kind(kind);
        });
        shape_select
            .add_event_listener_with_callback("change", onchange.as_ref().unchecked_ref())?;
        onchange.forget();
    }

    {
        let color_state = state.clone();
        let color_cb = color_input.clone();
        let oninput = Closure::<dyn FnMut(Event)>::new(move |_| {
            color_state.borrow_mut().board.set_color(&color_cb.value());
        });
        color_input.add_event_listener_with_callback("input", oninput.as_ref().unchecked_ref())?;
        oninput.forget();
    }

    {
        let undo_state = state.clone();
        let onclick = Closure::<dyn FnMut(Event)>::new(move |_| {
            undo_state.borrow_mut().undo();
        });
        undo_button.add_event_listener_with_callback("click", onclick.as_ref().unchecked_ref())?;
        onclick.forget();
    }

    {
        let clear_state = state.clone();
        let onclick = Closure::<dyn FnMut(Event)>::new(move |_| {
            clear_state.borrow_mut().clear();
        });
        clear_button.add_event_listener_with_callback("click", onclick.as_ref().unchecked_ref())?;
        onclick.forget();
    }

    {
        let key_state = state.clone();
        let onkeydown = Closure::<dyn FnMut(KeyboardEvent)>::new(move |event: KeyboardEvent| {
            let modifier = event.meta_key() || event.ctrl_key();
            if !modifier || event.shift_key() || !event.key().eq_ignore_ascii_case("z") {
                return;
            }
            event.prevent_default();
            key_state.borrow_mut().undo();
        });
        window.add_event_listener_with_callback("keydown", onkeydown.as_ref().unchecked_ref())?;
        onkeydown.forget();
    }

    {
        let save_state = state.clone();
        let document = document.clone();
        let onclick = Closure::<dyn FnMut(Event)>::new(move |_| {
            let state = save_state.borrow();
            save_json(&document, state.board.shapes());
        });
        save_json_button
            .add_event_listener_with_callback("click", onclick.as_ref().unchecked_ref())?;
        onclick.forget();
    }

    {
        let save_state = state.clone();
        let document = document.clone();
        let onclick = Closure::<dyn FnMut(Event)>::new(move |_| {
            let state = save_state.borrow();
            save_board_file(&document, state.board.shapes());
        });
        save_board_button
            .add_event_listener_with_callback("click", onclick.as_ref().unchecked_ref())?;
        onclick.forget();
    }

    {
        let load_file = load_file.clone();
        let load_state = state.clone();
        let onclick = Closure::<dyn FnMut(Event)>::new(move |_| {
            if load_state.borrow().loading.is_some() {
                return;
            }
            load_file.set_value("");
            load_file.click();
        });
        load_button.add_event_listener_with_callback("click", onclick.as_ref().unchecked_ref())?;
        onclick.forget();
    }

    {
        let load_file_cb = load_file.clone();
        let load_state_onchange = state.clone();
        let load_button_cb = load_button.clone();
        let onchange = Closure::<dyn FnMut(Event)>::new(move |_| {
            let files = load_file_cb.files();
            let Some(file) = files.and_then(|list| list.get(0)) else {
                return;
            };
            if load_state_onchange.borrow().loading.is_some() {
                return;
            }
            let reader = match FileReader::new() {
                Ok(reader) => reader,
                Err(error) => {
                    log::error!("Failed to create file reader: {error:?}");
                    return;
                }
            };
            let file_name = file.name();
            let load_state_onload = load_state_onchange.clone();
            let load_button_onload = load_button_cb.clone();
            let onload = Closure::<dyn FnMut(ProgressEvent)>::new(move |event: ProgressEvent| {
                let shapes = read_load_payload(&event);
                {
                    let mut state = load_state_onload.borrow_mut();
                    let _ = state.loading.take();
                    match shapes {
                        Some(shapes) => {
                            log::info!("Loaded {} shapes from {file_name}", shapes.len());
                            state.adopt_shapes(shapes);
                        }
                        None => log::warn!("Could not read a drawing from {file_name}"),
                    }
                }
                set_load_busy(&load_button_onload, false);
            });
            reader.set_onload(Some(onload.as_ref().unchecked_ref()));
            if let Err(error) = reader.read_as_array_buffer(&file) {
                log::error!("Failed to read file: {error:?}");
                return;
            }
            set_load_busy(&load_button_cb, true);
            load_state_onchange.borrow_mut().loading = Some(LoadingState { reader, onload });
        });
        load_file.add_event_listener_with_callback("change", onchange.as_ref().unchecked_ref())?;
        onchange.forget();
    }

    {
        let down_state = state.clone();
        let down_canvas = canvas.clone();
        let ondown = Closure::<dyn FnMut(PointerEvent)>::new(move |event: PointerEvent| {
            if event.button() != 0 {
                return;
            }
            let Some(point) = event_to_point(&down_canvas, &event) else {
                return;
            };
            event.prevent_default();
            if down_state
                .borrow_mut()
                .gesture_start(event.pointer_id(), point)
            {
                let _ = down_canvas.set_pointer_capture(event.pointer_id());
            }
        });
        canvas.add_event_listener_with_callback("pointerdown", ondown.as_ref().unchecked_ref())?;
        ondown.forget();
    }

    {
        let move_state = state.clone();
        let move_canvas = canvas.clone();
        let onmove = Closure::<dyn FnMut(PointerEvent)>::new(move |event: PointerEvent| {
            let Some(point) = event_to_point(&move_canvas, &event) else {
                return;
            };
            let mut state = move_state.borrow_mut();
            if state.active_pointer != Some(event.pointer_id()) {
                return;
            }
            event.prevent_default();
            state.gesture_move(event.pointer_id(), point);
        });
        canvas.add_event_listener_with_callback("pointermove", onmove.as_ref().unchecked_ref())?;
        onmove.forget();
    }

    {
        let stop_state = state.clone();
        let stop_canvas = canvas.clone();
        let onstop = Closure::<dyn FnMut(PointerEvent)>::new(move |event: PointerEvent| {
            let ended = stop_state.borrow_mut().gesture_end(event.pointer_id());
            if !ended {
                return;
            }
            event.prevent_default();
            if stop_canvas.has_pointer_capture(event.pointer_id()) {
                let _ = stop_canvas.release_pointer_capture(event.pointer_id());
            }
        });
        canvas.add_event_listener_with_callback("pointerup", onstop.as_ref().unchecked_ref())?;
        canvas
            .add_event_listener_with_callback("pointercancel", onstop.as_ref().unchecked_ref())?;
        canvas.add_event_listener_with_callback("pointerleave", onstop.as_ref().unchecked_ref())?;
        canvas.add_event_listener_with_callback(
            "lostpointercapture",
            onstop.as_ref().unchecked_ref(),
        )?;
        onstop.forget();
    }

    log::debug!("Event handlers installed");
    Ok(())
}

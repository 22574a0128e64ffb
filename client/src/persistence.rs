use js_sys::{Array, Uint8Array};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Blob, BlobPropertyBag, Document, FileReader, HtmlAnchorElement, ProgressEvent, Url};

use shapeboard_shared::{
    encode_board_file, encode_save_json, parse_load_payload_bytes, BoardFileData, Shape, Storage,
    StorageError,
};

pub const JSON_FILE_NAME: &str = "shapeboard.json";
pub const BOARD_FILE_NAME: &str = "shapeboard.board";

/// `window.localStorage`. Reads fail soft; a missing backend stores nothing.
pub struct LocalStorage {
    inner: Option<web_sys::Storage>,
}

impl LocalStorage {
    pub fn new(window: &web_sys::Window) -> Self {
        let inner = window.local_storage().ok().flatten();
        if inner.is_none() {
            log::warn!("localStorage unavailable, the drawing will not persist");
        }
        Self { inner }
    }

    fn backend(&self) -> Result<&web_sys::Storage, StorageError> {
        self.inner.as_ref().ok_or(StorageError::Unavailable)
    }
}

fn js_error(error: JsValue) -> StorageError {
    StorageError::Backend(
        error
            .as_string()
            .unwrap_or_else(|| format!("{error:?}")),
    )
}

impl Storage for LocalStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.inner.as_ref()?.get_item(key).ok().flatten()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.backend()?.set_item(key, value).map_err(js_error)
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.backend()?.remove_item(key).map_err(js_error)
    }
}

pub fn save_json(document: &Document, shapes: &[Shape]) {
    let json = match encode_save_json(shapes) {
        Ok(json) => json,
        Err(error) => {
            log::error!("Failed to encode board: {error}");
            return;
        }
    };
    let encoded = js_sys::encode_uri_component(&json);
    let href = format!("data:application/json;charset=utf-8,{encoded}");
    click_download(document, &href, JSON_FILE_NAME);
}

pub fn save_board_file(document: &Document, shapes: &[Shape]) {
    let payload = match encode_board_file(&BoardFileData {
        shapes: shapes.to_vec(),
    }) {
        Ok(payload) => payload,
        Err(error) => {
            log::error!("Failed to encode board file: {error}");
            return;
        }
    };
    let bytes = Uint8Array::from(payload.as_slice());
    let parts = Array::of1(&bytes.into());
    let options = BlobPropertyBag::new();
    options.set_type("application/octet-stream");
    let blob = match Blob::new_with_u8_array_sequence_and_options(&parts, &options) {
        Ok(blob) => blob,
        Err(error) => {
            log::error!("Failed to create board blob: {error:?}");
            return;
        }
    };
    let Ok(url) = Url::create_object_url_with_blob(&blob) else {
        log::error!("Failed to create object URL for board file");
        return;
    };
    click_download(document, &url, BOARD_FILE_NAME);
    let _ = Url::revoke_object_url(&url);
}

fn click_download(document: &Document, href: &str, file_name: &str) {
    if let Ok(element) = document.create_element("a") {
        if let Ok(anchor) = element.dyn_into::<HtmlAnchorElement>() {
            anchor.set_href(href);
            anchor.set_download(file_name);
            anchor.click();
        }
    }
}

pub fn read_load_payload(event: &ProgressEvent) -> Option<Vec<Shape>> {
    let reader: FileReader = event.target()?.dyn_into().ok()?;
    let result = reader.result().ok()?;
    let buffer = result.dyn_into::<js_sys::ArrayBuffer>().ok()?;
    let bytes = Uint8Array::new(&buffer).to_vec();
    parse_load_payload_bytes(&bytes)
}

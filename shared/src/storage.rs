use std::collections::HashMap;

use thiserror::Error;

use crate::{sanitize_color, BoardConfig, ShapeKind};

pub const SHAPES_KEY: &str = "shapes";
pub const SELECTED_SHAPE_KEY: &str = "selectedShape";
pub const SELECTED_COLOR_KEY: &str = "selectedColor";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage unavailable")]
    Unavailable,
    #[error("storage backend error: {0}")]
    Backend(String),
}

/// Text key/value store the board writes through to.
pub trait Storage {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&mut self, key: &str) -> Result<(), StorageError>;
}

#[derive(Default, Debug, Clone)]
pub struct MemoryStorage {
    entries: HashMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        self.entries.remove(key);
        Ok(())
    }
}

/// The last-selected shape type and color.
#[derive(Clone, Debug, PartialEq)]
pub struct Preferences {
    pub kind: ShapeKind,
    pub color: String,
}

impl Preferences {
    pub fn load(storage: &dyn Storage, config: &BoardConfig) -> Self {
        let kind = match storage.get(SELECTED_SHAPE_KEY) {
            Some(value) => ShapeKind::parse(&value).unwrap_or_else(|| {
                log::warn!("Ignoring unknown stored shape type {value:?}");
                config.default_kind
            }),
            None => config.default_kind,
        };
        let color = storage
            .get(SELECTED_COLOR_KEY)
            .filter(|value| !value.trim().is_empty())
            .map(|value| sanitize_color(&value))
            .unwrap_or_else(|| config.default_color.clone());
        Self { kind, color }
    }

    pub fn store_kind(storage: &mut dyn Storage, kind: ShapeKind) {
        if let Err(error) = storage.set(SELECTED_SHAPE_KEY, kind.as_str()) {
            log::warn!("Failed to store selected shape: {error}");
        }
    }

    pub fn store_color(storage: &mut dyn Storage, color: &str) {
        if let Err(error) = storage.set(SELECTED_COLOR_KEY, color) {
            log::warn!("Failed to store selected color: {error}");
        }
    }
}

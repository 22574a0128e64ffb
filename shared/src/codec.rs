use serde_json::Value;

use crate::Shape;

/// Serializes shapes as a JSON array of flat records tagged by `type`.
pub fn encode_shapes(shapes: &[Shape]) -> Result<String, serde_json::Error> {
    serde_json::to_string(shapes)
}

/// Reconstructs shapes in stored order. Never fails: an unparseable blob yields
/// an empty list and unrecognized records are skipped.
pub fn decode_shapes(text: &str) -> Vec<Shape> {
    let records = match serde_json::from_str::<Vec<Value>>(text) {
        Ok(records) => records,
        Err(error) => {
            log::warn!("Discarding unreadable shape blob: {error}");
            return Vec::new();
        }
    };
    decode_records(records)
}

pub(crate) fn decode_records(records: Vec<Value>) -> Vec<Shape> {
    let mut shapes = Vec::with_capacity(records.len());
    for (index, record) in records.into_iter().enumerate() {
        let tag = record
            .get("type")
            .and_then(Value::as_str)
            .unwrap_or("<missing>")
            .to_string();
        match serde_json::from_value::<Shape>(record) {
            Ok(shape) => shapes.push(shape),
            Err(error) => log::warn!("Skipping shape record {index} (type {tag}): {error}"),
        }
    }
    shapes
}

use bincode::error::EncodeError;
use bincode::{Decode, Encode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::codec::decode_records;
use crate::Shape;

pub const BOARD_FILE_MAGIC: [u8; 4] = *b"SHBD";
pub const BOARD_FILE_VERSION: u32 = 1;
const BOARD_HEADER_LEN: usize = BOARD_FILE_MAGIC.len() + std::mem::size_of::<u32>();

#[derive(Clone, Debug, Default, PartialEq, Encode, Decode)]
pub struct BoardFileData {
    pub shapes: Vec<Shape>,
}

#[derive(Debug, Error, PartialEq)]
pub enum BoardFileDecodeError {
    #[error("unsupported board file version {0}")]
    UnsupportedVersion(u32),
    #[error("invalid board file data")]
    InvalidData,
}

/// JSON save format. `shapes` holds the same flat records as the storage blob.
#[derive(Serialize, Deserialize)]
pub struct SaveData {
    pub version: u8,
    pub shapes: Vec<Value>,
}

/// Header followed by the bincode body. Fails rather than emit a header-only file.
pub fn encode_board_file(data: &BoardFileData) -> Result<Vec<u8>, EncodeError> {
    let body = bincode::encode_to_vec(data, bincode::config::standard())?;
    let mut payload = Vec::with_capacity(BOARD_HEADER_LEN + body.len());
    payload.extend_from_slice(&BOARD_FILE_MAGIC);
    payload.extend_from_slice(&BOARD_FILE_VERSION.to_le_bytes());
    payload.extend_from_slice(&body);
    Ok(payload)
}

pub fn decode_board_file(payload: &[u8]) -> Result<BoardFileData, BoardFileDecodeError> {
    if !(payload.len() >= BOARD_HEADER_LEN && payload.starts_with(&BOARD_FILE_MAGIC)) {
        return Err(BoardFileDecodeError::InvalidData);
    }
    let version = u32::from_le_bytes(
        payload[BOARD_FILE_MAGIC.len()..BOARD_HEADER_LEN]
            .try_into()
            .map_err(|_| BoardFileDecodeError::InvalidData)?,
    );
    let body = &payload[BOARD_HEADER_LEN..];
    match version {
        1 => bincode::decode_from_slice(body, bincode::config::standard())
            .map(|(data, _)| data)
            .map_err(|_| BoardFileDecodeError::InvalidData),
        _ => Err(BoardFileDecodeError::UnsupportedVersion(version)),
    }
}

pub fn encode_save_json(shapes: &[Shape]) -> Result<String, serde_json::Error> {
    let records = shapes
        .iter()
        .map(serde_json::to_value)
        .collect::<Result<Vec<_>, _>>()?;
    serde_json::to_string(&SaveData {
        version: 1,
        shapes: records,
    })
}

/// Reads a loaded file: binary board file first, then the JSON forms.
pub fn parse_load_payload_bytes(bytes: &[u8]) -> Option<Vec<Shape>> {
    match decode_board_file(bytes) {
        Ok(BoardFileData { shapes }) => return Some(shapes),
        Err(BoardFileDecodeError::UnsupportedVersion(version)) => {
            log::warn!("Board file version {version} is not supported");
            return None;
        }
        Err(BoardFileDecodeError::InvalidData) => {}
    }
    let text = std::str::from_utf8(bytes).ok()?;
    parse_load_payload_text(text)
}

pub fn parse_load_payload_text(text: &str) -> Option<Vec<Shape>> {
    let text = text.trim_start_matches('\u{feff}').trim();
    if let Ok(data) = serde_json::from_str::<SaveData>(text) {
        if data.version != 1 {
            log::warn!("Loading save data with unexpected version {}", data.version);
        }
        return Some(decode_records(data.shapes));
    }
    match serde_json::from_str::<Vec<Value>>(text) {
        Ok(records) => Some(decode_records(records)),
        Err(error) => {
            log::warn!("Unreadable board file: {error}");
            None
        }
    }
}

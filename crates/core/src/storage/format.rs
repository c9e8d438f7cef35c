use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::errors::CoreError;

/// Current document format version.
pub const CURRENT_VERSION: u16 = 1;

/// Every stored document is wrapped in this envelope:
///
/// ```text
/// { "format_version": 1, "payload": <document> }
/// ```
#[derive(Serialize)]
struct Envelope<'a, T> {
    format_version: u16,
    payload: &'a T,
}

#[derive(Deserialize)]
struct RawEnvelope {
    format_version: u16,
    payload: serde_json::Value,
}

/// Serialize `payload` into a versioned JSON document.
pub fn write_document<T: Serialize>(payload: &T) -> Result<Vec<u8>, CoreError> {
    let envelope = Envelope {
        format_version: CURRENT_VERSION,
        payload,
    };
    serde_json::to_vec_pretty(&envelope)
        .map_err(|e| CoreError::Serialization(format!("Failed to serialize document: {e}")))
}

/// Parse a versioned JSON document.
///
/// Rejects data that is not an envelope, envelopes of an unknown version,
/// and payloads that do not match `T`.
pub fn read_document<T: DeserializeOwned>(data: &[u8]) -> Result<T, CoreError> {
    let raw: RawEnvelope = serde_json::from_slice(data)
        .map_err(|e| CoreError::InvalidFileFormat(format!("Not a document envelope: {e}")))?;

    if raw.format_version == 0 || raw.format_version > CURRENT_VERSION {
        return Err(CoreError::UnsupportedVersion(raw.format_version));
    }

    serde_json::from_value(raw.payload)
        .map_err(|e| CoreError::Deserialization(format!("Failed to decode payload: {e}")))
}

//! JSON helpers for collection documents.

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::ser::{PrettyFormatter, Serializer};

/// Error type for serialization operations.
#[derive(Debug, thiserror::Error)]
pub enum SerializationError {
    /// JSON serialization failed.
    #[error("JSON serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),

    /// JSON deserialization failed.
    #[error("JSON deserialization failed: {0}")]
    Deserialize(serde_json::Error),

    /// UTF-8 encoding error.
    #[error("UTF-8 encoding error: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Serializes a collection document the way the collection service writes
/// it: 2-space indentation, non-ASCII kept as is, trailing newline.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn to_json_document<T: Serialize>(value: &T) -> Result<String, SerializationError> {
    let mut buffer = Vec::new();
    let formatter = PrettyFormatter::with_indent(b"  ");
    let mut serializer = Serializer::with_formatter(&mut buffer, formatter);
    value.serialize(&mut serializer)?;

    let mut json = String::from_utf8(buffer)?;
    json.push('\n');
    Ok(json)
}

/// Deserializes JSON from bytes.
///
/// # Errors
///
/// Returns an error if the JSON is invalid or doesn't match the expected type.
pub fn from_json_bytes<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, SerializationError> {
    serde_json::from_slice(bytes).map_err(SerializationError::Deserialize)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_document_layout() {
        let json = to_json_document(&json!({"name": "Café"})).unwrap();
        assert_eq!(json, "{\n  \"name\": \"Café\"\n}\n");
    }

    #[test]
    fn test_from_json_bytes_reports_bad_input() {
        let result: Result<serde_json::Value, _> = from_json_bytes(b"{nope");
        assert!(matches!(result, Err(SerializationError::Deserialize(_))));
    }
}

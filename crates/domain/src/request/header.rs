//! HTTP Header types

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{DomainError, DomainResult};

/// A single request header as stored in a collection document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    /// The header name (e.g., "Content-Type")
    pub key: String,
    /// The header value, may contain `{{variables}}`
    #[serde(default)]
    pub value: String,
    /// Value type hint (usually "text")
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub header_type: Option<String>,
    /// `disabled`, `description` and other fields, kept for round trips.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Header {
    /// Creates a new text header.
    #[must_use]
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
            header_type: Some("text".to_string()),
            extra: Map::new(),
        }
    }
}

/// Parses the header text typed into the editor.
///
/// The text must be a JSON array whose elements are objects with a string
/// `key` and an optional string `value` / `type`. Blank text means "no headers".
///
/// # Errors
///
/// Returns [`DomainError::InvalidHeaders`] when the text is not such an array.
pub fn parse_header_text(text: &str) -> DomainResult<Vec<Header>> {
    if text.trim().is_empty() {
        return Ok(Vec::new());
    }

    let value: serde_json::Value =
        serde_json::from_str(text).map_err(|e| DomainError::InvalidHeaders(e.to_string()))?;

    let Some(entries) = value.as_array() else {
        return Err(DomainError::InvalidHeaders(
            "headers must be a JSON array".to_string(),
        ));
    };

    entries
        .iter()
        .enumerate()
        .map(|(index, entry)| {
            serde_json::from_value::<Header>(entry.clone())
                .map_err(|e| DomainError::InvalidHeaders(format!("entry {index}: {e}")))
        })
        .collect()
}

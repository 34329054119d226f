//! HTTP Request body types

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Request body as carried by a collection document.
///
/// Only `mode`, `raw` and `options` are interpreted; form data, file and
/// graphql payloads ride along in `extra` untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestBody {
    /// Body mode ("raw", "urlencoded", "formdata", "file", "graphql")
    pub mode: String,
    /// Raw text. Free text; it is not required to be JSON.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw: Option<String>,
    /// Mode options, e.g. `{"raw": {"language": "json"}}`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Value>,
    /// Fields not interpreted by the editor.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl RequestBody {
    /// Creates a raw body tagged as JSON.
    #[must_use]
    pub fn raw_json(raw: impl Into<String>) -> Self {
        Self {
            mode: "raw".to_string(),
            raw: Some(raw.into()),
            options: Some(serde_json::json!({ "raw": { "language": "json" } })),
            extra: Map::new(),
        }
    }

    /// Creates a raw body without a language hint.
    #[must_use]
    pub fn raw_text(raw: impl Into<String>) -> Self {
        Self {
            mode: "raw".to_string(),
            raw: Some(raw.into()),
            options: None,
            extra: Map::new(),
        }
    }

    /// Parses the raw text as JSON, if there is any and it is valid.
    #[must_use]
    pub fn json_template(&self) -> Option<Value> {
        self.raw
            .as_deref()
            .filter(|raw| !raw.trim().is_empty())
            .and_then(|raw| serde_json::from_str(raw).ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_json_template() {
        let body = RequestBody::raw_json(r#"{"name": "x"}"#);
        assert_eq!(body.json_template(), Some(serde_json::json!({"name": "x"})));
    }

    #[test]
    fn test_free_text_has_no_template() {
        let body = RequestBody::raw_text("name={{name}}");
        assert_eq!(body.json_template(), None);
    }
}

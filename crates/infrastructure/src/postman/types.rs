//! Postman Collection v2.1 wire types.
//!
//! Only the fields the editor interprets are typed. Everything else is kept
//! in `extra` maps so that a load → save cycle writes it back unchanged.
//! All types use `#[serde(default)]` to accept the format's many variations.

#![allow(missing_docs)]

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Root structure for Postman Collection v2.1
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostmanCollection {
    pub info: PostmanInfo,
    #[serde(default)]
    pub item: Vec<PostmanItem>,
    /// Collection variables, auth, events...
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Collection metadata
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PostmanInfo {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "_postman_id", default, skip_serializing_if = "Option::is_none")]
    pub postman_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// An item is a folder (`item` present) or a request (`request` present)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostmanItem {
    #[serde(default)]
    pub name: String,
    /// Plain string or a `{content, type}` object
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item: Option<Vec<Self>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request: Option<PostmanRequest>,
    /// Saved example responses
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<Vec<PostmanResponse>>,
    /// id, event, auth, protocolProfileBehavior...
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PostmanItem {
    /// Returns true if this item is a folder (has sub-items)
    #[must_use]
    pub const fn is_folder(&self) -> bool {
        self.item.is_some()
    }

    /// Returns true if this item is a request
    #[must_use]
    pub const fn is_request(&self) -> bool {
        self.request.is_some()
    }
}

/// Postman Request definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostmanRequest {
    #[serde(default)]
    pub method: String,
    #[serde(default)]
    pub url: PostmanUrl,
    #[serde(default)]
    pub header: Vec<PostmanHeader>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<PostmanBody>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth: Option<PostmanAuth>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// URL can be either a simple string or a structured object
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PostmanUrl {
    Simple(String),
    /// `raw` plus host, path, query, variable...
    Structured(Map<String, Value>),
}

impl Default for PostmanUrl {
    fn default() -> Self {
        Self::Simple(String::new())
    }
}

impl PostmanUrl {
    /// Get the raw URL string
    #[must_use]
    pub fn raw(&self) -> String {
        match self {
            Self::Simple(s) => s.clone(),
            Self::Structured(parts) => parts
                .get("raw")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
        }
    }
}

/// Request header
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostmanHeader {
    pub key: String,
    #[serde(default)]
    pub value: String,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub header_type: Option<String>,
    /// disabled, description...
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Request body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostmanBody {
    #[serde(default)]
    pub mode: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Value>,
    /// urlencoded, formdata, file, graphql...
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Authentication configuration: the scheme name plus one parameter list
/// keyed by that name (`{"type": "bearer", "bearer": [...]}`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostmanAuth {
    #[serde(rename = "type")]
    pub auth_type: String,
    #[serde(flatten)]
    pub params: Map<String, Value>,
}

/// Auth parameter (key-value pair)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostmanAuthParam {
    pub key: String,
    #[serde(default)]
    pub value: Value,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub param_type: Option<String>,
}

/// Saved example response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostmanResponse {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    /// status, header, originalRequest, cookie...
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

//! Request leaf of a collection tree.

mod auth;
mod body;
mod header;
mod method;

pub use auth::{ApiKeyLocation, Auth, AuthParam};
pub use body::RequestBody;
pub use header::{Header, parse_header_text};
pub use method::HttpMethod;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A saved example response attached to a request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleResponse {
    /// Example name.
    #[serde(default)]
    pub name: String,
    /// HTTP status code, when recorded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<u16>,
    /// Response body text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    /// Status text, headers, original request and anything else.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SampleResponse {
    /// Parses the body as JSON, for use as an attribute extraction sample.
    #[must_use]
    pub fn json_body(&self) -> Option<Value> {
        self.body
            .as_deref()
            .and_then(|body| serde_json::from_str(body).ok())
    }
}

/// A request leaf.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
    /// Human-readable request name.
    pub name: String,
    /// HTTP method.
    pub method: HttpMethod,
    /// Raw URL. May contain `{{variables}}`.
    pub url: String,
    /// Structured URL parts (host, path, query...) other than `raw`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url_parts: Option<Map<String, Value>>,
    /// Ordered headers.
    #[serde(default)]
    pub headers: Vec<Header>,
    /// Request-specific authentication.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth: Option<Auth>,
    /// Request body.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<RequestBody>,
    /// Free-form description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Saved example responses, in document order.
    #[serde(default)]
    pub responses: Vec<SampleResponse>,
    /// Item-level document fields the editor does not interpret (events, ids...).
    #[serde(default)]
    pub extra: Map<String, Value>,
    /// Request-object fields the editor does not interpret.
    #[serde(default)]
    pub request_extra: Map<String, Value>,
}

impl Request {
    /// Creates a request with no headers, body or auth.
    #[must_use]
    pub fn new(name: impl Into<String>, method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            method,
            url: url.into(),
            url_parts: None,
            headers: Vec::new(),
            auth: None,
            body: None,
            description: None,
            responses: Vec::new(),
            extra: Map::new(),
            request_extra: Map::new(),
        }
    }

    /// Adds a header to the request.
    #[must_use]
    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push(Header::new(key, value));
        self
    }

    /// Sets the request body.
    #[must_use]
    pub fn with_body(mut self, body: RequestBody) -> Self {
        self.body = Some(body);
        self
    }

    /// Adds a saved example response.
    #[must_use]
    pub fn with_response(mut self, response: SampleResponse) -> Self {
        self.responses.push(response);
        self
    }

    /// Replaces the URL. Structured parts are dropped when the URL changes so
    /// the stored document never carries parts that disagree with `raw`.
    pub fn set_url(&mut self, url: impl Into<String>) {
        let url = url.into();
        if url != self.url {
            self.url_parts = None;
            self.url = url;
        }
    }

    /// Removes document metadata that identifies this particular item, so a
    /// copy does not claim the identity of its source.
    pub fn strip_identity(&mut self) {
        self.extra
            .retain(|key, _| key != "id" && !key.starts_with('_'));
        self.request_extra
            .retain(|key, _| key != "id" && !key.starts_with('_'));
    }

    /// Returns the first example response whose body parses as JSON.
    #[must_use]
    pub fn sample_body(&self) -> Option<Value> {
        self.responses.iter().find_map(SampleResponse::json_body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_set_url_drops_stale_parts() {
        let mut request = Request::new("ping", HttpMethod::Get, "{{baseUrl}}/ping");
        let mut parts = Map::new();
        parts.insert("path".into(), json!(["ping"]));
        request.url_parts = Some(parts);

        request.set_url("{{baseUrl}}/ping");
        assert!(request.url_parts.is_some());

        request.set_url("{{baseUrl}}/health");
        assert_eq!(request.url, "{{baseUrl}}/health");
        assert!(request.url_parts.is_none());
    }

    #[test]
    fn test_strip_identity() {
        let mut request = Request::new("ping", HttpMethod::Get, "/ping");
        request.extra.insert("id".into(), json!("abc"));
        request.extra.insert("_postman_id".into(), json!("def"));
        request.extra.insert("event".into(), json!([]));

        request.strip_identity();

        assert_eq!(request.extra.keys().collect::<Vec<_>>(), vec!["event"]);
    }

    #[test]
    fn test_sample_body_skips_non_json() {
        let request = Request::new("list", HttpMethod::Get, "/items")
            .with_response(SampleResponse {
                name: "text".into(),
                code: Some(200),
                body: Some("OK".into()),
                extra: Map::new(),
            })
            .with_response(SampleResponse {
                name: "json".into(),
                code: Some(200),
                body: Some(r#"{"id": 1}"#.into()),
                extra: Map::new(),
            });

        assert_eq!(request.sample_body(), Some(json!({"id": 1})));
    }
}

//! Collection service client using reqwest.
//!
//! This adapter implements both the `CollectionStore` and the
//! `GenerationService` ports against the collection service's JSON API.

use std::collections::BTreeMap;

use postgen_application::ports::{CollectionStore, GenerationService, StoreError};
use postgen_domain::collection::{CollectionTree, Node};
use postgen_domain::generation::{
    AttributeType, ConditionKey, ExtractedAttribute, GenerationOutcome, GenerationRequest,
};
use reqwest::{Client, Method, RequestBuilder, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::config::{ConfigError, PostgenConfig};
use crate::postman::{
    PostmanCollection, PostmanInfo, PostmanItem, collection_to_wire, items_from_wire,
    tree_from_wire,
};

/// HTTP client for the collection service.
///
/// Cloning is cheap and shares the connection pool.
#[derive(Debug, Clone)]
pub struct ReqwestCollectionStore {
    client: Client,
    base_url: Url,
}

#[derive(Deserialize)]
struct FullCollectionPayload {
    #[serde(default)]
    collection_info: PostmanInfo,
    #[serde(default)]
    items: Vec<PostmanItem>,
}

#[derive(Deserialize)]
struct FilteredRequestsPayload {
    #[serde(default)]
    items: Vec<PostmanItem>,
}

#[derive(Serialize)]
struct UpdateCollectionPayload {
    collection: PostmanCollection,
}

#[derive(Deserialize)]
struct ConditionKeysPayload {
    #[serde(default)]
    keys: Vec<Option<String>>,
}

#[derive(Deserialize)]
struct AttributesPayload {
    #[serde(default)]
    attributes: BTreeMap<String, AttributePayload>,
}

#[derive(Deserialize)]
struct AttributePayload {
    #[serde(default, rename = "type")]
    type_name: Option<String>,
    #[serde(default)]
    format: Option<String>,
    #[serde(default)]
    nullable: Option<bool>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    path: Option<String>,
    #[serde(default)]
    value: Option<Value>,
}

impl ReqwestCollectionStore {
    /// Creates a client for the service configured in `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is invalid or the client cannot be built.
    pub fn new(config: &PostgenConfig) -> Result<Self, ConfigError> {
        let base_url = config.base_url()?;
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.timeout())
            .build()
            .map_err(|e| ConfigError::HttpClient(e.to_string()))?;

        Ok(Self { client, base_url })
    }

    /// Creates a store with a custom reqwest client.
    #[must_use]
    pub const fn with_client(client: Client, base_url: Url) -> Self {
        Self { client, base_url }
    }

    /// Appends path segments to the base URL, percent-encoding each one.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, StoreError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| StoreError::Transport(format!("invalid base URL {}", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, segments: &[&str]) -> Result<RequestBuilder, StoreError> {
        Ok(self.client.request(method, self.endpoint(segments)?))
    }

    /// Sends a request and decodes a JSON success body.
    async fn send_json<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, StoreError> {
        let response = builder.send().await.map_err(Self::map_error)?;
        let status = response.status();
        let body = response.bytes().await.map_err(Self::map_error)?;

        if !status.is_success() {
            tracing::debug!(status = status.as_u16(), "collection service returned an error");
            return Err(StoreError::Http {
                status: status.as_u16(),
                message: error_detail(&body),
            });
        }

        serde_json::from_slice(&body).map_err(|e| StoreError::Decode(e.to_string()))
    }

    /// Maps reqwest errors to `StoreError`.
    fn map_error(error: reqwest::Error) -> StoreError {
        if error.is_timeout() {
            return StoreError::Transport("request timed out".to_string());
        }
        if error.is_decode() {
            return StoreError::Decode(error.to_string());
        }
        StoreError::Transport(error.to_string())
    }
}

/// Pulls the `detail` message out of an error body. The service sends either
/// a plain string or a list of validation errors; anything else is returned
/// as raw text.
fn error_detail(body: &[u8]) -> String {
    let Ok(value) = serde_json::from_slice::<Value>(body) else {
        return String::from_utf8_lossy(body).trim().to_string();
    };
    match value.get("detail") {
        Some(Value::String(detail)) => detail.clone(),
        Some(Value::Array(errors)) => errors
            .iter()
            .filter_map(|e| e.get("msg").and_then(Value::as_str))
            .collect::<Vec<_>>()
            .join("; "),
        Some(other) => other.to_string(),
        None => value.to_string(),
    }
}

fn attributes_from_payload(payload: AttributesPayload) -> Vec<ExtractedAttribute> {
    payload
        .attributes
        .into_iter()
        .map(|(key, attribute)| {
            let declared = AttributeType::from_schema(
                attribute.type_name.as_deref().unwrap_or("string"),
                attribute.format.as_deref(),
            );
            let (attr_type, sampled_null) = match &attribute.value {
                Some(value) => AttributeType::infer(value),
                None => (declared, false),
            };
            let source_name = attribute.name.filter(|name| *name != key);
            let mut extracted =
                ExtractedAttribute::new(attribute.path.unwrap_or(key), attr_type);
            extracted.nullable = attribute.nullable.unwrap_or(sampled_null);
            extracted.source_name = source_name;
            extracted
        })
        .collect()
}

impl CollectionStore for ReqwestCollectionStore {
    async fn full_collection(&self, collection_id: &str) -> Result<CollectionTree, StoreError> {
        let builder = self.request(Method::GET, &["collections", collection_id, "full"])?;
        let payload: FullCollectionPayload = self.send_json(builder).await?;
        tree_from_wire(PostmanCollection {
            info: payload.collection_info,
            item: payload.items,
            extra: Map::new(),
        })
        .map_err(|e| StoreError::Decode(e.to_string()))
    }

    async fn filtered_requests(&self, collection_id: &str) -> Result<Vec<Node>, StoreError> {
        let builder = self.request(Method::GET, &["collections", collection_id, "requests"])?;
        let payload: FilteredRequestsPayload = self.send_json(builder).await?;
        items_from_wire(payload.items).map_err(|e| StoreError::Decode(e.to_string()))
    }

    async fn save_collection(
        &self,
        collection_id: &str,
        tree: &CollectionTree,
    ) -> Result<(), StoreError> {
        let payload = UpdateCollectionPayload {
            collection: collection_to_wire(tree),
        };
        let builder = self
            .request(Method::PUT, &["collections", collection_id])?
            .json(&payload);
        let _: Value = self.send_json(builder).await?;
        Ok(())
    }
}

impl GenerationService for ReqwestCollectionStore {
    async fn extract_attributes(&self, sample: &Value) -> Result<Vec<ExtractedAttribute>, StoreError> {
        let builder = self
            .request(Method::POST, &["collections", "extract-attributes"])?
            .json(sample);
        let payload: AttributesPayload = self.send_json(builder).await?;
        Ok(attributes_from_payload(payload))
    }

    async fn condition_keys(&self, data_type: &str) -> Result<Vec<ConditionKey>, StoreError> {
        let builder = self.request(Method::GET, &["filtering-conditions", "keys", data_type])?;
        let payload: ConditionKeysPayload = self.send_json(builder).await?;
        Ok(payload
            .keys
            .into_iter()
            .flatten()
            .filter(|key| !key.trim().is_empty())
            .map(ConditionKey::new)
            .collect())
    }

    async fn generate_filtered_requests(
        &self,
        request: &GenerationRequest,
    ) -> Result<GenerationOutcome, StoreError> {
        let builder = self
            .request(Method::POST, &["collections", "generate-filtered"])?
            .json(request);
        self.send_json(builder).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serves a single canned response and hands back the raw request text.
    async fn serve_once(
        status: &'static str,
        body: String,
    ) -> (Url, tokio::task::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut received = Vec::new();
            let mut buf = [0u8; 4096];
            loop {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                received.extend_from_slice(&buf[..n]);
                let text = String::from_utf8_lossy(&received);
                if let Some(split) = text.find("\r\n\r\n") {
                    let length = text[..split]
                        .lines()
                        .find_map(|line| {
                            let (name, value) = line.split_once(':')?;
                            name.eq_ignore_ascii_case("content-length")
                                .then(|| value.trim().parse::<usize>().ok())
                                .flatten()
                        })
                        .unwrap_or(0);
                    if received.len() >= split + 4 + length {
                        break;
                    }
                }
            }
            let response = format!(
                "HTTP/1.1 {status}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
            String::from_utf8_lossy(&received).into_owned()
        });
        let url = Url::parse(&format!("http://{addr}/api")).unwrap();
        (url, handle)
    }

    fn store(base_url: Url) -> ReqwestCollectionStore {
        ReqwestCollectionStore::with_client(Client::new(), base_url)
    }

    #[test]
    fn test_endpoint_encodes_segments() {
        let store = store(Url::parse("http://localhost:8000/api/").unwrap());
        let url = store
            .endpoint(&["collections", "pet store", "full"])
            .unwrap();
        assert_eq!(url.as_str(), "http://localhost:8000/api/collections/pet%20store/full");
    }

    #[test]
    fn test_error_detail_variants() {
        assert_eq!(error_detail(br#"{"detail": "Collection not found"}"#), "Collection not found");
        assert_eq!(
            error_detail(br#"{"detail": [{"msg": "field required"}, {"msg": "bad type"}]}"#),
            "field required; bad type"
        );
        assert_eq!(error_detail(b"Internal Server Error\n"), "Internal Server Error");
    }

    #[test]
    fn test_attributes_from_schema_payload() {
        let payload: AttributesPayload = serde_json::from_value(json!({
            "attributes": {
                "createdAt": {"name": "createdAt", "type": "string", "format": "date-time", "nullable": true, "path": "createdAt"},
                "id": {"name": "identifier", "type": "integer", "path": "id"}
            },
            "count": 2,
            "format": "schema"
        }))
        .unwrap();

        let attributes = attributes_from_payload(payload);
        assert_eq!(attributes.len(), 2);
        assert_eq!(attributes[0].path, "createdAt");
        assert_eq!(attributes[0].attr_type, AttributeType::Datetime);
        assert!(attributes[0].nullable);
        assert_eq!(attributes[0].source_name, None);
        assert_eq!(attributes[1].attr_type, AttributeType::Integer);
        assert_eq!(attributes[1].source_name.as_deref(), Some("identifier"));
    }

    #[test]
    fn test_attributes_from_data_payload_use_sample_value() {
        let payload: AttributesPayload = serde_json::from_value(json!({
            "attributes": {
                "user.age": {"value": 42, "type": "number", "path": "user.age"},
                "user.born": {"value": "1990-04-01", "type": "string", "path": "user.born"}
            },
            "format": "data"
        }))
        .unwrap();

        let attributes = attributes_from_payload(payload);
        assert_eq!(attributes[0].attr_type, AttributeType::Integer);
        assert_eq!(attributes[1].attr_type, AttributeType::Date);
    }

    #[tokio::test]
    async fn test_full_collection_decodes_tree() {
        let body = json!({
            "collection_id": "petstore",
            "collection_info": {"name": "Petstore", "schema": "https://schema.getpostman.com/json/collection/v2.1.0/collection.json"},
            "items": [
                {"name": "Pets", "item": [
                    {"name": "list pets", "request": {"method": "GET", "url": "{{baseUrl}}/pets"}}
                ]}
            ]
        });
        let (url, server) = serve_once("200 OK", body.to_string()).await;

        let tree = store(url).full_collection("petstore").await.unwrap();
        let request = server.await.unwrap();

        assert!(request.starts_with("GET /api/collections/petstore/full "));
        assert_eq!(tree.info.name, "Petstore");
        assert_eq!(tree.items.len(), 1);
        assert_eq!(tree.items[0].name(), "Pets");
    }

    #[tokio::test]
    async fn test_save_sends_collection_envelope() {
        let (url, server) = serve_once(
            "200 OK",
            json!({"message": "Collection updated successfully", "collection_id": "petstore"})
                .to_string(),
        )
        .await;
        let mut tree = CollectionTree::default();
        tree.info.name = "Petstore".into();

        store(url).save_collection("petstore", &tree).await.unwrap();
        let request = server.await.unwrap();

        assert!(request.starts_with("PUT /api/collections/petstore "));
        let body = &request[request.find("\r\n\r\n").unwrap() + 4..];
        let sent: Value = serde_json::from_str(body).unwrap();
        assert_eq!(sent["collection"]["info"]["name"], "Petstore");
        assert_eq!(sent["collection"]["item"], json!([]));
    }

    #[tokio::test]
    async fn test_error_status_surfaces_detail() {
        let (url, server) = serve_once(
            "404 Not Found",
            json!({"detail": "Collection not found"}).to_string(),
        )
        .await;

        let error = store(url).filtered_requests("missing").await.unwrap_err();
        server.await.unwrap();

        assert!(matches!(error, StoreError::Http { status: 404, .. }));
        assert_eq!(error.message(), "Collection not found");
    }

    #[tokio::test]
    async fn test_condition_keys_skip_blank_entries() {
        let (url, server) = serve_once(
            "200 OK",
            json!({"keys": ["EQUALS", null, "", "CONTAINS"], "dataType": "string", "count": 4})
                .to_string(),
        )
        .await;

        let keys = store(url).condition_keys("string").await.unwrap();
        let request = server.await.unwrap();

        assert!(request.starts_with("GET /api/filtering-conditions/keys/string "));
        assert_eq!(keys, vec![ConditionKey::new("EQUALS"), ConditionKey::new("CONTAINS")]);
    }

    #[tokio::test]
    async fn test_unreachable_service_is_transport_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let url = Url::parse(&format!("http://{addr}/api")).unwrap();
        let error = store(url).full_collection("petstore").await.unwrap_err();

        assert!(matches!(error, StoreError::Transport(_)));
        assert_eq!(error.message(), "could not reach the collection service");
    }
}

//! Conversion between Postman wire types and the domain tree.

use postgen_domain::collection::{CollectionInfo, CollectionTree, Folder, Node};
use postgen_domain::request::{
    ApiKeyLocation, Auth, AuthParam, Header, HttpMethod, Request, RequestBody, SampleResponse,
};
use postgen_domain::{DomainError, DomainResult};
use serde_json::{Map, Value};

use super::types::{
    PostmanAuth, PostmanAuthParam, PostmanBody, PostmanCollection, PostmanHeader, PostmanInfo,
    PostmanItem, PostmanRequest, PostmanResponse, PostmanUrl,
};

/// Converts a wire collection into the domain tree.
///
/// # Errors
///
/// Returns an error for an unknown method or an item that is neither a
/// folder nor a request.
pub fn tree_from_wire(collection: PostmanCollection) -> DomainResult<CollectionTree> {
    Ok(CollectionTree {
        info: info_from_wire(collection.info),
        items: items_from_wire(collection.item)?,
        extra: collection.extra,
    })
}

/// Converts a list of wire items.
///
/// # Errors
///
/// Same as [`tree_from_wire`].
pub fn items_from_wire(items: Vec<PostmanItem>) -> DomainResult<Vec<Node>> {
    items.into_iter().map(item_from_wire).collect()
}

/// Converts the domain tree into a wire collection.
#[must_use]
pub fn collection_to_wire(tree: &CollectionTree) -> PostmanCollection {
    PostmanCollection {
        info: info_to_wire(&tree.info),
        item: items_to_wire(&tree.items),
        extra: tree.extra.clone(),
    }
}

/// Converts domain nodes into wire items.
#[must_use]
pub fn items_to_wire(items: &[Node]) -> Vec<PostmanItem> {
    items.iter().map(item_to_wire).collect()
}

fn info_from_wire(info: PostmanInfo) -> CollectionInfo {
    let mut extra = info.extra;
    CollectionInfo {
        name: info.name,
        postman_id: info.postman_id,
        description: split_description(info.description, &mut extra),
        schema: info.schema,
        extra,
    }
}

fn info_to_wire(info: &CollectionInfo) -> PostmanInfo {
    let mut extra = info.extra.clone();
    PostmanInfo {
        name: info.name.clone(),
        postman_id: info.postman_id.clone(),
        description: join_description(info.description.as_ref(), &mut extra),
        schema: info.schema.clone(),
        extra,
    }
}

/// Plain-text descriptions map onto the domain field; structured ones are
/// carried in `extra` untouched.
fn split_description(description: Option<Value>, extra: &mut Map<String, Value>) -> Option<String> {
    match description {
        Some(Value::String(text)) => Some(text),
        Some(other) => {
            extra.insert("description".to_string(), other);
            None
        }
        None => None,
    }
}

fn join_description(description: Option<&String>, extra: &mut Map<String, Value>) -> Option<Value> {
    let carried = extra.remove("description");
    description.cloned().map(Value::String).or(carried)
}

fn item_from_wire(item: PostmanItem) -> DomainResult<Node> {
    let PostmanItem {
        name,
        description,
        item: children,
        request,
        response,
        mut extra,
    } = item;

    if let Some(request) = request {
        if let Some(description) = description {
            extra.insert("description".to_string(), description);
        }
        let responses = response.unwrap_or_default();
        return request_from_wire(name, request, responses, extra).map(Node::Request);
    }

    let Some(children) = children else {
        return Err(DomainError::InvalidCollectionItem(format!(
            "`{name}` has neither sub-items nor a request"
        )));
    };
    Ok(Node::Folder(Folder {
        name,
        description: split_description(description, &mut extra),
        items: items_from_wire(children)?,
        extra,
    }))
}

fn item_to_wire(node: &Node) -> PostmanItem {
    match node {
        Node::Folder(folder) => {
            let mut extra = folder.extra.clone();
            PostmanItem {
                name: folder.name.clone(),
                description: join_description(folder.description.as_ref(), &mut extra),
                item: Some(items_to_wire(&folder.items)),
                request: None,
                response: None,
                extra,
            }
        }
        Node::Request(request) => {
            let mut extra = request.extra.clone();
            let description = extra.remove("description");
            PostmanItem {
                name: request.name.clone(),
                description,
                item: None,
                request: Some(request_to_wire(request)),
                response: Some(request.responses.iter().map(response_to_wire).collect()),
                extra,
            }
        }
    }
}

fn request_from_wire(
    name: String,
    request: PostmanRequest,
    responses: Vec<PostmanResponse>,
    extra: Map<String, Value>,
) -> DomainResult<Request> {
    let PostmanRequest {
        method,
        url,
        header,
        body,
        auth,
        description,
        extra: mut request_extra,
    } = request;

    let method = if method.trim().is_empty() {
        HttpMethod::Get
    } else {
        method.parse::<HttpMethod>()?
    };
    let (url, url_parts) = match url {
        PostmanUrl::Simple(raw) => (raw, None),
        PostmanUrl::Structured(mut parts) => {
            let raw = match parts.remove("raw") {
                Some(Value::String(raw)) => raw,
                _ => String::new(),
            };
            (raw, Some(parts))
        }
    };

    Ok(Request {
        name,
        method,
        url,
        url_parts,
        headers: header
            .into_iter()
            .map(|h| Header {
                key: h.key,
                value: h.value,
                header_type: h.header_type,
                extra: h.extra,
            })
            .collect(),
        auth: auth.map(auth_from_wire),
        body: body.map(|b| RequestBody {
            mode: b.mode,
            raw: b.raw,
            options: b.options,
            extra: b.extra,
        }),
        description: split_description(description, &mut request_extra),
        responses: responses
            .into_iter()
            .map(|r| SampleResponse {
                name: r.name,
                code: r.code,
                body: r.body,
                extra: r.extra,
            })
            .collect(),
        extra,
        request_extra,
    })
}

fn request_to_wire(request: &Request) -> PostmanRequest {
    let mut extra = request.request_extra.clone();
    let url = match &request.url_parts {
        Some(parts) => {
            let mut parts = parts.clone();
            parts.insert("raw".to_string(), Value::String(request.url.clone()));
            PostmanUrl::Structured(parts)
        }
        None => PostmanUrl::Simple(request.url.clone()),
    };

    PostmanRequest {
        method: request.method.as_str().to_string(),
        url,
        header: request
            .headers
            .iter()
            .map(|h| PostmanHeader {
                key: h.key.clone(),
                value: h.value.clone(),
                header_type: h.header_type.clone(),
                extra: h.extra.clone(),
            })
            .collect(),
        body: request.body.as_ref().map(|b| PostmanBody {
            mode: b.mode.clone(),
            raw: b.raw.clone(),
            options: b.options.clone(),
            extra: b.extra.clone(),
        }),
        auth: request.auth.as_ref().map(auth_to_wire),
        description: join_description(request.description.as_ref(), &mut extra),
        extra,
    }
}

fn response_to_wire(response: &SampleResponse) -> PostmanResponse {
    PostmanResponse {
        name: response.name.clone(),
        code: response.code,
        body: response.body.clone(),
        extra: response.extra.clone(),
    }
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn auth_from_wire(auth: PostmanAuth) -> Auth {
    let params: Vec<PostmanAuthParam> = auth
        .params
        .get(&auth.auth_type)
        .cloned()
        .and_then(|list| serde_json::from_value(list).ok())
        .unwrap_or_default();
    let text = |key: &str| {
        params
            .iter()
            .find(|p| p.key == key)
            .map(|p| value_text(&p.value))
            .unwrap_or_default()
    };

    match auth.auth_type.as_str() {
        "noauth" => Auth::NoAuth,
        "bearer" => Auth::Bearer {
            token: text("token"),
        },
        "basic" => Auth::Basic {
            username: text("username"),
            password: text("password"),
        },
        "apikey" => Auth::ApiKey {
            key: text("key"),
            value: text("value"),
            location: if text("in") == "query" {
                ApiKeyLocation::Query
            } else {
                ApiKeyLocation::Header
            },
        },
        _ => Auth::Other {
            params: params
                .into_iter()
                .map(|p| AuthParam {
                    key: p.key,
                    value: p.value,
                    param_type: p.param_type,
                })
                .collect(),
            scheme: auth.auth_type,
        },
    }
}

fn string_param(key: &str, value: &str) -> Value {
    auth_param(key, Value::String(value.to_string()), Some("string"))
}

fn auth_param(key: &str, value: Value, param_type: Option<&str>) -> Value {
    let mut param = Map::new();
    param.insert("key".to_string(), Value::String(key.to_string()));
    param.insert("value".to_string(), value);
    if let Some(param_type) = param_type {
        param.insert("type".to_string(), Value::String(param_type.to_string()));
    }
    Value::Object(param)
}

fn auth_to_wire(auth: &Auth) -> PostmanAuth {
    let params = match auth {
        Auth::NoAuth => None,
        Auth::Bearer { token } => Some(vec![string_param("token", token)]),
        Auth::Basic { username, password } => Some(vec![
            string_param("username", username),
            string_param("password", password),
        ]),
        Auth::ApiKey {
            key,
            value,
            location,
        } => Some(vec![
            string_param("key", key),
            string_param("value", value),
            string_param(
                "in",
                match location {
                    ApiKeyLocation::Header => "header",
                    ApiKeyLocation::Query => "query",
                },
            ),
        ]),
        Auth::Other { params, .. } => Some(
            params
                .iter()
                .map(|p| auth_param(&p.key, p.value.clone(), p.param_type.as_deref()))
                .collect(),
        ),
    };

    let mut map = Map::new();
    if let Some(params) = params {
        map.insert(auth.scheme().to_string(), Value::Array(params));
    }
    PostmanAuth {
        auth_type: auth.scheme().to_string(),
        params: map,
    }
}

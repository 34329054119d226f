//! End-to-end editing flows against an in-memory backend.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use postgen_application::ports::{CollectionStore, GenerationService, StoreError};
use postgen_application::{ApplicationError, EditorSession, LoadState};
use postgen_domain::collection::{
    CollectionInfo, Folder, LeafAddress, Node, RequestEdit, filtered_view, locate,
};
use postgen_domain::generation::{
    AttributeType, BodyFieldMapping, ConditionKey, ConditionMode, ExtractedAttribute,
    GenerationOutcome, GenerationRequest, MappingSource, SpecialToken, extract_attributes,
};
use postgen_domain::request::{HttpMethod, Request, RequestBody, SampleResponse};
use postgen_domain::CollectionTree;
use pretty_assertions::assert_eq;
use serde_json::{Map, Value, json};

#[derive(Default)]
struct Inner {
    tree: Mutex<CollectionTree>,
    saved: Mutex<Vec<CollectionTree>>,
    fail_next_load: Mutex<Option<StoreError>>,
    fail_next_save: Mutex<Option<StoreError>>,
    keys: HashMap<String, Result<Vec<ConditionKey>, StoreError>>,
    generated: Mutex<Vec<GenerationRequest>>,
}

#[derive(Clone, Default)]
struct Backend(Arc<Inner>);

impl CollectionStore for Backend {
    async fn full_collection(&self, _collection_id: &str) -> Result<CollectionTree, StoreError> {
        Ok(self.0.tree.lock().unwrap().clone())
    }

    async fn filtered_requests(&self, _collection_id: &str) -> Result<Vec<Node>, StoreError> {
        if let Some(err) = self.0.fail_next_load.lock().unwrap().take() {
            return Err(err);
        }
        Ok(filtered_view(&self.0.tree.lock().unwrap().items))
    }

    async fn save_collection(
        &self,
        _collection_id: &str,
        tree: &CollectionTree,
    ) -> Result<(), StoreError> {
        if let Some(err) = self.0.fail_next_save.lock().unwrap().take() {
            return Err(err);
        }
        self.0.saved.lock().unwrap().push(tree.clone());
        *self.0.tree.lock().unwrap() = tree.clone();
        Ok(())
    }
}

impl GenerationService for Backend {
    async fn extract_attributes(&self, sample: &Value) -> Result<Vec<ExtractedAttribute>, StoreError> {
        Ok(extract_attributes(sample))
    }

    async fn condition_keys(&self, data_type: &str) -> Result<Vec<ConditionKey>, StoreError> {
        self.0
            .keys
            .get(data_type)
            .cloned()
            .unwrap_or_else(|| Ok(Vec::new()))
    }

    async fn generate_filtered_requests(
        &self,
        request: &GenerationRequest,
    ) -> Result<GenerationOutcome, StoreError> {
        self.0.generated.lock().unwrap().push(request.clone());
        let folder_name = format!("{} - {}", request.object_type, request.request_name);
        let folder = Folder::new(folder_name.clone()).with_item(Request::new(
            format!("{} by name", request.request_name),
            request.request_method,
            "/search",
        ));
        self.0.tree.lock().unwrap().items.push(folder.into());
        Ok(GenerationOutcome {
            folder_name,
            collection_name: "Ping API".into(),
            requests_generated: 1,
            message: None,
        })
    }
}

fn ping_auth_tree() -> CollectionTree {
    let login = Request::new("login", HttpMethod::Post, "{{baseUrl}}/login")
        .with_header("Content-Type", "application/json")
        .with_body(RequestBody::raw_json(r#"{"username": "", "filter": {"field": ""}}"#))
        .with_response(SampleResponse {
            name: "ok".into(),
            code: Some(200),
            body: Some(r#"{"token": "abc", "expires_in": 3600}"#.into()),
            extra: Map::new(),
        });
    CollectionTree::new(
        CollectionInfo {
            name: "Ping API".into(),
            ..CollectionInfo::default()
        },
        vec![
            Request::new("ping", HttpMethod::Get, "{{baseUrl}}/ping").into(),
            Folder::new("Auth").with_item(login).into(),
        ],
    )
}

fn backend_with(tree: CollectionTree) -> Backend {
    let backend = Backend::default();
    *backend.0.tree.lock().unwrap() = tree;
    backend
}

fn session(backend: &Backend) -> EditorSession<Backend, Backend> {
    EditorSession::new(backend.clone(), backend.clone())
}

fn login() -> LeafAddress {
    LeafAddress::new("Auth", "login", HttpMethod::Post)
}

#[tokio::test]
async fn test_clone_then_save_sends_both_requests() {
    let backend = backend_with(ping_auth_tree());
    let mut session = session(&backend);

    assert_eq!(session.load_collection("c1").await.unwrap(), LoadState::Loaded);
    assert_eq!(session.display().len(), 2);

    let copy = session.clone_request(&login()).unwrap();
    assert_eq!(copy, LeafAddress::new("Auth", "login (Copy)", HttpMethod::Post));
    assert_eq!(session.display().len(), 3);

    session.save().await.unwrap();

    let saved = backend.0.saved.lock().unwrap().last().cloned().unwrap();
    assert_eq!(saved.items.len(), 2);
    assert_eq!(saved.items[0].name(), "ping");
    let auth = saved.items[1].as_folder().unwrap();
    let names: Vec<_> = auth.items.iter().map(Node::name).collect();
    assert_eq!(names, vec!["login", "login (Copy)"]);
    let root_requests = saved.items.iter().filter(|n| n.as_request().is_some()).count();
    assert_eq!(root_requests, 1);
}

#[tokio::test]
async fn test_hidden_injection_items_survive_save() {
    let mut tree = ping_auth_tree();
    tree.items.push(
        Folder::new("SQL Injection")
            .with_item(Request::new("ping sqli", HttpMethod::Get, "/ping"))
            .into(),
    );
    let backend = backend_with(tree);
    let mut session = session(&backend);

    session.load_collection("c1").await.unwrap();
    assert_eq!(session.display().len(), 2);

    session
        .delete_request(&LeafAddress::root("ping", HttpMethod::Get))
        .unwrap();
    session.save().await.unwrap();

    let saved = backend.0.saved.lock().unwrap().last().cloned().unwrap();
    let names: Vec<_> = saved.items.iter().map(Node::name).collect();
    assert_eq!(names, vec!["Auth", "SQL Injection"]);
}

#[tokio::test]
async fn test_empty_view_is_no_data() {
    let tree = CollectionTree::new(
        CollectionInfo::default(),
        vec![Request::new("html injection", HttpMethod::Get, "/").into()],
    );
    let backend = backend_with(tree);
    let mut session = session(&backend);

    assert_eq!(session.load_collection("c1").await.unwrap(), LoadState::NoData);
    assert_eq!(session.tree().items.len(), 1);
    assert!(session.display().is_empty());
}

#[tokio::test]
async fn test_save_after_no_data_load_keeps_hidden_folders() {
    let tree = CollectionTree::new(
        CollectionInfo::default(),
        vec![
            Folder::new("SQL Injection")
                .with_item(Request::new("ping sqli", HttpMethod::Get, "/ping"))
                .into(),
        ],
    );
    let backend = backend_with(tree.clone());
    let mut session = session(&backend);

    assert_eq!(session.load_collection("c1").await.unwrap(), LoadState::NoData);
    session.save().await.unwrap();

    let saved = backend.0.saved.lock().unwrap().last().cloned().unwrap();
    assert_eq!(saved, tree);
    assert_eq!(saved.items[0].name(), "SQL Injection");
}

#[tokio::test]
async fn test_failed_load_keeps_previous_state() {
    let backend = backend_with(ping_auth_tree());
    let mut session = session(&backend);
    session.load_collection("c1").await.unwrap();
    session.clone_request(&login()).unwrap();

    *backend.0.fail_next_load.lock().unwrap() = Some(StoreError::Transport("refused".into()));
    let err = session.load_collection("c2").await.unwrap_err();

    assert!(matches!(err, ApplicationError::ExternalService { .. }));
    assert_eq!(session.collection_id(), Some("c1"));
    assert_eq!(session.tree().request_count(), 3);
}

#[tokio::test]
async fn test_failed_save_surfaces_detail_and_keeps_edits() {
    let backend = backend_with(ping_auth_tree());
    let mut session = session(&backend);
    session.load_collection("c1").await.unwrap();
    session.clone_request(&login()).unwrap();

    *backend.0.fail_next_save.lock().unwrap() = Some(StoreError::Http {
        status: 500,
        message: "Error updating collection: disk full".into(),
    });
    let err = session.save().await.unwrap_err();
    assert_eq!(err.to_string(), "Error updating collection: disk full");
    assert_eq!(session.tree().request_count(), 3);

    session.save().await.unwrap();
    assert_eq!(backend.0.tree.lock().unwrap().request_count(), 3);
}

#[tokio::test]
async fn test_invalid_edit_changes_nothing() {
    let backend = backend_with(ping_auth_tree());
    let mut session = session(&backend);
    session.load_collection("c1").await.unwrap();
    let before = session.tree().clone();

    let mut edit = RequestEdit::from_request(session.request(&login()).unwrap()).unwrap();
    edit.headers = "{not json".into();
    edit.method = HttpMethod::Put;

    let err = session.edit_request(&login(), edit).unwrap_err();
    assert!(matches!(err, ApplicationError::Validation(_)));
    assert_eq!(session.tree(), &before);
}

#[tokio::test]
async fn test_edit_patches_display_and_stale_address_is_not_found() {
    let backend = backend_with(ping_auth_tree());
    let mut session = session(&backend);
    session.load_collection("c1").await.unwrap();

    let mut edit = RequestEdit::from_request(session.request(&login()).unwrap()).unwrap();
    edit.method = HttpMethod::Put;
    let edited = session.edit_request(&login(), edit.clone()).unwrap();

    assert_eq!(edited, LeafAddress::new("Auth", "login", HttpMethod::Put));
    assert!(session.display().entries().iter().any(|e| e.address == edited));

    let err = session.edit_request(&login(), edit).unwrap_err();
    assert!(matches!(err, ApplicationError::NotFound(_)));
}

#[tokio::test]
async fn test_mutations_need_a_loaded_collection() {
    let backend = backend_with(ping_auth_tree());
    let mut session = session(&backend);
    assert!(matches!(
        session.clone_request(&login()),
        Err(ApplicationError::NotLoaded)
    ));
    assert!(matches!(session.save().await, Err(ApplicationError::NotLoaded)));
}

#[tokio::test]
async fn test_generation_flow() {
    let mut backend = Backend::default();
    *backend.0.tree.lock().unwrap() = ping_auth_tree();
    Arc::get_mut(&mut backend.0)
        .unwrap()
        .keys
        .insert("integer".into(), Err(StoreError::Transport("down".into())));
    let mut session = session(&backend);
    session.load_collection("c1").await.unwrap();

    session.select_template(&login()).unwrap();
    assert_eq!(session.extract_attributes(None).await.unwrap(), 2);
    assert_eq!(session.resolve_conditions().await, 2);
    assert!(session.catalog().is_resolved("integer"));

    let err = session.compute_plan().unwrap_err();
    assert!(matches!(err, ApplicationError::Validation(_)));

    session.set_object_type("Session");
    // expires_in: 6 numeric fallbacks, token: 4 string fallbacks
    assert_eq!(session.compute_plan().unwrap().total_request_count, 10);

    assert!(session.add_custom_condition("token", "StartsWith").unwrap());
    assert!(!session.add_custom_condition("token", "EQ").unwrap());
    assert_eq!(session.compute_plan().unwrap().total_request_count, 11);

    session
        .add_custom_attribute("region", AttributeType::String, true)
        .unwrap();
    session.resolve_conditions().await;
    assert_eq!(session.compute_plan().unwrap().total_request_count, 15);

    session.set_condition_mode(ConditionMode::Selected);
    session.select_conditions("token", Vec::new()).unwrap();
    assert!(matches!(
        session.compute_plan(),
        Err(ApplicationError::Validation(_))
    ));
    assert!(session
        .select_conditions("token", vec!["Between".into()])
        .is_err());
    session
        .select_conditions("expires_in", vec!["GT".into(), "LT".into()])
        .unwrap();

    session
        .set_body_mapping(
            "filter.field",
            BodyFieldMapping::enabled(MappingSource::Special(SpecialToken::AttributeName)),
        )
        .unwrap();
    session
        .set_body_mapping(
            "username",
            BodyFieldMapping::enabled(MappingSource::ResponseAttribute("token".into())),
        )
        .unwrap();

    let plan = session.compute_plan().unwrap();
    assert_eq!(plan.total_request_count, 2);

    let outcome = session.generate().await.unwrap();
    assert_eq!(outcome.folder_name, "Session - login");

    let sent = backend.0.generated.lock().unwrap().last().cloned().unwrap();
    assert_eq!(sent.request_method, HttpMethod::Post);
    assert_eq!(sent.response_body, json!({"token": "abc", "expires_in": 3600}));
    assert!(!sent.generate_all_conditions);
    assert_eq!(
        sent.selected_conditions.unwrap()["expires_in"],
        vec![ConditionKey::from("GT"), "LT".into()]
    );
    assert_eq!(sent.request_body_mappings.map(|m| m.len()), Some(2));

    let generated = LeafAddress::new("Session - login", "login by name", HttpMethod::Post);
    assert!(locate(session.tree(), &generated).is_some());
}

#[tokio::test]
async fn test_custom_condition_later_listed_by_catalog_counts_once() {
    let mut backend = Backend::default();
    *backend.0.tree.lock().unwrap() = ping_auth_tree();
    let keys = &mut Arc::get_mut(&mut backend.0).unwrap().keys;
    keys.insert("string".into(), Ok(vec!["EQ".into(), "Like".into()]));
    keys.insert("integer".into(), Ok(vec!["EQ".into()]));
    let mut session = session(&backend);
    session.load_collection("c1").await.unwrap();
    session.select_template(&login()).unwrap();
    session.extract_attributes(None).await.unwrap();
    session.set_object_type("Session");

    assert!(session.add_custom_condition("token", "Like").unwrap());
    session.resolve_conditions().await;

    let plan = session.compute_plan().unwrap();
    assert_eq!(plan.total_request_count, 3);
    assert_eq!(plan.payload.custom_conditions, None);
}

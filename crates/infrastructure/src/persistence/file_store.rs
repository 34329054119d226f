//! File system based collection store.

use std::borrow::Cow;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use postgen_application::ports::{CollectionStore, StoreError};
use postgen_domain::collection::{CollectionTree, Node, filtered_view};
use regex::Regex;
use tokio::fs;

use crate::postman::{PostmanCollection, collection_to_wire, tree_from_wire};
use crate::serialization::{from_json_bytes, to_json_document};

/// Suffix of every collection document.
const COLLECTION_SUFFIX: &str = ".postman_collection.json";

#[allow(clippy::expect_used)]
static UNSAFE_ID_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"[<>:"|?*\x00-\x1f/\\]"#).expect("unsafe id pattern"));

/// Strips characters that could escape the collections directory.
///
/// # Errors
///
/// Returns [`StoreError::InvalidId`] if nothing usable is left.
pub fn sanitize_collection_id(collection_id: &str) -> Result<Cow<'_, str>, StoreError> {
    let cleaned = UNSAFE_ID_CHARS.replace_all(collection_id, "");
    if cleaned.is_empty() || cleaned == "." || cleaned == ".." {
        return Err(StoreError::InvalidId(collection_id.to_string()));
    }
    Ok(cleaned)
}

/// Collection store over a local directory laid out as
/// `<root>/<id>/<id>.postman_collection.json`.
#[derive(Debug, Clone)]
pub struct FileCollectionStore {
    root: PathBuf,
}

impl FileCollectionStore {
    /// Creates a store rooted at `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The collections directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the document for `collection_id`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidId`] for an unusable id.
    pub fn collection_path(&self, collection_id: &str) -> Result<PathBuf, StoreError> {
        let id = sanitize_collection_id(collection_id)?;
        Ok(self.root.join(id.as_ref()).join(format!("{id}{COLLECTION_SUFFIX}")))
    }

    async fn read_document(&self, collection_id: &str) -> Result<PostmanCollection, StoreError> {
        let path = self.collection_path(collection_id)?;
        let bytes = fs::read(&path).await.map_err(|e| {
            if e.kind() == ErrorKind::NotFound {
                StoreError::NotFound(collection_id.to_string())
            } else {
                StoreError::Io(format!("cannot read {}: {e}", path.display()))
            }
        })?;
        from_json_bytes(&bytes).map_err(|e| StoreError::Decode(e.to_string()))
    }
}

impl CollectionStore for FileCollectionStore {
    async fn full_collection(&self, collection_id: &str) -> Result<CollectionTree, StoreError> {
        let document = self.read_document(collection_id).await?;
        tree_from_wire(document).map_err(|e| StoreError::Decode(e.to_string()))
    }

    async fn filtered_requests(&self, collection_id: &str) -> Result<Vec<Node>, StoreError> {
        let tree = self.full_collection(collection_id).await?;
        Ok(filtered_view(&tree.items))
    }

    async fn save_collection(
        &self,
        collection_id: &str,
        tree: &CollectionTree,
    ) -> Result<(), StoreError> {
        let path = self.collection_path(collection_id)?;
        if fs::metadata(&path).await.is_err() {
            return Err(StoreError::NotFound(collection_id.to_string()));
        }

        let json = to_json_document(&collection_to_wire(tree))
            .map_err(|e| StoreError::Decode(e.to_string()))?;
        fs::write(&path, json.as_bytes())
            .await
            .map_err(|e| StoreError::Io(format!("cannot write {}: {e}", path.display())))?;

        tracing::debug!(path = %path.display(), "collection written");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::{Value, json};
    use tempfile::TempDir;

    fn document() -> Value {
        json!({
            "info": {
                "_postman_id": "9d1c",
                "name": "Petstore",
                "schema": "https://schema.getpostman.com/json/collection/v2.1.0/collection.json"
            },
            "item": [
                {"name": "ping", "request": {"method": "GET", "header": [], "url": "{{baseUrl}}/ping"}, "response": []},
                {"name": "Pets", "item": [
                    {"name": "list pets", "request": {"method": "GET", "header": [], "url": "{{baseUrl}}/pets"}, "response": []},
                    {"name": "list pets - SQL Injection", "request": {"method": "GET", "header": [], "url": "{{baseUrl}}/pets?q='"}, "response": []}
                ]},
                {"name": "Injection tests", "item": [
                    {"name": "probe", "request": {"method": "GET", "header": [], "url": "{{baseUrl}}/probe"}, "response": []}
                ]}
            ],
            "variable": [{"key": "baseUrl", "value": "http://localhost"}]
        })
    }

    async fn seeded_store(id: &str) -> (TempDir, FileCollectionStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = FileCollectionStore::new(dir.path());
        let path = store.collection_path(id).unwrap();
        fs::create_dir_all(path.parent().unwrap()).await.unwrap();
        fs::write(&path, to_json_document(&document()).unwrap())
            .await
            .unwrap();
        (dir, store)
    }

    #[test]
    fn test_sanitize_collection_id() {
        assert_eq!(sanitize_collection_id("petstore").unwrap(), "petstore");
        assert_eq!(sanitize_collection_id("../etc/passwd").unwrap(), "..etcpasswd");
        assert_eq!(sanitize_collection_id("a<b>:c|d?e*").unwrap(), "abcde");
        assert!(matches!(sanitize_collection_id("/"), Err(StoreError::InvalidId(_))));
        assert!(sanitize_collection_id("..").is_err());
        assert!(sanitize_collection_id("").is_err());
    }

    #[test]
    fn test_collection_path_layout() {
        let store = FileCollectionStore::new("/srv/collections");
        assert_eq!(
            store.collection_path("petstore").unwrap(),
            PathBuf::from("/srv/collections/petstore/petstore.postman_collection.json")
        );
    }

    #[tokio::test]
    async fn test_full_and_filtered_views() {
        let (_dir, store) = seeded_store("petstore").await;

        let tree = store.full_collection("petstore").await.unwrap();
        assert_eq!(tree.info.name, "Petstore");
        assert_eq!(tree.items.len(), 3);

        let view = store.filtered_requests("petstore").await.unwrap();
        let names: Vec<_> = view.iter().map(Node::name).collect();
        assert_eq!(names, vec!["ping", "Pets"]);
        let Node::Folder(pets) = &view[1] else {
            panic!("expected folder");
        };
        assert_eq!(pets.items.len(), 1);
    }

    #[tokio::test]
    async fn test_save_round_trips_document() {
        let (_dir, store) = seeded_store("petstore").await;

        let tree = store.full_collection("petstore").await.unwrap();
        store.save_collection("petstore", &tree).await.unwrap();

        let written = fs::read(store.collection_path("petstore").unwrap())
            .await
            .unwrap();
        let written: Value = serde_json::from_slice(&written).unwrap();
        assert_eq!(written, document());
    }

    #[tokio::test]
    async fn test_missing_collection_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileCollectionStore::new(dir.path());

        let load = store.full_collection("absent").await.unwrap_err();
        assert!(matches!(load, StoreError::NotFound(_)));

        let save = store
            .save_collection("absent", &CollectionTree::default())
            .await
            .unwrap_err();
        assert!(matches!(save, StoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_corrupt_document_is_decode_error() {
        let (_dir, store) = seeded_store("petstore").await;
        fs::write(store.collection_path("petstore").unwrap(), b"{not json")
            .await
            .unwrap();

        let error = store.full_collection("petstore").await.unwrap_err();
        assert!(matches!(error, StoreError::Decode(_)));
    }
}

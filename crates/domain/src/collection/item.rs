//! Collection item types

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::request::Request;

/// A folder containing requests and other folders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Folder {
    /// Folder name
    pub name: String,
    /// Items in this folder, in document order
    #[serde(default)]
    pub items: Vec<Node>,
    /// Optional description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Folder-level document fields the editor does not interpret
    #[serde(default)]
    pub extra: Map<String, Value>,
}

impl Folder {
    /// Creates a new empty folder.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            items: Vec::new(),
            description: None,
            extra: Map::new(),
        }
    }

    /// Appends an item and returns the folder, for building trees in one expression.
    #[must_use]
    pub fn with_item(mut self, item: impl Into<Node>) -> Self {
        self.items.push(item.into());
        self
    }
}

/// An item in a collection (either a folder or a request).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Node {
    /// A folder containing other items
    Folder(Folder),
    /// A request leaf
    Request(Request),
}

impl Node {
    /// Returns the name of this item.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Folder(f) => &f.name,
            Self::Request(r) => &r.name,
        }
    }

    /// Returns the request when this item is one.
    #[must_use]
    pub const fn as_request(&self) -> Option<&Request> {
        match self {
            Self::Request(r) => Some(r),
            Self::Folder(_) => None,
        }
    }

    /// Returns the folder when this item is one.
    #[must_use]
    pub const fn as_folder(&self) -> Option<&Folder> {
        match self {
            Self::Folder(f) => Some(f),
            Self::Request(_) => None,
        }
    }
}

impl From<Folder> for Node {
    fn from(folder: Folder) -> Self {
        Self::Folder(folder)
    }
}

impl From<Request> for Node {
    fn from(request: Request) -> Self {
        Self::Request(request)
    }
}

/// Collection metadata (`info` block of the document).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CollectionInfo {
    /// Collection name
    pub name: String,
    /// Store-assigned collection identifier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub postman_id: Option<String>,
    /// Optional description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Document schema URL
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
    /// Any other info fields
    #[serde(default)]
    pub extra: Map<String, Value>,
}

/// The full tree of a collection: the save target of every mutation.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CollectionTree {
    /// Collection metadata
    pub info: CollectionInfo,
    /// Root items, in document order
    #[serde(default)]
    pub items: Vec<Node>,
    /// Document-level fields the editor does not interpret (variables, auth, events)
    #[serde(default)]
    pub extra: Map<String, Value>,
}

impl CollectionTree {
    /// Creates a tree from its metadata and root items.
    #[must_use]
    pub fn new(info: CollectionInfo, items: Vec<Node>) -> Self {
        Self {
            info,
            items,
            extra: Map::new(),
        }
    }

    /// Returns true when the tree has no items at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns the total number of requests in the tree (recursive).
    #[must_use]
    pub fn request_count(&self) -> usize {
        fn count_in_items(items: &[Node]) -> usize {
            items.iter().fold(0, |acc, item| {
                acc + match item {
                    Node::Request(_) => 1,
                    Node::Folder(f) => count_in_items(&f.items),
                }
            })
        }
        count_in_items(&self.items)
    }

    /// Returns the node at `path`, where each element indexes one level of nesting.
    #[must_use]
    pub fn node(&self, path: &[usize]) -> Option<&Node> {
        let (last, parents) = path.split_last()?;
        self.items_at(parents)?.get(*last)
    }

    /// Returns the item list of the folder at `folder_path` (the root list for `[]`).
    #[must_use]
    pub fn items_at(&self, folder_path: &[usize]) -> Option<&Vec<Node>> {
        let mut items = &self.items;
        for index in folder_path {
            match items.get(*index)? {
                Node::Folder(folder) => items = &folder.items,
                Node::Request(_) => return None,
            }
        }
        Some(items)
    }

    /// Mutable counterpart of [`Self::items_at`].
    pub fn items_at_mut(&mut self, folder_path: &[usize]) -> Option<&mut Vec<Node>> {
        let mut items = &mut self.items;
        for index in folder_path {
            match items.get_mut(*index)? {
                Node::Folder(folder) => items = &mut folder.items,
                Node::Request(_) => return None,
            }
        }
        Some(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::HttpMethod;
    use pretty_assertions::assert_eq;

    fn sample_tree() -> CollectionTree {
        CollectionTree::new(
            CollectionInfo {
                name: "Test".into(),
                ..CollectionInfo::default()
            },
            vec![
                Request::new("Request 1", HttpMethod::Get, "/one").into(),
                Folder::new("Users")
                    .with_item(Request::new("Get Users", HttpMethod::Get, "/users"))
                    .with_item(Folder::new("Admin").with_item(Request::new(
                        "Create User",
                        HttpMethod::Post,
                        "/users",
                    )))
                    .into(),
            ],
        )
    }

    #[test]
    fn test_request_count() {
        assert_eq!(sample_tree().request_count(), 3);
    }

    #[test]
    fn test_node_by_path() {
        let tree = sample_tree();
        assert_eq!(tree.node(&[0]).map(Node::name), Some("Request 1"));
        assert_eq!(tree.node(&[1, 1, 0]).map(Node::name), Some("Create User"));
        assert!(tree.node(&[]).is_none());
        assert!(tree.node(&[0, 0]).is_none());
        assert!(tree.node(&[5]).is_none());
    }

    #[test]
    fn test_items_at_mut() {
        let mut tree = sample_tree();
        let admin = tree.items_at_mut(&[1, 1]).map(|items| items.len());
        assert_eq!(admin, Some(1));
        assert!(tree.items_at_mut(&[0]).is_none());
    }
}

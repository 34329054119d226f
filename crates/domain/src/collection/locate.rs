//! Tree locator: resolves a [`LeafAddress`] against the full tree.

use super::address::LeafAddress;
use super::item::{CollectionTree, Folder, Node};
use crate::request::Request;

/// Position of a request in the full tree: one index per nesting level.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Location {
    path: Vec<usize>,
}

impl Location {
    /// Wraps an index path. The path must be non-empty.
    #[must_use]
    pub const fn new(path: Vec<usize>) -> Self {
        Self { path }
    }

    /// Full index path, root first.
    #[must_use]
    pub fn path(&self) -> &[usize] {
        &self.path
    }

    /// Index path of the parent folder (`[]` for root-level items).
    #[must_use]
    pub fn parent_path(&self) -> &[usize] {
        self.path.split_last().map_or(&[], |(_, parents)| parents)
    }

    /// Index of the item inside its parent list.
    #[must_use]
    pub fn index(&self) -> usize {
        self.path.last().copied().unwrap_or_default()
    }

    /// The location of the next sibling.
    #[must_use]
    pub fn next_sibling(&self) -> Self {
        let mut path = self.parent_path().to_vec();
        path.push(self.index() + 1);
        Self { path }
    }
}

/// A located request together with its parent folder (`None` at root).
#[derive(Debug, Clone, Copy)]
pub struct Located<'a> {
    /// The request.
    pub request: &'a Request,
    /// Its immediate parent folder.
    pub parent: Option<&'a Folder>,
}

/// Finds the request at `address`, returning it with its parent folder.
#[must_use]
pub fn locate<'a>(tree: &'a CollectionTree, address: &LeafAddress) -> Option<Located<'a>> {
    let location = locate_path(tree, address)?;
    let request = tree.node(location.path())?.as_request()?;
    let parent = match location.parent_path() {
        [] => None,
        parent_path => tree.node(parent_path).and_then(Node::as_folder),
    };
    Some(Located { request, parent })
}

/// Finds the index path of the request at `address`.
///
/// Resolution order, first match wins in root-to-leaf, left-to-right order:
/// 1. root address: only root-level requests are considered;
/// 2. the first folder named `address.parent_folder`, immediate children only;
/// 3. any request anywhere whose immediate parent carries that folder name
///    (covers duplicate folder names and requests that moved).
#[must_use]
pub fn locate_path(tree: &CollectionTree, address: &LeafAddress) -> Option<Location> {
    if address.is_root() {
        return tree
            .items
            .iter()
            .position(|item| item.as_request().is_some_and(|r| address.names(r)))
            .map(|index| Location::new(vec![index]));
    }

    if let Some(folder_path) = find_folder(&tree.items, &address.parent_folder, &mut Vec::new()) {
        let found = tree.items_at(&folder_path).and_then(|items| {
            items
                .iter()
                .position(|item| item.as_request().is_some_and(|r| address.names(r)))
        });
        if let Some(index) = found {
            let mut path = folder_path;
            path.push(index);
            return Some(Location::new(path));
        }
    }

    find_under_named_parent(&tree.items, address, None, &mut Vec::new()).map(Location::new)
}

fn find_folder(items: &[Node], name: &str, prefix: &mut Vec<usize>) -> Option<Vec<usize>> {
    for (index, item) in items.iter().enumerate() {
        if let Node::Folder(folder) = item {
            prefix.push(index);
            if folder.name == name {
                return Some(prefix.clone());
            }
            if let Some(found) = find_folder(&folder.items, name, prefix) {
                return Some(found);
            }
            prefix.pop();
        }
    }
    None
}

fn find_under_named_parent(
    items: &[Node],
    address: &LeafAddress,
    parent: Option<&str>,
    prefix: &mut Vec<usize>,
) -> Option<Vec<usize>> {
    for (index, item) in items.iter().enumerate() {
        prefix.push(index);
        match item {
            Node::Request(request)
                if parent == Some(address.parent_folder.as_str()) && address.names(request) =>
            {
                return Some(prefix.clone());
            }
            Node::Folder(folder) => {
                if let Some(found) =
                    find_under_named_parent(&folder.items, address, Some(&folder.name), prefix)
                {
                    return Some(found);
                }
            }
            Node::Request(_) => {}
        }
        prefix.pop();
    }
    None
}

#[cfg(test)]
#[allow(clippy::expect_used)]
mod tests {
    use super::*;
    use crate::collection::{CollectionInfo, address_of};
    use crate::request::HttpMethod;
    use pretty_assertions::assert_eq;

    fn tree(items: Vec<Node>) -> CollectionTree {
        CollectionTree::new(CollectionInfo::default(), items)
    }

    fn get(name: &str) -> Request {
        Request::new(name, HttpMethod::Get, format!("/{name}"))
    }

    #[test]
    fn test_root_address_only_matches_root_requests() {
        let t = tree(vec![
            Folder::new("Nested").with_item(get("ping")).into(),
            get("ping").into(),
        ]);

        let location = locate_path(&t, &LeafAddress::root("ping", HttpMethod::Get));
        assert_eq!(location, Some(Location::new(vec![1])));

        let t = tree(vec![Folder::new("Nested").with_item(get("ping")).into()]);
        assert_eq!(locate_path(&t, &LeafAddress::root("ping", HttpMethod::Get)), None);
    }

    #[test]
    fn test_method_is_part_of_the_address() {
        let t = tree(vec![get("ping").into()]);
        assert_eq!(locate_path(&t, &LeafAddress::root("ping", HttpMethod::Post)), None);
    }

    #[test]
    fn test_first_named_folder_is_searched_first() {
        let t = tree(vec![
            Folder::new("Outer")
                .with_item(Folder::new("Users").with_item(get("list")))
                .into(),
            Folder::new("Users").with_item(get("list")).into(),
        ]);

        let location = locate_path(&t, &LeafAddress::new("Users", "list", HttpMethod::Get));
        assert_eq!(location, Some(Location::new(vec![0, 0, 0])));
    }

    #[test]
    fn test_falls_back_to_later_folder_with_same_name() {
        let t = tree(vec![
            Folder::new("Users").with_item(get("other")).into(),
            Folder::new("Archive")
                .with_item(Folder::new("Users").with_item(get("list")))
                .into(),
        ]);

        let location = locate_path(&t, &LeafAddress::new("Users", "list", HttpMethod::Get));
        assert_eq!(location, Some(Location::new(vec![1, 0, 0])));
    }

    #[test]
    fn test_fallback_requires_matching_parent_name() {
        let t = tree(vec![
            Folder::new("Users").into(),
            Folder::new("Orders").with_item(get("list")).into(),
        ]);

        assert_eq!(
            locate_path(&t, &LeafAddress::new("Users", "list", HttpMethod::Get)),
            None
        );
    }

    #[test]
    fn test_locate_round_trips_every_address() {
        let t = tree(vec![
            get("ping").into(),
            Folder::new("Auth")
                .with_item(Request::new("login", HttpMethod::Post, "/login"))
                .with_item(Folder::new("Tokens").with_item(get("refresh")))
                .into(),
            Folder::new("Users")
                .with_item(get("list"))
                .with_item(Request::new("list", HttpMethod::Delete, "/users"))
                .into(),
        ]);

        fn walk(t: &CollectionTree, items: &[Node], parent: Option<&Folder>) {
            for item in items {
                match item {
                    Node::Request(request) => {
                        let address = address_of(request, parent.map(|f| f.name.as_str()));
                        let located = locate(t, &address).expect("every leaf is locatable");
                        assert!(std::ptr::eq(located.request, request));
                        assert_eq!(
                            located.parent.map(|f| f.name.as_str()),
                            parent.map(|f| f.name.as_str())
                        );
                    }
                    Node::Folder(folder) => walk(t, &folder.items, Some(folder)),
                }
            }
        }
        walk(&t, &t.items, None);
    }

    #[test]
    fn test_location_helpers() {
        let location = Location::new(vec![2, 0, 3]);
        assert_eq!(location.parent_path(), &[2, 0]);
        assert_eq!(location.index(), 3);
        assert_eq!(location.next_sibling(), Location::new(vec![2, 0, 4]));
    }
}

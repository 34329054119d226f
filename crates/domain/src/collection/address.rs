//! Leaf addressing.
//!
//! A request is re-identified across the filtered and full views of a
//! collection by `(parent folder name, request name, method)`. The address is
//! recomputed from those fields every time; nothing is stamped into the tree.
//! Two requests sharing all three fields are indistinguishable and the first
//! one in traversal order wins.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::request::{HttpMethod, Request};

/// The canonical address of a request leaf.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LeafAddress {
    /// Name of the immediate parent folder, empty for root-level requests.
    pub parent_folder: String,
    /// Request name.
    pub name: String,
    /// Request method.
    pub method: HttpMethod,
}

impl LeafAddress {
    /// Creates an address inside the named folder.
    #[must_use]
    pub fn new(
        parent_folder: impl Into<String>,
        name: impl Into<String>,
        method: HttpMethod,
    ) -> Self {
        Self {
            parent_folder: parent_folder.into(),
            name: name.into(),
            method,
        }
    }

    /// Creates the address of a root-level request.
    #[must_use]
    pub fn root(name: impl Into<String>, method: HttpMethod) -> Self {
        Self::new(String::new(), name, method)
    }

    /// Returns true for root-level addresses.
    #[must_use]
    pub const fn is_root(&self) -> bool {
        self.parent_folder.is_empty()
    }

    /// Returns true when `request` has this address's name and method.
    #[must_use]
    pub fn names(&self, request: &Request) -> bool {
        request.name == self.name && request.method == self.method
    }
}

impl fmt::Display for LeafAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_root() {
            write!(f, "{} {}", self.method, self.name)
        } else {
            write!(f, "{}/{} {}", self.parent_folder, self.method, self.name)
        }
    }
}

/// Computes the address of `request` given its parent folder name (`None` at root).
#[must_use]
pub fn address_of(request: &Request, parent_folder_name: Option<&str>) -> LeafAddress {
    LeafAddress::new(
        parent_folder_name.unwrap_or_default(),
        request.name.clone(),
        request.method,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_address_of_root_request() {
        let request = Request::new("ping", HttpMethod::Get, "/ping");
        let address = address_of(&request, None);
        assert_eq!(address, LeafAddress::root("ping", HttpMethod::Get));
        assert!(address.is_root());
        assert_eq!(address.to_string(), "GET ping");
    }

    #[test]
    fn test_address_of_nested_request() {
        let request = Request::new("login", HttpMethod::Post, "/login");
        let address = address_of(&request, Some("Auth"));
        assert_eq!(address.parent_folder, "Auth");
        assert_eq!(address.to_string(), "Auth/POST login");
    }

    #[test]
    fn test_address_ignores_non_identity_fields() {
        let a = Request::new("login", HttpMethod::Post, "/v1/login");
        let b = Request::new("login", HttpMethod::Post, "/v2/login").with_header("X", "1");
        assert_eq!(address_of(&a, Some("Auth")), address_of(&b, Some("Auth")));
    }
}

//! Structural mutations of the full tree: edit, clone, delete.
//!
//! Each operation locates its target first and performs no change at all when
//! the lookup or the input validation fails.

use std::sync::LazyLock;

use regex::Regex;

use super::address::LeafAddress;
use super::item::{CollectionTree, Node};
use super::locate::{Location, locate_path};
use crate::error::{DomainError, DomainResult};
use crate::request::{Auth, HttpMethod, Request, RequestBody, parse_header_text};

#[allow(clippy::expect_used)]
static COPY_SUFFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)^(?P<base>.*) \(Copy(?: (?P<n>\d+))?\)$").expect("copy suffix pattern")
});

/// Form input for an in-place edit.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestEdit {
    /// Header text, a JSON array of `{key, value, type?}` objects.
    pub headers: String,
    /// New description (`None` clears it).
    pub description: Option<String>,
    /// New body (`None` removes it).
    pub body: Option<RequestBody>,
    /// New auth (`None` inherits from the parent).
    pub auth: Option<Auth>,
    /// New method.
    pub method: HttpMethod,
    /// New raw URL.
    pub url: String,
}

impl RequestEdit {
    /// Prefills the form from an existing request.
    ///
    /// # Errors
    ///
    /// Fails only if the current headers cannot be serialized, which does not
    /// happen for headers built by this crate.
    pub fn from_request(request: &Request) -> DomainResult<Self> {
        let headers = serde_json::to_string_pretty(&request.headers)
            .map_err(|e| DomainError::InvalidHeaders(e.to_string()))?;
        Ok(Self {
            headers,
            description: request.description.clone(),
            body: request.body.clone(),
            auth: request.auth.clone(),
            method: request.method,
            url: request.url.clone(),
        })
    }
}

/// Result of a successful clone.
#[derive(Debug, Clone, PartialEq)]
pub struct ClonedRequest {
    /// Where the copy was inserted.
    pub location: Location,
    /// The copy's address.
    pub address: LeafAddress,
    /// The copy itself.
    pub request: Request,
}

/// Strips one trailing `" (Copy)"` or `" (Copy N)"` from a request name.
#[must_use]
pub fn base_name(name: &str) -> &str {
    COPY_SUFFIX
        .captures(name)
        .and_then(|caps| caps.name("base"))
        .map_or(name, |base| base.as_str())
}

/// Picks the name for a new copy of `source_name` among `siblings`.
///
/// Copies are counted among siblings with the same method whose name is the
/// base name plus a copy suffix. The first copy is `"X (Copy)"`; with `n`
/// copies present the next one is `"X (Copy {n + 1})"`, moving up while that
/// name is still taken.
#[must_use]
pub fn copy_name(source_name: &str, method: HttpMethod, siblings: &[Node]) -> String {
    let base = base_name(source_name);
    let same_method: Vec<&str> = siblings
        .iter()
        .filter_map(Node::as_request)
        .filter(|sibling| sibling.method == method)
        .map(|sibling| sibling.name.as_str())
        .collect();
    let existing = same_method
        .iter()
        .filter(|name| {
            COPY_SUFFIX
                .captures(name)
                .and_then(|caps| caps.name("base"))
                .is_some_and(|b| b.as_str() == base)
        })
        .count();

    let candidate = |ordinal: usize| {
        if ordinal <= 1 {
            format!("{base} (Copy)")
        } else {
            format!("{base} (Copy {ordinal})")
        }
    };
    let mut ordinal = existing + 1;
    let mut name = candidate(ordinal);
    while same_method.contains(&name.as_str()) {
        ordinal += 1;
        name = candidate(ordinal);
    }
    name
}

impl CollectionTree {
    fn require(&self, address: &LeafAddress) -> DomainResult<Location> {
        locate_path(self, address).ok_or_else(|| DomainError::RequestNotFound(address.to_string()))
    }

    fn request_at_mut(&mut self, location: &Location) -> Option<&mut Request> {
        match self
            .items_at_mut(location.parent_path())?
            .get_mut(location.index())?
        {
            Node::Request(request) => Some(request),
            Node::Folder(_) => None,
        }
    }

    /// Replaces headers, description, body, auth, method and url of the
    /// addressed request, returning its address after the edit.
    ///
    /// # Errors
    ///
    /// - [`DomainError::RequestNotFound`] if the address does not resolve
    /// - [`DomainError::InvalidHeaders`] if the header text is malformed
    ///
    /// The tree is untouched on error.
    pub fn edit_request(
        &mut self,
        address: &LeafAddress,
        edit: RequestEdit,
    ) -> DomainResult<LeafAddress> {
        let location = self.require(address)?;
        let headers = parse_header_text(&edit.headers)?;

        let request = self
            .request_at_mut(&location)
            .ok_or_else(|| DomainError::RequestNotFound(address.to_string()))?;
        request.headers = headers;
        request.description = edit.description.filter(|d| !d.is_empty());
        request.body = edit.body;
        request.auth = edit.auth;
        request.method = edit.method;
        request.set_url(edit.url);

        Ok(LeafAddress::new(
            address.parent_folder.clone(),
            request.name.clone(),
            request.method,
        ))
    }

    /// Deep-copies the addressed request under a fresh copy name and inserts
    /// the copy right after its source.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::RequestNotFound`] if the address does not resolve.
    pub fn clone_request(&mut self, address: &LeafAddress) -> DomainResult<ClonedRequest> {
        let location = self.require(address)?;
        let not_found = || DomainError::RequestNotFound(address.to_string());

        let siblings = self.items_at(location.parent_path()).ok_or_else(not_found)?;
        let Some(Node::Request(source)) = siblings.get(location.index()) else {
            return Err(not_found());
        };

        let mut copy = source.clone();
        copy.strip_identity();
        copy.name = copy_name(&source.name, source.method, siblings);

        let target = location.next_sibling();
        let siblings = self
            .items_at_mut(location.parent_path())
            .ok_or_else(not_found)?;
        siblings.insert(target.index(), Node::Request(copy.clone()));

        Ok(ClonedRequest {
            location: target,
            address: LeafAddress::new(address.parent_folder.clone(), copy.name.clone(), copy.method),
            request: copy,
        })
    }

    /// Removes exactly the addressed request from its parent list.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::RequestNotFound`] if the address does not resolve.
    pub fn delete_request(&mut self, address: &LeafAddress) -> DomainResult<Request> {
        let location = self.require(address)?;
        let siblings = self
            .items_at_mut(location.parent_path())
            .ok_or_else(|| DomainError::RequestNotFound(address.to_string()))?;

        match siblings.remove(location.index()) {
            Node::Request(request) => Ok(request),
            folder @ Node::Folder(_) => {
                siblings.insert(location.index(), folder);
                Err(DomainError::RequestNotFound(address.to_string()))
            }
        }
    }
}

//! Collection store port.

use postgen_domain::{CollectionTree, Node};

/// Error type for backend calls.
#[derive(Debug, Clone, thiserror::Error)]
pub enum StoreError {
    /// The backend answered with an error status.
    #[error("server returned {status}: {message}")]
    Http {
        /// HTTP status code.
        status: u16,
        /// `detail` from the error body, or the raw body text.
        message: String,
    },

    /// The backend could not be reached.
    #[error("transport error: {0}")]
    Transport(String),

    /// The backend answered with a payload that could not be decoded.
    #[error("decode error: {0}")]
    Decode(String),

    /// The collection does not exist.
    #[error("collection not found: {0}")]
    NotFound(String),

    /// The collection id is empty after removing path-unsafe characters.
    #[error("invalid collection id: {0:?}")]
    InvalidId(String),

    /// Local storage failed.
    #[error("I/O error: {0}")]
    Io(String),
}

impl StoreError {
    /// Message suitable for showing to the user: the backend's own detail
    /// when it sent one, otherwise a generic line for the failure class.
    #[must_use]
    pub fn message(&self) -> String {
        match self {
            Self::Http { message, .. } if !message.trim().is_empty() => message.clone(),
            Self::Http { status, .. } => format!("request failed with status {status}"),
            Self::Transport(_) => "could not reach the collection service".to_string(),
            Self::Decode(_) => "unexpected response from the collection service".to_string(),
            Self::NotFound(id) => format!("collection {id} not found"),
            Self::InvalidId(_) => "Invalid collection ID".to_string(),
            Self::Io(detail) => detail.clone(),
        }
    }
}

/// Backing store for collections.
pub trait CollectionStore: Send + Sync {
    /// Loads the complete tree of a collection.
    ///
    /// # Errors
    ///
    /// Returns an error if the collection cannot be fetched or decoded.
    fn full_collection(
        &self,
        collection_id: &str,
    ) -> impl std::future::Future<Output = Result<CollectionTree, StoreError>> + Send;

    /// Loads the filtered view: the tree without generated injection items.
    ///
    /// # Errors
    ///
    /// Returns an error if the view cannot be fetched or decoded.
    fn filtered_requests(
        &self,
        collection_id: &str,
    ) -> impl std::future::Future<Output = Result<Vec<Node>, StoreError>> + Send;

    /// Replaces the stored collection with `tree`.
    ///
    /// # Errors
    ///
    /// Returns an error if the collection cannot be written.
    fn save_collection(
        &self,
        collection_id: &str,
        tree: &CollectionTree,
    ) -> impl std::future::Future<Output = Result<(), StoreError>> + Send;
}

//! Domain error types

use thiserror::Error;

/// Domain-level errors that can occur during validation or processing.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// The HTTP method is not supported.
    #[error("unsupported HTTP method: {0}")]
    UnsupportedMethod(String),

    /// The header text supplied to an edit is not a JSON array of key/value pairs.
    #[error("invalid headers: {0}")]
    InvalidHeaders(String),

    /// The request body template is invalid.
    #[error("invalid body: {0}")]
    InvalidBody(String),

    /// A collection item has an invalid structure.
    #[error("invalid collection item: {0}")]
    InvalidCollectionItem(String),

    /// No request matches the given address in the full tree.
    #[error("request {0} not found; reload the collection and retry")]
    RequestNotFound(String),

    /// Generation needs an object type label.
    #[error("object type is required before generating requests")]
    MissingObjectType,

    /// Selected-conditions mode with nothing selected.
    #[error("no conditions selected; select at least one condition to generate requests")]
    NoConditionsSelected,

    /// A body-field mapping is incomplete.
    #[error("invalid body mapping for `{field}`: {reason}")]
    InvalidMapping {
        /// Request body field path.
        field: String,
        /// What is wrong with the mapping.
        reason: String,
    },

    /// A condition token is empty or otherwise unusable.
    #[error("invalid condition: {0}")]
    InvalidCondition(String),
}

impl DomainError {
    /// Returns true when the error means the addressed request could not be found.
    #[must_use]
    pub const fn is_lookup(&self) -> bool {
        matches!(self, Self::RequestNotFound(_))
    }
}

/// Result type alias for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;

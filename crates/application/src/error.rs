//! Application error types

use postgen_domain::DomainError;
use thiserror::Error;

use crate::ports::StoreError;

/// Application-level errors.
///
/// Every variant is scoped to the operation that raised it; the session
/// stays usable afterwards.
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// The input was rejected; nothing was changed.
    #[error("{0}")]
    Validation(String),

    /// The addressed request is no longer in the tree.
    #[error("{0}")]
    NotFound(String),

    /// A backend call failed.
    #[error("{message}")]
    ExternalService {
        /// User-facing message.
        message: String,
        /// The underlying error.
        #[source]
        source: StoreError,
    },

    /// The operation needs a loaded collection.
    #[error("no collection loaded")]
    NotLoaded,
}

impl From<DomainError> for ApplicationError {
    fn from(err: DomainError) -> Self {
        if err.is_lookup() {
            Self::NotFound(err.to_string())
        } else {
            Self::Validation(err.to_string())
        }
    }
}

impl From<StoreError> for ApplicationError {
    fn from(source: StoreError) -> Self {
        Self::ExternalService {
            message: source.message(),
            source,
        }
    }
}

/// Result type alias for application operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;

//! Postgen Infrastructure - Adapters and implementations
//!
//! This crate provides concrete implementations of the ports
//! defined in the application layer, the Postman wire format and the
//! runtime configuration.

pub mod adapters;
pub mod config;
pub mod persistence;
pub mod postman;
pub mod serialization;

pub use adapters::{OfflineGenerationService, ReqwestCollectionStore};
pub use config::{ConfigError, PostgenConfig};
pub use persistence::{FileCollectionStore, sanitize_collection_id};
pub use serialization::{SerializationError, from_json_bytes, to_json_document};

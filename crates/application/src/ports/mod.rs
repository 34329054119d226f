//! Port definitions (interfaces)
//!
//! Ports define the boundaries between the editing core and the backend.
//! Each port is a trait implemented by adapters in the infrastructure layer.

mod collection_store;
mod generation_service;

pub use collection_store::{CollectionStore, StoreError};
pub use generation_service::GenerationService;

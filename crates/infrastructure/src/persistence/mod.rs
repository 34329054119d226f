//! Local persistence.

mod file_store;

pub use file_store::{FileCollectionStore, sanitize_collection_id};

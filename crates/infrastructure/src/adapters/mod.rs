//! Port implementations backed by external services.

mod offline_generation;
mod reqwest_store;

pub use offline_generation::OfflineGenerationService;
pub use reqwest_store::ReqwestCollectionStore;

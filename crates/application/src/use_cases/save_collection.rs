//! Save collection use case.

use postgen_domain::CollectionTree;

use crate::error::ApplicationResult;
use crate::ports::CollectionStore;

/// Use case for writing the full tree back to the store.
pub struct SaveCollection<'a, S: CollectionStore> {
    store: &'a S,
}

impl<'a, S: CollectionStore> SaveCollection<'a, S> {
    /// Creates a new `SaveCollection` use case.
    #[must_use]
    pub const fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Replaces the stored collection with `tree`.
    ///
    /// # Errors
    ///
    /// Returns an error if the store rejects the write.
    pub async fn execute(&self, collection_id: &str, tree: &CollectionTree) -> ApplicationResult<()> {
        self.store.save_collection(collection_id, tree).await?;
        tracing::info!(collection_id, requests = tree.request_count(), "collection saved");
        Ok(())
    }
}

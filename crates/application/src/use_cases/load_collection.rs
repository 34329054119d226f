//! Load collection use case.

use postgen_domain::CollectionTree;
use postgen_domain::collection::DisplayList;

use crate::error::ApplicationResult;
use crate::ports::CollectionStore;

/// Whether a load produced anything to edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadState {
    /// Nothing has been loaded yet.
    #[default]
    Idle,
    /// A collection with at least one visible request is loaded.
    Loaded,
    /// The collection (or its visible view) is empty.
    NoData,
}

/// Output from loading a collection.
#[derive(Debug, Clone)]
pub struct LoadCollectionOutput {
    /// The full tree, target of every mutation.
    pub tree: CollectionTree,
    /// The display list built from the filtered view.
    pub display: DisplayList,
    /// Load outcome.
    pub state: LoadState,
}

/// Use case for loading both views of a collection.
pub struct LoadCollection<'a, S: CollectionStore> {
    store: &'a S,
}

impl<'a, S: CollectionStore> LoadCollection<'a, S> {
    /// Creates a new `LoadCollection` use case.
    #[must_use]
    pub const fn new(store: &'a S) -> Self {
        Self { store }
    }

    /// Fetches the full tree and the filtered view concurrently.
    ///
    /// An empty full tree or an empty filtered view yields an empty display
    /// list and [`LoadState::NoData`]. The full tree is always kept as fetched.
    ///
    /// # Errors
    ///
    /// Returns an error if either fetch fails.
    pub async fn execute(&self, collection_id: &str) -> ApplicationResult<LoadCollectionOutput> {
        let (tree, view) = tokio::try_join!(
            self.store.full_collection(collection_id),
            self.store.filtered_requests(collection_id),
        )?;

        if tree.is_empty() || view.is_empty() {
            tracing::info!(collection_id, "collection has no requests to edit");
            return Ok(LoadCollectionOutput {
                tree,
                display: DisplayList::default(),
                state: LoadState::NoData,
            });
        }

        let display = DisplayList::from_items(&view);
        let visible = display.len();
        tracing::info!(
            collection_id,
            requests = tree.request_count(),
            visible,
            "collection loaded"
        );
        Ok(LoadCollectionOutput {
            tree,
            display,
            state: LoadState::Loaded,
        })
    }
}

//! Generation service for working without the collection service.

use postgen_application::ports::{GenerationService, StoreError};
use postgen_domain::generation::{
    ConditionKey, ExtractedAttribute, GenerationOutcome, GenerationRequest, extract_attributes,
};
use serde_json::Value;

/// Extracts attributes locally and resolves no condition keys, so every
/// type falls back to the built-in condition list. Generation needs the
/// service and always fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineGenerationService;

impl OfflineGenerationService {
    /// Creates the service.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl GenerationService for OfflineGenerationService {
    async fn extract_attributes(&self, sample: &Value) -> Result<Vec<ExtractedAttribute>, StoreError> {
        Ok(extract_attributes(sample))
    }

    async fn condition_keys(&self, _data_type: &str) -> Result<Vec<ConditionKey>, StoreError> {
        Ok(Vec::new())
    }

    async fn generate_filtered_requests(
        &self,
        request: &GenerationRequest,
    ) -> Result<GenerationOutcome, StoreError> {
        tracing::warn!(
            collection_id = %request.collection_id,
            "generation requested without a collection service"
        );
        Err(StoreError::Transport(
            "generation needs the collection service".to_string(),
        ))
    }
}

//! Generation service port.

use postgen_domain::generation::{
    ConditionKey, ExtractedAttribute, GenerationOutcome, GenerationRequest,
};
use serde_json::Value;

use super::StoreError;

/// Attribute extraction, condition lookup and filtered-request generation.
pub trait GenerationService: Send + Sync {
    /// Extracts attributes from a response sample.
    ///
    /// # Errors
    ///
    /// Returns an error if the service call fails.
    fn extract_attributes(
        &self,
        sample: &Value,
    ) -> impl std::future::Future<Output = Result<Vec<ExtractedAttribute>, StoreError>> + Send;

    /// Looks up the condition keys for a normalized data type.
    ///
    /// # Errors
    ///
    /// Returns an error if the master-data lookup fails.
    fn condition_keys(
        &self,
        data_type: &str,
    ) -> impl std::future::Future<Output = Result<Vec<ConditionKey>, StoreError>> + Send;

    /// Generates filtered requests into the stored collection.
    ///
    /// # Errors
    ///
    /// Returns an error if the service rejects the request or cannot be reached.
    fn generate_filtered_requests(
        &self,
        request: &GenerationRequest,
    ) -> impl std::future::Future<Output = Result<GenerationOutcome, StoreError>> + Send;
}

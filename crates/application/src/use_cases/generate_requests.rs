//! Generate requests use case.

use postgen_domain::generation::{GenerationOutcome, GenerationRequest};

use crate::error::ApplicationResult;
use crate::ports::GenerationService;

/// Use case for handing a plan payload to the generation service.
pub struct GenerateRequests<'a, G: GenerationService> {
    service: &'a G,
}

impl<'a, G: GenerationService> GenerateRequests<'a, G> {
    /// Creates a new `GenerateRequests` use case.
    #[must_use]
    pub const fn new(service: &'a G) -> Self {
        Self { service }
    }

    /// Sends `request` and returns what the service wrote.
    ///
    /// # Errors
    ///
    /// Returns an error if the service rejects the request.
    pub async fn execute(&self, request: &GenerationRequest) -> ApplicationResult<GenerationOutcome> {
        let outcome = self.service.generate_filtered_requests(request).await?;
        tracing::info!(
            collection_id = %request.collection_id,
            folder = %outcome.folder_name,
            generated = outcome.requests_generated,
            "filtered requests generated"
        );
        Ok(outcome)
    }
}

//! Extract attributes use case.

use postgen_domain::generation::ExtractedAttribute;
use serde_json::Value;

use crate::error::ApplicationResult;
use crate::ports::GenerationService;

/// Use case for extracting attributes from a response sample.
pub struct ExtractAttributes<'a, G: GenerationService> {
    service: &'a G,
}

impl<'a, G: GenerationService> ExtractAttributes<'a, G> {
    /// Creates a new `ExtractAttributes` use case.
    #[must_use]
    pub const fn new(service: &'a G) -> Self {
        Self { service }
    }

    /// Extracts the attributes of `sample`.
    ///
    /// # Errors
    ///
    /// Returns an error if the service call fails.
    pub async fn execute(&self, sample: &Value) -> ApplicationResult<Vec<ExtractedAttribute>> {
        let attributes = self.service.extract_attributes(sample).await?;
        tracing::info!(count = attributes.len(), "attributes extracted");
        Ok(attributes)
    }
}

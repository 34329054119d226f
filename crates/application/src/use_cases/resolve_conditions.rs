//! Resolve conditions use case.

use postgen_domain::generation::{AttributeSet, ConditionCatalog};

use crate::ports::GenerationService;

/// Use case for filling the condition catalog for an attribute set.
pub struct ResolveConditions<'a, G: GenerationService> {
    service: &'a G,
}

impl<'a, G: GenerationService> ResolveConditions<'a, G> {
    /// Creates a new `ResolveConditions` use case.
    #[must_use]
    pub const fn new(service: &'a G) -> Self {
        Self { service }
    }

    /// Looks up every data type of `attributes` not yet in `catalog`.
    ///
    /// A failed or empty lookup records the built-in set for that type, so
    /// this never fails. Returns the number of types looked up.
    pub async fn execute(&self, catalog: &mut ConditionCatalog, attributes: &AttributeSet) -> usize {
        let pending = catalog.unresolved(attributes.iter().map(|a| a.attr_type.as_str()));
        for data_type in &pending {
            match self.service.condition_keys(data_type).await {
                Ok(keys) if !keys.is_empty() => {
                    tracing::debug!(data_type = %data_type, keys = keys.len(), "conditions resolved");
                    catalog.insert(data_type, keys);
                }
                Ok(_) => {
                    tracing::warn!(data_type = %data_type, "no conditions configured, using defaults");
                    catalog.insert(data_type, Vec::new());
                }
                Err(err) => {
                    tracing::warn!(data_type = %data_type, error = %err, "condition lookup failed, using defaults");
                    catalog.insert(data_type, Vec::new());
                }
            }
        }
        pending.len()
    }
}

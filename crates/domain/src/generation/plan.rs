//! Generation planner: request counts and the payload for the generation service.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::attribute::{AttributeSet, AttributeType};
use super::condition::{ConditionCatalog, ConditionKey, CustomConditions};
use super::mapping::{BodyMappingTable, WireMapping};
use crate::collection::LeafAddress;
use crate::error::{DomainError, DomainResult};
use crate::request::HttpMethod;

/// Whether every catalog condition is generated or only an explicit selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConditionMode {
    /// Every catalog condition plus custom conditions, for every attribute.
    #[default]
    All,
    /// Only the conditions in the [`ConditionSelection`].
    Selected,
}

/// Selected conditions per attribute path, in selection order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConditionSelection {
    by_attribute: BTreeMap<String, Vec<ConditionKey>>,
}

impl ConditionSelection {
    /// Creates an empty selection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Selects a condition. Returns false if it was already selected.
    pub fn select(&mut self, attribute: &str, key: ConditionKey) -> bool {
        let keys = self.by_attribute.entry(attribute.to_string()).or_default();
        if keys.contains(&key) {
            return false;
        }
        keys.push(key);
        true
    }

    /// Deselects a condition. Returns whether it was selected.
    pub fn deselect(&mut self, attribute: &str, key: &str) -> bool {
        let Some(keys) = self.by_attribute.get_mut(attribute) else {
            return false;
        };
        let before = keys.len();
        keys.retain(|k| k.as_str() != key);
        let removed = before != keys.len();
        if keys.is_empty() {
            self.by_attribute.remove(attribute);
        }
        removed
    }

    /// Replaces the selection of one attribute, dropping duplicates.
    pub fn set(&mut self, attribute: &str, keys: impl IntoIterator<Item = ConditionKey>) {
        let mut unique: Vec<ConditionKey> = Vec::new();
        for key in keys {
            if !unique.contains(&key) {
                unique.push(key);
            }
        }
        if unique.is_empty() {
            self.by_attribute.remove(attribute);
        } else {
            self.by_attribute.insert(attribute.to_string(), unique);
        }
    }

    /// The selected conditions of one attribute.
    #[must_use]
    pub fn for_attribute(&self, attribute: &str) -> &[ConditionKey] {
        self.by_attribute.get(attribute).map_or(&[], Vec::as_slice)
    }

    /// Returns true when nothing is selected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_attribute.is_empty()
    }

    /// Clears the selection.
    pub fn clear(&mut self) {
        self.by_attribute.clear();
    }
}

/// A user-defined attribute as sent to the generation service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomAttributeSpec {
    /// Data type.
    #[serde(rename = "type")]
    pub attr_type: AttributeType,
    /// Whether the field may be null.
    pub nullable: bool,
    /// Attribute path.
    pub name: String,
}

/// The document handed to the generation service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// Target collection.
    pub collection_id: String,
    /// Template request name.
    pub request_name: String,
    /// Template request method.
    pub request_method: HttpMethod,
    /// Response sample the attributes were extracted from.
    pub response_body: Value,
    /// Legacy field, always empty.
    #[serde(default)]
    pub mappings: Vec<Value>,
    /// Legacy field, always empty.
    #[serde(default)]
    pub filters: Vec<Value>,
    /// Name of the collection, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collection_name: Option<String>,
    /// Object type label.
    pub object_type: String,
    /// Expand every catalog condition on the service side.
    pub generate_all_conditions: bool,
    /// Explicit conditions per attribute; absent when generating all.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_conditions: Option<BTreeMap<String, Vec<ConditionKey>>>,
    /// Enabled body-field mappings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_body_mappings: Option<BTreeMap<String, WireMapping>>,
    /// User-defined attributes by path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_attributes: Option<BTreeMap<String, CustomAttributeSpec>>,
    /// User-defined conditions by attribute path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_conditions: Option<BTreeMap<String, Vec<ConditionKey>>>,
}

/// What the generation service reports back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationOutcome {
    /// Folder the generated requests were written to.
    pub folder_name: String,
    /// Collection name.
    #[serde(rename = "name", default)]
    pub collection_name: String,
    /// Number of requests written.
    pub requests_generated: usize,
    /// Service message, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Input of [`GenerationPlanner::plan`].
#[derive(Debug, Clone, Copy)]
pub struct PlanInput<'a> {
    /// Target collection.
    pub collection_id: &'a str,
    /// The template request.
    pub template: &'a LeafAddress,
    /// Response sample.
    pub response_body: &'a Value,
    /// Object type label.
    pub object_type: &'a str,
    /// Collection name, when known.
    pub collection_name: Option<&'a str>,
    /// Merged attribute set.
    pub attributes: &'a AttributeSet,
    /// Condition mode.
    pub mode: ConditionMode,
    /// Explicit selection, used in [`ConditionMode::Selected`].
    pub selection: &'a ConditionSelection,
    /// User-defined conditions.
    pub custom_conditions: &'a CustomConditions,
    /// Body-field mappings.
    pub body_mappings: &'a BodyMappingTable,
}

/// A computed plan.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationPlan {
    /// Requests the service is expected to write.
    pub total_request_count: usize,
    /// Request count per attribute path, in attribute order.
    pub per_attribute: Vec<(String, usize)>,
    /// The service payload.
    pub payload: GenerationRequest,
}

/// Computes counts and payloads against a condition catalog.
#[derive(Debug, Clone, Copy)]
pub struct GenerationPlanner<'a> {
    catalog: &'a ConditionCatalog,
}

impl<'a> GenerationPlanner<'a> {
    /// Creates a planner over `catalog`.
    #[must_use]
    pub const fn new(catalog: &'a ConditionCatalog) -> Self {
        Self { catalog }
    }

    /// Request count per attribute.
    #[must_use]
    pub fn counts(
        &self,
        attributes: &AttributeSet,
        mode: ConditionMode,
        selection: &ConditionSelection,
        custom: &CustomConditions,
    ) -> Vec<(String, usize)> {
        attributes
            .iter()
            .map(|attribute| {
                let count = match mode {
                    ConditionMode::All => {
                        let catalog = self.catalog.conditions_for(attribute.attr_type.as_str());
                        let extra = custom
                            .for_attribute(&attribute.path)
                            .iter()
                            .filter(|key| !catalog.contains(key))
                            .count();
                        catalog.len() + extra
                    }
                    ConditionMode::Selected => selection.for_attribute(&attribute.path).len(),
                };
                (attribute.path.clone(), count)
            })
            .collect()
    }

    /// Validates the input and builds the plan.
    ///
    /// # Errors
    ///
    /// - [`DomainError::MissingObjectType`] when the label is blank
    /// - [`DomainError::InvalidMapping`] for an incomplete enabled mapping
    /// - [`DomainError::NoConditionsSelected`] when selected mode adds up to zero
    pub fn plan(&self, input: &PlanInput<'_>) -> DomainResult<GenerationPlan> {
        let object_type = input.object_type.trim();
        if object_type.is_empty() {
            return Err(DomainError::MissingObjectType);
        }
        input.body_mappings.validate()?;

        let per_attribute = self.counts(
            input.attributes,
            input.mode,
            input.selection,
            input.custom_conditions,
        );
        let total_request_count = per_attribute.iter().map(|(_, count)| count).sum();
        if input.mode == ConditionMode::Selected && total_request_count == 0 {
            return Err(DomainError::NoConditionsSelected);
        }

        let selected_conditions = (input.mode == ConditionMode::Selected).then(|| {
            input
                .attributes
                .iter()
                .filter_map(|attribute| {
                    let keys = input.selection.for_attribute(&attribute.path);
                    (!keys.is_empty()).then(|| (attribute.path.clone(), keys.to_vec()))
                })
                .collect()
        });

        let custom_attributes: BTreeMap<_, _> = input
            .attributes
            .custom()
            .iter()
            .map(|attribute| {
                (
                    attribute.path.clone(),
                    CustomAttributeSpec {
                        attr_type: attribute.attr_type,
                        nullable: attribute.nullable,
                        name: attribute.path.clone(),
                    },
                )
            })
            .collect();

        let payload = GenerationRequest {
            collection_id: input.collection_id.to_string(),
            request_name: input.template.name.clone(),
            request_method: input.template.method,
            response_body: input.response_body.clone(),
            mappings: Vec::new(),
            filters: Vec::new(),
            collection_name: input.collection_name.map(str::to_string),
            object_type: object_type.to_string(),
            generate_all_conditions: input.mode == ConditionMode::All,
            selected_conditions,
            request_body_mappings: input.body_mappings.to_wire(),
            custom_attributes: (!custom_attributes.is_empty()).then_some(custom_attributes),
            custom_conditions: (!input.custom_conditions.is_empty())
                .then(|| input.custom_conditions.as_map().clone()),
        };

        Ok(GenerationPlan {
            total_request_count,
            per_attribute,
            payload,
        })
    }
}

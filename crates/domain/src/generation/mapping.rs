//! Request body field mappings.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::attribute::extract_paths;
use crate::error::{DomainError, DomainResult};

/// Values computed per generated request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SpecialToken {
    /// The filtered attribute's path.
    AttributeName,
    /// The object type label.
    ObjectType,
    /// The filtered attribute's data type.
    DataType,
    /// The condition key.
    Condition,
    /// A sample value for the attribute.
    AttributeValue,
}

impl SpecialToken {
    /// Wire name of the token.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::AttributeName => "attributeName",
            Self::ObjectType => "objectType",
            Self::DataType => "dataType",
            Self::Condition => "condition",
            Self::AttributeValue => "attributeValue",
        }
    }
}

impl fmt::Display for SpecialToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SpecialToken {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        [
            Self::AttributeName,
            Self::ObjectType,
            Self::DataType,
            Self::Condition,
            Self::AttributeValue,
        ]
        .into_iter()
        .find(|token| token.as_str() == s.trim())
        .ok_or_else(|| DomainError::InvalidMapping {
            field: String::new(),
            reason: format!("unknown special token `{s}`"),
        })
    }
}

/// Where a body field's value comes from.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum MappingSource {
    /// No source; the field keeps its template value.
    #[default]
    Unmapped,
    /// The value of a response attribute, by path.
    ResponseAttribute(String),
    /// A literal value.
    Manual(String),
    /// A computed token.
    Special(SpecialToken),
}

/// A single body-field mapping.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BodyFieldMapping {
    /// Value source.
    pub source: MappingSource,
    /// Disabled mappings are kept but not sent.
    pub enabled: bool,
}

impl BodyFieldMapping {
    /// Creates an enabled mapping.
    #[must_use]
    pub const fn enabled(source: MappingSource) -> Self {
        Self {
            source,
            enabled: true,
        }
    }
}

/// Mapping as sent to the generation service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireMapping {
    /// `none`, `response`, `manual` or `special`.
    pub mode: String,
    /// Attribute path or special token name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// Literal value for manual mappings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    /// Always true on the wire; disabled mappings are not sent.
    pub enabled: bool,
}

impl From<&BodyFieldMapping> for WireMapping {
    fn from(mapping: &BodyFieldMapping) -> Self {
        let (mode, source, value) = match &mapping.source {
            MappingSource::Unmapped => ("none", None, None),
            MappingSource::ResponseAttribute(path) => ("response", Some(path.clone()), None),
            MappingSource::Manual(value) => ("manual", None, Some(value.clone())),
            MappingSource::Special(token) => ("special", Some(token.as_str().to_string()), None),
        };
        Self {
            mode: mode.to_string(),
            source,
            value,
            enabled: mapping.enabled,
        }
    }
}

/// Mappings for every leaf field of the template request's body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BodyMappingTable {
    entries: Vec<(String, BodyFieldMapping)>,
}

impl BodyMappingTable {
    /// Builds an unmapped, disabled entry for each leaf of `template`.
    #[must_use]
    pub fn from_template(template: &Value) -> Self {
        Self {
            entries: extract_paths(template)
                .into_iter()
                .map(|field| (field, BodyFieldMapping::default()))
                .collect(),
        }
    }

    /// Sets the mapping of an existing field.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidMapping`] when the field is not part of
    /// the template body.
    pub fn set(&mut self, field: &str, mapping: BodyFieldMapping) -> DomainResult<()> {
        let entry = self
            .entries
            .iter_mut()
            .find(|(name, _)| name == field)
            .ok_or_else(|| DomainError::InvalidMapping {
                field: field.to_string(),
                reason: "not a field of the request body".to_string(),
            })?;
        entry.1 = mapping;
        Ok(())
    }

    /// The mapping of a field.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&BodyFieldMapping> {
        self.entries
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, mapping)| mapping)
    }

    /// Field paths in template order.
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    /// Returns true when the template body had no leaf fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Checks every enabled mapping is complete.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidMapping`] for an enabled response mapping
    /// without an attribute path.
    pub fn validate(&self) -> DomainResult<()> {
        for (field, mapping) in &self.entries {
            if !mapping.enabled {
                continue;
            }
            if let MappingSource::ResponseAttribute(path) = &mapping.source
                && path.trim().is_empty()
            {
                return Err(DomainError::InvalidMapping {
                    field: field.clone(),
                    reason: "no response attribute selected".to_string(),
                });
            }
        }
        Ok(())
    }

    /// Enabled mappings in wire form, or `None` when nothing is enabled.
    #[must_use]
    pub fn to_wire(&self) -> Option<BTreeMap<String, WireMapping>> {
        let wire: BTreeMap<_, _> = self
            .entries
            .iter()
            .filter(|(_, mapping)| mapping.enabled)
            .map(|(field, mapping)| (field.clone(), WireMapping::from(mapping)))
            .collect();
        (!wire.is_empty()).then_some(wire)
    }
}

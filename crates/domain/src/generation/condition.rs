//! Condition keys, the per-type catalog and user-defined conditions.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};

/// A filter condition identifier such as `EQ` or `Contains`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConditionKey(String);

impl ConditionKey {
    /// Wraps a key.
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// The key text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConditionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ConditionKey {
    fn from(key: &str) -> Self {
        Self::new(key)
    }
}

impl AsRef<str> for ConditionKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Normalizes a data type name into the catalog's lookup key.
#[must_use]
pub fn normalize_type(type_name: &str) -> String {
    let lowered = type_name.trim().to_lowercase();
    match lowered.as_str() {
        "" => "string".to_string(),
        "integer" | "int32" | "int64" => "integer".to_string(),
        "number" | "float" | "double" => "number".to_string(),
        _ => lowered,
    }
}

/// Built-in conditions used when the master-data service has nothing.
#[must_use]
pub fn fallback_conditions(type_name: &str) -> Vec<ConditionKey> {
    let keys: &[&str] = match normalize_type(type_name).as_str() {
        "string" => &["EQ", "NEQ", "Contains", "NotContains"],
        "integer" | "number" => &["EQ", "NEQ", "GT", "LT", "GTE", "LTE"],
        _ => &["EQ", "NEQ"],
    };
    keys.iter().copied().map(ConditionKey::from).collect()
}

/// Session cache of condition keys per normalized data type.
#[derive(Debug, Clone, Default)]
pub struct ConditionCatalog {
    by_type: HashMap<String, Vec<ConditionKey>>,
}

impl ConditionCatalog {
    /// Creates an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the keys for a type. An empty list records the fallback set.
    pub fn insert(&mut self, type_name: &str, keys: Vec<ConditionKey>) {
        let keys = if keys.is_empty() {
            fallback_conditions(type_name)
        } else {
            keys
        };
        self.by_type.insert(normalize_type(type_name), keys);
    }

    /// Returns the cached keys for a type, if resolved.
    #[must_use]
    pub fn cached(&self, type_name: &str) -> Option<&[ConditionKey]> {
        self.by_type.get(&normalize_type(type_name)).map(Vec::as_slice)
    }

    /// Returns true when the type has been resolved.
    #[must_use]
    pub fn is_resolved(&self, type_name: &str) -> bool {
        self.by_type.contains_key(&normalize_type(type_name))
    }

    /// The keys for a type, falling back when the type is not cached.
    #[must_use]
    pub fn conditions_for(&self, type_name: &str) -> Vec<ConditionKey> {
        self.cached(type_name)
            .map_or_else(|| fallback_conditions(type_name), <[ConditionKey]>::to_vec)
    }

    /// Returns true when `key` is in the catalog set for `type_name`.
    #[must_use]
    pub fn contains(&self, type_name: &str, key: &str) -> bool {
        self.conditions_for(type_name).iter().any(|k| k.as_str() == key)
    }

    /// Normalized types among `type_names` not yet resolved, deduplicated in order.
    pub fn unresolved<'a>(&self, type_names: impl IntoIterator<Item = &'a str>) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        for normalized in type_names.into_iter().map(normalize_type) {
            if !self.by_type.contains_key(&normalized) && !out.contains(&normalized) {
                out.push(normalized);
            }
        }
        out
    }

    /// Drops all cached entries.
    pub fn clear(&mut self) {
        self.by_type.clear();
    }
}

/// Conditions the user added per attribute on top of the catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CustomConditions {
    by_attribute: BTreeMap<String, Vec<ConditionKey>>,
}

impl CustomConditions {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a condition for `attribute`.
    ///
    /// Returns `Ok(false)` when the token is already in `catalog` or was added
    /// before; nothing changes in that case.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidCondition`] when the token is blank.
    pub fn add(
        &mut self,
        attribute: &str,
        token: &str,
        catalog: &[ConditionKey],
    ) -> DomainResult<bool> {
        let token = token.trim();
        if token.is_empty() {
            return Err(DomainError::InvalidCondition(format!(
                "empty condition for `{attribute}`"
            )));
        }
        if catalog.iter().any(|k| k.as_str() == token) {
            return Ok(false);
        }
        let keys = self.by_attribute.entry(attribute.to_string()).or_default();
        if keys.iter().any(|k| k.as_str() == token) {
            return Ok(false);
        }
        keys.push(ConditionKey::from(token));
        Ok(true)
    }

    /// Removes a condition. Returns whether it was present.
    pub fn remove(&mut self, attribute: &str, token: &str) -> bool {
        let Some(keys) = self.by_attribute.get_mut(attribute) else {
            return false;
        };
        let before = keys.len();
        keys.retain(|k| k.as_str() != token);
        let removed = before != keys.len();
        if keys.is_empty() {
            self.by_attribute.remove(attribute);
        }
        removed
    }

    /// Drops every condition for which `in_catalog(attribute, key)` holds.
    /// Returns how many were dropped.
    pub fn drop_catalogued(
        &mut self,
        mut in_catalog: impl FnMut(&str, &ConditionKey) -> bool,
    ) -> usize {
        let mut dropped = 0;
        self.by_attribute.retain(|attribute, keys| {
            let before = keys.len();
            keys.retain(|key| !in_catalog(attribute, key));
            dropped += before - keys.len();
            !keys.is_empty()
        });
        dropped
    }

    /// The custom conditions of one attribute.
    #[must_use]
    pub fn for_attribute(&self, attribute: &str) -> &[ConditionKey] {
        self.by_attribute.get(attribute).map_or(&[], Vec::as_slice)
    }

    /// Returns true when no attribute has custom conditions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_attribute.is_empty()
    }

    /// All entries, ordered by attribute path.
    #[must_use]
    pub const fn as_map(&self) -> &BTreeMap<String, Vec<ConditionKey>> {
        &self.by_attribute
    }
}

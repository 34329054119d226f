//! Attribute extraction from JSON bodies.
//!
//! Paths are dot-joined object keys. Arrays never add a segment of their own:
//! an array whose first element is an object is walked through that element,
//! and an array of primitives yields nothing. Only the first element of an
//! array is ever sampled.

use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Data type of an attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttributeType {
    /// Text
    #[default]
    String,
    /// Whole number
    Integer,
    /// Any other number
    Number,
    /// true / false
    Boolean,
    /// Calendar date
    Date,
    /// Timestamp
    Datetime,
}

impl AttributeType {
    /// Returns the type name used for condition lookups.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Date => "date",
            Self::Datetime => "datetime",
        }
    }

    /// Maps a schema type name (and optional format) onto an attribute type.
    /// Unknown names are treated as strings.
    #[must_use]
    pub fn from_schema(type_name: &str, format: Option<&str>) -> Self {
        match (type_name.trim().to_lowercase().as_str(), format) {
            ("string", Some("date")) | ("date", _) => Self::Date,
            ("string", Some("date-time")) | ("datetime" | "date-time", _) => Self::Datetime,
            ("integer" | "int" | "int32" | "int64" | "long", _) => Self::Integer,
            ("number" | "float" | "double" | "decimal", _) => Self::Number,
            ("boolean" | "bool", _) => Self::Boolean,
            _ => Self::String,
        }
    }

    /// Infers the type of a sample value. `null` reads as a nullable string.
    #[must_use]
    pub fn infer(value: &Value) -> (Self, bool) {
        match value {
            Value::Bool(_) => (Self::Boolean, false),
            Value::Number(n) if n.is_i64() || n.is_u64() => (Self::Integer, false),
            Value::Number(_) => (Self::Number, false),
            Value::String(s) => (Self::infer_text(s), false),
            Value::Null | Value::Array(_) | Value::Object(_) => (Self::String, true),
        }
    }

    fn infer_text(text: &str) -> Self {
        if NaiveDate::parse_from_str(text, "%Y-%m-%d").is_ok() {
            Self::Date
        } else if DateTime::parse_from_rfc3339(text).is_ok()
            || NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S").is_ok()
        {
            Self::Datetime
        } else {
            Self::String
        }
    }
}

impl fmt::Display for AttributeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A flattened field of a response sample (or a user-added custom field).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedAttribute {
    /// Dot-delimited field path.
    pub path: String,
    /// Data type.
    #[serde(rename = "type")]
    pub attr_type: AttributeType,
    /// Whether the field may be null.
    #[serde(default)]
    pub nullable: bool,
    /// Original field label, when the sample declared one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_name: Option<String>,
    /// True for attributes added by the user rather than extracted.
    #[serde(default)]
    pub is_custom: bool,
}

impl ExtractedAttribute {
    /// Creates an extracted, non-nullable attribute.
    #[must_use]
    pub fn new(path: impl Into<String>, attr_type: AttributeType) -> Self {
        Self {
            path: path.into(),
            attr_type,
            nullable: false,
            source_name: None,
            is_custom: false,
        }
    }

    /// Creates a user-defined attribute.
    #[must_use]
    pub fn custom(path: impl Into<String>, attr_type: AttributeType, nullable: bool) -> Self {
        Self {
            nullable,
            is_custom: true,
            ..Self::new(path, attr_type)
        }
    }
}

/// Lists the leaf field paths of `value`.
#[must_use]
pub fn extract_paths(value: &Value) -> Vec<String> {
    let mut out = Vec::new();
    walk(value, "", false, &mut out);
    out.into_iter().map(|attribute| attribute.path).collect()
}

/// Extracts typed attributes from a response sample.
///
/// Object entries that look like schema metadata (an object with a string
/// `type`, optionally `format`, `nullable` and `name`) become one attribute
/// each with the declared type; everything else is sampled from its value.
#[must_use]
pub fn extract_attributes(value: &Value) -> Vec<ExtractedAttribute> {
    let mut out = Vec::new();
    walk(value, "", true, &mut out);
    out
}

fn walk(value: &Value, prefix: &str, schema_aware: bool, out: &mut Vec<ExtractedAttribute>) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                let path = join(prefix, key);
                match child {
                    Value::Object(entry) if schema_aware && is_schema_entry(entry) => {
                        out.push(from_schema_entry(path, entry));
                    }
                    Value::Object(_) | Value::Array(_) => walk(child, &path, schema_aware, out),
                    primitive => {
                        let (attr_type, nullable) = AttributeType::infer(primitive);
                        out.push(ExtractedAttribute {
                            nullable,
                            ..ExtractedAttribute::new(path, attr_type)
                        });
                    }
                }
            }
        }
        Value::Array(items) => {
            if let Some(first @ Value::Object(_)) = items.first() {
                walk(first, prefix, schema_aware, out);
            }
        }
        _ => {}
    }
}

fn join(prefix: &str, key: &str) -> String {
    if prefix.is_empty() {
        key.to_string()
    } else {
        format!("{prefix}.{key}")
    }
}

fn is_schema_entry(entry: &Map<String, Value>) -> bool {
    entry.get("type").is_some_and(Value::is_string)
}

fn from_schema_entry(path: String, entry: &Map<String, Value>) -> ExtractedAttribute {
    let type_name = entry.get("type").and_then(Value::as_str).unwrap_or("string");
    let format = entry.get("format").and_then(Value::as_str);
    ExtractedAttribute {
        path,
        attr_type: AttributeType::from_schema(type_name, format),
        nullable: entry.get("nullable").and_then(Value::as_bool).unwrap_or(false),
        source_name: entry.get("name").and_then(Value::as_str).map(str::to_string),
        is_custom: false,
    }
}

/// The session's working attribute set: extracted attributes merged with
/// user-defined ones. A custom attribute replaces an extracted one with the
/// same path, keeping the extracted one's position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttributeSet {
    extracted: Vec<ExtractedAttribute>,
    custom: Vec<ExtractedAttribute>,
}

impl AttributeSet {
    /// Creates a set from extracted attributes.
    #[must_use]
    pub const fn new(extracted: Vec<ExtractedAttribute>) -> Self {
        Self {
            extracted,
            custom: Vec::new(),
        }
    }

    /// Replaces the extracted attributes, keeping the custom ones.
    pub fn set_extracted(&mut self, extracted: Vec<ExtractedAttribute>) {
        self.extracted = extracted;
    }

    /// Adds or replaces a custom attribute.
    pub fn add_custom(&mut self, attribute: ExtractedAttribute) {
        let attribute = ExtractedAttribute {
            is_custom: true,
            ..attribute
        };
        match self.custom.iter_mut().find(|a| a.path == attribute.path) {
            Some(existing) => *existing = attribute,
            None => self.custom.push(attribute),
        }
    }

    /// Removes a custom attribute. Returns whether one was removed.
    pub fn remove_custom(&mut self, path: &str) -> bool {
        let before = self.custom.len();
        self.custom.retain(|a| a.path != path);
        before != self.custom.len()
    }

    /// The custom attributes, in insertion order.
    #[must_use]
    pub fn custom(&self) -> &[ExtractedAttribute] {
        &self.custom
    }

    /// Iterates the merged set.
    pub fn iter(&self) -> impl Iterator<Item = &ExtractedAttribute> {
        let overridden = |path: &str| self.custom.iter().find(|c| c.path == path);
        self.extracted
            .iter()
            .map(move |a| overridden(&a.path).unwrap_or(a))
            .chain(
                self.custom
                    .iter()
                    .filter(|c| !self.extracted.iter().any(|a| a.path == c.path)),
            )
    }

    /// Looks up an attribute by path in the merged set.
    #[must_use]
    pub fn get(&self, path: &str) -> Option<&ExtractedAttribute> {
        self.iter().find(|a| a.path == path)
    }

    /// Number of attributes in the merged set.
    #[must_use]
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    /// Returns true when the merged set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.extracted.is_empty() && self.custom.is_empty()
    }
}

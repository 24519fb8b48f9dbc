//! Service tags

use crate::constants::PRIORITY_ATTRIBUTE;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Tag attribute value (strings and numbers)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    /// Integer attribute
    Int(i64),
    /// Floating point attribute
    Float(f64),
    /// String attribute
    Str(String),
}

impl AttributeValue {
    /// Numeric interpretation, parsing numeric strings
    #[allow(clippy::cast_precision_loss)]
    pub fn as_number(&self) -> Option<f64> {
        match self {
            AttributeValue::Int(n) => Some(*n as f64),
            AttributeValue::Float(x) => Some(*x),
            AttributeValue::Str(s) => s.trim().parse().ok(),
        }
    }
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeValue::Int(n) => write!(f, "{n}"),
            AttributeValue::Float(x) => write!(f, "{x}"),
            AttributeValue::Str(s) => f.write_str(s),
        }
    }
}

impl From<i64> for AttributeValue {
    fn from(n: i64) -> Self {
        AttributeValue::Int(n)
    }
}

impl From<i32> for AttributeValue {
    fn from(n: i32) -> Self {
        AttributeValue::Int(i64::from(n))
    }
}

impl From<f64> for AttributeValue {
    fn from(x: f64) -> Self {
        AttributeValue::Float(x)
    }
}

impl From<&str> for AttributeValue {
    fn from(s: &str) -> Self {
        AttributeValue::Str(s.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(s: String) -> Self {
        AttributeValue::Str(s)
    }
}

/// Tag attributes keyed by attribute name
pub type TagAttributes = BTreeMap<String, AttributeValue>;

/// Named metadata attached to a definition
///
/// A definition may carry the same tag name several times with different
/// attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tag {
    /// Tag name
    pub name: String,
    /// Attribute mapping
    #[serde(default)]
    pub attributes: TagAttributes,
}

impl Tag {
    /// Tag without attributes
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: TagAttributes::new(),
        }
    }

    /// Add an attribute
    #[must_use]
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Shorthand for the `priority` attribute
    #[must_use]
    pub fn with_priority(self, priority: i64) -> Self {
        self.with_attribute(PRIORITY_ATTRIBUTE, priority)
    }

    /// Numeric `priority` attribute, defaulting to 0
    pub fn priority(&self) -> f64 {
        self.attributes
            .get(PRIORITY_ATTRIBUTE)
            .and_then(AttributeValue::as_number)
            .unwrap_or(0.0)
    }

    /// Merge inferred attributes into this tag; existing attributes win
    pub fn merge_missing(&mut self, inferred: &TagAttributes) {
        for (key, value) in inferred {
            self.attributes
                .entry(key.clone())
                .or_insert_with(|| value.clone());
        }
    }
}

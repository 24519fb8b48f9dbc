//! Parameter storage

use crate::error::{Error, Result};
use crate::value_objects::Literal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Named literal values available to service arguments
///
/// The bag is mutable while definitions are being collected and becomes
/// read-only once parameter resolution has replaced every value with its
/// fully interpolated form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParameterBag {
    values: BTreeMap<String, Literal>,
    #[serde(default)]
    frozen: bool,
}

impl ParameterBag {
    /// Create an empty, mutable bag
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a parameter, replacing any previous value
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Literal>) -> Result<()> {
        let name = name.into();
        if self.frozen {
            return Err(Error::FrozenParameters { name });
        }
        self.values.insert(name, value.into());
        Ok(())
    }

    /// Remove a parameter
    pub fn remove(&mut self, name: &str) -> Result<Option<Literal>> {
        if self.frozen {
            return Err(Error::FrozenParameters {
                name: name.to_string(),
            });
        }
        Ok(self.values.remove(name))
    }

    /// Look up a parameter
    pub fn get(&self, name: &str) -> Option<&Literal> {
        self.values.get(name)
    }

    /// Whether a parameter is defined
    pub fn has(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// All parameters ordered by name
    pub fn all(&self) -> &BTreeMap<String, Literal> {
        &self.values
    }

    /// Number of parameters
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the bag is empty
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Whether resolution has frozen the bag
    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    /// Replace every value with its resolved form and make the bag read-only
    pub fn freeze(&mut self, resolved: BTreeMap<String, Literal>) {
        self.values = resolved;
        self.frozen = true;
    }
}

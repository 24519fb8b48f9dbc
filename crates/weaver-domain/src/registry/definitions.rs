//! Definition registry
//!
//! The mutable, build-time store of service definitions, aliases and
//! parameters. Loaders and service providers populate it, compiler passes
//! rewrite it, and compilation finally freezes it.
//!
//! Insertion order is kept for diagnostics only; nothing in resolution
//! depends on it.

use super::parameters::ParameterBag;
use crate::error::{Error, Result};
use crate::value_objects::{Alias, ServiceDefinition, TagAttributes};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// In-memory store of definitions, aliases and parameters
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DefinitionRegistry {
    definitions: BTreeMap<String, ServiceDefinition>,
    definition_order: Vec<String>,
    aliases: BTreeMap<String, Alias>,
    alias_order: Vec<String>,
    parameters: ParameterBag,
}

/// One `(service, attributes)` entry returned by [`DefinitionRegistry::find_tagged_by`]
#[derive(Debug, Clone, PartialEq)]
pub struct TaggedEntry {
    /// Tagged service identifier
    pub id: String,
    /// Attributes of this tag occurrence
    pub attributes: TagAttributes,
}

impl DefinitionRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    // ------------------------------------------------------------------
    // Definitions
    // ------------------------------------------------------------------

    /// Add a definition, replacing any definition or alias with the same identifier
    ///
    /// Returns the replaced definition. A replaced definition keeps its
    /// original position in the insertion order.
    pub fn add(&mut self, definition: ServiceDefinition) -> Option<ServiceDefinition> {
        let id = definition.id.clone();
        if self.aliases.remove(&id).is_some() {
            self.alias_order.retain(|alias| alias != &id);
        }
        let previous = self.definitions.insert(id.clone(), definition);
        if previous.is_none() {
            self.definition_order.push(id);
        }
        previous
    }

    /// Get a definition by identifier (aliases are not followed)
    pub fn get(&self, id: &str) -> Result<&ServiceDefinition> {
        self.definitions
            .get(id)
            .ok_or_else(|| Error::not_found(format!("service definition '{id}'")))
    }

    /// Mutable access to a definition
    pub fn get_mut(&mut self, id: &str) -> Result<&mut ServiceDefinition> {
        self.definitions
            .get_mut(id)
            .ok_or_else(|| Error::not_found(format!("service definition '{id}'")))
    }

    /// Get a definition if present
    pub fn find(&self, id: &str) -> Option<&ServiceDefinition> {
        self.definitions.get(id)
    }

    /// Whether a definition or alias with this identifier exists
    pub fn has(&self, id: &str) -> bool {
        self.definitions.contains_key(id) || self.aliases.contains_key(id)
    }

    /// Whether a definition (not an alias) with this identifier exists
    pub fn has_definition(&self, id: &str) -> bool {
        self.definitions.contains_key(id)
    }

    /// Remove a definition
    pub fn remove(&mut self, id: &str) -> Option<ServiceDefinition> {
        let removed = self.definitions.remove(id);
        if removed.is_some() {
            self.definition_order.retain(|existing| existing != id);
        }
        removed
    }

    /// Move a definition to a new identifier, keeping its insertion position
    ///
    /// A definition without an explicit class keeps building from its old
    /// identifier. Fails when `from` does not exist or `to` is already taken.
    pub fn rename(&mut self, from: &str, to: &str) -> Result<()> {
        if self.has(to) {
            return Err(Error::invalid_definition(
                from,
                format!("cannot rename to '{to}': identifier already in use"),
            ));
        }
        let mut definition = self
            .definitions
            .remove(from)
            .ok_or_else(|| Error::not_found(format!("service definition '{from}'")))?;
        definition.class.get_or_insert_with(|| from.to_string());
        definition.id = to.to_string();
        self.definitions.insert(to.to_string(), definition);
        if let Some(slot) = self.definition_order.iter_mut().find(|id| id.as_str() == from) {
            *slot = to.to_string();
        }
        Ok(())
    }

    /// Definition identifiers in insertion order
    pub fn ids(&self) -> Vec<String> {
        self.definition_order.clone()
    }

    /// Definitions in insertion order
    pub fn definitions(&self) -> impl Iterator<Item = &ServiceDefinition> {
        self.definition_order
            .iter()
            .filter_map(|id| self.definitions.get(id))
    }

    /// Mutable access to every definition, ordered by identifier
    pub fn definitions_mut(&mut self) -> impl Iterator<Item = &mut ServiceDefinition> {
        self.definitions.values_mut()
    }

    /// Number of definitions
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    /// Whether the registry has no definitions
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Every `(id, attributes)` pair for definitions tagged `tag`
    ///
    /// A definition carrying the tag several times appears once per
    /// occurrence. Ordered by definition insertion order, then tag order.
    pub fn find_tagged_by(&self, tag: &str) -> Vec<TaggedEntry> {
        self.definitions()
            .flat_map(|definition| {
                definition.tags_named(tag).map(move |occurrence| TaggedEntry {
                    id: definition.id.clone(),
                    attributes: occurrence.attributes.clone(),
                })
            })
            .collect()
    }

    /// Every tag name used by at least one definition
    pub fn tag_names(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.definitions()
            .flat_map(|definition| definition.tags.iter())
            .filter(|tag| seen.insert(tag.name.clone()))
            .map(|tag| tag.name.clone())
            .collect()
    }

    // ------------------------------------------------------------------
    // Aliases
    // ------------------------------------------------------------------

    /// Register an alias, replacing any definition with the same identifier
    pub fn set_alias(&mut self, id: impl Into<String>, alias: Alias) -> Result<()> {
        let id = id.into();
        if id == alias.target {
            return Err(Error::CircularAlias {
                chain: vec![id.clone(), id],
            });
        }
        self.remove(&id);
        if self.aliases.insert(id.clone(), alias).is_none() {
            self.alias_order.push(id);
        }
        Ok(())
    }

    /// Get an alias
    pub fn alias(&self, id: &str) -> Option<&Alias> {
        self.aliases.get(id)
    }

    /// Whether an alias with this identifier exists
    pub fn has_alias(&self, id: &str) -> bool {
        self.aliases.contains_key(id)
    }

    /// Remove an alias
    pub fn remove_alias(&mut self, id: &str) -> Option<Alias> {
        let removed = self.aliases.remove(id);
        if removed.is_some() {
            self.alias_order.retain(|existing| existing != id);
        }
        removed
    }

    /// Aliases in insertion order
    pub fn aliases(&self) -> impl Iterator<Item = (&str, &Alias)> {
        self.alias_order
            .iter()
            .filter_map(|id| self.aliases.get(id).map(|alias| (id.as_str(), alias)))
    }

    /// Follow alias chains to a non-alias identifier
    ///
    /// Identifiers that are not aliases resolve to themselves. The returned
    /// identifier is not guaranteed to name an existing definition.
    pub fn resolve_alias(&self, id: &str) -> Result<String> {
        let mut chain = vec![id.to_string()];
        let mut current = id;
        while let Some(alias) = self.aliases.get(current) {
            if chain.iter().any(|seen| seen == &alias.target) {
                chain.push(alias.target.clone());
                return Err(Error::CircularAlias { chain });
            }
            chain.push(alias.target.clone());
            current = &alias.target;
        }
        Ok(current.to_string())
    }

    // ------------------------------------------------------------------
    // Parameters
    // ------------------------------------------------------------------

    /// Parameter bag
    pub fn parameters(&self) -> &ParameterBag {
        &self.parameters
    }

    /// Mutable parameter bag
    pub fn parameters_mut(&mut self) -> &mut ParameterBag {
        &mut self.parameters
    }

    /// Set a parameter
    pub fn set_parameter(
        &mut self,
        name: impl Into<String>,
        value: impl Into<crate::value_objects::Literal>,
    ) -> Result<()> {
        self.parameters.set(name, value)
    }
}

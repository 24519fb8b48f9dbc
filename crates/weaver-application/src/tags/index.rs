//! Tag index
//!
//! Secondary index from tag name to the services carrying it. The index is
//! derived data: it is rebuilt from the registry whenever it is needed and is
//! never persisted.

use super::AutoconfigureRules;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use weaver_domain::constants::PRIORITY_ATTRIBUTE;
use weaver_domain::registry::{DefinitionRegistry, TaggedEntry};
use weaver_domain::value_objects::AttributeValue;

/// One service of a tagged collection with its effective priority
#[derive(Debug, Clone, PartialEq)]
pub struct PrioritizedService {
    /// Service identifier
    pub id: String,
    /// Highest `priority` attribute among the service's occurrences of the tag
    pub priority: f64,
}

/// Tag name to tagged services
#[derive(Debug, Clone, Default)]
pub struct TagIndex {
    entries: BTreeMap<String, Vec<TaggedEntry>>,
}

impl TagIndex {
    /// Index every concrete definition of the registry
    ///
    /// Abstract templates are skipped: they can never be part of a
    /// collection.
    pub fn from_registry(registry: &DefinitionRegistry) -> Self {
        let mut index = Self::default();
        index.scan(registry);
        index
    }

    /// Apply autoconfiguration rules, then re-index the registry
    pub fn rebuild(&mut self, registry: &mut DefinitionRegistry, rules: &AutoconfigureRules) {
        rules.apply(registry);
        self.scan(registry);
    }

    fn scan(&mut self, registry: &DefinitionRegistry) {
        self.entries.clear();
        for definition in registry.definitions().filter(|d| !d.is_abstract) {
            for tag in &definition.tags {
                self.entries
                    .entry(tag.name.clone())
                    .or_default()
                    .push(TaggedEntry {
                        id: definition.id.clone(),
                        attributes: tag.attributes.clone(),
                    });
            }
        }
    }

    /// Every occurrence of `tag`, one entry per occurrence
    pub fn find(&self, tag: &str) -> &[TaggedEntry] {
        self.entries.get(tag).map_or(&[], Vec::as_slice)
    }

    /// Indexed tag names
    pub fn tag_names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Services carrying `tag`, one entry per service
    ///
    /// Ordered by descending priority, then identifier ascending. A service
    /// tagged several times takes the highest priority of its occurrences.
    pub fn prioritized(&self, tag: &str) -> Vec<PrioritizedService> {
        let mut best: BTreeMap<&str, f64> = BTreeMap::new();
        for entry in self.find(tag) {
            let priority = entry
                .attributes
                .get(PRIORITY_ATTRIBUTE)
                .and_then(AttributeValue::as_number)
                .unwrap_or(0.0);
            best.entry(entry.id.as_str())
                .and_modify(|current| *current = current.max(priority))
                .or_insert(priority);
        }
        let mut services: Vec<PrioritizedService> = best
            .into_iter()
            .map(|(id, priority)| PrioritizedService {
                id: id.to_string(),
                priority,
            })
            .collect();
        services.sort_by(|a, b| {
            b.priority
                .partial_cmp(&a.priority)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.id.cmp(&b.id))
        });
        services
    }

    /// Identifiers of [`TagIndex::prioritized`]
    pub fn ordered_ids(&self, tag: &str) -> Vec<String> {
        self.prioritized(tag).into_iter().map(|s| s.id).collect()
    }
}

//! Capability-driven autoconfiguration rules

use tracing::trace;
use weaver_domain::registry::DefinitionRegistry;
use weaver_domain::value_objects::Tag;

/// Mapping of capability token to the tag applied to its implementers
///
/// Several tags may be registered for one capability; they are applied in
/// registration order.
#[derive(Debug, Clone, Default)]
pub struct AutoconfigureRules {
    rules: Vec<(String, Tag)>,
}

impl AutoconfigureRules {
    /// Create an empty rule set
    pub fn new() -> Self {
        Self::default()
    }

    /// Tag every definition declaring `capability` with `tag`
    pub fn register(&mut self, capability: impl Into<String>, tag: Tag) {
        self.rules.push((capability.into(), tag));
    }

    /// Registered `(capability, tag)` rules
    pub fn rules(&self) -> &[(String, Tag)] {
        &self.rules
    }

    /// Whether no rule is registered
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Attach inferred tags to every definition that opted into autoconfiguration
    ///
    /// When a definition already carries a tag with the inferred name, the
    /// inferred attributes are merged into every occurrence and explicit
    /// attributes win. Otherwise the inferred tag is appended. Returns how
    /// many definitions were touched.
    pub fn apply(&self, registry: &mut DefinitionRegistry) -> usize {
        if self.rules.is_empty() {
            return 0;
        }
        let mut touched = 0;
        for definition in registry.definitions_mut() {
            if !definition.autoconfigure {
                continue;
            }
            let mut changed = false;
            for (capability, inferred) in &self.rules {
                if !definition.capabilities.contains(capability) {
                    continue;
                }
                if definition.has_tag(&inferred.name) {
                    for explicit in definition
                        .tags
                        .iter_mut()
                        .filter(|tag| tag.name == inferred.name)
                    {
                        explicit.merge_missing(&inferred.attributes);
                    }
                } else {
                    definition.tags.push(inferred.clone());
                }
                trace!(service = %definition.id, tag = %inferred.name, "autoconfigured tag");
                changed = true;
            }
            if changed {
                touched += 1;
            }
        }
        touched
    }
}

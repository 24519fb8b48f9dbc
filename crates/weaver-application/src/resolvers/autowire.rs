//! Autowiring
//!
//! Fills constructor positions a definition leaves unset by matching the
//! declared capability of each [`ParameterSlot`] against the capability sets
//! of the other definitions. A definition's class name counts as one of its
//! capabilities.

use std::borrow::Cow;
use std::collections::{BTreeMap, BTreeSet};
use weaver_domain::error::{Error, Result};
use weaver_domain::registry::DefinitionRegistry;
use weaver_domain::value_objects::{Argument, ParameterSlot, Reference, ServiceDefinition};

/// Capability token to the definitions providing it
#[derive(Debug, Clone, Default)]
pub struct CapabilityIndex {
    providers: BTreeMap<String, BTreeSet<String>>,
}

impl CapabilityIndex {
    /// Index every definition of the registry, abstract templates included
    pub fn from_registry(registry: &DefinitionRegistry) -> Self {
        let mut providers: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        for definition in registry.definitions() {
            let class = definition.class_name().to_string();
            for capability in definition.capabilities.iter().cloned().chain([class]) {
                providers
                    .entry(capability)
                    .or_default()
                    .insert(definition.id.clone());
            }
        }
        Self { providers }
    }

    /// Definitions providing `capability`, ordered by identifier
    pub fn providers(&self, capability: &str) -> impl Iterator<Item = &str> {
        self.providers
            .get(capability)
            .into_iter()
            .flatten()
            .map(String::as_str)
    }
}

/// Outcome of a candidate search
struct Candidates {
    accepted: BTreeSet<String>,
    rejected: Vec<String>,
}

/// Resolves unset constructor positions of autowired definitions
pub struct AutowireResolver<'a> {
    registry: &'a DefinitionRegistry,
    index: Cow<'a, CapabilityIndex>,
}

impl<'a> AutowireResolver<'a> {
    /// Create a resolver and index the registry's capabilities
    pub fn new(registry: &'a DefinitionRegistry) -> Self {
        Self {
            registry,
            index: Cow::Owned(CapabilityIndex::from_registry(registry)),
        }
    }

    /// Create a resolver reusing an index built earlier from the same registry
    pub fn with_index(registry: &'a DefinitionRegistry, index: &'a CapabilityIndex) -> Self {
        Self {
            registry,
            index: Cow::Borrowed(index),
        }
    }

    /// Arguments for every unset position covered by the signature
    ///
    /// Positions beyond the signature stay unset.
    pub fn autowire(&self, definition: &ServiceDefinition) -> Result<BTreeMap<usize, Argument>> {
        let mut wired = BTreeMap::new();
        for position in definition.unset_positions() {
            if let Some(slot) = definition.signature.get(position) {
                wired.insert(position, self.resolve_slot(definition, position, slot)?);
            }
        }
        Ok(wired)
    }

    /// Resolve one constructor position
    pub fn resolve_slot(
        &self,
        definition: &ServiceDefinition,
        position: usize,
        slot: &ParameterSlot,
    ) -> Result<Argument> {
        if let Some(target) = &slot.target {
            let reference = Reference::new(target);
            return Ok(Argument::Service(if slot.nullable {
                reference.optional()
            } else {
                reference
            }));
        }

        let Some(capability) = &slot.capability else {
            return Self::fallback(slot).ok_or_else(|| {
                Error::invalid_definition(
                    &definition.id,
                    format!(
                        "argument #{position} (${}) declares no capability and has no default",
                        slot.name
                    ),
                )
            });
        };

        let Candidates { accepted, rejected } = self.candidates(definition, capability);
        match accepted.len() {
            0 => Self::fallback(slot).ok_or_else(|| Error::NoCandidate {
                service: definition.id.clone(),
                position,
                argument: slot.name.clone(),
                capability: capability.clone(),
                rejected,
            }),
            1 => Ok(accepted
                .into_iter()
                .next()
                .map(Argument::service)
                .unwrap_or_else(Argument::null)),
            _ => {
                let defaults: Vec<&String> = accepted
                    .iter()
                    .filter(|id| {
                        self.registry
                            .find(id)
                            .is_some_and(|candidate| candidate.default_for.contains(capability))
                    })
                    .collect();
                match defaults.as_slice() {
                    [only] => Ok(Argument::service(only.as_str())),
                    _ => Err(Error::AmbiguousCandidate {
                        service: definition.id.clone(),
                        position,
                        argument: slot.name.clone(),
                        capability: capability.clone(),
                        candidates: accepted.into_iter().collect(),
                        rejected,
                    }),
                }
            }
        }
    }

    fn fallback(slot: &ParameterSlot) -> Option<Argument> {
        match (&slot.default, slot.nullable) {
            (Some(default), _) => Some(Argument::Literal(default.clone())),
            (None, true) => Some(Argument::null()),
            (None, false) => None,
        }
    }

    fn candidates(&self, consumer: &ServiceDefinition, capability: &str) -> Candidates {
        let mut accepted = BTreeSet::new();
        let mut rejected = Vec::new();
        for id in self.index.providers(capability) {
            let Some(candidate) = self.registry.find(id) else {
                continue;
            };
            if candidate.is_abstract {
                rejected.push(format!("{id} (abstract)"));
                continue;
            }
            if id == consumer.id {
                rejected.push(format!("{id} (self-reference)"));
                continue;
            }
            if let Some(decorator) = &candidate.decorated_by {
                // A decorator receives the service it wraps; everyone else gets the outermost decorator
                if *decorator == consumer.id {
                    return Candidates {
                        accepted: BTreeSet::from([id.to_string()]),
                        rejected,
                    };
                }
                let outermost = self.outermost_decorator(decorator);
                if outermost != consumer.id {
                    accepted.insert(outermost);
                }
                continue;
            }
            accepted.insert(id.to_string());
        }
        Candidates { accepted, rejected }
    }

    fn outermost_decorator(&self, decorator: &str) -> String {
        let mut current = decorator.to_string();
        let mut seen = BTreeSet::new();
        while seen.insert(current.clone()) {
            match self
                .registry
                .find(&current)
                .and_then(|d| d.decorated_by.clone())
            {
                Some(next) => current = next,
                None => break,
            }
        }
        current
    }
}

//! Inlining of single-use private services

use crate::ports::CompilerPass;
use std::collections::{BTreeMap, HashSet};
use tracing::{debug, trace};
use weaver_domain::error::Result;
use weaver_domain::registry::DefinitionRegistry;
use weaver_domain::value_objects::{Argument, ServiceDefinition};

/// Flattens private services used exactly once into their consumer
///
/// A service qualifies when it is private, not lazy, referenced by exactly
/// one eager reference and by no alias or tagged collection. A transient
/// service can always be inlined; a shared one only into a shared consumer,
/// so it is still built at most once.
pub struct InlineServiceDefinitionsPass;

#[derive(Default)]
struct Usage {
    consumers: BTreeMap<String, Vec<String>>,
    blocked: HashSet<String>,
}

impl Usage {
    fn collect(registry: &DefinitionRegistry) -> Self {
        let mut usage = Self::default();
        for definition in registry.definitions() {
            for argument in definition.arguments.values() {
                usage.record(argument, &definition.id);
            }
        }
        for (id, _) in registry.aliases() {
            if let Ok(target) = registry.resolve_alias(id) {
                usage.blocked.insert(target);
            }
        }
        usage
    }

    fn record(&mut self, argument: &Argument, owner: &str) {
        match argument {
            Argument::Service(reference) => {
                if reference.lazy {
                    self.blocked.insert(reference.id.clone());
                }
                self.consumers
                    .entry(reference.id.clone())
                    .or_default()
                    .push(owner.to_string());
            }
            Argument::Collection(items) => {
                for item in items {
                    self.record(item, owner);
                }
            }
            Argument::Inline(definition) => {
                for nested in definition.arguments.values() {
                    self.record(nested, owner);
                }
            }
            Argument::Tagged(_) | Argument::Parameter(_) | Argument::Literal(_) => {}
        }
    }

    fn sole_consumer(&self, id: &str) -> Option<&str> {
        match self.consumers.get(id).map(Vec::as_slice) {
            Some([consumer]) if consumer != id && !self.blocked.contains(id) => Some(consumer.as_str()),
            _ => None,
        }
    }
}

impl CompilerPass for InlineServiceDefinitionsPass {
    fn name(&self) -> &str {
        "inline_service_definitions"
    }

    fn process(&self, registry: &mut DefinitionRegistry) -> Result<()> {
        let usage = Usage::collect(registry);
        let mut tagged = HashSet::new();
        for definition in registry.definitions() {
            for argument in definition.arguments.values() {
                argument.for_each_tag(&mut |tag| {
                    tagged.extend(registry.find_tagged_by(tag).into_iter().map(|e| e.id));
                });
            }
        }

        let candidates: Vec<String> = registry
            .definitions()
            .filter(|definition| {
                !definition.is_public() && !definition.lazy && !tagged.contains(&definition.id)
            })
            .filter(|definition| {
                usage.sole_consumer(&definition.id).is_some_and(|consumer| {
                    !definition.is_shared()
                        || registry.find(consumer).is_some_and(ServiceDefinition::is_shared)
                })
            })
            .map(|definition| definition.id.clone())
            .collect();

        let mut inlined = 0;
        for id in candidates {
            let Some(definition) = registry.remove(&id) else {
                continue;
            };
            let mut pending = Some(definition);
            for consumer in registry.definitions_mut() {
                if replace_reference(&mut consumer.arguments, &id, &mut pending) {
                    trace!(service = %id, consumer = %consumer.id, "inlined");
                    break;
                }
            }
            if let Some(unplaced) = pending {
                registry.add(unplaced);
            } else {
                inlined += 1;
            }
        }
        debug!(inlined, "private services inlined");
        Ok(())
    }
}

fn replace_reference(
    arguments: &mut BTreeMap<usize, Argument>,
    id: &str,
    pending: &mut Option<ServiceDefinition>,
) -> bool {
    arguments
        .values_mut()
        .any(|argument| replace_in(argument, id, pending))
}

fn replace_in(argument: &mut Argument, id: &str, pending: &mut Option<ServiceDefinition>) -> bool {
    match argument {
        Argument::Service(reference) if reference.id == id => match pending.take() {
            Some(definition) => {
                *argument = Argument::Inline(Box::new(definition));
                true
            }
            None => false,
        },
        Argument::Collection(items) => items.iter_mut().any(|item| replace_in(item, id, pending)),
        Argument::Inline(definition) => replace_reference(&mut definition.arguments, id, pending),
        Argument::Service(_) | Argument::Parameter(_) | Argument::Literal(_) | Argument::Tagged(_) => {
            false
        }
    }
}

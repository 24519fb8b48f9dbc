//! Autowiring pass

use crate::graph::public_roots;
use crate::ports::CompilerPass;
use crate::resolvers::{AutowireResolver, CapabilityIndex};
use crate::tags::TagIndex;
use std::collections::{HashSet, VecDeque};
use tracing::trace;
use weaver_domain::error::Result;
use weaver_domain::registry::DefinitionRegistry;

/// Fills unset arguments of autowired definitions
///
/// By default only definitions reachable from a public root are autowired,
/// discovered as a worklist so that references produced by autowiring are
/// followed too. Definitions nobody can reach are left untouched and later
/// pruned. In eager mode every definition is autowired.
pub struct AutowirePass {
    eager: bool,
}

impl AutowirePass {
    /// Autowire only what public roots reach
    pub fn reachable_only() -> Self {
        Self { eager: false }
    }

    /// Autowire every definition
    pub fn eager() -> Self {
        Self { eager: true }
    }
}

impl CompilerPass for AutowirePass {
    fn name(&self) -> &str {
        "autowire"
    }

    fn process(&self, registry: &mut DefinitionRegistry) -> Result<()> {
        let index = CapabilityIndex::from_registry(registry);
        let tags = TagIndex::from_registry(registry);
        let mut queue: VecDeque<String> = if self.eager {
            registry.ids().into()
        } else {
            public_roots(registry).into()
        };
        let mut visited = HashSet::new();

        while let Some(requested) = queue.pop_front() {
            let id = registry.resolve_alias(&requested).unwrap_or(requested);
            if !visited.insert(id.clone()) {
                continue;
            }
            let Some(definition) = registry.find(&id) else {
                continue;
            };

            if definition.autowire && !definition.is_abstract {
                let wired = AutowireResolver::with_index(registry, &index).autowire(definition)?;
                if !wired.is_empty() {
                    trace!(service = %id, arguments = wired.len(), "autowired");
                    registry.get_mut(&id)?.arguments.extend(wired);
                }
            }

            let definition = registry.get(&id)?;
            for argument in definition.arguments.values() {
                argument.for_each_reference(&mut |reference| queue.push_back(reference.id.clone()));
                argument.for_each_tag(&mut |tag| queue.extend(tags.ordered_ids(tag)));
            }
        }
        Ok(())
    }
}

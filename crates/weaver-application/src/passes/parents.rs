//! Parent definition inheritance

use crate::ports::CompilerPass;
use tracing::trace;
use weaver_domain::error::{Error, Result};
use weaver_domain::registry::DefinitionRegistry;
use weaver_domain::value_objects::ServiceDefinition;

/// Merges every child definition with its (transitively resolved) parent
///
/// The child inherits the class when it has none, the signature when its own
/// is empty, the union of capabilities, the autowire and lazy flags, and every
/// argument position it does not set itself. Tags, visibility, sharing and the
/// abstract flag are never inherited.
pub struct ResolveParentsPass;

impl CompilerPass for ResolveParentsPass {
    fn name(&self) -> &str {
        "resolve_parents"
    }

    fn process(&self, registry: &mut DefinitionRegistry) -> Result<()> {
        let children: Vec<String> = registry
            .definitions()
            .filter(|definition| definition.parent.is_some())
            .map(|definition| definition.id.clone())
            .collect();
        for id in children {
            let resolved = resolve(registry, &id, &mut Vec::new())?;
            trace!(service = %id, "resolved parent definition");
            registry.add(resolved);
        }
        Ok(())
    }
}

fn resolve(
    registry: &DefinitionRegistry,
    id: &str,
    chain: &mut Vec<String>,
) -> Result<ServiceDefinition> {
    let child = registry.get(id)?.clone();
    let Some(parent_id) = child.parent.clone() else {
        return Ok(child);
    };
    if chain.iter().any(|seen| seen == id) {
        chain.push(id.to_string());
        return Err(Error::invalid_definition(
            id,
            format!("circular parent chain: {}", chain.join(" -> ")),
        ));
    }
    let parent_id = registry.resolve_alias(&parent_id)?;
    if !registry.has_definition(&parent_id) {
        return Err(Error::unresolved_reference(parent_id, id));
    }

    chain.push(id.to_string());
    let parent = resolve(registry, &parent_id, chain)?;
    chain.pop();

    Ok(inherit(parent, child))
}

fn inherit(parent: ServiceDefinition, mut child: ServiceDefinition) -> ServiceDefinition {
    if child.class.is_none() {
        child.class = parent.class;
    }
    if child.signature.is_empty() {
        child.signature = parent.signature;
    }
    child.capabilities.extend(parent.capabilities);
    child.autowire |= parent.autowire;
    child.lazy |= parent.lazy;

    let mut arguments = parent.arguments;
    arguments.extend(std::mem::take(&mut child.arguments));
    child.arguments = arguments;
    child.parent = None;
    child
}

//! Removal passes

use crate::graph::reachable_from_public;
use crate::ports::CompilerPass;
use tracing::debug;
use weaver_domain::error::Result;
use weaver_domain::registry::DefinitionRegistry;

/// Deletes abstract templates
pub struct RemoveAbstractDefinitionsPass;

impl CompilerPass for RemoveAbstractDefinitionsPass {
    fn name(&self) -> &str {
        "remove_abstract_definitions"
    }

    fn process(&self, registry: &mut DefinitionRegistry) -> Result<()> {
        let templates: Vec<String> = registry
            .definitions()
            .filter(|definition| definition.is_abstract)
            .map(|definition| definition.id.clone())
            .collect();
        for id in &templates {
            registry.remove(id);
        }
        debug!(removed = templates.len(), "abstract definitions removed");
        Ok(())
    }
}

/// Deletes private aliases; references to them were already rewritten
pub struct RemovePrivateAliasesPass;

impl CompilerPass for RemovePrivateAliasesPass {
    fn name(&self) -> &str {
        "remove_private_aliases"
    }

    fn process(&self, registry: &mut DefinitionRegistry) -> Result<()> {
        let private: Vec<String> = registry
            .aliases()
            .filter(|(_, alias)| !alias.is_public())
            .map(|(id, _)| id.to_string())
            .collect();
        for id in &private {
            registry.remove_alias(id);
        }
        debug!(removed = private.len(), "private aliases removed");
        Ok(())
    }
}

/// Deletes every definition no public root can reach
///
/// Roots are public definitions and the targets of public aliases; edges are
/// references (lazy ones included) and tagged collections.
pub struct RemoveUnusedDefinitionsPass;

impl CompilerPass for RemoveUnusedDefinitionsPass {
    fn name(&self) -> &str {
        "remove_unused_definitions"
    }

    fn process(&self, registry: &mut DefinitionRegistry) -> Result<()> {
        let reachable = reachable_from_public(registry);
        let unused: Vec<String> = registry
            .ids()
            .into_iter()
            .filter(|id| !reachable.contains(id))
            .collect();
        for id in &unused {
            registry.remove(id);
        }
        debug!(removed = unused.len(), kept = registry.len(), "unused definitions removed");
        Ok(())
    }
}

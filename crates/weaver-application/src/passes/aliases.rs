//! Alias reference rewriting

use crate::ports::CompilerPass;
use std::collections::HashMap;
use weaver_domain::error::{Error, Result};
use weaver_domain::registry::DefinitionRegistry;

/// Validates every alias and points references at final definitions
///
/// Fails with `CircularAlias` on alias loops and `UnresolvedReference` when
/// an alias chain ends at an identifier with no definition.
pub struct ResolveAliasReferencesPass;

impl CompilerPass for ResolveAliasReferencesPass {
    fn name(&self) -> &str {
        "resolve_alias_references"
    }

    fn process(&self, registry: &mut DefinitionRegistry) -> Result<()> {
        let mut targets: HashMap<String, String> = HashMap::new();
        for (id, alias) in registry.aliases() {
            let target = registry.resolve_alias(id)?;
            if !registry.has_definition(&target) {
                return Err(Error::unresolved_reference(&alias.target, id));
            }
            targets.insert(id.to_string(), target);
        }
        if targets.is_empty() {
            return Ok(());
        }

        for definition in registry.definitions_mut() {
            for argument in definition.arguments.values_mut() {
                argument.for_each_reference_mut(&mut |reference| {
                    if let Some(target) = targets.get(&reference.id) {
                        reference.id.clone_from(target);
                    }
                });
            }
        }
        Ok(())
    }
}

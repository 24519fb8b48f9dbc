//! Optional references to missing services

use crate::ports::CompilerPass;
use std::collections::HashSet;
use weaver_domain::error::Result;
use weaver_domain::registry::DefinitionRegistry;
use weaver_domain::value_objects::Argument;

/// Replaces optional references to identifiers that do not exist with the
/// absent value; inside collections the item is dropped instead
pub struct ResolveInvalidReferencesPass;

impl CompilerPass for ResolveInvalidReferencesPass {
    fn name(&self) -> &str {
        "resolve_invalid_references"
    }

    fn process(&self, registry: &mut DefinitionRegistry) -> Result<()> {
        let known: HashSet<String> = registry
            .ids()
            .into_iter()
            .chain(registry.aliases().map(|(id, _)| id.to_string()))
            .collect();
        let exists = |id: &str| known.contains(id);
        for definition in registry.definitions_mut() {
            for argument in definition.arguments.values_mut() {
                drop_missing(argument, &exists);
            }
        }
        Ok(())
    }
}

fn is_missing_optional(argument: &Argument, exists: &impl Fn(&str) -> bool) -> bool {
    matches!(argument, Argument::Service(reference) if reference.optional && !exists(&reference.id))
}

fn drop_missing(argument: &mut Argument, exists: &impl Fn(&str) -> bool) {
    if is_missing_optional(argument, exists) {
        *argument = Argument::null();
        return;
    }
    match argument {
        Argument::Collection(items) => {
            items.retain(|item| !is_missing_optional(item, exists));
            for item in items {
                drop_missing(item, exists);
            }
        }
        Argument::Inline(definition) => {
            for nested in definition.arguments.values_mut() {
                drop_missing(nested, exists);
            }
        }
        Argument::Service(_) | Argument::Parameter(_) | Argument::Literal(_) | Argument::Tagged(_) => {}
    }
}

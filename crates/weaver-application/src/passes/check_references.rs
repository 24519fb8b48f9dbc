//! Reference existence checks

use crate::ports::CompilerPass;
use weaver_domain::error::{Error, Result};
use weaver_domain::registry::DefinitionRegistry;
use weaver_domain::value_objects::Reference;

/// Every required reference must name an existing, non-abstract definition,
/// and every public alias must end at one
pub struct CheckReferencesPass;

impl CompilerPass for CheckReferencesPass {
    fn name(&self) -> &str {
        "check_references"
    }

    fn process(&self, registry: &mut DefinitionRegistry) -> Result<()> {
        let registry: &DefinitionRegistry = registry;
        for definition in registry.definitions().filter(|d| !d.is_abstract) {
            let mut outcome = Ok(());
            for argument in definition.arguments.values() {
                argument.for_each_reference(&mut |reference| {
                    if outcome.is_ok() {
                        outcome = check(registry, &definition.id, reference);
                    }
                });
            }
            outcome?;
        }
        for (id, alias) in registry.aliases() {
            let target = registry.resolve_alias(id)?;
            match registry.find(&target) {
                None => return Err(Error::unresolved_reference(&alias.target, id)),
                Some(found) if found.is_abstract && alias.is_public() => {
                    return Err(Error::invalid_definition(
                        id,
                        format!("public alias points to abstract service '{target}'"),
                    ));
                }
                Some(_) => {}
            }
        }
        Ok(())
    }
}

fn check(registry: &DefinitionRegistry, owner: &str, reference: &Reference) -> Result<()> {
    let target = registry.resolve_alias(&reference.id)?;
    match registry.find(&target) {
        None if reference.optional => Ok(()),
        None => Err(Error::unresolved_reference(&reference.id, owner)),
        Some(found) if found.is_abstract => Err(Error::invalid_definition(
            owner,
            format!("references abstract service '{target}'"),
        )),
        Some(_) => Ok(()),
    }
}

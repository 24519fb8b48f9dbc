//! Parameter resolution pass

use crate::ports::CompilerPass;
use crate::resolvers::ParameterResolver;
use tracing::debug;
use weaver_domain::error::Result;
use weaver_domain::registry::DefinitionRegistry;
use weaver_domain::value_objects::Argument;

/// Resolves every parameter, freezes the bag and replaces parameter
/// arguments with their values
///
/// Placeholders inside string literals and autowiring defaults are
/// interpolated too. A bag that is already frozen is not interpolated again.
pub struct ResolveParametersPass;

impl CompilerPass for ResolveParametersPass {
    fn name(&self) -> &str {
        "resolve_parameters"
    }

    fn process(&self, registry: &mut DefinitionRegistry) -> Result<()> {
        let interpolate = !registry.parameters().is_frozen();
        if interpolate {
            let resolved = ParameterResolver::new(registry.parameters()).resolve_all()?;
            debug!(parameters = resolved.len(), "parameters resolved");
            registry.parameters_mut().freeze(resolved);
        }

        let bag = registry.parameters().clone();
        let mut resolver = ParameterResolver::new(&bag);
        for definition in registry.definitions_mut() {
            let owner = definition.id.clone();
            for argument in definition.arguments.values_mut() {
                resolve_argument(&mut resolver, argument, &owner, interpolate)?;
            }
            if interpolate {
                for slot in &mut definition.signature {
                    if let Some(default) = slot.default.as_mut() {
                        *default = resolver.resolve_value(default, Some(&owner))?;
                    }
                }
            }
        }
        Ok(())
    }
}

fn resolve_argument(
    resolver: &mut ParameterResolver<'_>,
    argument: &mut Argument,
    owner: &str,
    interpolate: bool,
) -> Result<()> {
    match argument {
        Argument::Parameter(name) => {
            *argument = Argument::Literal(resolver.resolve(name, Some(owner))?);
        }
        Argument::Literal(literal) if interpolate => {
            *literal = resolver.resolve_value(literal, Some(owner))?;
        }
        Argument::Collection(items) => {
            for item in items {
                resolve_argument(resolver, item, owner, interpolate)?;
            }
        }
        Argument::Inline(definition) => {
            let inner_owner = definition.id.clone();
            for nested in definition.arguments.values_mut() {
                resolve_argument(resolver, nested, &inner_owner, interpolate)?;
            }
        }
        Argument::Literal(_) | Argument::Service(_) | Argument::Tagged(_) => {}
    }
    Ok(())
}

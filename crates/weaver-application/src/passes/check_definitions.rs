//! Definition consistency checks

use crate::graph::reachable_from_public;
use crate::ports::CompilerPass;
use weaver_domain::error::{Error, Result};
use weaver_domain::registry::DefinitionRegistry;
use weaver_domain::value_objects::{Argument, ServiceDefinition};

/// Rejects definitions that cannot be built as declared
///
/// Abstract templates are skipped. When unreachable definitions are pruned
/// afterwards, missing arguments are only reported for reachable ones.
pub struct CheckDefinitionsPass {
    prune_unreachable: bool,
}

impl CheckDefinitionsPass {
    /// Report missing arguments for every definition, or only for reachable ones
    pub fn new(prune_unreachable: bool) -> Self {
        Self { prune_unreachable }
    }
}

impl CompilerPass for CheckDefinitionsPass {
    fn name(&self) -> &str {
        "check_definitions"
    }

    fn process(&self, registry: &mut DefinitionRegistry) -> Result<()> {
        let reachable = self
            .prune_unreachable
            .then(|| reachable_from_public(registry));
        for definition in registry.definitions().filter(|d| !d.is_abstract) {
            if let Some(parent) = &definition.parent {
                return Err(Error::invalid_definition(
                    &definition.id,
                    format!("parent '{parent}' was never resolved"),
                ));
            }
            if let Some(decoration) = &definition.decorates {
                return Err(Error::invalid_definition(
                    &definition.id,
                    format!("decoration of '{}' was never applied", decoration.target),
                ));
            }
            for argument in definition.arguments.values() {
                check_argument(definition, argument)?;
            }
            let checked = reachable
                .as_ref()
                .is_none_or(|reachable| reachable.contains(&definition.id));
            if checked {
                check_positions(definition)?;
            }
        }
        Ok(())
    }
}

fn check_positions(definition: &ServiceDefinition) -> Result<()> {
    match definition.unset_positions().first() {
        None => Ok(()),
        Some(&position) => {
            let name = definition
                .signature
                .get(position)
                .map(|slot| format!(" (${})", slot.name))
                .unwrap_or_default();
            Err(Error::invalid_definition(
                &definition.id,
                format!("argument #{position}{name} is not set"),
            ))
        }
    }
}

fn check_argument(definition: &ServiceDefinition, argument: &Argument) -> Result<()> {
    match argument {
        Argument::Parameter(name) => Err(Error::invalid_definition(
            &definition.id,
            format!("parameter '{name}' was never resolved"),
        )),
        Argument::Collection(items) => items
            .iter()
            .try_for_each(|item| check_argument(definition, item)),
        Argument::Inline(inline) => inline
            .arguments
            .values()
            .try_for_each(|nested| check_argument(inline, nested)),
        Argument::Service(_) | Argument::Literal(_) | Argument::Tagged(_) => Ok(()),
    }
}

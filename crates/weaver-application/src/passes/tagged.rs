//! Tagged collection baking

use crate::ports::CompilerPass;
use crate::tags::TagIndex;
use weaver_domain::error::Result;
use weaver_domain::registry::DefinitionRegistry;
use weaver_domain::value_objects::Argument;

/// Replaces every tagged-collection argument with the concrete, ordered
/// list of references it denotes
pub struct ResolveTaggedCollectionsPass;

impl CompilerPass for ResolveTaggedCollectionsPass {
    fn name(&self) -> &str {
        "resolve_tagged_collections"
    }

    fn process(&self, registry: &mut DefinitionRegistry) -> Result<()> {
        let tags = TagIndex::from_registry(registry);
        for definition in registry.definitions_mut() {
            for argument in definition.arguments.values_mut() {
                bake(argument, &tags);
            }
        }
        Ok(())
    }
}

fn bake(argument: &mut Argument, tags: &TagIndex) {
    match argument {
        Argument::Tagged(tag) => {
            let items = tags
                .ordered_ids(tag)
                .into_iter()
                .map(Argument::service)
                .collect();
            *argument = Argument::Collection(items);
        }
        Argument::Collection(items) => {
            for item in items {
                bake(item, tags);
            }
        }
        Argument::Inline(definition) => {
            for nested in definition.arguments.values_mut() {
                bake(nested, tags);
            }
        }
        Argument::Service(_) | Argument::Parameter(_) | Argument::Literal(_) => {}
    }
}

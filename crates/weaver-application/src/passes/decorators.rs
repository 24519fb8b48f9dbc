//! Service decoration

use crate::ports::CompilerPass;
use std::collections::BTreeMap;
use tracing::debug;
use weaver_domain::constants::INNER_SUFFIX;
use weaver_domain::error::{Error, Result};
use weaver_domain::registry::DefinitionRegistry;
use weaver_domain::value_objects::{Alias, Visibility};

/// Rewires decorated identifiers to their decorators
///
/// The decorated service moves to `<decorator>.inner` (or the explicit inner
/// identifier) and becomes private; the decorated identifier becomes an alias
/// to the decorator with the original visibility. Tags move from the wrapped
/// definition to the decorator, so tagged collections receive the outermost
/// service. When several decorators
/// target one identifier, the highest priority wraps the original first.
pub struct DecoratorPass;

struct Decorator {
    id: String,
    inner_id: String,
    priority: i32,
}

impl CompilerPass for DecoratorPass {
    fn name(&self) -> &str {
        "decorate_services"
    }

    fn process(&self, registry: &mut DefinitionRegistry) -> Result<()> {
        let mut by_target: BTreeMap<String, Vec<Decorator>> = BTreeMap::new();
        for definition in registry.definitions() {
            if let Some(decoration) = &definition.decorates {
                by_target
                    .entry(decoration.target.clone())
                    .or_default()
                    .push(Decorator {
                        id: definition.id.clone(),
                        inner_id: decoration
                            .inner_id
                            .clone()
                            .unwrap_or_else(|| format!("{}{INNER_SUFFIX}", definition.id)),
                        priority: decoration.priority,
                    });
            }
        }

        for (target, mut decorators) in by_target {
            decorators.sort_by(|a, b| b.priority.cmp(&a.priority).then_with(|| a.id.cmp(&b.id)));
            for decorator in decorators {
                decorate(registry, &target, &decorator)?;
                debug!(service = %target, decorator = %decorator.id, "service decorated");
            }
        }
        Ok(())
    }
}

fn decorate(registry: &mut DefinitionRegistry, target: &str, decorator: &Decorator) -> Result<()> {
    if target == decorator.id {
        return Err(Error::invalid_definition(
            &decorator.id,
            "a service cannot decorate itself",
        ));
    }
    if registry.has(&decorator.inner_id) {
        return Err(Error::invalid_definition(
            &decorator.id,
            format!("inner identifier '{}' is already in use", decorator.inner_id),
        ));
    }

    let (visibility, wrapped) = if let Some(alias) = registry.remove_alias(target) {
        let wrapped = registry.resolve_alias(&alias.target)?;
        let visibility = alias.visibility;
        registry.set_alias(&decorator.inner_id, Alias::private(alias.target))?;
        (visibility, wrapped)
    } else if registry.has_definition(target) {
        let visibility = registry.get(target)?.visibility;
        registry.rename(target, &decorator.inner_id)?;
        registry.get_mut(&decorator.inner_id)?.visibility = Visibility::Private;
        (visibility, decorator.inner_id.clone())
    } else {
        return Err(Error::unresolved_reference(target, &decorator.id));
    };

    if registry.has_definition(&wrapped) {
        let original = registry.get_mut(&wrapped)?;
        original.decorated_by = Some(decorator.id.clone());
        let mut tags = std::mem::take(&mut original.tags);
        let outer = registry.get_mut(&decorator.id)?;
        tags.append(&mut outer.tags);
        outer.tags = tags;
    }
    registry.set_alias(
        target,
        Alias {
            target: decorator.id.clone(),
            visibility,
        },
    )?;
    registry.get_mut(&decorator.id)?.decorates = None;
    Ok(())
}

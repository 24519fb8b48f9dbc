//! Reference resolution
//!
//! Turns symbolic arguments into concrete values or deferred service
//! bindings. Service references never produce instances here: they bind to
//! the final definition identifier, and the instance is built later by the
//! run-time container in the precomputed order.

use crate::resolvers::ParameterResolver;
use crate::tags::TagIndex;
use weaver_domain::error::{Error, Result};
use weaver_domain::registry::DefinitionRegistry;
use weaver_domain::value_objects::{Argument, Literal, Reference, ServiceDefinition};

/// Concrete form of an [`Argument`]
#[derive(Debug, Clone, PartialEq)]
pub enum ResolvedArgument {
    /// Literal value, `Null` for absent optional references
    Value(Literal),
    /// Deferred binding to a definition that is compiled on its own
    Service {
        /// Final (non-alias) identifier
        id: String,
        /// Construction deferred to first use
        lazy: bool,
    },
    /// Ordered sequence of resolved items
    Collection(Vec<ResolvedArgument>),
    /// Private definition built for this consumer only
    Inline(Box<ServiceDefinition>),
}

/// Resolves arguments against a registry
pub struct ReferenceResolver<'a> {
    registry: &'a DefinitionRegistry,
    tags: TagIndex,
}

impl<'a> ReferenceResolver<'a> {
    /// Create a resolver and index the registry's tags
    pub fn new(registry: &'a DefinitionRegistry) -> Self {
        Self {
            registry,
            tags: TagIndex::from_registry(registry),
        }
    }

    /// Follow aliases; `None` when no definition exists at the end of the chain
    pub fn resolve_id(&self, id: &str) -> Result<Option<String>> {
        let target = self.registry.resolve_alias(id)?;
        Ok(self.registry.has_definition(&target).then_some(target))
    }

    /// Resolve a service reference
    ///
    /// Returns `None` for an optional reference whose target is absent and
    /// fails with `UnresolvedReference` for a required one.
    pub fn resolve_reference(
        &self,
        reference: &Reference,
        owner: &str,
    ) -> Result<Option<ResolvedArgument>> {
        match self.resolve_id(&reference.id)? {
            Some(id) => {
                let lazy = reference.lazy || self.registry.find(&id).is_some_and(|d| d.lazy);
                Ok(Some(ResolvedArgument::Service { id, lazy }))
            }
            None if reference.optional => Ok(None),
            None => Err(Error::unresolved_reference(&reference.id, owner)),
        }
    }

    /// Resolve a parameter by name
    pub fn resolve_parameter(&self, name: &str, owner: &str) -> Result<Literal> {
        let parameters = self.registry.parameters();
        if parameters.is_frozen() {
            return parameters
                .get(name)
                .cloned()
                .ok_or_else(|| Error::unresolved_parameter(name, Some(owner.to_string())));
        }
        ParameterResolver::new(parameters).resolve(name, Some(owner))
    }

    /// Identifiers of every concrete service tagged `tag`, in collection order
    pub fn resolve_tagged(&self, tag: &str) -> Vec<String> {
        self.tags.ordered_ids(tag)
    }

    /// Resolve any argument held by the definition `owner`
    pub fn resolve(&self, argument: &Argument, owner: &str) -> Result<ResolvedArgument> {
        match argument {
            Argument::Service(reference) => Ok(self
                .resolve_reference(reference, owner)?
                .unwrap_or(ResolvedArgument::Value(Literal::Null))),
            Argument::Parameter(name) => {
                Ok(ResolvedArgument::Value(self.resolve_parameter(name, owner)?))
            }
            Argument::Literal(literal) => Ok(ResolvedArgument::Value(literal.clone())),
            Argument::Tagged(tag) => Ok(ResolvedArgument::Collection(
                self.resolve_tagged(tag)
                    .into_iter()
                    .map(|id| {
                        let lazy = self.registry.find(&id).is_some_and(|d| d.lazy);
                        ResolvedArgument::Service { id, lazy }
                    })
                    .collect(),
            )),
            Argument::Collection(items) => items
                .iter()
                .map(|item| self.resolve(item, owner))
                .collect::<Result<Vec<_>>>()
                .map(ResolvedArgument::Collection),
            Argument::Inline(definition) => Ok(ResolvedArgument::Inline(definition.clone())),
        }
    }
}

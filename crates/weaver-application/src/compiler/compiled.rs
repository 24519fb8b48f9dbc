//! Frozen compilation output
//!
//! A [`CompiledContainer`] is the immutable result of one compilation: a
//! descriptor per service with fully resolved arguments and the height of
//! its eager dependency chain, from which the construction order of any
//! service is derived on request. It is plain data and serializes to JSON
//! for caching.

use crate::graph::{post_order, OrderPlanner, ServiceGraph};
use crate::resolvers::{ReferenceResolver, ResolvedArgument};
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use weaver_domain::error::{Error, Result};
use weaver_domain::registry::DefinitionRegistry;
use weaver_domain::value_objects::{Literal, ServiceDefinition};

/// Resolved constructor argument
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum CompiledArgument {
    /// Literal, `Null` for absent optional references
    Value(Literal),
    /// Another compiled service
    Service {
        /// Service identifier
        id: String,
        /// Passed as a deferred handle built on first use
        deferred: bool,
    },
    /// Ordered sequence
    Collection(Vec<CompiledArgument>),
    /// Private service built for this consumer only
    Inline(Box<CompiledService>),
}

/// Construction recipe of one service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompiledService {
    /// Service identifier
    pub id: String,
    /// Class the service is built from
    pub class: String,
    /// Positional arguments
    pub arguments: Vec<CompiledArgument>,
    /// Memoized for the container lifetime
    pub shared: bool,
    /// Retrievable from outside the container
    pub public: bool,
    /// Handed out as a deferred handle to consumers
    pub lazy: bool,
    /// Distinct eager dependencies, inline definitions included
    pub dependencies: Vec<String>,
    /// Length of the longest eager dependency chain below this service
    pub height: usize,
}

/// Alias surviving compilation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompiledAlias {
    /// Final service identifier
    pub target: String,
    /// Retrievable from outside the container
    pub public: bool,
}

/// Immutable, serializable result of a compilation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompiledContainer {
    services: BTreeMap<String, CompiledService>,
    aliases: BTreeMap<String, CompiledAlias>,
    parameters: BTreeMap<String, Literal>,
    registry: DefinitionRegistry,
    /// Private identifiers that compilation removed
    #[serde(default)]
    hidden: BTreeSet<String>,
}

impl CompiledContainer {
    /// Freeze a fully processed registry
    pub fn freeze(registry: DefinitionRegistry) -> Result<Self> {
        let (services, aliases) = {
            let graph = ServiceGraph::from_registry(&registry);
            let resolver = ReferenceResolver::new(&registry);
            let mut lowering = Lowering {
                resolver: &resolver,
                graph: &graph,
                planner: OrderPlanner::new(&graph),
            };

            let mut services = BTreeMap::new();
            for definition in registry.definitions() {
                services.insert(definition.id.clone(), lowering.service(definition)?);
            }

            let mut aliases = BTreeMap::new();
            for (id, alias) in registry.aliases() {
                let target = resolver
                    .resolve_id(id)?
                    .ok_or_else(|| Error::unresolved_reference(&alias.target, id))?;
                aliases.insert(
                    id.to_string(),
                    CompiledAlias {
                        target,
                        public: alias.is_public(),
                    },
                );
            }
            (services, aliases)
        };

        Ok(Self {
            services,
            aliases,
            parameters: registry.parameters().all().clone(),
            registry,
            hidden: BTreeSet::new(),
        })
    }

    /// Remember private identifiers that may no longer have a descriptor
    ///
    /// Identifiers that still name a service or alias are ignored.
    #[must_use]
    pub fn with_hidden(mut self, ids: impl IntoIterator<Item = String>) -> Self {
        let hidden: BTreeSet<String> = ids
            .into_iter()
            .filter(|id| !self.services.contains_key(id) && !self.aliases.contains_key(id))
            .collect();
        self.hidden.extend(hidden);
        self
    }

    /// Whether `id` can be requested from outside the container
    pub fn has(&self, id: &str) -> bool {
        match self.aliases.get(id) {
            Some(alias) => alias.public && self.services.contains_key(&alias.target),
            None => self.services.get(id).is_some_and(|service| service.public),
        }
    }

    /// External lookup: follows public aliases and enforces visibility
    ///
    /// Private identifiers fail with `Access`, including those inlined into
    /// their consumer or removed by compilation.
    pub fn lookup(&self, id: &str) -> Result<&CompiledService> {
        if let Some(alias) = self.aliases.get(id) {
            if !alias.public {
                return Err(Error::access(id));
            }
            return self
                .services
                .get(&alias.target)
                .ok_or_else(|| Error::not_found(format!("service '{id}'")));
        }
        match self.services.get(id) {
            Some(service) if service.public => Ok(service),
            Some(_) => Err(Error::access(id)),
            None if self.hidden.contains(id) || self.inline_services().contains_key(id) => {
                Err(Error::access(id))
            }
            None => Err(Error::not_found(format!("service '{id}'"))),
        }
    }

    /// Internal lookup without alias resolution or visibility checks
    pub fn service(&self, id: &str) -> Option<&CompiledService> {
        self.services.get(id)
    }

    /// Services to build for `id`, deepest first, ending with `id`
    ///
    /// Inline services count under their own identifiers. Empty when `id`
    /// has no descriptor.
    pub fn resolution_order(&self, id: &str) -> Vec<String> {
        let inline = self.inline_services();
        let lookup = |id: &str| self.services.get(id).or_else(|| inline.get(id).copied());
        lookup(id)
            .map(|root| construction_order(root, lookup))
            .unwrap_or_default()
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    /// Descriptors nested in arguments, keyed by identifier
    pub fn inline_services(&self) -> HashMap<&str, &CompiledService> {
        let mut inline = HashMap::new();
        let mut pending: Vec<&CompiledArgument> = self
            .services
            .values()
            .flat_map(|service| &service.arguments)
            .collect();
        while let Some(argument) = pending.pop() {
            match argument {
                CompiledArgument::Inline(service) => {
                    inline.insert(service.id.as_str(), service.as_ref());
                    pending.extend(&service.arguments);
                }
                CompiledArgument::Collection(items) => pending.extend(items),
                CompiledArgument::Value(_) | CompiledArgument::Service { .. } => {}
            }
        }
        inline
    }

    /// Every compiled service, ordered by identifier
    pub fn services(&self) -> impl Iterator<Item = &CompiledService> {
        self.services.values()
    }

    /// Identifiers that can be requested from outside, aliases included
    pub fn public_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self
            .services
            .values()
            .filter(|service| service.public)
            .map(|service| service.id.clone())
            .chain(
                self.aliases
                    .iter()
                    .filter(|(_, alias)| alias.public)
                    .map(|(id, _)| id.clone()),
            )
            .collect();
        ids.sort();
        ids
    }

    /// Surviving aliases
    pub fn aliases(&self) -> &BTreeMap<String, CompiledAlias> {
        &self.aliases
    }

    /// A resolved parameter
    pub fn parameter(&self, name: &str) -> Option<&Literal> {
        self.parameters.get(name)
    }

    /// Every resolved parameter
    pub fn parameters(&self) -> &BTreeMap<String, Literal> {
        &self.parameters
    }

    /// The pruned, fully resolved definition graph
    pub fn registry(&self) -> &DefinitionRegistry {
        &self.registry
    }

    /// Take the definition graph, e.g. to compile it again
    pub fn into_registry(self) -> DefinitionRegistry {
        self.registry
    }

    /// Number of compiled services
    pub fn len(&self) -> usize {
        self.services.len()
    }

    /// Whether no service was compiled
    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }
}

/// Turns definitions into descriptors over one graph
struct Lowering<'r, 'g> {
    resolver: &'r ReferenceResolver<'r>,
    graph: &'g ServiceGraph,
    planner: OrderPlanner<'g>,
}

impl Lowering<'_, '_> {
    fn service(&mut self, definition: &ServiceDefinition) -> Result<CompiledService> {
        let mut arguments = Vec::with_capacity(definition.arity());
        for position in 0..definition.arity() {
            let argument = definition.arguments.get(&position).ok_or_else(|| {
                Error::invalid_definition(&definition.id, format!("argument #{position} is not set"))
            })?;
            let resolved = self.resolver.resolve(argument, &definition.id)?;
            arguments.push(self.argument(resolved)?);
        }

        let graph = self.graph;
        let height = graph
            .node_id(&definition.id)
            .map_or(0, |node| self.planner.height(node));
        Ok(CompiledService {
            id: definition.id.clone(),
            class: definition.class_name().to_string(),
            arguments,
            shared: definition.is_shared(),
            public: definition.is_public(),
            lazy: definition.lazy,
            dependencies: graph.eager_dependencies(&definition.id),
            height,
        })
    }

    fn argument(&mut self, resolved: ResolvedArgument) -> Result<CompiledArgument> {
        Ok(match resolved {
            ResolvedArgument::Value(literal) => CompiledArgument::Value(literal),
            ResolvedArgument::Service { id, lazy } => CompiledArgument::Service { id, deferred: lazy },
            ResolvedArgument::Collection(items) => CompiledArgument::Collection(
                items
                    .into_iter()
                    .map(|item| self.argument(item))
                    .collect::<Result<Vec<_>>>()?,
            ),
            ResolvedArgument::Inline(definition) => {
                CompiledArgument::Inline(Box::new(self.service(&definition)?))
            }
        })
    }
}

/// Services to build for `root`, deepest first, `root` last
///
/// Among the dependencies of one service the one with the greatest height is
/// visited first; ties keep argument order. `lookup` finds the descriptor of
/// a dependency; unknown identifiers are visited as leaves.
pub fn construction_order<'a, F>(root: &'a CompiledService, lookup: F) -> Vec<&'a str>
where
    F: Fn(&str) -> Option<&'a CompiledService>,
{
    let height = |id: &str| lookup(id).map_or(0, |service| service.height);
    post_order(root.id.as_str(), |id| {
        let descriptor = if id == root.id { Some(root) } else { lookup(id) };
        let mut dependencies: Vec<&'a str> = descriptor
            .map(|service| service.dependencies.iter().map(String::as_str).collect())
            .unwrap_or_default();
        dependencies.sort_by_key(|dependency| Reverse(height(dependency)));
        dependencies
    })
}

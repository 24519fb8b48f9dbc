//! Service dependency graph
//!
//! Nodes are definitions; edges are service references found in their
//! arguments, including references inside collections and tagged
//! collections. An edge is lazy when the reference is lazy or the
//! target definition is lazy.

pub mod cycles;
pub mod order;

pub use cycles::{find_fatal_cycle, strongly_connected_components};
pub use order::{post_order, OrderPlanner};

use crate::tags::TagIndex;
use std::collections::{BTreeMap, BTreeSet, VecDeque};
use weaver_domain::registry::DefinitionRegistry;
use weaver_domain::value_objects::{Argument, ServiceDefinition};

/// Directed reference from one definition to another
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edge {
    /// Referenced definition
    pub target: String,
    /// Construction of the target is deferred
    pub lazy: bool,
}

/// Adjacency list over the definitions of a registry
#[derive(Debug, Clone, Default)]
pub struct ServiceGraph {
    nodes: BTreeMap<String, Vec<Edge>>,
}

impl ServiceGraph {
    /// Build the graph of every definition in the registry
    ///
    /// References to identifiers without a definition (unresolved optional
    /// references) produce no edge. Inline definitions become nodes of their
    /// own with a single eager edge from their consumer.
    pub fn from_registry(registry: &DefinitionRegistry) -> Self {
        let tags = TagIndex::from_registry(registry);
        let mut graph = Self::default();
        for definition in registry.definitions() {
            graph.add_node(registry, &tags, definition);
        }
        graph
    }

    fn add_node(
        &mut self,
        registry: &DefinitionRegistry,
        tags: &TagIndex,
        definition: &ServiceDefinition,
    ) {
        let mut edges = Vec::new();
        for argument in definition.arguments.values() {
            self.collect_edges(registry, tags, argument, &mut edges);
        }
        self.nodes.insert(definition.id.clone(), edges);
    }

    fn collect_edges(
        &mut self,
        registry: &DefinitionRegistry,
        tags: &TagIndex,
        argument: &Argument,
        edges: &mut Vec<Edge>,
    ) {
        match argument {
            Argument::Service(reference) => {
                push_reference(registry, &reference.id, reference.lazy, edges);
            }
            Argument::Tagged(tag) => {
                for id in tags.ordered_ids(tag) {
                    push_reference(registry, &id, false, edges);
                }
            }
            Argument::Collection(items) => {
                for item in items {
                    self.collect_edges(registry, tags, item, edges);
                }
            }
            Argument::Inline(inline) => {
                edges.push(Edge {
                    target: inline.id.clone(),
                    lazy: false,
                });
                self.add_node(registry, tags, inline);
            }
            Argument::Parameter(_) | Argument::Literal(_) => {}
        }
    }

    /// Whether the graph has a node for `id`
    pub fn contains(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    /// The graph's own copy of a node identifier
    pub fn node_id(&self, id: &str) -> Option<&str> {
        self.nodes.get_key_value(id).map(|(key, _)| key.as_str())
    }

    /// Outgoing edges in argument order
    pub fn edges(&self, id: &str) -> &[Edge] {
        self.nodes.get(id).map_or(&[], Vec::as_slice)
    }

    /// Node identifiers, ordered
    pub fn node_ids(&self) -> impl Iterator<Item = &str> {
        self.nodes.keys().map(String::as_str)
    }

    /// Distinct eager dependencies of a node in argument order
    pub fn eager_dependencies(&self, id: &str) -> Vec<String> {
        let mut seen = BTreeSet::new();
        self.edges(id)
            .iter()
            .filter(|edge| !edge.lazy && seen.insert(edge.target.as_str()))
            .map(|edge| edge.target.clone())
            .collect()
    }
}

fn push_reference(registry: &DefinitionRegistry, id: &str, lazy: bool, edges: &mut Vec<Edge>) {
    let target = registry
        .resolve_alias(id)
        .unwrap_or_else(|_| id.to_string());
    if let Some(found) = registry.find(&target) {
        edges.push(Edge {
            lazy: lazy || found.lazy,
            target,
        });
    }
}

/// Public definitions and the definitions public aliases resolve to
pub fn public_roots(registry: &DefinitionRegistry) -> Vec<String> {
    let mut roots: Vec<String> = registry
        .definitions()
        .filter(|definition| definition.is_public())
        .map(|definition| definition.id.clone())
        .collect();
    for (id, alias) in registry.aliases() {
        if alias.is_public() {
            if let Ok(target) = registry.resolve_alias(id) {
                roots.push(target);
            }
        }
    }
    roots
}

/// Every definition reachable from a public root through references and
/// tagged collections, lazy edges included
pub fn reachable_from_public(registry: &DefinitionRegistry) -> BTreeSet<String> {
    let graph = ServiceGraph::from_registry(registry);
    let mut reachable = BTreeSet::new();
    let mut queue: VecDeque<String> = public_roots(registry).into();
    while let Some(id) = queue.pop_front() {
        if !graph.contains(&id) || !reachable.insert(id.clone()) {
            continue;
        }
        queue.extend(graph.edges(&id).iter().map(|edge| edge.target.clone()));
    }
    reachable
}

//! Run-time service container
//!
//! Builds instances from a [`CompiledContainer`]. Shared services are
//! memoized per identifier behind a `OnceCell`, so concurrent first requests
//! produce exactly one instance: one caller constructs, the others wait for
//! it and receive the same `Arc`.
//!
//! A request builds the requested service and every eager dependency that is
//! not memoized yet, deepest chain first, using the heights recorded at
//! compile time. Within one request each service is built at most once,
//! transient services included. A shared service is built while its own cell
//! is held, so its transient dependencies are not duplicated by concurrent
//! first requests either.

use super::arguments::{Instance, ResolvedArguments, Value};
use super::factory::FactoryCatalog;
use super::lazy::LazyService;
use dashmap::DashMap;
use once_cell::sync::OnceCell;
use std::any::Any;
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Weak};
use tracing::trace;
use weaver_application::compiler::{
    construction_order, CompiledArgument, CompiledContainer, CompiledService,
};
use weaver_domain::error::{Error, Result};
use weaver_domain::value_objects::Literal;

thread_local! {
    static CONSTRUCTING: RefCell<Vec<String>> = const { RefCell::new(Vec::new()) };
}

/// Whether the current thread is constructing `id`
pub(crate) fn is_constructing(id: &str) -> bool {
    CONSTRUCTING.with(|stack| stack.borrow().iter().any(|entry| entry == id))
}

/// Marks a service as under construction on this thread until dropped
struct ConstructionGuard;

impl ConstructionGuard {
    fn enter(id: &str) -> Result<Self> {
        CONSTRUCTING.with(|stack| {
            let mut stack = stack.borrow_mut();
            if stack.iter().any(|entry| entry == id) {
                let mut chain = stack.clone();
                chain.push(id.to_string());
                return Err(Error::construction(
                    id,
                    format!("circular construction: {}", chain.join(" -> ")),
                ));
            }
            stack.push(id.to_string());
            Ok(Self)
        })
    }
}

impl Drop for ConstructionGuard {
    fn drop(&mut self) {
        CONSTRUCTING.with(|stack| {
            stack.borrow_mut().pop();
        });
    }
}

/// Immutable compiled data plus the shared-instance memo
pub(crate) struct ContainerState {
    compiled: CompiledContainer,
    factories: FactoryCatalog,
    inline: HashMap<String, CompiledService>,
    shared: DashMap<String, Arc<OnceCell<Instance>>>,
    this: Weak<ContainerState>,
}

impl ContainerState {
    fn descriptor(&self, id: &str) -> Result<&CompiledService> {
        self.compiled
            .service(id)
            .or_else(|| self.inline.get(id))
            .ok_or_else(|| Error::not_found(format!("service '{id}'")))
    }

    fn memoized(&self, id: &str) -> Option<Instance> {
        self.shared
            .get(id)
            .and_then(|cell| cell.value().get().map(Arc::clone))
    }

    /// Build or fetch `id` without visibility checks
    ///
    /// A shared service is built inside its own cell, dependencies included,
    /// so callers losing the race wait for the winner instead of building
    /// the dependency chain a second time.
    pub(crate) fn resolve(&self, id: &str) -> Result<Instance> {
        let descriptor = self.descriptor(id)?;
        if !descriptor.shared {
            let _guard = ConstructionGuard::enter(id)?;
            return self.build(descriptor);
        }

        let cell = self.cell(id);
        if let Some(instance) = cell.get() {
            return Ok(Arc::clone(instance));
        }
        let _guard = ConstructionGuard::enter(id)?;
        cell.get_or_try_init(|| self.build(descriptor))
            .map(Arc::clone)
    }

    fn cell(&self, id: &str) -> Arc<OnceCell<Instance>> {
        Arc::clone(self.shared.entry(id.to_string()).or_default().value())
    }

    /// Build `root` and every eager dependency that is not memoized yet
    fn build(&self, root: &CompiledService) -> Result<Instance> {
        let needed = self.needed(root)?;
        let mut order = construction_order(root, |id: &str| self.descriptor(id).ok());
        order.pop();

        let mut built: HashMap<&str, Instance> = HashMap::new();
        for node in order {
            if let Some(instance) = self.memoized(node) {
                built.insert(node, instance);
            } else if needed.contains(node) {
                let instance = self.instantiate(node, &built)?;
                built.insert(node, instance);
            }
        }
        self.construct(root, &built)
    }

    /// Nodes reachable through eager dependencies, stopping at memoized ones
    fn needed<'s>(&'s self, root: &'s CompiledService) -> Result<HashSet<&'s str>> {
        let mut needed = HashSet::new();
        let mut stack = vec![root];
        while let Some(descriptor) = stack.pop() {
            if !needed.insert(descriptor.id.as_str()) {
                continue;
            }
            for dependency in &descriptor.dependencies {
                if self.memoized(dependency).is_none() {
                    stack.push(self.descriptor(dependency)?);
                }
            }
        }
        Ok(needed)
    }

    fn instantiate(&self, id: &str, built: &HashMap<&str, Instance>) -> Result<Instance> {
        let descriptor = self.descriptor(id)?;
        if !descriptor.shared {
            let _guard = ConstructionGuard::enter(id)?;
            return self.construct(descriptor, built);
        }

        let cell = self.cell(id);
        if let Some(instance) = cell.get() {
            return Ok(Arc::clone(instance));
        }
        let _guard = ConstructionGuard::enter(id)?;
        cell.get_or_try_init(|| self.construct(descriptor, built))
            .map(Arc::clone)
    }

    fn construct(
        &self,
        descriptor: &CompiledService,
        built: &HashMap<&str, Instance>,
    ) -> Result<Instance> {
        let factory = self
            .factories
            .get(&descriptor.class)
            .ok_or_else(|| Error::unknown_factory(&descriptor.id, &descriptor.class))?;
        let values = descriptor
            .arguments
            .iter()
            .map(|argument| self.value(argument, built))
            .collect::<Result<Vec<_>>>()?;
        trace!(service = %descriptor.id, class = %descriptor.class, "constructing service");
        factory(&ResolvedArguments::new(&descriptor.id, values))
    }

    fn value(&self, argument: &CompiledArgument, built: &HashMap<&str, Instance>) -> Result<Value> {
        Ok(match argument {
            CompiledArgument::Value(Literal::Null) => Value::Null,
            CompiledArgument::Value(literal) => Value::Literal(literal.clone()),
            CompiledArgument::Service { id, deferred: true } => {
                Value::Lazy(LazyService::new(id, self.this.clone()))
            }
            CompiledArgument::Service { id, deferred: false } => {
                Value::Service(self.built_instance(id, built)?)
            }
            CompiledArgument::Inline(inline) => Value::Service(self.built_instance(&inline.id, built)?),
            CompiledArgument::Collection(items) => Value::Collection(
                items
                    .iter()
                    .map(|item| self.value(item, built))
                    .collect::<Result<Vec<_>>>()?,
            ),
        })
    }

    fn built_instance(&self, id: &str, built: &HashMap<&str, Instance>) -> Result<Instance> {
        built
            .get(id)
            .map(Arc::clone)
            .or_else(|| self.memoized(id))
            .ok_or_else(|| Error::construction(id, "dependency was not built before its consumer"))
    }
}

/// Thread-safe service container over one compiled artifact
///
/// Cloning is cheap; clones share instances.
#[derive(Clone)]
pub struct ServiceContainer {
    state: Arc<ContainerState>,
}

impl ServiceContainer {
    /// Create a container, failing with `UnknownFactory` when a compiled
    /// class has no factory
    pub fn new(compiled: CompiledContainer, factories: FactoryCatalog) -> Result<Self> {
        factories.verify(&compiled)?;
        let mut inline = HashMap::new();
        for service in compiled.services() {
            index_inline(&service.arguments, &mut inline);
        }
        let state = Arc::new_cyclic(|this| ContainerState {
            compiled,
            factories,
            inline,
            shared: DashMap::new(),
            this: this.clone(),
        });
        Ok(Self { state })
    }

    /// Get a public service, building it on first request when shared
    pub fn get(&self, id: &str) -> Result<Instance> {
        let descriptor = self.state.compiled.lookup(id)?;
        self.state.resolve(&descriptor.id)
    }

    /// Get a public service and downcast it
    pub fn get_as<T: Any + Send + Sync>(&self, id: &str) -> Result<Arc<T>> {
        self.get(id)?.downcast::<T>().map_err(|_| {
            Error::construction(id, format!("service is not a {}", std::any::type_name::<T>()))
        })
    }

    /// Whether `id` names a public service or public alias
    pub fn has(&self, id: &str) -> bool {
        self.state.compiled.has(id)
    }

    /// Whether a shared service has been built already
    pub fn is_initialized(&self, id: &str) -> bool {
        let id = self
            .state
            .compiled
            .aliases()
            .get(id)
            .map_or(id, |alias| alias.target.as_str());
        self.state.memoized(id).is_some()
    }

    /// A resolved parameter
    pub fn parameter(&self, name: &str) -> Option<&Literal> {
        self.state.compiled.parameter(name)
    }

    /// Identifiers that can be requested, aliases included
    pub fn public_ids(&self) -> Vec<String> {
        self.state.compiled.public_ids()
    }

    /// The compiled artifact behind this container
    pub fn compiled(&self) -> &CompiledContainer {
        &self.state.compiled
    }
}

impl std::fmt::Debug for ServiceContainer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceContainer")
            .field("services", &self.state.compiled.len())
            .field("initialized", &self.state.shared.len())
            .finish()
    }
}

fn index_inline(arguments: &[CompiledArgument], inline: &mut HashMap<String, CompiledService>) {
    for argument in arguments {
        match argument {
            CompiledArgument::Inline(service) => {
                index_inline(&service.arguments, inline);
                inline.insert(service.id.clone(), service.as_ref().clone());
            }
            CompiledArgument::Collection(items) => index_inline(items, inline),
            CompiledArgument::Value(_) | CompiledArgument::Service { .. } => {}
        }
    }
}

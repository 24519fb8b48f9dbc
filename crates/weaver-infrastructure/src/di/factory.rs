//! Factory catalog
//!
//! Maps class names to the closures that build instances from resolved
//! arguments. Crates can contribute factories at link time:
//!
//! ```ignore
//! use weaver_infrastructure::di::{FactoryEntry, SERVICE_FACTORIES};
//!
//! #[linkme::distributed_slice(SERVICE_FACTORIES)]
//! static ROUTER: FactoryEntry = FactoryEntry {
//!     class: "Router",
//!     factory: |args| Ok(Arc::new(Router::new(args.service(0)?))),
//! };
//! ```

use super::arguments::{Instance, ResolvedArguments};
use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use weaver_application::compiler::{CompiledArgument, CompiledContainer, CompiledService};
use weaver_domain::error::{Error, Result};

/// Builds one instance from its resolved arguments
pub type Factory = Arc<dyn Fn(&ResolvedArguments) -> Result<Instance> + Send + Sync>;

/// Link-time factory registration
pub struct FactoryEntry {
    /// Class the factory builds
    pub class: &'static str,
    /// Factory function
    pub factory: fn(&ResolvedArguments) -> Result<Instance>,
}

// Auto-collection via linkme distributed slices - crates submit entries at compile time
#[linkme::distributed_slice]
pub static SERVICE_FACTORIES: [FactoryEntry] = [..];

/// Class name to factory
#[derive(Clone, Default)]
pub struct FactoryCatalog {
    factories: HashMap<String, Factory>,
}

impl FactoryCatalog {
    /// Empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog of every factory submitted to [`SERVICE_FACTORIES`]
    pub fn discover() -> Self {
        let mut catalog = Self::new();
        for entry in SERVICE_FACTORIES.iter() {
            let factory = entry.factory;
            catalog.register_raw(entry.class, Arc::new(factory));
        }
        catalog
    }

    /// Register a factory returning a concrete type
    pub fn register<T, F>(&mut self, class: impl Into<String>, factory: F) -> &mut Self
    where
        T: Any + Send + Sync,
        F: Fn(&ResolvedArguments) -> Result<T> + Send + Sync + 'static,
    {
        self.register_raw(
            class,
            Arc::new(move |arguments: &ResolvedArguments| {
                factory(arguments).map(|value| Arc::new(value) as Instance)
            }),
        )
    }

    /// Register a type-erased factory, replacing any previous one for `class`
    pub fn register_raw(&mut self, class: impl Into<String>, factory: Factory) -> &mut Self {
        self.factories.insert(class.into(), factory);
        self
    }

    /// Add every factory of `other`, replacing factories for the same class
    pub fn extend(&mut self, other: FactoryCatalog) -> &mut Self {
        self.factories.extend(other.factories);
        self
    }

    /// Factory for `class`
    pub fn get(&self, class: &str) -> Option<&Factory> {
        self.factories.get(class)
    }

    /// Whether a factory exists for `class`
    pub fn contains(&self, class: &str) -> bool {
        self.factories.contains_key(class)
    }

    /// Registered class names, sorted
    pub fn classes(&self) -> Vec<&str> {
        let mut classes: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        classes.sort_unstable();
        classes
    }

    /// Number of factories
    pub fn len(&self) -> usize {
        self.factories.len()
    }

    /// Whether the catalog is empty
    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }

    /// Fail with `UnknownFactory` for the first compiled service, inline
    /// services included, whose class has no factory
    pub fn verify(&self, compiled: &CompiledContainer) -> Result<()> {
        compiled
            .services()
            .try_for_each(|service| self.verify_service(service))
    }

    fn verify_service(&self, service: &CompiledService) -> Result<()> {
        if !self.contains(&service.class) {
            return Err(Error::unknown_factory(&service.id, &service.class));
        }
        service
            .arguments
            .iter()
            .try_for_each(|argument| self.verify_argument(argument))
    }

    fn verify_argument(&self, argument: &CompiledArgument) -> Result<()> {
        match argument {
            CompiledArgument::Inline(inline) => self.verify_service(inline),
            CompiledArgument::Collection(items) => items
                .iter()
                .try_for_each(|item| self.verify_argument(item)),
            CompiledArgument::Value(_) | CompiledArgument::Service { .. } => Ok(()),
        }
    }
}

impl fmt::Debug for FactoryCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FactoryCatalog")
            .field("classes", &self.classes())
            .finish()
    }
}

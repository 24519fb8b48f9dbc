//! Container bootstrap
//!
//! Wires configuration, discovered service providers and factories into a
//! ready [`ServiceContainer`]:
//!
//! ```text
//! linkme providers ─┐
//! explicit providers ┼─> ContainerBuilder ──compile──> CompiledContainer ──> ServiceContainer
//! config parameters ─┘                                                        ↑
//!                                                  FactoryCatalog (linkme + explicit)
//! ```

use super::container::ServiceContainer;
use super::factory::FactoryCatalog;
use crate::config::AppConfig;
use crate::snapshot;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info};
use weaver_application::compiler::{CompiledContainer, CompilerOptions, ContainerBuilder};
use weaver_application::ports::registry::discover_service_providers;
use weaver_application::ports::{RegistrationContext, ServiceProvider};
use weaver_domain::error::Result;
use weaver_domain::registry::DefinitionRegistry;
use weaver_domain::value_objects::Literal;

/// Applies configured parameters after every provider has registered
struct ConfigParameters {
    parameters: BTreeMap<String, Literal>,
}

impl ServiceProvider for ConfigParameters {
    fn name(&self) -> &str {
        "config_parameters"
    }

    fn register(&self, _context: &mut RegistrationContext<'_>) -> Result<()> {
        Ok(())
    }

    fn alter(&self, registry: &mut DefinitionRegistry) -> Result<()> {
        for (name, value) in &self.parameters {
            registry.set_parameter(name.clone(), value.clone())?;
        }
        Ok(())
    }
}

/// Builds a container from configuration and providers
pub struct ContainerBootstrap {
    config: AppConfig,
    providers: Vec<Arc<dyn ServiceProvider>>,
    factories: FactoryCatalog,
    discover: bool,
}

impl ContainerBootstrap {
    /// Bootstrap with link-time providers and factories
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            providers: Vec::new(),
            factories: FactoryCatalog::discover(),
            discover: true,
        }
    }

    /// Skip link-time provider discovery
    #[must_use]
    pub fn without_discovery(mut self) -> Self {
        self.discover = false;
        self
    }

    /// Add a provider after the discovered ones
    #[must_use]
    pub fn with_provider(mut self, provider: Arc<dyn ServiceProvider>) -> Self {
        self.providers.push(provider);
        self
    }

    /// Add factories, replacing discovered ones for the same class
    #[must_use]
    pub fn with_factories(mut self, factories: FactoryCatalog) -> Self {
        self.factories.extend(factories);
        self
    }

    /// Builder holding every provider's contribution, no pass run yet
    fn prepare(&self) -> Result<ContainerBuilder> {
        let mut providers = if self.discover {
            discover_service_providers(&self.config.providers.disabled)
        } else {
            Vec::new()
        };
        providers.extend(self.providers.iter().cloned());
        debug!(
            providers = ?providers.iter().map(|p| p.name().to_string()).collect::<Vec<_>>(),
            "bootstrapping container"
        );

        let mut builder =
            ContainerBuilder::new().with_options(CompilerOptions::from(self.config.compiler));
        for provider in providers {
            builder.add_provider(provider);
        }
        if !self.config.parameters.is_empty() {
            builder.add_provider(Arc::new(ConfigParameters {
                parameters: self.config.parameters.clone(),
            }));
        }
        builder.run_providers()?;
        Ok(builder)
    }

    /// Fingerprint of the definitions the providers contribute
    ///
    /// Taken before any compiler pass runs, so a cached artifact can be
    /// looked up without compiling.
    pub fn fingerprint(&self) -> Result<String> {
        snapshot::fingerprint(self.prepare()?.registry())
    }

    /// Compile without building a container
    pub fn compile(&self) -> Result<CompiledContainer> {
        self.prepare()?.compile()
    }

    /// Compile and build the container
    pub fn build(self) -> Result<ServiceContainer> {
        let builder = self.prepare()?;
        let fingerprint = snapshot::fingerprint(builder.registry())?;
        let compiled = builder.compile()?;
        info!(
            fingerprint = %fingerprint,
            services = compiled.len(),
            factories = self.factories.len(),
            "container ready"
        );
        ServiceContainer::new(compiled, self.factories)
    }
}

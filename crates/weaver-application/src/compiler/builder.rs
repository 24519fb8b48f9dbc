//! Container builder
//!
//! Entry point of a compilation. Collects definitions, providers, compiler
//! passes and autoconfiguration rules, then runs the pipeline and freezes the
//! result. Identifiers that were private before the pipeline stay known to
//! the artifact after pruning, inlining or alias removal, so requesting them
//! is an access error rather than a missing service:
//!
//! 1. every provider's `register`
//! 2. every provider's `alter`
//! 3. built-in passes followed by user passes, phase by phase
//! 4. [`CompiledContainer::freeze`]
//!
//! Any error aborts the whole compilation; no partial container is produced.

use crate::compiler::{CompiledContainer, CompilerOptions, PassConfig};
use crate::ports::{CompilerPass, RegistrationContext, ServiceProvider};
use crate::tags::AutoconfigureRules;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};
use weaver_domain::error::Result;
use weaver_domain::registry::DefinitionRegistry;
use weaver_domain::value_objects::{Alias, Literal, PassPhase, ServiceDefinition, Tag};

/// Collects everything a compilation needs
#[derive(Default)]
pub struct ContainerBuilder {
    registry: DefinitionRegistry,
    passes: PassConfig,
    autoconfigure: AutoconfigureRules,
    providers: Vec<Arc<dyn ServiceProvider>>,
    options: CompilerOptions,
}

impl ContainerBuilder {
    /// Empty builder with default options
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder starting from an existing registry
    pub fn from_registry(registry: DefinitionRegistry) -> Self {
        Self {
            registry,
            ..Self::default()
        }
    }

    /// Replace the compiler options
    #[must_use]
    pub fn with_options(mut self, options: CompilerOptions) -> Self {
        self.options = options;
        self
    }

    /// Current compiler options
    pub fn options(&self) -> &CompilerOptions {
        &self.options
    }

    /// The registry being built
    pub fn registry(&self) -> &DefinitionRegistry {
        &self.registry
    }

    /// Mutable access to the registry being built
    pub fn registry_mut(&mut self) -> &mut DefinitionRegistry {
        &mut self.registry
    }

    /// Add a definition (last writer wins)
    pub fn register(&mut self, definition: ServiceDefinition) -> &mut Self {
        self.registry.add(definition);
        self
    }

    /// Register an alias
    pub fn set_alias(&mut self, id: impl Into<String>, alias: Alias) -> Result<&mut Self> {
        self.registry.set_alias(id, alias)?;
        Ok(self)
    }

    /// Set a parameter
    pub fn set_parameter(
        &mut self,
        name: impl Into<String>,
        value: impl Into<Literal>,
    ) -> Result<&mut Self> {
        self.registry.set_parameter(name, value)?;
        Ok(self)
    }

    /// Add a service provider; providers run in the order they were added
    pub fn add_provider(&mut self, provider: Arc<dyn ServiceProvider>) -> &mut Self {
        self.providers.push(provider);
        self
    }

    /// Register a compiler pass
    pub fn add_compiler_pass(
        &mut self,
        pass: impl CompilerPass + 'static,
        phase: PassPhase,
        priority: i32,
    ) -> &mut Self {
        self.passes.add_pass(pass, phase, priority);
        self
    }

    /// Tag every definition declaring `capability` with `tag`
    pub fn register_for_autoconfiguration(
        &mut self,
        capability: impl Into<String>,
        tag: Tag,
    ) -> &mut Self {
        self.autoconfigure.register(capability, tag);
        self
    }

    /// Run every pending provider's `register`, then every `alter`
    ///
    /// Afterwards [`registry`](Self::registry) holds every contribution the
    /// compilation starts from. Providers run once; [`compile`](Self::compile)
    /// calls this itself when it has not been called yet.
    pub fn run_providers(&mut self) -> Result<()> {
        let providers = std::mem::take(&mut self.providers);
        for provider in &providers {
            let mut context = RegistrationContext::new(
                &mut self.registry,
                &mut self.passes,
                &mut self.autoconfigure,
            );
            provider.register(&mut context)?;
            debug!(provider = provider.name(), "service provider registered");
        }
        for provider in &providers {
            provider.alter(&mut self.registry)?;
            debug!(provider = provider.name(), "service provider altered registry");
        }
        Ok(())
    }

    /// Run providers and passes, then freeze the registry
    pub fn compile(mut self) -> Result<CompiledContainer> {
        let started = Instant::now();
        self.run_providers()?;
        let Self {
            mut registry,
            passes: user_passes,
            autoconfigure,
            options,
            ..
        } = self;
        let private_ids = private_ids(&registry);

        let mut pipeline = PassConfig::builtin(&options, autoconfigure);
        pipeline.append(user_passes);
        debug!(
            definitions = registry.len(),
            passes = pipeline.len(),
            "compiling container"
        );
        pipeline.run(&mut registry)?;

        let compiled = CompiledContainer::freeze(registry)?.with_hidden(private_ids);
        info!(
            services = compiled.len(),
            aliases = compiled.aliases().len(),
            parameters = compiled.parameters().len(),
            elapsed_ms = started.elapsed().as_secs_f64() * 1000.0,
            "container compiled"
        );
        Ok(compiled)
    }
}

/// Private definitions and aliases of the registry the pipeline starts from
fn private_ids(registry: &DefinitionRegistry) -> Vec<String> {
    registry
        .definitions()
        .filter(|definition| !definition.is_public())
        .map(|definition| definition.id.clone())
        .chain(
            registry
                .aliases()
                .filter(|(_, alias)| !alias.is_public())
                .map(|(id, _)| id.to_string()),
        )
        .collect()
}

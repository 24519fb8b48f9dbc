//! Service provider port
//!
//! Service providers contribute definitions, aliases, parameters, compiler
//! passes and autoconfiguration rules before compilation starts. Every
//! provider's `register` runs before any provider's `alter`, so `alter`
//! always sees the complete initial registry.

use crate::compiler::PassConfig;
use crate::ports::CompilerPass;
use crate::tags::AutoconfigureRules;
use weaver_domain::error::Result;
use weaver_domain::registry::DefinitionRegistry;
use weaver_domain::value_objects::{Alias, Literal, PassPhase, ServiceDefinition, Tag};

/// Contributor of definitions and compiler passes
pub trait ServiceProvider: Send + Sync {
    /// Provider name used in logs
    fn name(&self) -> &str;

    /// Add definitions, aliases, parameters and compiler passes
    fn register(&self, context: &mut RegistrationContext<'_>) -> Result<()>;

    /// Cross-cutting edits run after every provider has registered
    fn alter(&self, _registry: &mut DefinitionRegistry) -> Result<()> {
        Ok(())
    }
}

/// What a provider can touch while registering
pub struct RegistrationContext<'a> {
    registry: &'a mut DefinitionRegistry,
    passes: &'a mut PassConfig,
    autoconfigure: &'a mut AutoconfigureRules,
}

impl<'a> RegistrationContext<'a> {
    /// Create a context over the builder's state
    pub fn new(
        registry: &'a mut DefinitionRegistry,
        passes: &'a mut PassConfig,
        autoconfigure: &'a mut AutoconfigureRules,
    ) -> Self {
        Self {
            registry,
            passes,
            autoconfigure,
        }
    }

    /// Direct access to the registry
    pub fn registry(&mut self) -> &mut DefinitionRegistry {
        self.registry
    }

    /// Add a definition (last writer wins)
    pub fn add(&mut self, definition: ServiceDefinition) {
        self.registry.add(definition);
    }

    /// Register an alias
    pub fn set_alias(&mut self, id: impl Into<String>, alias: Alias) -> Result<()> {
        self.registry.set_alias(id, alias)
    }

    /// Set a parameter
    pub fn set_parameter(&mut self, name: impl Into<String>, value: impl Into<Literal>) -> Result<()> {
        self.registry.set_parameter(name, value)
    }

    /// Register a compiler pass in a phase with a priority
    pub fn add_compiler_pass(
        &mut self,
        pass: impl CompilerPass + 'static,
        phase: PassPhase,
        priority: i32,
    ) {
        self.passes.add_pass(pass, phase, priority);
    }

    /// Tag every definition declaring `capability` with `tag`
    pub fn register_for_autoconfiguration(&mut self, capability: impl Into<String>, tag: Tag) {
        self.autoconfigure.register(capability, tag);
    }
}

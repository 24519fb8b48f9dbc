//! Compiler pass pipeline
//!
//! Passes are grouped by [`PassPhase`]. Phases run strictly in order; inside
//! a phase, passes run by descending priority and equal priorities keep
//! registration order.

use crate::compiler::CompilerOptions;
use crate::passes::{
    AutoconfigurePass, AutowirePass, CheckCircularReferencesPass, CheckDefinitionsPass,
    CheckReferencesPass, DecoratorPass, InlineServiceDefinitionsPass, RemoveAbstractDefinitionsPass,
    RemovePrivateAliasesPass, RemoveUnusedDefinitionsPass, ResolveAliasReferencesPass,
    ResolveInvalidReferencesPass, ResolveParametersPass, ResolveParentsPass,
    ResolveTaggedCollectionsPass,
};
use crate::ports::CompilerPass;
use crate::tags::AutoconfigureRules;
use std::time::Instant;
use tracing::{debug, error};
use weaver_domain::error::{Error, Result};
use weaver_domain::registry::DefinitionRegistry;
use weaver_domain::value_objects::PassPhase;

/// A pass with its scheduling data
pub struct RegisteredPass {
    pass: Box<dyn CompilerPass>,
    phase: PassPhase,
    priority: i32,
}

impl RegisteredPass {
    /// Pass name
    pub fn name(&self) -> &str {
        self.pass.name()
    }

    /// Phase the pass runs in
    pub fn phase(&self) -> PassPhase {
        self.phase
    }

    /// Priority inside the phase
    pub fn priority(&self) -> i32 {
        self.priority
    }
}

/// Ordered collection of compiler passes
#[derive(Default)]
pub struct PassConfig {
    passes: Vec<RegisteredPass>,
}

impl PassConfig {
    /// Empty configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in passes enabled by `options`
    pub fn builtin(options: &CompilerOptions, rules: AutoconfigureRules) -> Self {
        let mut config = Self::new();
        config.add_pass(ResolveParentsPass, PassPhase::BeforeOptimization, 200);
        if options.autoconfigure {
            config.add_pass(
                AutoconfigurePass::new(rules),
                PassPhase::BeforeOptimization,
                100,
            );
        }

        config.add_pass(ResolveParametersPass, PassPhase::Optimize, 200);
        config.add_pass(DecoratorPass, PassPhase::Optimize, 150);
        let autowire = if options.remove_unused_definitions {
            AutowirePass::reachable_only()
        } else {
            AutowirePass::eager()
        };
        config.add_pass(autowire, PassPhase::Optimize, 100);
        if options.resolve_tagged_collections {
            config.add_pass(ResolveTaggedCollectionsPass, PassPhase::Optimize, 50);
        }
        config.add_pass(ResolveAliasReferencesPass, PassPhase::Optimize, 0);
        config.add_pass(ResolveInvalidReferencesPass, PassPhase::Optimize, -100);

        config.add_pass(
            CheckDefinitionsPass::new(options.remove_unused_definitions),
            PassPhase::BeforeRemoving,
            100,
        );
        config.add_pass(CheckReferencesPass, PassPhase::BeforeRemoving, 50);
        config.add_pass(CheckCircularReferencesPass, PassPhase::BeforeRemoving, 0);

        config.add_pass(RemoveAbstractDefinitionsPass, PassPhase::Remove, 100);
        config.add_pass(RemovePrivateAliasesPass, PassPhase::Remove, 50);
        if options.remove_unused_definitions {
            config.add_pass(RemoveUnusedDefinitionsPass, PassPhase::Remove, 0);
        }

        if options.inline_private_services {
            config.add_pass(InlineServiceDefinitionsPass, PassPhase::AfterRemoving, 0);
        }
        config
    }

    /// Register a pass
    pub fn add_pass(&mut self, pass: impl CompilerPass + 'static, phase: PassPhase, priority: i32) {
        self.add_boxed(Box::new(pass), phase, priority);
    }

    /// Register a boxed pass
    pub fn add_boxed(&mut self, pass: Box<dyn CompilerPass>, phase: PassPhase, priority: i32) {
        self.passes.push(RegisteredPass {
            pass,
            phase,
            priority,
        });
    }

    /// Append every pass of `other`, after the passes already registered
    pub fn append(&mut self, other: PassConfig) {
        self.passes.extend(other.passes);
    }

    /// Number of registered passes
    pub fn len(&self) -> usize {
        self.passes.len()
    }

    /// Whether no pass is registered
    pub fn is_empty(&self) -> bool {
        self.passes.is_empty()
    }

    /// Passes of one phase in execution order
    pub fn passes_for(&self, phase: PassPhase) -> Vec<&RegisteredPass> {
        let mut passes: Vec<&RegisteredPass> =
            self.passes.iter().filter(|p| p.phase == phase).collect();
        // Stable: equal priorities keep registration order
        passes.sort_by(|a, b| b.priority.cmp(&a.priority));
        passes
    }

    /// Names of the passes of one phase in execution order
    pub fn pass_names(&self, phase: PassPhase) -> Vec<String> {
        self.passes_for(phase)
            .into_iter()
            .map(|p| p.name().to_string())
            .collect()
    }

    /// Run every phase over the registry
    ///
    /// The first failing pass aborts the run. Passes of the validation phase
    /// that modify the registry fail with a `Compilation` error.
    pub fn run(&self, registry: &mut DefinitionRegistry) -> Result<()> {
        for phase in PassPhase::ALL {
            let passes = self.passes_for(phase);
            debug!(phase = %phase, passes = passes.len(), "running compiler phase");
            for registered in passes {
                let started = Instant::now();
                let outcome = if phase.is_validation() {
                    run_validation(registered, registry)
                } else {
                    registered.pass.process(registry)
                };
                if let Err(e) = outcome {
                    let e = e.in_pass(phase, registered.name());
                    error!(phase = %phase, pass = registered.name(), error = %e, "compiler pass failed");
                    return Err(e);
                }
                debug!(
                    pass = registered.name(),
                    priority = registered.priority,
                    elapsed_ms = started.elapsed().as_secs_f64() * 1000.0,
                    "compiler pass completed"
                );
            }
        }
        Ok(())
    }
}

/// Runs a validation pass and rejects any change it makes
///
/// The registry is compared in serialized form: float literals such as NaN
/// are not equal to themselves.
fn run_validation(registered: &RegisteredPass, registry: &mut DefinitionRegistry) -> Result<()> {
    let before = serde_json::to_vec(registry)?;
    registered.pass.process(registry)?;
    if serde_json::to_vec(registry)? == before {
        Ok(())
    } else {
        Err(Error::compilation(
            "validation passes must not modify the definition graph",
        ))
    }
}

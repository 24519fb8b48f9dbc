//! # weaver
//!
//! A dependency-injection container compiler. Service definitions are
//! collected into a registry, transformed by ordered compiler passes
//! (autowiring, tagged collections, decoration, pruning, inlining),
//! validated for dangling references and cycles, and frozen into an
//! immutable artifact that a run-time container serves from.
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use weaver::prelude::*;
//!
//! struct Greeter(String);
//!
//! let mut builder = ContainerBuilder::new();
//! builder.set_parameter("greeting", "hello").unwrap();
//! builder.register(
//!     ServiceDefinition::new("greeter")
//!         .with_class("Greeter")
//!         .public()
//!         .with_argument(Argument::parameter("greeting")),
//! );
//!
//! let mut factories = FactoryCatalog::new();
//! factories.register("Greeter", |args| Ok(Greeter(args.string(0)?)));
//!
//! let container = ServiceContainer::new(builder.compile().unwrap(), factories).unwrap();
//! let greeter: Arc<Greeter> = container.get_as("greeter").unwrap();
//! assert_eq!(greeter.0, "hello");
//! ```
//!
//! ## Architecture
//!
//! - `domain` - Definition model, registry and error taxonomy
//! - `application` - Compiler passes, resolvers, graph validation, compiled artifact
//! - `infrastructure` - Run-time container, factories, config, logging, bootstrap

/// Domain layer - definition graph model and errors
///
/// Re-exports from the domain crate for convenience
pub mod domain {
    pub use weaver_domain::*;
}

/// Application layer - the compiler
///
/// Re-exports from the application crate for convenience
pub mod application {
    pub use weaver_application::*;
}

/// Infrastructure layer - container, config and logging
///
/// Re-exports from the infrastructure crate for convenience
pub mod infrastructure {
    pub use weaver_infrastructure::*;
}

// Re-export commonly used domain types at the crate root
pub use domain::*;

// Re-export the compiler entry points at the crate root
pub use application::{CompiledContainer, CompilerOptions, ContainerBuilder};

// Re-export the run-time container at the crate root
pub use infrastructure::{ContainerBootstrap, FactoryCatalog, ServiceContainer};

/// Re-exported so downstream crates can submit providers and factories
pub use linkme;

/// Everything needed to define, compile and serve a container
pub mod prelude {
    pub use weaver_application::ports::registry::{ServiceProviderEntry, SERVICE_PROVIDERS};
    pub use weaver_application::{
        pass_fn, CompiledContainer, CompilerOptions, CompilerPass, ContainerBuilder,
        RegistrationContext, ServiceProvider,
    };
    pub use weaver_domain::{
        Alias, Argument, Error, Literal, ParameterSlot, PassPhase, Result, ServiceDefinition, Tag,
    };
    pub use weaver_infrastructure::di::{FactoryEntry, Instance, SERVICE_FACTORIES};
    pub use weaver_infrastructure::{
        AppConfig, ConfigLoader, ContainerBootstrap, FactoryCatalog, LazyService,
        ResolvedArguments, ServiceContainer,
    };
}

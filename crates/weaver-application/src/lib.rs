//! Application layer for the weaver container compiler
//!
//! Turns a [`DefinitionRegistry`](weaver_domain::DefinitionRegistry) into a
//! validated, pruned and frozen [`CompiledContainer`]. The layer holds the
//! extension points (compiler passes and service providers), the argument
//! resolvers, the tag index, the dependency graph algorithms and the
//! built-in passes.
//!
//! ## Example
//!
//! ```
//! use weaver_application::ContainerBuilder;
//! use weaver_domain::{Argument, ServiceDefinition};
//!
//! let mut builder = ContainerBuilder::new();
//! builder.register(ServiceDefinition::new("request_stack"));
//! builder.register(
//!     ServiceDefinition::new("router")
//!         .public()
//!         .with_argument(Argument::service("request_stack")),
//! );
//! let compiled = builder.compile().unwrap();
//! assert!(compiled.has("router"));
//! assert!(!compiled.has("request_stack"));
//! ```

pub mod compiler;
pub mod graph;
pub mod passes;
pub mod ports;
pub mod resolvers;
pub mod tags;

pub use compiler::{
    CompiledAlias, CompiledArgument, CompiledContainer, CompiledService, CompilerOptions,
    ContainerBuilder, PassConfig,
};
pub use ports::{pass_fn, CompilerPass, RegistrationContext, ServiceProvider};
pub use tags::{AutoconfigureRules, TagIndex};

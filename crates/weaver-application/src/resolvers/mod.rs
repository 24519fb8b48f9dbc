//! Argument resolvers

pub mod autowire;
pub mod parameters;
pub mod references;

pub use autowire::{AutowireResolver, CapabilityIndex};
pub use parameters::{whole_placeholder, ParameterResolver};
pub use references::{ReferenceResolver, ResolvedArgument};

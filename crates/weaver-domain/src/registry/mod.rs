//! Build-time storage of definitions and parameters

pub mod definitions;
pub mod parameters;

pub use definitions::{DefinitionRegistry, TaggedEntry};
pub use parameters::ParameterBag;

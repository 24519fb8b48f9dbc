//! Domain layer for the weaver container compiler
//!
//! Holds the definition graph data model, the mutable registry that
//! collects it before compilation, and the error taxonomy shared by every
//! other crate. This crate has no knowledge of passes or run-time instances.

pub mod constants;
pub mod error;
pub mod registry;
pub mod value_objects;

pub use error::{Error, Result};
pub use registry::{DefinitionRegistry, ParameterBag, TaggedEntry};
pub use value_objects::{
    Alias, Argument, AttributeValue, Decoration, Literal, ParameterSlot, PassPhase, Reference,
    ServiceDefinition, Sharing, Tag, TagAttributes, Visibility,
};

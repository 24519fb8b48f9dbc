//! Value objects of the definition graph

pub mod alias;
pub mod argument;
pub mod definition;
pub mod phase;
pub mod tag;

pub use alias::Alias;
pub use argument::{Argument, Literal, Reference};
pub use definition::{Decoration, ParameterSlot, ServiceDefinition, Sharing, Visibility};
pub use phase::PassPhase;
pub use tag::{AttributeValue, Tag, TagAttributes};

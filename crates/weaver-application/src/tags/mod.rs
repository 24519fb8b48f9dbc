//! Tag index and autoconfiguration

pub mod autoconfigure;
pub mod index;

pub use autoconfigure::AutoconfigureRules;
pub use index::{PrioritizedService, TagIndex};

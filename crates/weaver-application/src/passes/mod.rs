//! Built-in compiler passes

pub mod aliases;
pub mod autoconfigure;
pub mod autowire;
pub mod check_cycles;
pub mod check_definitions;
pub mod check_references;
pub mod decorators;
pub mod inline;
pub mod invalid_references;
pub mod parameters;
pub mod parents;
pub mod remove;
pub mod tagged;

pub use aliases::ResolveAliasReferencesPass;
pub use autoconfigure::AutoconfigurePass;
pub use autowire::AutowirePass;
pub use check_cycles::CheckCircularReferencesPass;
pub use check_definitions::CheckDefinitionsPass;
pub use check_references::CheckReferencesPass;
pub use decorators::DecoratorPass;
pub use inline::InlineServiceDefinitionsPass;
pub use invalid_references::ResolveInvalidReferencesPass;
pub use parameters::ResolveParametersPass;
pub use parents::ResolveParentsPass;
pub use remove::{
    RemoveAbstractDefinitionsPass, RemovePrivateAliasesPass, RemoveUnusedDefinitionsPass,
};
pub use tagged::ResolveTaggedCollectionsPass;

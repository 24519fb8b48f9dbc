//! Compiler pass port

use weaver_domain::error::Result;
use weaver_domain::registry::DefinitionRegistry;

/// A graph-transformation step run once per compilation
///
/// A pass receives exclusive access to the whole registry and may add or
/// remove definitions, aliases and tags, or rewrite arguments. Passes
/// registered in the validation phase must leave the registry untouched.
pub trait CompilerPass: Send + Sync {
    /// Name used in logs and error messages
    fn name(&self) -> &str;

    /// Transform or validate the registry
    fn process(&self, registry: &mut DefinitionRegistry) -> Result<()>;
}

/// Compiler pass backed by a closure
pub struct FnPass<F> {
    name: String,
    process: F,
}

impl<F> CompilerPass for FnPass<F>
where
    F: Fn(&mut DefinitionRegistry) -> Result<()> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn process(&self, registry: &mut DefinitionRegistry) -> Result<()> {
        (self.process)(registry)
    }
}

/// Wrap a closure as a named compiler pass
///
/// # Example
///
/// ```
/// use weaver_application::ports::pass_fn;
/// use weaver_domain::{ServiceDefinition, Tag};
///
/// let pass = pass_fn("tag-handlers", |registry| {
///     for definition in registry.definitions_mut() {
///         if definition.id.ends_with("_handler") {
///             definition.tags.push(Tag::new("handler"));
///         }
///     }
///     Ok(())
/// });
/// # let _ = pass;
/// ```
pub fn pass_fn<F>(name: impl Into<String>, process: F) -> FnPass<F>
where
    F: Fn(&mut DefinitionRegistry) -> Result<()> + Send + Sync,
{
    FnPass {
        name: name.into(),
        process,
    }
}

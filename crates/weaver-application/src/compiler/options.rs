//! Compiler options

use serde::{Deserialize, Serialize};

/// Switches for the optional built-in passes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompilerOptions {
    /// Attach capability-driven tags
    pub autoconfigure: bool,
    /// Prune definitions no public root reaches
    pub remove_unused_definitions: bool,
    /// Flatten single-use private services into their consumer
    pub inline_private_services: bool,
    /// Bake tagged collections into concrete reference lists during
    /// compilation instead of at freeze time
    pub resolve_tagged_collections: bool,
}

impl Default for CompilerOptions {
    fn default() -> Self {
        Self {
            autoconfigure: true,
            remove_unused_definitions: true,
            inline_private_services: true,
            resolve_tagged_collections: true,
        }
    }
}

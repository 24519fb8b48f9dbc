//! Circular reference detection

use crate::graph::{find_fatal_cycle, ServiceGraph};
use crate::ports::CompilerPass;
use tracing::error;
use weaver_domain::error::{Error, Result};
use weaver_domain::registry::DefinitionRegistry;

/// Fails on any dependency cycle that contains an eager edge
pub struct CheckCircularReferencesPass;

impl CompilerPass for CheckCircularReferencesPass {
    fn name(&self) -> &str {
        "check_circular_references"
    }

    fn process(&self, registry: &mut DefinitionRegistry) -> Result<()> {
        let graph = ServiceGraph::from_registry(registry);
        match find_fatal_cycle(&graph) {
            None => Ok(()),
            Some(cycle) => {
                error!(cycle = %cycle.join(" -> "), "circular service reference");
                Err(Error::CyclicServiceGraph { cycle })
            }
        }
    }
}

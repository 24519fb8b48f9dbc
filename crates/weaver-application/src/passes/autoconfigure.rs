//! Autoconfiguration pass

use crate::ports::CompilerPass;
use crate::tags::{AutoconfigureRules, TagIndex};
use tracing::debug;
use weaver_domain::error::Result;
use weaver_domain::registry::DefinitionRegistry;

/// Rebuilds the tag index, attaching capability-driven tags
pub struct AutoconfigurePass {
    rules: AutoconfigureRules,
}

impl AutoconfigurePass {
    /// Pass applying `rules`
    pub fn new(rules: AutoconfigureRules) -> Self {
        Self { rules }
    }
}

impl CompilerPass for AutoconfigurePass {
    fn name(&self) -> &str {
        "autoconfigure"
    }

    fn process(&self, registry: &mut DefinitionRegistry) -> Result<()> {
        let mut index = TagIndex::default();
        index.rebuild(registry, &self.rules);
        debug!(
            rules = self.rules.rules().len(),
            tags = index.tag_names().count(),
            "autoconfiguration applied"
        );
        Ok(())
    }
}

//! Compiler pass phases

use serde::{Deserialize, Serialize};
use std::fmt;

/// Phase of the compiler pass pipeline
///
/// Phases run strictly in declaration order; every pass of one phase finishes
/// before the first pass of the next phase starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PassPhase {
    /// Structural rewrites before any reference is resolved (parents, autoconfiguration)
    BeforeOptimization,
    /// Parameter, alias, autowiring and tagged collection resolution
    Optimize,
    /// Validation only; passes must not mutate the registry
    BeforeRemoving,
    /// Reachability pruning
    Remove,
    /// Final rewrites over the pruned graph (inlining)
    AfterRemoving,
}

impl PassPhase {
    /// All phases in execution order
    pub const ALL: [PassPhase; 5] = [
        PassPhase::BeforeOptimization,
        PassPhase::Optimize,
        PassPhase::BeforeRemoving,
        PassPhase::Remove,
        PassPhase::AfterRemoving,
    ];

    /// Canonical upper-case name
    pub fn as_str(self) -> &'static str {
        match self {
            PassPhase::BeforeOptimization => "BEFORE_OPTIMIZATION",
            PassPhase::Optimize => "OPTIMIZE",
            PassPhase::BeforeRemoving => "BEFORE_REMOVING",
            PassPhase::Remove => "REMOVE",
            PassPhase::AfterRemoving => "AFTER_REMOVING",
        }
    }

    /// Whether passes in this phase are restricted to validation
    pub fn is_validation(self) -> bool {
        matches!(self, PassPhase::BeforeRemoving)
    }
}

impl fmt::Display for PassPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

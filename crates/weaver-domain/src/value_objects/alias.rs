//! Service aliases

use super::definition::Visibility;
use serde::{Deserialize, Serialize};

/// Alternate identifier resolving to another identifier
///
/// Targets may themselves be aliases; resolution follows the chain until it
/// reaches a real definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alias {
    /// Identifier the alias resolves to
    pub target: String,
    /// Public aliases are retrievable and act as pruning roots
    #[serde(default = "public_visibility")]
    pub visibility: Visibility,
}

fn public_visibility() -> Visibility {
    Visibility::Public
}

impl Alias {
    /// Public alias
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            visibility: Visibility::Public,
        }
    }

    /// Private alias
    pub fn private(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            visibility: Visibility::Private,
        }
    }

    /// Whether the alias is public
    pub fn is_public(&self) -> bool {
        self.visibility == Visibility::Public
    }
}

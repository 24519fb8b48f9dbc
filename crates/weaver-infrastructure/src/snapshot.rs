//! Compiled artifact helpers
//!
//! A compiled container is plain data. These helpers serialize it to JSON and
//! compute the fingerprint a cache would key it by: the digest of the registry
//! providers produce, before compilation. Persisting the artifact is left to
//! the caller.

use sha2::{Digest, Sha256};
use weaver_application::compiler::CompiledContainer;
use weaver_domain::error::Result;
use weaver_domain::registry::DefinitionRegistry;

/// SHA-256 hex digest of the registry's JSON form
///
/// Registries holding the same definitions, aliases and parameters in the
/// same insertion order have the same fingerprint.
pub fn fingerprint(registry: &DefinitionRegistry) -> Result<String> {
    let canonical = serde_json::to_vec(registry)?;
    Ok(hex::encode(Sha256::digest(&canonical)))
}

/// Serialize a compiled container
pub fn to_json(compiled: &CompiledContainer) -> Result<String> {
    Ok(serde_json::to_string_pretty(compiled)?)
}

/// Load a compiled container serialized with [`to_json`]
pub fn from_json(json: &str) -> Result<CompiledContainer> {
    Ok(serde_json::from_str(json)?)
}

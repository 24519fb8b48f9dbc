//! Service Provider Registry
//!
//! Auto-registration of service providers. Crates contribute providers via
//! `#[linkme::distributed_slice(SERVICE_PROVIDERS)]`; the bootstrap layer
//! discovers them at run time.
//!
//! ```ignore
//! use weaver_application::ports::registry::{ServiceProviderEntry, SERVICE_PROVIDERS};
//!
//! #[linkme::distributed_slice(SERVICE_PROVIDERS)]
//! static ROUTING: ServiceProviderEntry = ServiceProviderEntry {
//!     name: "routing",
//!     description: "Router, matchers and route providers",
//!     factory: || Arc::new(RoutingProvider),
//! };
//! ```

use crate::ports::ServiceProvider;
use std::sync::Arc;
use weaver_domain::error::{Error, Result};

/// Registry entry for service providers
pub struct ServiceProviderEntry {
    /// Unique provider name
    pub name: &'static str,
    /// Human-readable description
    pub description: &'static str,
    /// Factory creating the provider
    pub factory: fn() -> Arc<dyn ServiceProvider>,
}

// Auto-collection via linkme distributed slices - providers submit entries at compile time
#[linkme::distributed_slice]
pub static SERVICE_PROVIDERS: [ServiceProviderEntry] = [..];

/// Resolve a registered provider by name
pub fn resolve_service_provider(name: &str) -> Result<Arc<dyn ServiceProvider>> {
    SERVICE_PROVIDERS
        .iter()
        .find(|entry| entry.name == name)
        .map(|entry| (entry.factory)())
        .ok_or_else(|| {
            let available: Vec<&str> = SERVICE_PROVIDERS.iter().map(|e| e.name).collect();
            Error::not_found(format!(
                "service provider '{name}'. Available providers: {available:?}"
            ))
        })
}

/// List all registered providers as `(name, description)`
pub fn list_service_providers() -> Vec<(&'static str, &'static str)> {
    SERVICE_PROVIDERS
        .iter()
        .map(|e| (e.name, e.description))
        .collect()
}

/// Instantiate every registered provider whose name is not in `disabled`,
/// ordered by name
pub fn discover_service_providers(disabled: &[String]) -> Vec<Arc<dyn ServiceProvider>> {
    let mut entries: Vec<&ServiceProviderEntry> = SERVICE_PROVIDERS
        .iter()
        .filter(|entry| !disabled.iter().any(|name| name == entry.name))
        .collect();
    entries.sort_by_key(|entry| entry.name);
    entries.into_iter().map(|entry| (entry.factory)()).collect()
}

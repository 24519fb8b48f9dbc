//! Extension points of the compiler

pub mod compiler_pass;
pub mod provider;
pub mod registry;

pub use compiler_pass::{pass_fn, CompilerPass, FnPass};
pub use provider::{RegistrationContext, ServiceProvider};
pub use registry::{
    discover_service_providers, list_service_providers, resolve_service_provider,
    ServiceProviderEntry, SERVICE_PROVIDERS,
};

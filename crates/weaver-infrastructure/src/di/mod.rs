//! Run-time dependency injection
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`container`] | Service lookup and shared-instance memoization |
//! | [`factory`] | Class name to constructor closures |
//! | [`arguments`] | Resolved arguments handed to factories |
//! | [`lazy`] | Deferred service handles |
//! | [`bootstrap`] | Configuration and providers to a ready container |

pub mod arguments;
pub mod bootstrap;
pub mod container;
pub mod factory;
pub mod lazy;

pub use arguments::{Instance, ResolvedArguments, Value};
pub use bootstrap::ContainerBootstrap;
pub use container::ServiceContainer;
pub use factory::{Factory, FactoryCatalog, FactoryEntry, SERVICE_FACTORIES};
pub use lazy::LazyService;

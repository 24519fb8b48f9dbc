//! # Infrastructure Layer
//!
//! Run-time side of weaver: the service container built from a compiled
//! artifact, plus configuration, logging and bootstrap.
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`di`] | Service container, factories, lazy handles, bootstrap |
//! | [`config`] | Figment configuration (TOML + `WEAVER__` environment) |
//! | [`logging`] | Structured logging with tracing |
//! | [`snapshot`] | Artifact fingerprint and JSON helpers |
//! | [`constants`] | Configuration and logging constants |

pub mod config;
pub mod constants;
pub mod di;
pub mod error_ext;
pub mod logging;
pub mod snapshot;

pub use config::{AppConfig, ConfigLoader};
pub use di::{ContainerBootstrap, FactoryCatalog, LazyService, ResolvedArguments, ServiceContainer};
pub use error_ext::ErrorContext;

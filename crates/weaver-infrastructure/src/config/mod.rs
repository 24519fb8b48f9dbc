//! Configuration loading and types

pub mod loader;
pub mod types;

pub use loader::{ConfigBuilder, ConfigLoader};
pub use types::{AppConfig, CompilerConfig, LoggingConfig, ProvidersConfig};

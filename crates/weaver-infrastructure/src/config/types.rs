//! Configuration types

use crate::constants::DEFAULT_LOG_LEVEL;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use weaver_application::compiler::CompilerOptions;
use weaver_domain::value_objects::Literal;

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Logging configuration
    pub logging: LoggingConfig,
    /// Optional compiler passes
    pub compiler: CompilerConfig,
    /// Provider discovery
    pub providers: ProvidersConfig,
    /// Parameters set after every provider registered, overriding theirs
    pub parameters: BTreeMap<String, Literal>,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Enable JSON output format
    pub json_format: bool,

    /// Log to a daily-rolling file in addition to stdout
    pub file_output: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL.to_string(),
            json_format: false,
            file_output: None,
        }
    }
}

/// Switches for the optional built-in compiler passes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompilerConfig {
    /// Attach tags from capability rules
    pub autoconfigure: bool,
    /// Prune definitions unreachable from public services
    pub remove_unused_definitions: bool,
    /// Inline single-use private services
    pub inline_private_services: bool,
    /// Bake tagged collections before validation
    pub resolve_tagged_collections: bool,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            autoconfigure: true,
            remove_unused_definitions: true,
            inline_private_services: true,
            resolve_tagged_collections: true,
        }
    }
}

impl From<CompilerConfig> for CompilerOptions {
    fn from(config: CompilerConfig) -> Self {
        Self {
            autoconfigure: config.autoconfigure,
            remove_unused_definitions: config.remove_unused_definitions,
            inline_private_services: config.inline_private_services,
            resolve_tagged_collections: config.resolve_tagged_collections,
        }
    }
}

/// Service provider discovery
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProvidersConfig {
    /// Names of discovered providers to skip
    pub disabled: Vec<String>,
}

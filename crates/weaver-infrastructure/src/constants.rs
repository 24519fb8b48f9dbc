//! Infrastructure layer constants
//!
//! Domain constants live in `weaver_domain::constants`.

// ============================================================================
// CONFIGURATION CONSTANTS
// ============================================================================

/// Default configuration file name
pub const DEFAULT_CONFIG_FILENAME: &str = "weaver.toml";

/// Default configuration directory name
pub const DEFAULT_CONFIG_DIR: &str = "weaver";

/// Environment variable prefix for configuration
pub const CONFIG_ENV_PREFIX: &str = "WEAVER";

/// Separator between nested keys in environment variable names
pub const CONFIG_ENV_SEPARATOR: &str = "__";

// ============================================================================
// LOGGING CONSTANTS
// ============================================================================

/// Default log level
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Environment variable overriding the log filter
pub const LOG_FILTER_ENV: &str = "WEAVER_LOG";

/// File name prefix of rolling log files
pub const LOG_FILE_PREFIX: &str = "weaver";

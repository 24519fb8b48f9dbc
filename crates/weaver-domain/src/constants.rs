//! Domain constants

/// Tag attribute ordering tagged collections (descending)
pub const PRIORITY_ATTRIBUTE: &str = "priority";

/// Suffix appended to a decorator identifier to name the decorated original
pub const INNER_SUFFIX: &str = ".inner";

/// Delimiter of parameter placeholders inside string values
pub const PARAMETER_DELIMITER: char = '%';

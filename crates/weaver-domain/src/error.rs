//! Error handling types

use crate::value_objects::PassPhase;
use thiserror::Error;

/// Result type alias for operations that can fail
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for container compilation and service lookup
#[derive(Error, Debug)]
pub enum Error {
    /// A required service reference points at an identifier that does not exist
    #[error("Unresolved reference: service '{referenced_by}' depends on non-existent service '{id}'")]
    UnresolvedReference {
        /// The missing identifier
        id: String,
        /// The definition (or alias) holding the reference
        referenced_by: String,
    },

    /// A parameter reference names an undefined parameter
    #[error("Unresolved parameter: '{name}'{}", describe_origin(.referenced_by.as_deref()))]
    UnresolvedParameter {
        /// The undefined parameter name
        name: String,
        /// Service or parameter holding the reference, if any
        referenced_by: Option<String>,
    },

    /// A parameter value references itself transitively
    #[error("Circular parameter reference: {}", .chain.join(" -> "))]
    CircularParameter {
        /// Parameter names forming the cycle, first name repeated at the end
        chain: Vec<String>,
    },

    /// Autowiring found no usable candidate for an argument
    #[error(
        "Cannot autowire argument #{position} (${argument}) of service '{service}': no service provides '{capability}'{}",
        describe_rejected(.rejected)
    )]
    NoCandidate {
        /// Service being autowired
        service: String,
        /// Zero-based argument position
        position: usize,
        /// Declared argument name
        argument: String,
        /// Requested capability
        capability: String,
        /// Definitions that provide the capability but were rejected, with the reason
        rejected: Vec<String>,
    },

    /// Autowiring found several candidates and no single default
    #[error(
        "Cannot autowire argument #{position} (${argument}) of service '{service}': '{capability}' is provided by several services ({}); mark exactly one as default or name the service explicitly{}",
        .candidates.join(", "),
        describe_rejected(.rejected)
    )]
    AmbiguousCandidate {
        /// Service being autowired
        service: String,
        /// Zero-based argument position
        position: usize,
        /// Declared argument name
        argument: String,
        /// Requested capability
        capability: String,
        /// Every matching candidate
        candidates: Vec<String>,
        /// Definitions that provide the capability but were rejected, with the reason
        rejected: Vec<String>,
    },

    /// The eager service graph contains a cycle
    #[error("Circular service reference: {}", .cycle.join(" -> "))]
    CyclicServiceGraph {
        /// Identifiers forming the cycle, first identifier repeated at the end
        cycle: Vec<String>,
    },

    /// Alias resolution loops back onto itself
    #[error("Circular alias: {}", .chain.join(" -> "))]
    CircularAlias {
        /// Alias identifiers forming the loop
        chain: Vec<String>,
    },

    /// A private service was requested from outside the container
    #[error("Access denied: service '{id}' is private")]
    Access {
        /// The private identifier
        id: String,
    },

    /// Identifier not present in the registry or container
    #[error("Not found: {resource}")]
    NotFound {
        /// The resource that was not found
        resource: String,
    },

    /// Generic pass-reported compilation failure
    #[error(
        "Compilation failed{}: {message}",
        describe_location(.phase.as_ref(), .pass.as_deref(), .service.as_deref())
    )]
    Compilation {
        /// Phase in which the failure happened
        phase: Option<PassPhase>,
        /// Name of the reporting pass
        pass: Option<String>,
        /// Offending definition, if any
        service: Option<String>,
        /// What went wrong
        message: String,
    },

    /// Parameters were modified after resolution froze them
    #[error("Parameter '{name}' cannot be set: parameters are frozen")]
    FrozenParameters {
        /// Parameter being written
        name: String,
    },

    /// No factory is registered for a compiled class
    #[error("No factory registered for class '{class}' (service '{id}')")]
    UnknownFactory {
        /// Service identifier
        id: String,
        /// Class the service is built from
        class: String,
    },

    /// A factory failed while building a service instance
    #[error("Failed to construct service '{id}': {message}")]
    Construction {
        /// Service identifier
        id: String,
        /// Description of the failure
        message: String,
    },

    /// Configuration-related error
    #[error("Configuration error: {message}")]
    Configuration {
        /// Description of the configuration error
        message: String,
        /// Optional source error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// I/O operation error
    #[error("I/O error: {message}")]
    Io {
        /// Description of the I/O error
        message: String,
        /// Optional source error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// JSON parsing or serialization error
    #[error("JSON error: {source}")]
    Json {
        /// The underlying JSON error
        #[from]
        source: serde_json::Error,
    },
}

fn describe_origin(referenced_by: Option<&str>) -> String {
    referenced_by
        .map(|origin| format!(" (referenced by '{origin}')"))
        .unwrap_or_default()
}

fn describe_rejected(rejected: &[String]) -> String {
    if rejected.is_empty() {
        String::new()
    } else {
        format!("; rejected candidates: {}", rejected.join(", "))
    }
}

fn describe_location(
    phase: Option<&PassPhase>,
    pass: Option<&str>,
    service: Option<&str>,
) -> String {
    let mut location = String::new();
    if let Some(phase) = phase {
        location.push_str(&format!(" in phase {phase}"));
    }
    if let Some(pass) = pass {
        location.push_str(&format!(" ({pass})"));
    }
    if let Some(service) = service {
        location.push_str(&format!(" for service '{service}'"));
    }
    location
}

// Reference and lookup error creation methods
impl Error {
    /// Create an unresolved reference error
    pub fn unresolved_reference<S: Into<String>, R: Into<String>>(id: S, referenced_by: R) -> Self {
        Self::UnresolvedReference {
            id: id.into(),
            referenced_by: referenced_by.into(),
        }
    }

    /// Create an unresolved parameter error
    pub fn unresolved_parameter<S: Into<String>>(name: S, referenced_by: Option<String>) -> Self {
        Self::UnresolvedParameter {
            name: name.into(),
            referenced_by,
        }
    }

    /// Create a not found error
    pub fn not_found<S: Into<String>>(resource: S) -> Self {
        Self::NotFound {
            resource: resource.into(),
        }
    }

    /// Create an access error for a private service
    pub fn access<S: Into<String>>(id: S) -> Self {
        Self::Access { id: id.into() }
    }
}

// Compilation error creation methods
impl Error {
    /// Create a compilation error without location details
    pub fn compilation<S: Into<String>>(message: S) -> Self {
        Self::Compilation {
            phase: None,
            pass: None,
            service: None,
            message: message.into(),
        }
    }

    /// Create a compilation error naming the offending definition
    pub fn invalid_definition<I: Into<String>, S: Into<String>>(id: I, message: S) -> Self {
        Self::Compilation {
            phase: None,
            pass: None,
            service: Some(id.into()),
            message: message.into(),
        }
    }

    /// Fill in the phase and pass of a compilation error that lacks them
    ///
    /// Other variants are returned unchanged.
    #[must_use]
    pub fn in_pass(self, at_phase: PassPhase, pass_name: &str) -> Self {
        match self {
            Self::Compilation {
                phase,
                pass,
                service,
                message,
            } => Self::Compilation {
                phase: phase.or(Some(at_phase)),
                pass: pass.or_else(|| Some(pass_name.to_string())),
                service,
                message,
            },
            other => other,
        }
    }

    /// Whether this error is raised by compiling the definition graph
    ///
    /// Lookup, construction, factory, configuration and I/O failures are not.
    pub fn is_compile_time(&self) -> bool {
        matches!(
            self,
            Self::UnresolvedReference { .. }
                | Self::UnresolvedParameter { .. }
                | Self::CircularParameter { .. }
                | Self::NoCandidate { .. }
                | Self::AmbiguousCandidate { .. }
                | Self::CyclicServiceGraph { .. }
                | Self::CircularAlias { .. }
                | Self::FrozenParameters { .. }
                | Self::Compilation { .. }
        )
    }
}

// Run-time error creation methods
impl Error {
    /// Create a construction error
    pub fn construction<I: Into<String>, S: Into<String>>(id: I, message: S) -> Self {
        Self::Construction {
            id: id.into(),
            message: message.into(),
        }
    }

    /// Create an unknown factory error
    pub fn unknown_factory<I: Into<String>, C: Into<String>>(id: I, class: C) -> Self {
        Self::UnknownFactory {
            id: id.into(),
            class: class.into(),
        }
    }
}

// Configuration and I/O error creation methods
impl Error {
    /// Create a configuration error
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
            source: None,
        }
    }

    /// Create a configuration error with source
    pub fn configuration_with_source<
        S: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    >(
        message: S,
        source: E,
    ) -> Self {
        Self::Configuration {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create an I/O error
    pub fn io<S: Into<String>>(message: S) -> Self {
        Self::Io {
            message: message.into(),
            source: None,
        }
    }

    /// Create an I/O error with source
    pub fn io_with_source<S: Into<String>, E: std::error::Error + Send + Sync + 'static>(
        message: S,
        source: E,
    ) -> Self {
        Self::Io {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::io_with_source(err.to_string(), err)
    }
}

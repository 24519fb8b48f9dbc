//! Constructor arguments
//!
//! An [`Argument`] is what a definition declares for one constructor position.
//! Compiler passes progressively rewrite symbolic arguments (parameters,
//! tagged collections, aliases) into concrete ones.

use super::definition::ServiceDefinition;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Scalar literal value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Literal {
    /// Absent value
    Null,
    /// Boolean
    Bool(bool),
    /// Signed integer
    Int(i64),
    /// Floating point number
    Float(f64),
    /// String
    Str(String),
}

impl Literal {
    /// Whether this is the null literal
    pub fn is_null(&self) -> bool {
        matches!(self, Literal::Null)
    }

    /// Borrow the string content, if this is a string
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Literal::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Integer content, if this is an integer
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Literal::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Boolean content, if this is a boolean
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Literal::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Textual form used when the literal is interpolated into a string
    pub fn to_interpolated(&self) -> String {
        match self {
            Literal::Null => String::new(),
            other => other.to_string(),
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Null => f.write_str("null"),
            Literal::Bool(b) => write!(f, "{b}"),
            Literal::Int(n) => write!(f, "{n}"),
            Literal::Float(x) => write!(f, "{x}"),
            Literal::Str(s) => f.write_str(s),
        }
    }
}

impl From<&str> for Literal {
    fn from(s: &str) -> Self {
        Literal::Str(s.to_string())
    }
}

impl From<String> for Literal {
    fn from(s: String) -> Self {
        Literal::Str(s)
    }
}

impl From<i64> for Literal {
    fn from(n: i64) -> Self {
        Literal::Int(n)
    }
}

impl From<bool> for Literal {
    fn from(b: bool) -> Self {
        Literal::Bool(b)
    }
}

impl From<f64> for Literal {
    fn from(x: f64) -> Self {
        Literal::Float(x)
    }
}

/// Reference to another service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reference {
    /// Target identifier (definition or alias)
    pub id: String,
    /// Resolve to absent instead of failing when the target does not exist
    #[serde(default)]
    pub optional: bool,
    /// Construct the target on first use through a deferred handle
    #[serde(default)]
    pub lazy: bool,
}

impl Reference {
    /// Required, eager reference
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            optional: false,
            lazy: false,
        }
    }

    /// Mark the reference as optional
    #[must_use]
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    /// Mark the reference as lazy
    #[must_use]
    pub fn lazy(mut self) -> Self {
        self.lazy = true;
        self
    }
}

/// A constructor argument
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Argument {
    /// Reference to another service
    Service(Reference),
    /// Reference to a named parameter
    Parameter(String),
    /// Literal scalar
    Literal(Literal),
    /// Every service carrying the given tag, ordered by priority
    Tagged(String),
    /// Concrete ordered sequence, produced when tagged collections are baked
    Collection(Vec<Argument>),
    /// Private definition flattened into its sole consumer
    Inline(Box<ServiceDefinition>),
}

impl Argument {
    /// Required reference to a service
    pub fn service(id: impl Into<String>) -> Self {
        Argument::Service(Reference::new(id))
    }

    /// Optional reference to a service
    pub fn optional_service(id: impl Into<String>) -> Self {
        Argument::Service(Reference::new(id).optional())
    }

    /// Lazy reference to a service
    pub fn lazy_service(id: impl Into<String>) -> Self {
        Argument::Service(Reference::new(id).lazy())
    }

    /// Reference to a parameter
    pub fn parameter(name: impl Into<String>) -> Self {
        Argument::Parameter(name.into())
    }

    /// Literal value
    pub fn literal(value: impl Into<Literal>) -> Self {
        Argument::Literal(value.into())
    }

    /// Absent value
    pub fn null() -> Self {
        Argument::Literal(Literal::Null)
    }

    /// Collection of services tagged with `tag`
    pub fn tagged(tag: impl Into<String>) -> Self {
        Argument::Tagged(tag.into())
    }

    /// Visit every service reference in this argument, descending into
    /// collections and inline definitions
    pub fn for_each_reference<'a>(&'a self, visit: &mut impl FnMut(&'a Reference)) {
        match self {
            Argument::Service(reference) => visit(reference),
            Argument::Collection(items) => {
                for item in items {
                    item.for_each_reference(visit);
                }
            }
            Argument::Inline(definition) => {
                for argument in definition.arguments.values() {
                    argument.for_each_reference(visit);
                }
            }
            Argument::Parameter(_) | Argument::Literal(_) | Argument::Tagged(_) => {}
        }
    }

    /// Mutable variant of [`Argument::for_each_reference`]
    pub fn for_each_reference_mut(&mut self, visit: &mut impl FnMut(&mut Reference)) {
        match self {
            Argument::Service(reference) => visit(reference),
            Argument::Collection(items) => {
                for item in items {
                    item.for_each_reference_mut(visit);
                }
            }
            Argument::Inline(definition) => {
                for argument in definition.arguments.values_mut() {
                    argument.for_each_reference_mut(visit);
                }
            }
            Argument::Parameter(_) | Argument::Literal(_) | Argument::Tagged(_) => {}
        }
    }

    /// Visit every tag name requested by this argument
    pub fn for_each_tag<'a>(&'a self, visit: &mut impl FnMut(&'a str)) {
        match self {
            Argument::Tagged(tag) => visit(tag),
            Argument::Collection(items) => {
                for item in items {
                    item.for_each_tag(visit);
                }
            }
            Argument::Inline(definition) => {
                for argument in definition.arguments.values() {
                    argument.for_each_tag(visit);
                }
            }
            Argument::Service(_) | Argument::Parameter(_) | Argument::Literal(_) => {}
        }
    }
}

impl From<Literal> for Argument {
    fn from(literal: Literal) -> Self {
        Argument::Literal(literal)
    }
}

impl From<Reference> for Argument {
    fn from(reference: Reference) -> Self {
        Argument::Service(reference)
    }
}

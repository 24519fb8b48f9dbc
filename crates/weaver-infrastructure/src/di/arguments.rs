//! Constructor arguments handed to factories

use super::lazy::LazyService;
use std::any::Any;
use std::sync::Arc;
use weaver_domain::error::{Error, Result};
use weaver_domain::value_objects::Literal;

/// A built service instance
pub type Instance = Arc<dyn Any + Send + Sync>;

/// Run-time value of one constructor argument
#[derive(Clone)]
pub enum Value {
    /// Absent optional reference or null literal
    Null,
    /// Scalar literal
    Literal(Literal),
    /// Built dependency
    Service(Instance),
    /// Dependency built on first use
    Lazy(LazyService),
    /// Ordered sequence, e.g. a tagged collection
    Collection(Vec<Value>),
}

impl std::fmt::Debug for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Null => f.write_str("Null"),
            Value::Literal(literal) => f.debug_tuple("Literal").field(literal).finish(),
            Value::Service(_) => f.write_str("Service(..)"),
            Value::Lazy(lazy) => f.debug_tuple("Lazy").field(&lazy.id()).finish(),
            Value::Collection(items) => f.debug_list().entries(items).finish(),
        }
    }
}

/// Positional arguments of one service being built
///
/// Accessors fail with a construction error naming the service and position
/// when the argument is missing or has another shape.
#[derive(Debug, Clone)]
pub struct ResolvedArguments {
    service_id: String,
    values: Vec<Value>,
}

impl ResolvedArguments {
    /// Arguments for `service_id`
    pub fn new(service_id: impl Into<String>, values: Vec<Value>) -> Self {
        Self {
            service_id: service_id.into(),
            values,
        }
    }

    /// Identifier of the service being built
    pub fn service_id(&self) -> &str {
        &self.service_id
    }

    /// Number of arguments
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether there are no arguments
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Raw argument value
    pub fn value(&self, position: usize) -> Result<&Value> {
        self.values
            .get(position)
            .ok_or_else(|| self.mismatch(position, "is missing"))
    }

    /// Eagerly built dependency
    pub fn service<T: Any + Send + Sync>(&self, position: usize) -> Result<Arc<T>> {
        match self.value(position)? {
            Value::Service(instance) => self.downcast(position, instance),
            Value::Lazy(_) => Err(self.mismatch(position, "is a deferred handle, use lazy()")),
            _ => Err(self.mismatch(position, "is not a service")),
        }
    }

    /// Dependency that may be absent
    pub fn optional_service<T: Any + Send + Sync>(&self, position: usize) -> Result<Option<Arc<T>>> {
        match self.value(position)? {
            Value::Null => Ok(None),
            _ => self.service(position).map(Some),
        }
    }

    /// Deferred handle to a dependency
    pub fn lazy(&self, position: usize) -> Result<LazyService> {
        match self.value(position)? {
            Value::Lazy(lazy) => Ok(lazy.clone()),
            _ => Err(self.mismatch(position, "is not a deferred handle")),
        }
    }

    /// Every built service of a collection, in collection order
    pub fn collection<T: Any + Send + Sync>(&self, position: usize) -> Result<Vec<Arc<T>>> {
        let Value::Collection(items) = self.value(position)? else {
            return Err(self.mismatch(position, "is not a collection"));
        };
        items
            .iter()
            .filter_map(|item| match item {
                Value::Service(instance) => Some(self.downcast(position, instance)),
                Value::Lazy(lazy) => Some(lazy.get_as::<T>()),
                _ => None,
            })
            .collect()
    }

    /// Literal value
    pub fn literal(&self, position: usize) -> Result<&Literal> {
        match self.value(position)? {
            Value::Literal(literal) => Ok(literal),
            _ => Err(self.mismatch(position, "is not a literal")),
        }
    }

    /// String literal
    pub fn string(&self, position: usize) -> Result<String> {
        self.literal(position)?
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| self.mismatch(position, "is not a string"))
    }

    /// Integer literal
    pub fn int(&self, position: usize) -> Result<i64> {
        self.literal(position)?
            .as_int()
            .ok_or_else(|| self.mismatch(position, "is not an integer"))
    }

    /// Boolean literal
    pub fn bool(&self, position: usize) -> Result<bool> {
        self.literal(position)?
            .as_bool()
            .ok_or_else(|| self.mismatch(position, "is not a boolean"))
    }

    fn downcast<T: Any + Send + Sync>(&self, position: usize, instance: &Instance) -> Result<Arc<T>> {
        Arc::clone(instance).downcast::<T>().map_err(|_| {
            self.mismatch(
                position,
                format!("is not a {}", std::any::type_name::<T>()),
            )
        })
    }

    fn mismatch(&self, position: usize, problem: impl std::fmt::Display) -> Error {
        Error::construction(&self.service_id, format!("argument #{position} {problem}"))
    }
}

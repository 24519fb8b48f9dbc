//! Service definitions
//!
//! A [`ServiceDefinition`] is the declarative recipe for one service: the
//! class it is built from, its positional arguments, tags and the flags that
//! govern visibility, sharing and laziness.

use super::argument::{Argument, Literal};
use super::tag::Tag;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Whether a service can be requested from outside the container
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    /// Retrievable by identifier and a pruning root
    Public,
    /// Only reachable as a dependency of another service
    #[default]
    Private,
}

/// Instance sharing mode
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sharing {
    /// One memoized instance per container lifetime
    #[default]
    Shared,
    /// A fresh instance on every request
    Transient,
}

/// One constructor parameter as declared by the implementing type
///
/// Autowiring reads these to fill positions the definition leaves unset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterSlot {
    /// Parameter name, used in diagnostics
    pub name: String,
    /// Capability token the argument must provide
    #[serde(default)]
    pub capability: Option<String>,
    /// Resolve to absent when no candidate exists
    #[serde(default)]
    pub nullable: bool,
    /// Explicit service identifier; bypasses the capability search
    #[serde(default)]
    pub target: Option<String>,
    /// Value used when no candidate exists
    #[serde(default)]
    pub default: Option<Literal>,
}

impl ParameterSlot {
    /// Untyped parameter
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            capability: None,
            nullable: false,
            target: None,
            default: None,
        }
    }

    /// Parameter requiring a capability
    pub fn typed(name: impl Into<String>, capability: impl Into<String>) -> Self {
        Self {
            capability: Some(capability.into()),
            ..Self::new(name)
        }
    }

    /// Allow the parameter to resolve to absent
    #[must_use]
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// Pin the parameter to an exact service identifier
    #[must_use]
    pub fn named(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }

    /// Fallback literal when no candidate exists
    #[must_use]
    pub fn with_default(mut self, value: impl Into<Literal>) -> Self {
        self.default = Some(value.into());
        self
    }
}

/// Decoration request: this definition wraps another service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decoration {
    /// Identifier being decorated
    pub target: String,
    /// Identifier the original definition is renamed to
    #[serde(default)]
    pub inner_id: Option<String>,
    /// Higher priorities sit closer to the original service
    #[serde(default)]
    pub priority: i32,
}

/// Declarative recipe for constructing a service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceDefinition {
    /// Unique identifier
    pub id: String,
    /// Implementing type; defaults to the identifier
    #[serde(default)]
    pub class: Option<String>,
    /// Positional arguments; unset positions may be filled by autowiring
    #[serde(default)]
    pub arguments: BTreeMap<usize, Argument>,
    /// Constructor signature used by autowiring
    #[serde(default)]
    pub signature: Vec<ParameterSlot>,
    /// Tags in declaration order
    #[serde(default)]
    pub tags: Vec<Tag>,
    /// Capability tokens this service implements
    #[serde(default)]
    pub capabilities: BTreeSet<String>,
    /// Capabilities for which this service is the default implementation
    #[serde(default)]
    pub default_for: BTreeSet<String>,
    /// Public or private
    #[serde(default)]
    pub visibility: Visibility,
    /// Shared singleton or fresh per request
    #[serde(default)]
    pub sharing: Sharing,
    /// Template only; never instantiated
    #[serde(default)]
    pub is_abstract: bool,
    /// Construction deferred to first use
    #[serde(default)]
    pub lazy: bool,
    /// Unset arguments are inferred from the signature
    #[serde(default)]
    pub autowire: bool,
    /// Capability-driven tags may be attached
    #[serde(default = "default_true")]
    pub autoconfigure: bool,
    /// Template definition this one inherits from
    #[serde(default)]
    pub parent: Option<String>,
    /// Service this definition decorates
    #[serde(default)]
    pub decorates: Option<Decoration>,
    /// Set on a decorated original: the decorator wrapping it
    #[serde(default)]
    pub decorated_by: Option<String>,
}

fn default_true() -> bool {
    true
}

impl ServiceDefinition {
    /// Private, shared definition with no arguments
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            class: None,
            arguments: BTreeMap::new(),
            signature: Vec::new(),
            tags: Vec::new(),
            capabilities: BTreeSet::new(),
            default_for: BTreeSet::new(),
            visibility: Visibility::Private,
            sharing: Sharing::Shared,
            is_abstract: false,
            lazy: false,
            autowire: false,
            autoconfigure: true,
            parent: None,
            decorates: None,
            decorated_by: None,
        }
    }

    /// Set the implementing class
    #[must_use]
    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.class = Some(class.into());
        self
    }

    /// Append an argument after the last set position
    #[must_use]
    pub fn with_argument(mut self, argument: impl Into<Argument>) -> Self {
        let next = self.next_position();
        self.arguments.insert(next, argument.into());
        self
    }

    /// Set the argument at a specific position
    #[must_use]
    pub fn with_argument_at(mut self, position: usize, argument: impl Into<Argument>) -> Self {
        self.arguments.insert(position, argument.into());
        self
    }

    /// Append a constructor parameter to the signature
    #[must_use]
    pub fn with_parameter(mut self, slot: ParameterSlot) -> Self {
        self.signature.push(slot);
        self
    }

    /// Attach a tag
    #[must_use]
    pub fn with_tag(mut self, tag: Tag) -> Self {
        self.tags.push(tag);
        self
    }

    /// Declare an implemented capability
    #[must_use]
    pub fn with_capability(mut self, capability: impl Into<String>) -> Self {
        self.capabilities.insert(capability.into());
        self
    }

    /// Mark this service as the default implementation of a capability
    ///
    /// Also declares the capability.
    #[must_use]
    pub fn default_for(mut self, capability: impl Into<String>) -> Self {
        let capability = capability.into();
        self.capabilities.insert(capability.clone());
        self.default_for.insert(capability);
        self
    }

    /// Make the service public
    #[must_use]
    pub fn public(mut self) -> Self {
        self.visibility = Visibility::Public;
        self
    }

    /// Make the service private
    #[must_use]
    pub fn private(mut self) -> Self {
        self.visibility = Visibility::Private;
        self
    }

    /// Build a fresh instance on every request
    #[must_use]
    pub fn transient(mut self) -> Self {
        self.sharing = Sharing::Transient;
        self
    }

    /// Mark as abstract template
    #[must_use]
    pub fn abstract_template(mut self) -> Self {
        self.is_abstract = true;
        self
    }

    /// Defer construction to first use
    #[must_use]
    pub fn lazy(mut self) -> Self {
        self.lazy = true;
        self
    }

    /// Opt in to autowiring
    #[must_use]
    pub fn autowired(mut self) -> Self {
        self.autowire = true;
        self
    }

    /// Opt out of autoconfiguration
    #[must_use]
    pub fn without_autoconfigure(mut self) -> Self {
        self.autoconfigure = false;
        self
    }

    /// Inherit from a template definition
    #[must_use]
    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    /// Decorate another service
    #[must_use]
    pub fn decorating(mut self, target: impl Into<String>) -> Self {
        self.decorates = Some(Decoration {
            target: target.into(),
            inner_id: None,
            priority: 0,
        });
        self
    }

    /// Decorate another service with explicit inner identifier and priority
    #[must_use]
    pub fn decorating_with(
        mut self,
        target: impl Into<String>,
        inner_id: Option<String>,
        priority: i32,
    ) -> Self {
        self.decorates = Some(Decoration {
            target: target.into(),
            inner_id,
            priority,
        });
        self
    }

    /// Class the service is built from
    pub fn class_name(&self) -> &str {
        self.class.as_deref().unwrap_or(&self.id)
    }

    /// Whether the service is public
    pub fn is_public(&self) -> bool {
        self.visibility == Visibility::Public
    }

    /// Whether the service is shared
    pub fn is_shared(&self) -> bool {
        self.sharing == Sharing::Shared
    }

    /// Position right after the highest set argument
    pub fn next_position(&self) -> usize {
        self.arguments.keys().next_back().map_or(0, |last| last + 1)
    }

    /// Number of constructor positions: the larger of the signature length and
    /// the highest set argument
    pub fn arity(&self) -> usize {
        self.signature.len().max(self.next_position())
    }

    /// Positions in `0..arity()` that have no argument
    pub fn unset_positions(&self) -> Vec<usize> {
        (0..self.arity())
            .filter(|position| !self.arguments.contains_key(position))
            .collect()
    }

    /// Tags with the given name
    pub fn tags_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Tag> + 'a {
        self.tags.iter().filter(move |tag| tag.name == name)
    }

    /// Whether at least one tag with the given name is attached
    pub fn has_tag(&self, name: &str) -> bool {
        self.tags.iter().any(|tag| tag.name == name)
    }
}

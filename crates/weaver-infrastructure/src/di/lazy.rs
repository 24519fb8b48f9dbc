//! Deferred service handles

use super::arguments::Instance;
use super::container::{ContainerState, is_constructing};
use once_cell::sync::OnceCell;
use std::any::Any;
use std::fmt;
use std::sync::{Arc, Weak};
use tracing::trace;
use weaver_domain::error::{Error, Result};

/// Handle to a service that is built on the first call to [`LazyService::get`]
///
/// The resolved instance is kept by the handle; clones share it. The handle
/// does not keep its container alive.
#[derive(Clone)]
pub struct LazyService {
    id: String,
    container: Weak<ContainerState>,
    cell: Arc<OnceCell<Instance>>,
}

impl LazyService {
    pub(crate) fn new(id: impl Into<String>, container: Weak<ContainerState>) -> Self {
        Self {
            id: id.into(),
            container,
            cell: Arc::new(OnceCell::new()),
        }
    }

    /// Identifier of the deferred service
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Whether the target has been resolved through this handle
    pub fn is_resolved(&self) -> bool {
        self.cell.get().is_some()
    }

    /// Resolve the target, building it on first use
    pub fn get(&self) -> Result<Instance> {
        if let Some(instance) = self.cell.get() {
            return Ok(Arc::clone(instance));
        }
        if is_constructing(&self.id) {
            return Err(Error::construction(
                &self.id,
                "deferred service requested while it is being constructed",
            ));
        }
        self.cell
            .get_or_try_init(|| {
                let container = self.container.upgrade().ok_or_else(|| {
                    Error::construction(&self.id, "container dropped before first use")
                })?;
                trace!(service = %self.id, "resolving deferred service");
                container.resolve(&self.id)
            })
            .map(Arc::clone)
    }

    /// Resolve the target and downcast it
    pub fn get_as<T: Any + Send + Sync>(&self) -> Result<Arc<T>> {
        self.get()?.downcast::<T>().map_err(|_| {
            Error::construction(
                &self.id,
                format!("deferred service is not a {}", std::any::type_name::<T>()),
            )
        })
    }
}

impl fmt::Debug for LazyService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LazyService")
            .field("id", &self.id)
            .field("resolved", &self.is_resolved())
            .finish()
    }
}

// component.rs - Component id allocation
//
// Ids are dense and handed out in registration order. Nothing is ever freed,
// so an id stays valid for the lifetime of its registry.

use crate::config::{RegistryConfig, MAX_CAPACITY};
use crate::error::RegistryError;
use std::borrow::Cow;
use std::fmt;
use std::sync::{PoisonError, RwLock};

/// Dense identity assigned once per registered component type.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ComponentId(u32);

impl ComponentId {
    pub(crate) fn new(index: usize) -> Self {
        // Registries never hand out more than MAX_CAPACITY ids.
        debug_assert!(index < MAX_CAPACITY);
        Self(index as u32)
    }

    /// Slot index backing this id.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Allocator of [`ComponentId`]s.
///
/// Registration is not idempotent: every call claims a fresh id. Callers
/// are expected to register each type once (see [`Instance`](crate::Instance)
/// and [`Context::register`](crate::Context::register)).
#[derive(Debug)]
pub struct ComponentRegistry {
    name: String,
    capacity: usize,
    names: RwLock<Vec<Cow<'static, str>>>,
}

impl ComponentRegistry {
    pub fn new(capacity: usize) -> Self {
        Self::from_config(&RegistryConfig::with_capacity(capacity))
    }

    /// Build a registry from `config`.
    ///
    /// The effective capacity is clamped to [`MAX_CAPACITY`], so an
    /// unvalidated config can never produce colliding ids.
    pub fn from_config(config: &RegistryConfig) -> Self {
        let capacity = config.capacity.min(MAX_CAPACITY);
        Self {
            name: config.name.clone(),
            capacity,
            names: RwLock::new(Vec::with_capacity(capacity)),
        }
    }

    /// Claim the next free id for `name`.
    pub fn register_component(
        &self,
        name: impl Into<Cow<'static, str>>,
    ) -> Result<ComponentId, RegistryError> {
        let name = name.into();
        let mut names = self.names.write().unwrap_or_else(PoisonError::into_inner);
        if names.len() >= self.capacity {
            return Err(RegistryError::CapacityExceeded {
                registry: self.name.clone(),
                name: name.into_owned(),
                capacity: self.capacity,
            });
        }

        let id = ComponentId::new(names.len());
        tracing::debug!(registry = %self.name, component = %name, %id, "claimed component id");
        names.push(name);
        Ok(id)
    }

    /// Number of ids issued so far.
    pub fn size(&self) -> usize {
        self.names.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Display name recorded when `id` was claimed.
    pub fn name_of(&self, id: ComponentId) -> Option<Cow<'static, str>> {
        self.names
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id.index())
            .cloned()
    }

    /// All registered components in id order.
    pub fn entries(&self) -> Vec<(ComponentId, Cow<'static, str>)> {
        self.names
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .enumerate()
            .map(|(index, name)| (ComponentId::new(index), name.clone()))
            .collect()
    }
}

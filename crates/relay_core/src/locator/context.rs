// context.rs - Explicit service locator
//
// Owns its own registry and shared table, so independent contexts never see
// each other's ids or instances.

use crate::config::{check_capacity, RegistryConfig};
use crate::error::RegistryError;
use crate::locator::{ComponentId, ComponentRegistry, SharedInstance, SharedInstanceTable};
use std::any::{type_name, Any, TypeId};
use std::collections::HashMap;
use std::sync::Arc;

/// Locator passed explicitly to the code that needs it.
pub struct Context {
    registry: ComponentRegistry,
    ids: HashMap<TypeId, ComponentId>,
    instances: SharedInstanceTable,
}

impl Context {
    pub fn new(config: &RegistryConfig) -> Result<Self, RegistryError> {
        check_capacity(config.capacity)?;
        let registry = ComponentRegistry::from_config(config);
        let instances = SharedInstanceTable::new(&registry)?;
        Ok(Self {
            registry,
            ids: HashMap::new(),
            instances,
        })
    }

    pub fn registry(&self) -> &ComponentRegistry {
        &self.registry
    }

    pub fn instances(&self) -> &SharedInstanceTable {
        &self.instances
    }

    /// Id for `T`, claiming one on the first call for each type.
    pub fn register<T: Any + Send + Sync>(&mut self) -> Result<ComponentId, RegistryError> {
        let key = TypeId::of::<T>();
        if let Some(&id) = self.ids.get(&key) {
            return Ok(id);
        }
        let id = self.registry.register_component(type_name::<T>())?;
        self.ids.insert(key, id);
        Ok(id)
    }

    pub fn id_of<T: Any>(&self) -> Option<ComponentId> {
        self.ids.get(&TypeId::of::<T>()).copied()
    }

    /// Store `instance` as the `T` for this context, replacing any previous one.
    pub fn provide<T: Any + Send + Sync>(
        &mut self,
        instance: Arc<T>,
    ) -> Result<ComponentId, RegistryError> {
        let id = self.register::<T>()?;
        self.instances.set_instance(id, instance as SharedInstance);
        Ok(id)
    }

    /// # Panics
    /// Panics if no `T` has been provided.
    pub fn get<T: Any + Send + Sync>(&self) -> Arc<T> {
        match self.get_optional::<T>() {
            Some(instance) => instance,
            None => {
                tracing::error!(registry = self.registry.name(), component = type_name::<T>(), "instance used before it was provided");
                panic!("instance of '{}' used before it was provided", type_name::<T>());
            }
        }
    }

    pub fn get_optional<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        let id = self.id_of::<T>()?;
        self.instances.retain_as::<T>(id)
    }

    /// Borrow the `T` without taking a reference.
    pub fn borrow<T: Any>(&self) -> Option<&T> {
        let id = self.id_of::<T>()?;
        self.instances.borrow_as::<T>(id)
    }

    /// Release this context's `T`. The id stays claimed.
    pub fn remove<T: Any + Send + Sync>(&mut self) -> Option<Arc<T>> {
        let id = self.id_of::<T>()?;
        let previous = self.instances.clear(id)?;
        previous.downcast::<T>().ok()
    }
}

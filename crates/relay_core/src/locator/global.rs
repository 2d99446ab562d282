//! Process-wide registry and instance table.
//!
//! Both are created lazily on first use. [`init_global`] may replace the
//! default configuration, but only before anything has touched them.

use crate::config::{check_capacity, RegistryConfig};
use crate::error::RegistryError;
use crate::locator::{ComponentRegistry, InstanceTable};
use once_cell::sync::{Lazy, OnceCell};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

static CONFIG: OnceCell<RegistryConfig> = OnceCell::new();

static REGISTRY: Lazy<ComponentRegistry> =
    Lazy::new(|| ComponentRegistry::from_config(global_config()));

static INSTANCES: Lazy<RwLock<InstanceTable>> = Lazy::new(|| match InstanceTable::new(&REGISTRY) {
    Ok(table) => RwLock::new(table),
    Err(err) => {
        tracing::error!(%err, "global instance table could not be created");
        panic!("{err}");
    }
});

/// Configure the global registry. Must run before the first registration.
pub fn init_global(config: RegistryConfig) -> Result<(), RegistryError> {
    check_capacity(config.capacity)?;
    let name = config.name.clone();
    let capacity = config.capacity;
    CONFIG
        .set(config)
        .map_err(|_| RegistryError::AlreadyInitialized)?;
    tracing::debug!(registry = %name, capacity, "global registry configured");
    Ok(())
}

pub fn global_config() -> &'static RegistryConfig {
    CONFIG.get_or_init(RegistryConfig::default)
}

pub fn global_registry() -> &'static ComponentRegistry {
    &REGISTRY
}

pub fn read_instances() -> RwLockReadGuard<'static, InstanceTable> {
    INSTANCES.read().unwrap_or_else(PoisonError::into_inner)
}

pub fn write_instances() -> RwLockWriteGuard<'static, InstanceTable> {
    INSTANCES.write().unwrap_or_else(PoisonError::into_inner)
}

//! Relay Core
//!
//! Contains the service-locator and broadcast substrate:
//! - Component registry (dense ids per named type)
//! - Instance slot tables (non-owning and shared)
//! - Typed instance accessors with lazy caching
//! - Multicast events and transform pipelines

pub mod config;
pub mod error;
pub mod event;
pub mod locator;

pub use config::{RegistryConfig, DEFAULT_CAPACITY, MAX_CAPACITY};
pub use error::{ConfigError, RegistryError};
pub use event::{Event, Pipeline, Subscriber, Subscription};
pub use locator::{
    global_config, global_registry, init_global, read_instances, write_instances, ComponentId,
    ComponentRegistry, Context, Instance, InstanceBinding, InstanceRef, InstanceTable, SharedInstance,
    SharedInstanceTable, SlotTable,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_is_set() {
        assert!(!VERSION.is_empty());
    }
}

// bootstrap.rs - One-time id claim for declared instance types

use crate::locator::{global_registry, ComponentId, ComponentRegistry};

/// Claim an id for `name` from `registry`.
///
/// Running out of ids here means the process was configured with too small
/// a capacity; there is nothing sensible to fall back to.
pub(crate) fn claim_id(registry: &ComponentRegistry, name: &'static str) -> ComponentId {
    match registry.register_component(name) {
        Ok(id) => id,
        Err(err) => {
            tracing::error!(registry = registry.name(), component = name, %err, "component bootstrap failed");
            panic!("{err}");
        }
    }
}

pub(crate) fn claim_global_id(name: &'static str) -> ComponentId {
    claim_id(global_registry(), name)
}

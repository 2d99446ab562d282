//! Typed service locator.
//!
//! Component ids are claimed from a [`ComponentRegistry`] once per type and
//! index into fixed-capacity slot tables. Several tables can share one
//! registry, so an id always names the same type regardless of which table
//! it is used with. [`Instance`] binds a Rust type to its id and mediates
//! every read and write; [`Context`] is the explicit, non-global variant.

mod bootstrap;
mod component;
mod context;
mod global;
mod instance;
mod table;

pub use component::{ComponentId, ComponentRegistry};
pub use context::Context;
pub use global::{global_config, global_registry, init_global, read_instances, write_instances};
pub use instance::{Instance, InstanceBinding};
pub use table::{InstanceRef, InstanceTable, SharedInstance, SharedInstanceTable, SlotTable};

/// Implement [`Instance`] for a type, binding it to a process-wide id.
///
/// The id is claimed from the global registry exactly once, the first time
/// the type is touched (or eagerly via [`Instance::ensure_registered`]).
///
/// # Example
/// ```ignore
/// struct ResourceManager { /* ... */ }
///
/// declare_instance!(ResourceManager);
///
/// ResourceManager::set(Box::leak(Box::new(ResourceManager::new())));
/// let manager = ResourceManager::get();
/// ```
#[macro_export]
macro_rules! declare_instance {
    ($ty:ty) => {
        $crate::declare_instance!($ty, stringify!($ty));
    };
    ($ty:ty, $name:expr) => {
        impl $crate::Instance for $ty {
            fn binding() -> &'static $crate::InstanceBinding<Self> {
                static BINDING: $crate::InstanceBinding<$ty> = $crate::InstanceBinding::new($name);
                &BINDING
            }
        }
    };
}

// instance.rs - Typed access to instance tables
//
// Each participating type owns a static `InstanceBinding` (see
// `declare_instance!`). The binding claims the type's id once and caches
// the global instance after the first successful lookup.

use crate::locator::bootstrap::claim_global_id;
use crate::locator::{
    read_instances, write_instances, ComponentId, InstanceRef, InstanceTable, SharedInstance,
    SharedInstanceTable,
};
use once_cell::sync::OnceCell;
use std::any::Any;
use std::sync::Arc;

/// Per-type static state: display name, claimed id and cached global instance.
pub struct InstanceBinding<T: 'static> {
    name: &'static str,
    id: OnceCell<ComponentId>,
    cached: OnceCell<&'static T>,
}

impl<T: 'static> InstanceBinding<T> {
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            id: OnceCell::new(),
            cached: OnceCell::new(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Id for `T`, claiming one from the global registry on first use.
    pub fn id(&self) -> ComponentId {
        *self.id.get_or_init(|| claim_global_id(self.name))
    }

    pub fn is_registered(&self) -> bool {
        self.id.get().is_some()
    }

    pub fn is_cached(&self) -> bool {
        self.cached.get().is_some()
    }

    // Once cached the pointer is never refreshed, even if the table changes.
    fn cache(&self, instance: &'static T) -> &'static T {
        self.cached.get_or_init(|| instance)
    }
}

/// A type reachable through the service locator.
///
/// Implemented via [`declare_instance!`](crate::declare_instance). Reading a
/// slot that was never set through [`get`](Instance::get) or
/// [`get_in`](Instance::get_in) is a programming error and panics; use the
/// `*_optional` variants when absence is expected.
pub trait Instance: Any + Send + Sync + Sized {
    fn binding() -> &'static InstanceBinding<Self>;

    fn name() -> &'static str {
        Self::binding().name()
    }

    fn id() -> ComponentId {
        Self::binding().id()
    }

    /// Claim the id now instead of on first access.
    fn ensure_registered() -> ComponentId {
        Self::id()
    }

    fn get_in(table: &InstanceTable) -> &'static Self {
        Self::get_optional_in(table).unwrap_or_else(|| used_before_set(Self::name()))
    }

    fn get_optional_in(table: &InstanceTable) -> Option<&'static Self> {
        table.get_as::<Self>(Self::id())
    }

    fn set_in(instance: &'static Self, table: &mut InstanceTable) {
        table.set_instance(Self::id(), instance as InstanceRef);
    }

    /// Global instance. Only the first call consults the table.
    fn get() -> &'static Self {
        let binding = Self::binding();
        if let Some(instance) = binding.cached.get() {
            return instance;
        }
        let instance = Self::get_in(&read_instances());
        binding.cache(instance)
    }

    /// Like [`get`](Instance::get), but absence is not an error. Absence is
    /// not cached, so a later call sees a subsequent `set`.
    fn get_optional() -> Option<&'static Self> {
        let binding = Self::binding();
        if let Some(instance) = binding.cached.get() {
            return Some(instance);
        }
        let instance = Self::get_optional_in(&read_instances())?;
        Some(binding.cache(instance))
    }

    fn set(instance: &'static Self) {
        Self::set_in(instance, &mut write_instances());
    }

    fn get_shared(table: &SharedInstanceTable) -> &Self {
        Self::get_shared_optional(table).unwrap_or_else(|| used_before_set(Self::name()))
    }

    fn get_shared_optional(table: &SharedInstanceTable) -> Option<&Self> {
        table.borrow_as::<Self>(Self::id())
    }

    /// New strong reference to the shared instance, if one is set.
    fn retain(table: &SharedInstanceTable) -> Option<Arc<Self>> {
        table.retain_as::<Self>(Self::id())
    }

    fn set_shared(instance: Arc<Self>, table: &mut SharedInstanceTable) {
        table.set_instance(Self::id(), instance as SharedInstance);
    }
}

#[cold]
fn used_before_set(name: &str) -> ! {
    tracing::error!(component = name, "instance used before it was set");
    panic!("instance of '{name}' used before it was set");
}

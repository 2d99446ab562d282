// table.rs - Fixed-capacity instance slot tables
//
// One slot per possible component id, all empty at construction. Ids come
// from a registry; an id past the end of the table is a hard failure.

use crate::locator::{ComponentId, ComponentRegistry};
use crate::config::check_capacity;
use crate::error::RegistryError;
use relay_metrics::Counter;
use std::any::{type_name, Any};
use std::sync::Arc;

/// Non-owning slot value. The table never manages its lifetime.
pub type InstanceRef = &'static (dyn Any + Send + Sync);

/// Owning slot value. The table holds one strong reference per populated slot.
pub type SharedInstance = Arc<dyn Any + Send + Sync>;

/// Table of raw, non-owning instance references.
pub type InstanceTable = SlotTable<InstanceRef>;

/// Table of reference-counted instances.
pub type SharedInstanceTable = SlotTable<SharedInstance>;

/// Fixed-length array from [`ComponentId`] to an optional value.
pub struct SlotTable<S> {
    slots: Vec<Option<S>>,
    lookups: Counter,
}

impl<S> SlotTable<S> {
    /// Create a table sized to the registry's capacity.
    pub fn new(registry: &ComponentRegistry) -> Result<Self, RegistryError> {
        Self::with_capacity(registry, registry.capacity())
    }

    /// Create a table with `capacity` slots.
    ///
    /// Fails if `capacity` is zero or above [`MAX_CAPACITY`](crate::MAX_CAPACITY), or if the
    /// registry has already handed out more ids than the table can hold.
    pub fn with_capacity(
        registry: &ComponentRegistry,
        capacity: usize,
    ) -> Result<Self, RegistryError> {
        check_capacity(capacity)?;
        let registered = registry.size();
        if registered > capacity {
            return Err(RegistryError::TableTooSmall {
                registered,
                capacity,
            });
        }

        tracing::debug!(registry = registry.name(), capacity, registered, "instance table created");
        Ok(Self {
            slots: (0..capacity).map(|_| None).collect(),
            lookups: Counter::new(),
        })
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of populated slots.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }

    /// Borrow the value stored under `id`.
    ///
    /// # Panics
    /// Panics if `id` is outside the table.
    pub fn get_instance(&self, id: ComponentId) -> Option<&S> {
        relay_metrics::metrics! {
            self.lookups.increment(&id.to_string(), 1);
        }
        self.slot(id).as_ref()
    }

    /// Store `value` under `id`, dropping whatever the slot held before.
    ///
    /// The new value is in place before the old one is released, so storing
    /// a handle to the value already in the slot never destroys it.
    pub fn set_instance(&mut self, id: ComponentId, value: S) {
        let previous = self.slot_mut(id).replace(value);
        tracing::trace!(%id, replaced = previous.is_some(), "instance slot written");
        drop(previous);
    }

    /// Empty the slot under `id`, handing back its previous value.
    pub fn clear(&mut self, id: ComponentId) -> Option<S> {
        let previous = self.slot_mut(id).take();
        tracing::trace!(%id, cleared = previous.is_some(), "instance slot cleared");
        previous
    }

    /// How many times `id` has been looked up (always 0 without `metrics`).
    pub fn lookups(&self, id: ComponentId) -> usize {
        self.lookups.get(&id.to_string())
    }

    fn slot(&self, id: ComponentId) -> &Option<S> {
        match self.slots.get(id.index()) {
            Some(slot) => slot,
            None => out_of_range(id, self.slots.len()),
        }
    }

    fn slot_mut(&mut self, id: ComponentId) -> &mut Option<S> {
        let capacity = self.slots.len();
        match self.slots.get_mut(id.index()) {
            Some(slot) => slot,
            None => out_of_range(id, capacity),
        }
    }
}

impl SlotTable<InstanceRef> {
    /// Typed view of the reference stored under `id`.
    ///
    /// # Panics
    /// Panics if the slot holds a value of another type.
    pub fn get_as<T: Any>(&self, id: ComponentId) -> Option<&'static T> {
        let value: InstanceRef = *self.get_instance(id)?;
        match value.downcast_ref::<T>() {
            Some(typed) => Some(typed),
            None => type_mismatch::<T>(id),
        }
    }
}

impl SlotTable<SharedInstance> {
    /// Borrow the instance under `id` without touching its reference count.
    ///
    /// # Panics
    /// Panics if the slot holds a value of another type.
    pub fn borrow_as<T: Any>(&self, id: ComponentId) -> Option<&T> {
        let value = self.get_instance(id)?;
        match (**value).downcast_ref::<T>() {
            Some(typed) => Some(typed),
            None => type_mismatch::<T>(id),
        }
    }

    /// Take a new strong reference to the instance under `id`.
    ///
    /// # Panics
    /// Panics if the slot holds a value of another type.
    pub fn retain_as<T: Any + Send + Sync>(&self, id: ComponentId) -> Option<Arc<T>> {
        let value = Arc::clone(self.get_instance(id)?);
        match value.downcast::<T>() {
            Ok(typed) => Some(typed),
            Err(_) => type_mismatch::<T>(id),
        }
    }
}

#[cold]
fn out_of_range(id: ComponentId, capacity: usize) -> ! {
    tracing::error!(%id, capacity, "component id outside instance table");
    panic!("component id {id} is outside the instance table ({capacity} slots)");
}

#[cold]
fn type_mismatch<T>(id: ComponentId) -> ! {
    tracing::error!(%id, expected = type_name::<T>(), "instance slot holds another type");
    panic!("instance slot {id} does not hold a {}", type_name::<T>());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MAX_CAPACITY;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug, PartialEq)]
    struct Foo(u32);

    #[derive(Debug, PartialEq)]
    struct Bar(&'static str);

    static FOO: Foo = Foo(7);
    static BAR: Bar = Bar("bar");

    /// Stand-in whose drops are observable.
    struct Tracked {
        drops: Arc<AtomicUsize>,
    }

    impl Drop for Tracked {
        fn drop(&mut self) {
            self.drops.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn test_foo_bar_scenario() {
        let registry = ComponentRegistry::new(8);
        let foo = registry.register_component("Foo").unwrap();
        let bar = registry.register_component("Bar").unwrap();
        assert_eq!(foo.index(), 0);
        assert_eq!(bar.index(), 1);

        let mut table = InstanceTable::new(&registry).unwrap();
        table.set_instance(foo, &FOO as InstanceRef);
        table.set_instance(bar, &BAR as InstanceRef);

        assert!(std::ptr::eq(table.get_as::<Foo>(foo).unwrap(), &FOO));
        assert!(std::ptr::eq(table.get_as::<Bar>(bar).unwrap(), &BAR));

        // A third type that was registered but never populated.
        let baz = registry.register_component("Baz").unwrap();
        assert!(table.get_as::<Foo>(baz).is_none());
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_table_too_small() {
        let registry = ComponentRegistry::new(8);
        for name in ["A", "B", "C"] {
            registry.register_component(name).unwrap();
        }

        let err = InstanceTable::with_capacity(&registry, 2).err().unwrap();
        assert!(matches!(
            err,
            RegistryError::TableTooSmall {
                registered: 3,
                capacity: 2
            }
        ));
        assert!(InstanceTable::with_capacity(&registry, 3).is_ok());
    }

    #[test]
    fn test_capacity_out_of_bounds_rejected() {
        let registry = ComponentRegistry::new(4);
        for capacity in [0, MAX_CAPACITY + 1, usize::MAX] {
            let err = SharedInstanceTable::with_capacity(&registry, capacity)
                .err()
                .unwrap();
            assert!(matches!(err, RegistryError::InvalidCapacity { .. }));
        }
    }

    #[test]
    fn test_tables_share_id_namespace() {
        let registry = ComponentRegistry::new(4);
        let foo = registry.register_component("Foo").unwrap();

        let mut global = SharedInstanceTable::new(&registry).unwrap();
        let mut scoped = SharedInstanceTable::new(&registry).unwrap();
        global.set_instance(foo, Arc::new(Foo(1)) as SharedInstance);
        scoped.set_instance(foo, Arc::new(Foo(2)) as SharedInstance);

        assert_eq!(global.borrow_as::<Foo>(foo), Some(&Foo(1)));
        assert_eq!(scoped.borrow_as::<Foo>(foo), Some(&Foo(2)));
    }

    #[test]
    fn test_overwrite_releases_previous_once() {
        let registry = ComponentRegistry::new(4);
        let id = registry.register_component("Tracked").unwrap();
        let mut table = SharedInstanceTable::new(&registry).unwrap();

        let drops = Arc::new(AtomicUsize::new(0));
        let first = Arc::new(Tracked {
            drops: Arc::clone(&drops),
        });
        table.set_instance(id, Arc::clone(&first) as SharedInstance);
        assert_eq!(Arc::strong_count(&first), 2);

        let second = Arc::new(Tracked {
            drops: Arc::clone(&drops),
        });
        table.set_instance(id, Arc::clone(&second) as SharedInstance);
        assert_eq!(Arc::strong_count(&first), 1);
        assert_eq!(Arc::strong_count(&second), 2);
        assert_eq!(drops.load(Ordering::SeqCst), 0);

        drop(first);
        assert_eq!(drops.load(Ordering::SeqCst), 1);

        drop(table);
        assert_eq!(Arc::strong_count(&second), 1);
        drop(second);
        assert_eq!(drops.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_restore_same_value_keeps_it_alive() {
        let registry = ComponentRegistry::new(4);
        let id = registry.register_component("Tracked").unwrap();
        let mut table = SharedInstanceTable::new(&registry).unwrap();

        let drops = Arc::new(AtomicUsize::new(0));
        table.set_instance(
            id,
            Arc::new(Tracked {
                drops: Arc::clone(&drops),
            }) as SharedInstance,
        );

        // Re-store the table's only handle into its own slot.
        let same = Arc::clone(table.get_instance(id).unwrap());
        table.set_instance(id, same);

        assert_eq!(drops.load(Ordering::SeqCst), 0);
        let held = table.retain_as::<Tracked>(id).unwrap();
        assert_eq!(Arc::strong_count(&held), 2);
    }

    #[test]
    fn test_borrow_does_not_retain() {
        let registry = ComponentRegistry::new(4);
        let id = registry.register_component("Foo").unwrap();
        let mut table = SharedInstanceTable::new(&registry).unwrap();

        let foo = Arc::new(Foo(3));
        table.set_instance(id, Arc::clone(&foo) as SharedInstance);
        assert_eq!(table.borrow_as::<Foo>(id), Some(&Foo(3)));
        assert_eq!(Arc::strong_count(&foo), 2);

        let retained = table.retain_as::<Foo>(id).unwrap();
        assert_eq!(Arc::strong_count(&foo), 3);
        drop(retained);

        let cleared = table.clear(id);
        assert!(cleared.is_some());
        drop(cleared);
        assert_eq!(Arc::strong_count(&foo), 1);
        assert!(table.is_empty());
    }

    #[test]
    #[should_panic(expected = "outside the instance table")]
    fn test_out_of_range_id_panics() {
        let registry = ComponentRegistry::new(2);
        let table = InstanceTable::new(&registry).unwrap();
        table.get_instance(ComponentId::new(2));
    }

    #[test]
    #[should_panic(expected = "does not hold")]
    fn test_type_mismatch_panics() {
        let registry = ComponentRegistry::new(2);
        let id = registry.register_component("Foo").unwrap();
        let mut table = InstanceTable::new(&registry).unwrap();
        table.set_instance(id, &FOO as InstanceRef);
        table.get_as::<Bar>(id);
    }

    #[cfg(feature = "metrics")]
    #[test]
    fn test_lookups_counted_per_id() {
        let registry = ComponentRegistry::new(4);
        let foo = registry.register_component("Foo").unwrap();
        let bar = registry.register_component("Bar").unwrap();
        let mut table = InstanceTable::new(&registry).unwrap();
        table.set_instance(foo, &FOO as InstanceRef);

        table.get_as::<Foo>(foo);
        table.get_as::<Foo>(foo);
        table.get_instance(bar);

        assert_eq!(table.lookups(foo), 2);
        assert_eq!(table.lookups(bar), 1);
    }
}

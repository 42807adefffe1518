//! Type-erased registration record shared by every key bound to it.

use crate::container::error::ContainerError;
use crate::container::lifetime::{Lifetime, Policy};
use crate::container::resolution::Resolution;
use crate::container::service::{Binds, Service};
use parking_lot::Mutex;
use std::any::{type_name, Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

pub(crate) type ErasedInstance = Arc<dyn Any + Send + Sync>;

pub(crate) type Factory =
    Arc<dyn Fn(&mut Resolution<'_>) -> Result<Instance, ContainerError> + Send + Sync>;

pub(crate) type OptionsFactory = Arc<dyn Fn() -> Box<dyn Any + Send + Sync> + Send + Sync>;

/// Casts an erased instance to one key type. Stored boxed per key.
type Caster<K> = fn(ErasedInstance) -> Option<Arc<K>>;

/// Cache slot. `None` for plain services, `Some(parameter)` for closed
/// generics.
pub(crate) type Slot = Option<TypeId>;

/// A constructed service together with its typed disposer.
#[derive(Clone)]
pub(crate) struct Instance {
    value: ErasedInstance,
    dispose: fn(&(dyn Any + Send + Sync)),
}

impl Instance {
    pub(crate) fn new<C: Service>(value: Arc<C>) -> Self {
        Self {
            value,
            dispose: dispose_as::<C>,
        }
    }

    pub(crate) fn value(&self) -> ErasedInstance {
        Arc::clone(&self.value)
    }

    pub(crate) fn dispose(&self) {
        (self.dispose)(self.value.as_ref());
    }
}

fn dispose_as<C: Service>(value: &(dyn Any + Send + Sync)) {
    if let Some(service) = value.downcast_ref::<C>() {
        service.dispose();
    }
}

pub(crate) fn upcast_erased<K, C>(instance: ErasedInstance) -> Option<Arc<K>>
where
    K: ?Sized + 'static,
    C: Binds<K>,
{
    instance.downcast::<C>().ok().map(<C as Binds<K>>::upcast)
}

pub(crate) fn injectable_factory<C, F>(factory: F) -> Factory
where
    C: Service,
    F: Fn(&mut Resolution<'_>) -> Result<C, ContainerError> + Send + Sync + 'static,
{
    Arc::new(move |ctx: &mut Resolution<'_>| {
        factory(ctx).map(|service| Instance::new(Arc::new(service)))
    })
}

/// One registration: how to build a concrete type, how it lives, and the
/// instances built so far.
pub(crate) struct ServiceEntry {
    concrete: TypeId,
    name: &'static str,
    generic: bool,
    policy: Mutex<Policy>,
    options: Mutex<Option<OptionsFactory>>,
    factories: Mutex<HashMap<Slot, Factory>>,
    instances: Mutex<HashMap<Slot, Instance>>,
    casters: Mutex<HashMap<TypeId, Box<dyn Any + Send + Sync>>>,
}

impl ServiceEntry {
    pub(crate) fn new<C: 'static>(generic: bool) -> Self {
        Self {
            concrete: TypeId::of::<C>(),
            name: type_name::<C>(),
            generic,
            policy: Mutex::new(Policy::default()),
            options: Mutex::new(None),
            factories: Mutex::new(HashMap::new()),
            instances: Mutex::new(HashMap::new()),
            casters: Mutex::new(HashMap::new()),
        }
    }

    pub(crate) fn concrete(&self) -> TypeId {
        self.concrete
    }

    pub(crate) fn name(&self) -> &'static str {
        self.name
    }

    pub(crate) fn is_generic(&self) -> bool {
        self.generic
    }

    pub(crate) fn policy(&self) -> Policy {
        *self.policy.lock()
    }

    pub(crate) fn set_lazy(&self, lazy: bool) -> Result<(), ContainerError> {
        let mut policy = self.policy.lock();
        if policy.supplied {
            return Err(ContainerError::SuppliedInstance {
                service: self.name,
                modifier: if lazy { "lazy" } else { "non-lazy" },
            });
        }
        policy.lazy = lazy;
        Ok(())
    }

    /// Build on every resolution. Refused once an instance was supplied.
    pub(crate) fn set_transient(&self) -> Result<(), ContainerError> {
        let mut policy = self.policy.lock();
        if policy.supplied {
            return Err(ContainerError::SuppliedInstance {
                service: self.name,
                modifier: "transient",
            });
        }
        policy.lifetime = Lifetime::Transient;
        Ok(())
    }

    /// Cache one instance. Always allowed, supplied or not.
    pub(crate) fn set_singleton(&self) {
        self.policy.lock().lifetime = Lifetime::Singleton;
    }

    /// Attach a ready instance; the entry becomes an eager singleton.
    pub(crate) fn supply(&self, instance: Instance) {
        {
            let mut policy = self.policy.lock();
            policy.supplied = true;
            policy.lazy = false;
            policy.lifetime = Lifetime::Singleton;
        }
        self.instances.lock().insert(None, instance);
    }

    pub(crate) fn set_options(&self, options: OptionsFactory) {
        *self.options.lock() = Some(options);
    }

    pub(crate) fn options(&self) -> Option<OptionsFactory> {
        self.options.lock().clone()
    }

    pub(crate) fn set_factory(&self, slot: Slot, factory: Factory) {
        self.factories.lock().insert(slot, factory);
    }

    /// Install a factory unless one is already present. Returns whether it
    /// was installed.
    pub(crate) fn set_factory_if_absent(&self, slot: Slot, factory: Factory) -> bool {
        let mut factories = self.factories.lock();
        if factories.contains_key(&slot) {
            return false;
        }
        factories.insert(slot, factory);
        true
    }

    pub(crate) fn factory(&self, slot: Slot) -> Option<Factory> {
        self.factories.lock().get(&slot).cloned()
    }

    pub(crate) fn add_caster<K: ?Sized + 'static>(&self, caster: Caster<K>) {
        self.casters
            .lock()
            .insert(TypeId::of::<K>(), Box::new(caster));
    }

    pub(crate) fn cast<K: ?Sized + 'static>(&self, instance: ErasedInstance) -> Option<Arc<K>> {
        let caster = {
            let casters = self.casters.lock();
            *casters.get(&TypeId::of::<K>())?.downcast_ref::<Caster<K>>()?
        };
        caster(instance)
    }

    pub(crate) fn cached(&self, slot: Slot) -> Option<Instance> {
        self.instances.lock().get(&slot).cloned()
    }

    /// Cache `instance` unless another resolution got there first; either
    /// way the cached instance is returned.
    pub(crate) fn store(&self, slot: Slot, instance: Instance) -> Instance {
        self.instances
            .lock()
            .entry(slot)
            .or_insert(instance)
            .clone()
    }

    pub(crate) fn take_instances(&self) -> Vec<Instance> {
        self.instances.lock().drain().map(|(_, instance)| instance).collect()
    }
}

impl fmt::Debug for ServiceEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceEntry")
            .field("service", &self.name)
            .field("generic", &self.generic)
            .field("policy", &self.policy())
            .field("cached", &self.instances.lock().len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    trait Named: Send + Sync {
        fn name(&self) -> &'static str;
    }

    struct Widget {
        disposed: Arc<AtomicUsize>,
    }

    impl Service for Widget {
        fn dispose(&self) {
            self.disposed.fetch_add(1, Ordering::SeqCst);
        }
    }

    impl Named for Widget {
        fn name(&self) -> &'static str {
            "widget"
        }
    }

    crate::bind!(Widget => dyn Named);

    fn widget() -> (Arc<Widget>, Arc<AtomicUsize>) {
        let disposed = Arc::new(AtomicUsize::new(0));
        (
            Arc::new(Widget {
                disposed: Arc::clone(&disposed),
            }),
            disposed,
        )
    }

    #[test]
    fn casts_through_registered_casters_only() {
        let entry = ServiceEntry::new::<Widget>(false);
        let (instance, _) = widget();
        let erased: ErasedInstance = instance;

        assert!(entry.cast::<dyn Named>(Arc::clone(&erased)).is_none());

        entry.add_caster::<dyn Named>(upcast_erased::<dyn Named, Widget>);
        let named = entry.cast::<dyn Named>(erased).unwrap();
        assert_eq!(named.name(), "widget");
    }

    #[test]
    fn first_stored_instance_wins() {
        let entry = ServiceEntry::new::<Widget>(false);
        let (first, _) = widget();
        let (second, _) = widget();

        let kept = entry.store(None, Instance::new(Arc::clone(&first)));
        let again = entry.store(None, Instance::new(second));

        let kept = kept.value().downcast::<Widget>().unwrap();
        let again = again.value().downcast::<Widget>().unwrap();
        assert!(Arc::ptr_eq(&kept, &first));
        assert!(Arc::ptr_eq(&again, &first));
    }

    #[test]
    fn take_instances_disposes_through_typed_hook() {
        let entry = ServiceEntry::new::<Widget>(false);
        let (instance, disposed) = widget();
        entry.store(None, Instance::new(instance));

        for instance in entry.take_instances() {
            instance.dispose();
        }

        assert_eq!(disposed.load(Ordering::SeqCst), 1);
        assert!(entry.cached(None).is_none());
    }

    #[test]
    fn supplied_instance_locks_policy() {
        let entry = ServiceEntry::new::<Widget>(false);
        entry.set_lazy(true).unwrap();
        let (instance, _) = widget();
        entry.supply(Instance::new(instance));

        let policy = entry.policy();
        assert!(policy.supplied);
        assert!(policy.is_eager_singleton());
        assert!(matches!(
            entry.set_lazy(true),
            Err(ContainerError::SuppliedInstance { modifier: "lazy", .. })
        ));
        assert!(matches!(
            entry.set_transient(),
            Err(ContainerError::SuppliedInstance { modifier: "transient", .. })
        ));
        entry.set_singleton();
        assert_eq!(entry.policy().lifetime, Lifetime::Singleton);
    }
}

//! The service container.

use crate::container::entry::{injectable_factory, upcast_erased, Instance, ServiceEntry};
use crate::container::error::ContainerError;
use crate::container::generic::{GenericService, OpenGeneric};
use crate::container::handle::{GenericHandle, ServiceHandle};
use crate::container::resolution::Resolution;
use crate::container::service::{Binds, Inject, Injectable, Service};
use std::any::{type_name, TypeId};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Registry of service entries keyed by the type they are resolved as.
///
/// Registration needs `&mut self`; once wiring is done the container is
/// typically shared behind an `Arc` and resolved through `&self`.
///
/// # Example
///
/// ```rust
/// use bluecheese::bind;
/// use bluecheese::container::{ContainerError, Injectable, Resolution, Service, ServiceContainer};
/// use std::sync::Arc;
///
/// trait Greeter: Send + Sync {
///     fn greet(&self) -> String;
/// }
///
/// struct Plain;
/// impl Service for Plain {}
/// impl Greeter for Plain {
///     fn greet(&self) -> String {
///         "hello".to_string()
///     }
/// }
/// impl Injectable for Plain {
///     fn construct(_ctx: &mut Resolution<'_>) -> Result<Self, ContainerError> {
///         Ok(Plain)
///     }
/// }
/// bind!(Plain => dyn Greeter);
///
/// struct Loud {
///     inner: Arc<dyn Greeter>,
/// }
/// impl Service for Loud {}
/// impl Greeter for Loud {
///     fn greet(&self) -> String {
///         self.inner.greet().to_uppercase()
///     }
/// }
/// impl Injectable for Loud {
///     fn construct(ctx: &mut Resolution<'_>) -> Result<Self, ContainerError> {
///         Ok(Loud { inner: ctx.get::<dyn Greeter>()? })
///     }
/// }
/// bind!(Loud => dyn Greeter);
///
/// let mut container = ServiceContainer::new();
/// container.register_as::<dyn Greeter, Plain>().unwrap();
/// container.register_decorator::<dyn Greeter, Loud>().unwrap();
/// container.startup().unwrap();
///
/// assert_eq!(container.get::<dyn Greeter>().unwrap().greet(), "HELLO");
/// ```
#[derive(Default)]
pub struct ServiceContainer {
    services: HashMap<TypeId, Arc<ServiceEntry>>,
    /// Entries replaced by decorators, innermost first.
    decorated: HashMap<TypeId, Vec<Arc<ServiceEntry>>>,
    order: Vec<TypeId>,
    names: HashMap<TypeId, &'static str>,
    children: Vec<Arc<ServiceContainer>>,
}

impl ServiceContainer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `C` under its own type.
    pub fn register<C: Injectable>(&mut self) -> Result<ServiceHandle<C>, ContainerError> {
        self.register_factory::<C, _>(C::construct)
    }

    /// Register `C` under its own type, built by `factory`.
    pub fn register_factory<C, F>(&mut self, factory: F) -> Result<ServiceHandle<C>, ContainerError>
    where
        C: Service,
        F: Fn(&mut Resolution<'_>) -> Result<C, ContainerError> + Send + Sync + 'static,
    {
        self.ensure_vacant::<C>()?;
        let entry = Arc::new(ServiceEntry::new::<C>(false));
        entry.set_factory(None, injectable_factory(factory));
        entry.add_caster::<C>(upcast_erased::<C, C>);
        self.bind::<C>(Arc::clone(&entry));
        Ok(ServiceHandle::new(entry))
    }

    /// Register `C` under the key `K`.
    ///
    /// If `C` is already registered in this container under another key,
    /// the existing entry is bound to `K` too, so every key shares one
    /// instance.
    pub fn register_as<K, C>(&mut self) -> Result<ServiceHandle<C>, ContainerError>
    where
        K: ?Sized + Send + Sync + 'static,
        C: Injectable + Binds<K>,
    {
        self.register_factory_as::<K, C, _>(C::construct)
    }

    /// Register `C`, built by `factory`, under the key `K`.
    ///
    /// When an entry for `C` already exists, it is reused and keeps the
    /// factory it was registered with.
    pub fn register_factory_as<K, C, F>(
        &mut self,
        factory: F,
    ) -> Result<ServiceHandle<C>, ContainerError>
    where
        K: ?Sized + Send + Sync + 'static,
        C: Binds<K>,
        F: Fn(&mut Resolution<'_>) -> Result<C, ContainerError> + Send + Sync + 'static,
    {
        self.ensure_vacant::<K>()?;
        let entry = self.entry_for::<C>();
        if !entry.set_factory_if_absent(None, injectable_factory(factory)) {
            debug!(
                service = type_name::<K>(),
                implementation = type_name::<C>(),
                "Reusing existing factory"
            );
        }
        entry.add_caster::<K>(upcast_erased::<K, C>);
        self.bind::<K>(Arc::clone(&entry));
        Ok(ServiceHandle::new(entry))
    }

    /// Register an existing instance of `C` under the key `K`.
    pub fn register_instance<K, C>(&mut self, instance: C) -> Result<ServiceHandle<C>, ContainerError>
    where
        K: ?Sized + Send + Sync + 'static,
        C: Binds<K>,
    {
        self.register_shared::<K, C>(Arc::new(instance))
    }

    /// Register an already shared instance of `C` under the key `K`.
    pub fn register_shared<K, C>(&mut self, instance: Arc<C>) -> Result<ServiceHandle<C>, ContainerError>
    where
        K: ?Sized + Send + Sync + 'static,
        C: Binds<K>,
    {
        self.ensure_vacant::<K>()?;
        let entry = self.entry_for::<C>();
        entry.supply(Instance::new(instance));
        entry.add_caster::<K>(upcast_erased::<K, C>);
        self.bind::<K>(Arc::clone(&entry));
        Ok(ServiceHandle::new(entry))
    }

    /// Replace the service registered under `K` with `D`.
    ///
    /// `D` obtains the service it wraps by asking for `K` from its own
    /// factory. Decorators may be stacked; each one wraps the previous.
    pub fn register_decorator<K, D>(&mut self) -> Result<ServiceHandle<D>, ContainerError>
    where
        K: ?Sized + Send + Sync + 'static,
        D: Injectable + Binds<K>,
    {
        self.register_decorator_factory::<K, D, _>(D::construct)
    }

    /// Like [`register_decorator`](Self::register_decorator) with an
    /// explicit factory.
    pub fn register_decorator_factory<K, D, F>(
        &mut self,
        factory: F,
    ) -> Result<ServiceHandle<D>, ContainerError>
    where
        K: ?Sized + Send + Sync + 'static,
        D: Binds<K>,
        F: Fn(&mut Resolution<'_>) -> Result<D, ContainerError> + Send + Sync + 'static,
    {
        let key = TypeId::of::<K>();
        let previous = self
            .services
            .get(&key)
            .cloned()
            .ok_or(ContainerError::NotRegistered {
                service: type_name::<K>(),
            })?;

        let entry = Arc::new(ServiceEntry::new::<D>(false));
        entry.set_factory(None, injectable_factory(factory));
        entry.add_caster::<K>(upcast_erased::<K, D>);

        self.decorated.entry(key).or_default().push(previous);
        self.services.insert(key, Arc::clone(&entry));
        debug!(
            service = type_name::<K>(),
            decorator = type_name::<D>(),
            "Registered decorator"
        );
        Ok(ServiceHandle::new(entry))
    }

    /// Register the open generic family `F`, implemented by `G`.
    ///
    /// Each parameter type is enabled with
    /// [`GenericHandle::instantiate`].
    pub fn register_generic<F, G>(&mut self) -> Result<GenericHandle<F, G>, ContainerError>
    where
        F: OpenGeneric,
        G: GenericService<F>,
    {
        self.ensure_vacant::<F>()?;
        let entry = Arc::new(ServiceEntry::new::<G>(true));
        self.bind::<F>(Arc::clone(&entry));
        Ok(GenericHandle::new(entry))
    }

    /// Consult `child` for keys this container does not register.
    ///
    /// Children are searched in attach order; this container's own
    /// entries always win.
    pub fn attach(&mut self, child: Arc<ServiceContainer>) {
        debug!(services = child.len(), "Attached child container");
        self.children.push(child);
    }

    /// Build every non-lazy singleton that has not been built yet.
    ///
    /// Replaced entries are built before the decorators that wrap them.
    /// Supplied instances dropped by [`shutdown`](Self::shutdown) are
    /// skipped. Attached children are not started.
    pub fn startup(&self) -> Result<(), ContainerError> {
        let mut seen = HashSet::new();
        let mut built = 0usize;

        let decorated = self
            .order
            .iter()
            .filter_map(|key| self.decorated.get(key))
            .flatten();
        let live = self.order.iter().filter_map(|key| self.services.get(key));

        for entry in decorated.chain(live) {
            if !seen.insert(Arc::as_ptr(entry)) {
                continue;
            }
            if entry.is_generic()
                || !entry.policy().is_eager_singleton()
                || entry.cached(None).is_some()
            {
                continue;
            }
            // A supplied instance disposed by `shutdown` cannot be rebuilt.
            if entry.policy().supplied && entry.factory(None).is_none() {
                continue;
            }
            Resolution::new(self).instantiate(entry, None, entry.name())?;
            built += 1;
        }

        info!(services = self.services.len(), built, "Container started");
        Ok(())
    }

    /// Dispose and drop every cached instance, most recently registered
    /// first. Registrations stay in place.
    pub fn shutdown(&self) {
        let mut seen = HashSet::new();
        let mut disposed = 0usize;

        for key in self.order.iter().rev() {
            let live = self.services.get(key).into_iter();
            let decorated = self.decorated.get(key).into_iter().flatten().rev();
            for entry in live.chain(decorated) {
                if !seen.insert(Arc::as_ptr(entry)) {
                    continue;
                }
                for instance in entry.take_instances() {
                    instance.dispose();
                    disposed += 1;
                }
            }
        }

        info!(disposed, "Container shut down");
    }

    /// Resolve the service registered under `K`.
    pub fn get<K>(&self) -> Result<Arc<K>, ContainerError>
    where
        K: ?Sized + Send + Sync + 'static,
    {
        Resolution::new(self).get::<K>()
    }

    /// Resolve `F::Of<P>` from an open generic registration.
    pub fn get_generic<F, P>(&self) -> Result<Arc<F::Of<P>>, ContainerError>
    where
        F: OpenGeneric,
        P: Send + Sync + 'static,
    {
        Resolution::new(self).get_generic::<F, P>()
    }

    /// Assign the dependencies of a value the container did not build.
    ///
    /// With `include_base`, every value reachable through
    /// [`Inject::base`] is injected as well, outermost first.
    pub fn inject(&self, target: &mut dyn Inject, include_base: bool) -> Result<(), ContainerError> {
        let mut ctx = Resolution::new(self);
        inject_chain(target, &mut ctx, include_base)
    }

    /// Whether `K` resolves here or in an attached child.
    pub fn contains<K: ?Sized + 'static>(&self) -> bool {
        self.lookup(TypeId::of::<K>()).is_some()
    }

    /// Number of keys registered directly in this container.
    pub fn len(&self) -> usize {
        self.services.len()
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }

    pub(crate) fn lookup(&self, key: TypeId) -> Option<Arc<ServiceEntry>> {
        match self.services.get(&key) {
            Some(entry) => Some(Arc::clone(entry)),
            None => self.children.iter().find_map(|child| child.lookup(key)),
        }
    }

    /// Entries answering `key`, innermost first. The last one is live.
    pub(crate) fn chain(&self, key: TypeId) -> Vec<Arc<ServiceEntry>> {
        match self.services.get(&key) {
            Some(live) => {
                let mut chain = self.decorated.get(&key).cloned().unwrap_or_default();
                chain.push(Arc::clone(live));
                chain
            }
            None => self
                .children
                .iter()
                .map(|child| child.chain(key))
                .find(|chain| !chain.is_empty())
                .unwrap_or_default(),
        }
    }

    fn ensure_vacant<K: ?Sized + 'static>(&self) -> Result<(), ContainerError> {
        if self.services.contains_key(&TypeId::of::<K>()) {
            warn!(service = type_name::<K>(), "Duplicate registration rejected");
            return Err(ContainerError::DuplicateRegistration {
                service: type_name::<K>(),
            });
        }
        Ok(())
    }

    /// The non-generic entry whose concrete type is `C`, or a fresh one.
    fn entry_for<C: Service>(&self) -> Arc<ServiceEntry> {
        let concrete = TypeId::of::<C>();
        self.order
            .iter()
            .filter_map(|key| self.services.get(key))
            .find(|entry| !entry.is_generic() && entry.concrete() == concrete)
            .cloned()
            .unwrap_or_else(|| Arc::new(ServiceEntry::new::<C>(false)))
    }

    fn bind<K: ?Sized + 'static>(&mut self, entry: Arc<ServiceEntry>) {
        let key = TypeId::of::<K>();
        debug!(
            service = type_name::<K>(),
            implementation = entry.name(),
            "Registered service"
        );
        self.services.insert(key, entry);
        self.names.insert(key, type_name::<K>());
        self.order.push(key);
    }
}

fn inject_chain(
    target: &mut dyn Inject,
    ctx: &mut Resolution<'_>,
    include_base: bool,
) -> Result<(), ContainerError> {
    target.inject(ctx)?;
    if include_base {
        if let Some(base) = target.base() {
            inject_chain(base, ctx, include_base)?;
        }
    }
    Ok(())
}

impl fmt::Debug for ServiceContainer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let services: Vec<_> = self
            .order
            .iter()
            .filter_map(|key| self.names.get(key))
            .collect();
        f.debug_struct("ServiceContainer")
            .field("services", &services)
            .field("children", &self.children.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bind;
    use std::sync::atomic::{AtomicUsize, Ordering};

    trait Counter: Send + Sync {
        fn id(&self) -> usize;
    }

    static NEXT_ID: AtomicUsize = AtomicUsize::new(0);

    struct Numbered {
        id: usize,
    }

    impl Service for Numbered {}

    impl Injectable for Numbered {
        fn construct(_ctx: &mut Resolution<'_>) -> Result<Self, ContainerError> {
            Ok(Self {
                id: NEXT_ID.fetch_add(1, Ordering::SeqCst),
            })
        }
    }

    impl Counter for Numbered {
        fn id(&self) -> usize {
            self.id
        }
    }

    bind!(Numbered => dyn Counter);

    #[test]
    fn register_as_reuses_concrete_entry() {
        let mut container = ServiceContainer::new();
        container.register::<Numbered>().unwrap().as_lazy().unwrap();
        container.register_as::<dyn Counter, Numbered>().unwrap();

        let by_interface = container.get::<dyn Counter>().unwrap();
        let by_concrete = container.get::<Numbered>().unwrap();

        assert_eq!(by_interface.id(), by_concrete.id);
        assert_eq!(container.len(), 2);
    }

    #[test]
    fn separate_registers_get_separate_entries() {
        let mut container = ServiceContainer::new();
        container.register_as::<dyn Counter, Numbered>().unwrap();
        // `register` always creates a fresh entry.
        container.register::<Numbered>().unwrap();
        container.startup().unwrap();

        let a = container.get::<dyn Counter>().unwrap();
        let b = container.get::<Numbered>().unwrap();
        assert_ne!(a.id(), b.id);
    }

    #[test]
    fn duplicate_key_is_rejected() {
        let mut container = ServiceContainer::new();
        container.register::<Numbered>().unwrap();
        assert!(matches!(
            container.register::<Numbered>(),
            Err(ContainerError::DuplicateRegistration { .. })
        ));
    }

    #[test]
    fn decorator_requires_existing_key() {
        let mut container = ServiceContainer::new();
        assert!(matches!(
            container.register_decorator::<dyn Counter, Numbered>(),
            Err(ContainerError::NotRegistered { .. })
        ));
    }

    #[test]
    fn own_entries_shadow_children() {
        let mut child = ServiceContainer::new();
        child
            .register_instance::<dyn Counter, Numbered>(Numbered { id: 1000 })
            .unwrap();

        let mut parent = ServiceContainer::new();
        parent.attach(Arc::new(child));
        assert_eq!(parent.get::<dyn Counter>().unwrap().id(), 1000);

        parent
            .register_instance::<dyn Counter, Numbered>(Numbered { id: 2000 })
            .unwrap();
        assert_eq!(parent.get::<dyn Counter>().unwrap().id(), 2000);
        assert!(parent.contains::<dyn Counter>());
        assert!(!parent.contains::<Numbered>());
    }

    #[test]
    fn debug_lists_registered_keys() {
        let mut container = ServiceContainer::new();
        container.register::<Numbered>().unwrap();
        let rendered = format!("{:?}", container);
        assert!(rendered.contains("Numbered"));
    }
}

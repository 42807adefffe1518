//! Fluent modifiers returned by registration.

use crate::container::entry::{ErasedInstance, Instance, ServiceEntry};
use crate::container::error::ContainerError;
use crate::container::generic::{GenericService, OpenGeneric};
use crate::container::lifetime::Policy;
use crate::container::resolution::Resolution;
use crate::container::service::{Service, ServiceOptions};
use std::any::{Any, TypeId};
use std::marker::PhantomData;
use std::sync::Arc;

fn options_factory<O, F>(options: F) -> Arc<dyn Fn() -> Box<dyn Any + Send + Sync> + Send + Sync>
where
    O: ServiceOptions,
    F: Fn() -> O + Send + Sync + 'static,
{
    Arc::new(move || Box::new(options()) as Box<dyn Any + Send + Sync>)
}

/// Handle to a registered entry whose concrete type is `C`.
///
/// Modifiers apply to the entry, so they affect every key the entry is
/// bound to.
pub struct ServiceHandle<C> {
    entry: Arc<ServiceEntry>,
    _service: PhantomData<fn() -> C>,
}

impl<C: Service> ServiceHandle<C> {
    pub(crate) fn new(entry: Arc<ServiceEntry>) -> Self {
        Self {
            entry,
            _service: PhantomData,
        }
    }

    /// Defer construction until first resolution.
    pub fn as_lazy(self) -> Result<Self, ContainerError> {
        self.entry.set_lazy(true)?;
        Ok(self)
    }

    /// Build during startup (the default).
    pub fn as_non_lazy(self) -> Result<Self, ContainerError> {
        self.entry.set_lazy(false)?;
        Ok(self)
    }

    /// Cache one instance (the default).
    pub fn as_singleton(self) -> Self {
        self.entry.set_singleton();
        self
    }

    /// Build a new instance on every resolution.
    pub fn as_transient(self) -> Result<Self, ContainerError> {
        self.entry.set_transient()?;
        Ok(self)
    }

    /// Use `instance` instead of constructing one. The entry becomes a
    /// non-lazy singleton.
    pub fn with_instance(self, instance: C) -> Self {
        self.with_shared(Arc::new(instance))
    }

    /// Like [`with_instance`](Self::with_instance) for an instance that is
    /// already shared.
    pub fn with_shared(self, instance: Arc<C>) -> Self {
        self.entry.supply(Instance::new(instance));
        self
    }

    /// Attach options read by the factory through
    /// [`Resolution::options`](crate::container::Resolution::options).
    pub fn with_options<O, F>(self, options: F) -> Self
    where
        O: ServiceOptions,
        F: Fn() -> O + Send + Sync + 'static,
    {
        self.entry.set_options(options_factory(options));
        self
    }

    pub fn policy(&self) -> Policy {
        self.entry.policy()
    }
}

/// Handle to an open generic registration.
pub struct GenericHandle<F, G> {
    entry: Arc<ServiceEntry>,
    _family: PhantomData<fn() -> (F, G)>,
}

impl<F, G> GenericHandle<F, G>
where
    F: OpenGeneric,
    G: GenericService<F>,
{
    pub(crate) fn new(entry: Arc<ServiceEntry>) -> Self {
        Self {
            entry,
            _family: PhantomData,
        }
    }

    /// Make `F::Of<P>` resolvable.
    pub fn instantiate<P: Send + Sync + 'static>(self) -> Self {
        self.entry.set_factory(
            Some(TypeId::of::<P>()),
            Arc::new(|ctx: &mut Resolution<'_>| {
                G::construct::<P>(ctx).map(|service| Instance::new(Arc::new(service)))
            }),
        );
        self.entry.add_caster::<F::Of<P>>(cast_generic::<F, G, P>);
        self
    }

    pub fn as_singleton(self) -> Self {
        self.entry.set_singleton();
        self
    }

    pub fn as_transient(self) -> Result<Self, ContainerError> {
        self.entry.set_transient()?;
        Ok(self)
    }

    pub fn with_options<O, Opt>(self, options: Opt) -> Self
    where
        O: ServiceOptions,
        Opt: Fn() -> O + Send + Sync + 'static,
    {
        self.entry.set_options(options_factory(options));
        self
    }

    pub fn policy(&self) -> Policy {
        self.entry.policy()
    }
}

fn cast_generic<F, G, P>(instance: ErasedInstance) -> Option<Arc<F::Of<P>>>
where
    F: OpenGeneric,
    G: GenericService<F>,
    P: Send + Sync + 'static,
{
    instance
        .downcast::<G::Of<P>>()
        .ok()
        .map(G::upcast::<P>)
}

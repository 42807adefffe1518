//! Resolution context passed to factories.

use crate::container::entry::{ErasedInstance, ServiceEntry, Slot};
use crate::container::error::ContainerError;
use crate::container::generic::OpenGeneric;
use crate::container::lifetime::Lifetime;
use crate::container::registry::ServiceContainer;
use crate::container::service::ServiceOptions;
use std::any::{type_name, TypeId};
use std::sync::Arc;
use tracing::debug;

/// One top-level resolution in progress.
///
/// Tracks the entries currently under construction so that a factory
/// asking for its own key gets the service it decorates, and so that
/// cycles are reported instead of recursing forever.
pub struct Resolution<'a> {
    container: &'a ServiceContainer,
    /// Entries under construction with the cache slot each is building.
    stack: Vec<(Arc<ServiceEntry>, Slot)>,
}

impl<'a> Resolution<'a> {
    pub(crate) fn new(container: &'a ServiceContainer) -> Self {
        Self {
            container,
            stack: Vec::new(),
        }
    }

    /// The container this resolution reads from.
    pub fn container(&self) -> &'a ServiceContainer {
        self.container
    }

    /// Resolve the service registered under `K`.
    ///
    /// From inside a decorator's factory, asking for the decorated key
    /// yields the service one level further in.
    pub fn get<K>(&mut self) -> Result<Arc<K>, ContainerError>
    where
        K: ?Sized + Send + Sync + 'static,
    {
        let service = type_name::<K>();
        let entry = self.select(TypeId::of::<K>(), None, service)?;
        let instance = self.instantiate(&entry, None, service)?;
        entry
            .cast::<K>(instance)
            .ok_or(ContainerError::TypeMismatch {
                service,
                expected: entry.name(),
            })
    }

    /// Resolve the closed generic `F::Of<P>`.
    pub fn get_generic<F, P>(&mut self) -> Result<Arc<F::Of<P>>, ContainerError>
    where
        F: OpenGeneric,
        P: Send + Sync + 'static,
    {
        let service = type_name::<F::Of<P>>();
        let slot = Some(TypeId::of::<P>());
        let entry = self.select(TypeId::of::<F>(), slot, service)?;
        let instance = self.instantiate(&entry, slot, service)?;
        entry
            .cast::<F::Of<P>>(instance)
            .ok_or(ContainerError::TypeMismatch {
                service,
                expected: entry.name(),
            })
    }

    /// Options attached to the service being constructed.
    ///
    /// Falls back to `O::default()` when no options were attached or when
    /// called outside of a factory.
    pub fn options<O: ServiceOptions>(&self) -> Result<O, ContainerError> {
        let Some((current, _)) = self.stack.last() else {
            return Ok(O::default());
        };
        let Some(options) = current.options() else {
            return Ok(O::default());
        };
        options()
            .downcast::<O>()
            .map(|options| *options)
            .map_err(|_| ContainerError::TypeMismatch {
                service: current.name(),
                expected: type_name::<O>(),
            })
    }

    /// Pick the entry that answers `key` for the service currently being
    /// built.
    ///
    /// Only a request for the slot under construction refers back to the
    /// current entry; another instantiation of the same generic family is
    /// an ordinary dependency.
    fn select(
        &self,
        key: TypeId,
        slot: Slot,
        service: &'static str,
    ) -> Result<Arc<ServiceEntry>, ContainerError> {
        let current = self
            .stack
            .last()
            .filter(|(_, building)| *building == slot)
            .map(|(current, _)| current);
        if let Some(current) = current {
            let chain = self.container.chain(key);
            if let Some(position) = chain.iter().position(|entry| Arc::ptr_eq(entry, current)) {
                return match position.checked_sub(1) {
                    Some(inner) => Ok(Arc::clone(&chain[inner])),
                    None => Err(ContainerError::SelfReference {
                        service: current.name(),
                        dependency: service,
                    }),
                };
            }
            if current.concrete() == key {
                return Err(ContainerError::SelfReference {
                    service: current.name(),
                    dependency: service,
                });
            }
        }

        self.container
            .lookup(key)
            .ok_or(ContainerError::NotRegistered { service })
    }

    pub(crate) fn instantiate(
        &mut self,
        entry: &Arc<ServiceEntry>,
        slot: Slot,
        service: &'static str,
    ) -> Result<ErasedInstance, ContainerError> {
        let policy = entry.policy();
        if policy.lifetime == Lifetime::Singleton {
            if let Some(instance) = entry.cached(slot) {
                return Ok(instance.value());
            }
        }

        if self
            .stack
            .iter()
            .any(|(pending, building)| Arc::ptr_eq(pending, entry) && *building == slot)
        {
            return Err(ContainerError::CircularDependency {
                path: self.path_to(entry),
            });
        }

        let factory = match entry.factory(slot) {
            Some(factory) => factory,
            None if policy.supplied => {
                return Err(ContainerError::NotConstructible {
                    service: entry.name(),
                })
            }
            None => return Err(ContainerError::NotRegistered { service }),
        };

        self.stack.push((Arc::clone(entry), slot));
        let built = factory(self);
        self.stack.pop();

        let instance = built.map_err(|source| ContainerError::Instantiation {
            service: entry.name(),
            source: Box::new(source),
        })?;
        debug!(
            service = entry.name(),
            lifetime = ?policy.lifetime,
            "Instantiated service"
        );

        Ok(match policy.lifetime {
            Lifetime::Singleton => entry.store(slot, instance).value(),
            Lifetime::Transient => instance.value(),
        })
    }

    fn path_to(&self, entry: &ServiceEntry) -> String {
        self.stack
            .iter()
            .map(|(pending, _)| pending.name())
            .chain(std::iter::once(entry.name()))
            .collect::<Vec<_>>()
            .join(" -> ")
    }
}

//! Open generic registrations.
//!
//! A family such as "`Repository<T>` for any `T`" is registered once under
//! its family marker. Each parameter type the application needs is closed
//! with [`GenericHandle::instantiate`](crate::container::GenericHandle::instantiate)
//! and cached separately under the same entry.
//!
//! # Example
//!
//! ```rust
//! use bluecheese::container::{
//!     ContainerError, GenericService, OpenGeneric, Resolution, Service, ServiceContainer,
//! };
//! use std::marker::PhantomData;
//! use std::sync::Arc;
//!
//! trait Repository<T>: Send + Sync {
//!     fn describe(&self) -> String;
//! }
//!
//! struct Repositories;
//! impl OpenGeneric for Repositories {
//!     type Of<P: Send + Sync + 'static> = dyn Repository<P>;
//! }
//!
//! struct InMemoryRepository<T>(PhantomData<fn() -> T>);
//! impl<T: Send + Sync + 'static> Service for InMemoryRepository<T> {}
//! impl<T: Send + Sync + 'static> Repository<T> for InMemoryRepository<T> {
//!     fn describe(&self) -> String {
//!         format!("memory<{}>", std::any::type_name::<T>())
//!     }
//! }
//!
//! struct InMemory;
//! impl GenericService<Repositories> for InMemory {
//!     type Of<P: Send + Sync + 'static> = InMemoryRepository<P>;
//!
//!     fn construct<P: Send + Sync + 'static>(
//!         _ctx: &mut Resolution<'_>,
//!     ) -> Result<InMemoryRepository<P>, ContainerError> {
//!         Ok(InMemoryRepository(PhantomData))
//!     }
//!
//!     fn upcast<P: Send + Sync + 'static>(
//!         service: Arc<InMemoryRepository<P>>,
//!     ) -> Arc<dyn Repository<P>> {
//!         service
//!     }
//! }
//!
//! let mut container = ServiceContainer::new();
//! container
//!     .register_generic::<Repositories, InMemory>()
//!     .unwrap()
//!     .instantiate::<u32>();
//!
//! let repository = container.get_generic::<Repositories, u32>().unwrap();
//! assert_eq!(repository.describe(), "memory<u32>");
//! ```

use crate::container::error::ContainerError;
use crate::container::resolution::Resolution;
use crate::container::service::Service;
use std::sync::Arc;

/// Marker for a generic service key, mapping a parameter type to the key
/// type resolved for it.
pub trait OpenGeneric: 'static {
    type Of<P: Send + Sync + 'static>: ?Sized + Send + Sync + 'static;
}

/// Implementation family for an [`OpenGeneric`] key.
pub trait GenericService<F: OpenGeneric>: 'static {
    type Of<P: Send + Sync + 'static>: Service;

    fn construct<P: Send + Sync + 'static>(
        ctx: &mut Resolution<'_>,
    ) -> Result<Self::Of<P>, ContainerError>;

    fn upcast<P: Send + Sync + 'static>(service: Arc<Self::Of<P>>) -> Arc<F::Of<P>>;
}

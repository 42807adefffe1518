//! Service container for dependency injection and service location.
//!
//! Services are registered under a key type (usually a trait object),
//! then resolved by key. Each registration carries a lifecycle policy:
//! singletons are cached per entry, transients are built on every request,
//! and non-lazy singletons are built by [`ServiceContainer::startup`].
//!
//! Constructors are expressed through [`Injectable`]; bindings from a
//! concrete type to the keys it can be resolved as are declared with
//! [`bind!`](crate::bind). Decorators replace a key's entry and receive
//! the previous one when they ask for the same key.

mod entry;
pub mod error;
pub mod generic;
pub mod handle;
pub mod lifetime;
mod macros;
pub mod registry;
pub mod resolution;
pub mod service;

pub use error::{BoxError, ContainerError};
pub use generic::{GenericService, OpenGeneric};
pub use handle::{GenericHandle, ServiceHandle};
pub use lifetime::{Lifetime, Policy};
pub use registry::ServiceContainer;
pub use resolution::Resolution;
pub use service::{Binds, Inject, Injectable, Service, ServiceOptions};

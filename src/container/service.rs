//! Traits a type implements to take part in the container.

use crate::container::error::ContainerError;
use crate::container::resolution::Resolution;
use std::sync::Arc;

/// A value the container can own and hand out.
///
/// `dispose` runs once for every cached instance during
/// [`ServiceContainer::shutdown`](crate::container::ServiceContainer::shutdown).
pub trait Service: Send + Sync + 'static {
    fn dispose(&self) {}
}

/// A service that knows how to build itself from the container.
///
/// This is the container's notion of a constructor: every dependency is
/// requested through the [`Resolution`] context.
///
/// # Example
///
/// ```rust
/// use bluecheese::container::{ContainerError, Injectable, Resolution, Service, ServiceContainer};
/// use std::sync::Arc;
///
/// struct Clock;
/// impl Service for Clock {}
/// impl Injectable for Clock {
///     fn construct(_ctx: &mut Resolution<'_>) -> Result<Self, ContainerError> {
///         Ok(Clock)
///     }
/// }
///
/// struct Scheduler {
///     clock: Arc<Clock>,
/// }
/// impl Service for Scheduler {}
/// impl Injectable for Scheduler {
///     fn construct(ctx: &mut Resolution<'_>) -> Result<Self, ContainerError> {
///         Ok(Scheduler { clock: ctx.get::<Clock>()? })
///     }
/// }
///
/// let mut container = ServiceContainer::new();
/// container.register::<Clock>().unwrap();
/// container.register::<Scheduler>().unwrap();
/// container.startup().unwrap();
///
/// let scheduler = container.get::<Scheduler>().unwrap();
/// assert!(Arc::ptr_eq(&scheduler.clock, &container.get::<Clock>().unwrap()));
/// ```
pub trait Injectable: Service + Sized {
    fn construct(ctx: &mut Resolution<'_>) -> Result<Self, ContainerError>;
}

/// Statement that a service can be handed out as `K`.
///
/// Every service binds to itself. Bindings to trait objects are usually
/// generated with [`bind!`](crate::bind).
pub trait Binds<K: ?Sized + 'static>: Service {
    fn upcast(self: Arc<Self>) -> Arc<K>;
}

impl<T: Service> Binds<T> for T {
    fn upcast(self: Arc<Self>) -> Arc<T> {
        self
    }
}

/// Marker for option values read by factories via
/// [`Resolution::options`].
pub trait ServiceOptions: Default + Send + Sync + 'static {}

/// Field injection for values the container did not construct.
///
/// `inject` assigns this value's own dependencies. Types that embed a
/// "base" value expose it through `base` so the container can walk the
/// chain when asked to include base types.
pub trait Inject {
    fn inject(&mut self, ctx: &mut Resolution<'_>) -> Result<(), ContainerError>;

    fn base(&mut self) -> Option<&mut dyn Inject> {
        None
    }
}

//! Macros for declaring service bindings.

/// Implement [`Binds`](crate::container::Binds) for each listed key type.
///
/// The service must coerce to every key, which in practice means it
/// implements each listed trait.
///
/// # Example
///
/// ```
/// use bluecheese::bind;
/// use bluecheese::container::Service;
///
/// trait Audio: Send + Sync {}
/// trait Mixer: Send + Sync {}
///
/// struct Engine;
/// impl Service for Engine {}
/// impl Audio for Engine {}
/// impl Mixer for Engine {}
///
/// bind!(Engine => dyn Audio, dyn Mixer);
/// ```
#[macro_export]
macro_rules! bind {
    ($service:ty => $($key:ty),+ $(,)?) => {
        $(
            impl $crate::container::Binds<$key> for $service {
                fn upcast(
                    self: ::std::sync::Arc<Self>,
                ) -> ::std::sync::Arc<$key> {
                    self
                }
            }
        )+
    };
}

//! Service lifetime definitions.

/// Service lifetimes controlling instance caching behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Lifetime {
    /// One instance per entry (and per generic parameter), cached until
    /// shutdown
    #[default]
    Singleton,
    /// New instance per resolution, never cached
    Transient,
}

/// Lifecycle policy of one registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Policy {
    /// Created on first resolution instead of at startup
    pub lazy: bool,
    pub lifetime: Lifetime,
    /// An instance was supplied at registration; forces eager singleton
    pub supplied: bool,
}

impl Default for Policy {
    fn default() -> Self {
        Self {
            lazy: false,
            lifetime: Lifetime::Singleton,
            supplied: false,
        }
    }
}

impl Policy {
    /// Whether startup should build this entry ahead of time.
    pub fn is_eager_singleton(&self) -> bool {
        !self.lazy && self.lifetime == Lifetime::Singleton
    }
}

//! Errors raised while wiring or resolving services.

use thiserror::Error;

/// Boxed error returned by user factories.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors that can occur when registering or resolving services.
///
/// These are wiring mistakes; none of them is worth retrying.
#[derive(Debug, Error)]
pub enum ContainerError {
    #[error("Service '{service}' is already registered")]
    DuplicateRegistration { service: &'static str },

    #[error("Service '{service}' is not registered")]
    NotRegistered { service: &'static str },

    #[error("Expected an instance of '{expected}' while resolving '{service}'")]
    TypeMismatch {
        service: &'static str,
        expected: &'static str,
    },

    #[error("'{service}' depends on '{dependency}', which resolves back to itself and decorates nothing")]
    SelfReference {
        service: &'static str,
        dependency: &'static str,
    },

    #[error("Circular dependency: {path}")]
    CircularDependency { path: String },

    #[error("Failed to instantiate '{service}': {source}")]
    Instantiation {
        service: &'static str,
        #[source]
        source: Box<ContainerError>,
    },

    #[error("Cannot make '{service}' {modifier}: it was registered with an instance")]
    SuppliedInstance {
        service: &'static str,
        modifier: &'static str,
    },

    #[error("'{service}' was registered with an instance and has no factory to rebuild it")]
    NotConstructible { service: &'static str },

    #[error(transparent)]
    Factory(BoxError),
}

impl ContainerError {
    /// Wrap an arbitrary error raised inside a factory.
    pub fn factory<E>(error: E) -> Self
    where
        E: Into<BoxError>,
    {
        Self::Factory(error.into())
    }

    /// The innermost error beneath any `Instantiation` wrappers.
    pub fn root_cause(&self) -> &ContainerError {
        let mut current = self;
        while let Self::Instantiation { source, .. } = current {
            current = source.as_ref();
        }
        current
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_cause_unwraps_instantiation_chain() {
        let error = ContainerError::Instantiation {
            service: "Outer",
            source: Box::new(ContainerError::Instantiation {
                service: "Inner",
                source: Box::new(ContainerError::NotRegistered { service: "Missing" }),
            }),
        };

        assert!(matches!(
            error.root_cause(),
            ContainerError::NotRegistered { service: "Missing" }
        ));
        assert!(error.to_string().contains("Outer"));
    }

    #[test]
    fn factory_wraps_foreign_errors() {
        let error = ContainerError::factory("disk on fire");
        assert_eq!(error.to_string(), "disk on fire");
    }
}

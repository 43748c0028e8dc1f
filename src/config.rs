//! Configuration for the Prometheus collector factory.

use crate::error::{validate_namespace, RegistrationResult};
use crate::prometheus::{CollectorFactory, MetricsRegistry};

/// Namespace prefixed to every series unless overridden.
pub const DEFAULT_NAMESPACE: &str = "hystrix";

/// Text that starts every help string unless overridden.
pub const DEFAULT_HELP_PREFIX: &str = "Hystrix";

/// Builder for creating collector factories with custom settings.
#[derive(Debug, Clone)]
pub struct CollectorBuilder {
    namespace: String,
    help_prefix: String,
}

impl Default for CollectorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl CollectorBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            namespace: DEFAULT_NAMESPACE.to_string(),
            help_prefix: DEFAULT_HELP_PREFIX.to_string(),
        }
    }

    /// Sets the namespace prefixed to every series name.
    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    /// Sets the text that starts every series help string.
    pub fn help_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.help_prefix = prefix.into();
        self
    }

    /// Registers the series with `registry` and returns the factory.
    ///
    /// Nothing is registered if the namespace is invalid or any series name
    /// is already taken.
    pub fn build(self, registry: &mut MetricsRegistry) -> RegistrationResult<CollectorFactory> {
        validate_namespace(&self.namespace)?;
        CollectorFactory::register(registry, &self.namespace, &self.help_prefix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RegistrationError;

    #[test]
    fn defaults_to_hystrix_namespace() {
        let mut registry = MetricsRegistry::new();
        let factory = CollectorBuilder::default().build(&mut registry).unwrap();

        assert_eq!(factory.namespace(), "hystrix");
        assert!(registry.contains("hystrix_attempts"));
    }

    #[test]
    fn custom_namespace_and_help() {
        let mut registry = MetricsRegistry::new();
        CollectorBuilder::new()
            .namespace("payments")
            .help_prefix("Payments breaker")
            .build(&mut registry)
            .unwrap();

        let text = registry.encode().unwrap();
        assert!(text.contains("# HELP payments_timeouts Payments breaker timeouts"));
        assert!(!registry.contains("hystrix_attempts"));
    }

    #[test]
    fn invalid_namespace_registers_nothing() {
        let mut registry = MetricsRegistry::new();
        let err = CollectorBuilder::new()
            .namespace("bad-name")
            .build(&mut registry)
            .unwrap_err();

        assert!(matches!(err, RegistrationError::InvalidNamespace { .. }));
        assert!(!registry.contains("bad-name_attempts"));
    }
}

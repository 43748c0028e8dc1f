//! Registry handle that tracks which series names it holds.

use ahash::AHashSet;
use prometheus_client::encoding::text::encode;
use prometheus_client::registry::{Metric, Registry, Unit};
use std::fmt;

use crate::error::{RegistrationError, RegistrationResult};

/// A Prometheus registry that refuses duplicate series names.
///
/// `prometheus_client::registry::Registry` accepts the same name twice and
/// emits it twice on scrape. This wrapper remembers every name registered
/// through it so a second registration is reported instead. The client
/// registry is only ever created and mutated by the wrapper, so every name it
/// holds is known here.
#[derive(Debug, Default)]
pub struct MetricsRegistry {
    registry: Registry,
    names: AHashSet<String>,
}

impl MetricsRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if a series with this full name was registered here.
    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    /// Returns the underlying client registry.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Encodes all registered series in the OpenMetrics text format.
    pub fn encode(&self) -> Result<String, fmt::Error> {
        let mut buffer = String::new();
        encode(&mut buffer, &self.registry)?;
        Ok(buffer)
    }

    /// Fails with the first name in `names` that is already registered.
    pub(crate) fn ensure_vacant<'a, I>(&self, names: I) -> RegistrationResult<()>
    where
        I: IntoIterator<Item = &'a str>,
    {
        match names.into_iter().find(|name| self.contains(name)) {
            Some(name) => {
                tracing::warn!(metric = name, "rejecting duplicate metric registration");
                Err(RegistrationError::Duplicate {
                    name: name.to_string(),
                })
            }
            None => Ok(()),
        }
    }

    /// Registers one series. `name` is the full name without unit suffix.
    pub(crate) fn register(
        &mut self,
        name: &str,
        help: String,
        unit: Option<Unit>,
        metric: impl Metric,
    ) -> RegistrationResult<()> {
        let full_name = match &unit {
            Some(unit) => format!("{}_{}", name, unit.as_str()),
            None => name.to_string(),
        };
        self.ensure_vacant([full_name.as_str()])?;

        match unit {
            Some(unit) => self.registry.register_with_unit(name, help, unit, metric),
            None => self.registry.register(name, help, metric),
        }

        tracing::debug!(metric = %full_name, "registered metric");
        self.names.insert(full_name);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prometheus_client::metrics::counter::Counter;
    use prometheus_client::metrics::gauge::Gauge;
    use std::sync::atomic::AtomicU64;

    #[test]
    fn tracks_names_with_unit_suffix() {
        let mut registry = MetricsRegistry::new();
        registry
            .register(
                "svc_uptime",
                "Uptime".to_string(),
                Some(Unit::Seconds),
                Gauge::<f64, AtomicU64>::default(),
            )
            .unwrap();

        assert!(registry.contains("svc_uptime_seconds"));
        assert!(!registry.contains("svc_uptime"));
    }

    #[test]
    fn second_registration_is_rejected() {
        let mut registry = MetricsRegistry::new();
        registry
            .register("svc_hits", "Hits".to_string(), None, Counter::<u64>::default())
            .unwrap();

        let err = registry
            .register("svc_hits", "Hits".to_string(), None, Counter::<u64>::default())
            .unwrap_err();

        assert_eq!(
            err,
            RegistrationError::Duplicate {
                name: "svc_hits".to_string()
            }
        );
        let text = registry.encode().unwrap();
        assert_eq!(text.matches("# TYPE svc_hits counter").count(), 1);
    }

    #[test]
    fn ensure_vacant_reports_first_conflict() {
        let mut registry = MetricsRegistry::new();
        registry
            .register("b", "B".to_string(), None, Counter::<u64>::default())
            .unwrap();

        assert!(registry.ensure_vacant(["a", "c"]).is_ok());
        let err = registry.ensure_vacant(["a", "b", "c"]).unwrap_err();
        assert_eq!(err.to_string(), "Metric already registered: b");
    }
}

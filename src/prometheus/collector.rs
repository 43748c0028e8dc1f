//! Per-circuit Prometheus collector and the factory that builds it.

use prometheus_client::encoding::EncodeLabelSet;
use prometheus_client::metrics::counter::Counter;
use prometheus_client::metrics::family::Family;
use prometheus_client::metrics::gauge::Gauge;
use prometheus_client::registry::Unit;
use std::sync::atomic::AtomicU64;
use std::sync::Arc;
use std::time::Duration;

use super::registry::MetricsRegistry;
use crate::config::CollectorBuilder;
use crate::error::RegistrationResult;
use crate::metrics::MetricCollector;

#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
struct CircuitLabels {
    circuit_name: String,
}

type EventFamily = Family<CircuitLabels, Counter>;
type SecondsCounterFamily = Family<CircuitLabels, Counter<f64, AtomicU64>>;
type SecondsGaugeFamily = Family<CircuitLabels, Gauge<f64, AtomicU64>>;

/// The eleven series shared by every collector built from one factory.
#[derive(Debug, Default)]
struct CircuitMetrics {
    attempts: EventFamily,
    errors: EventFamily,
    failures: EventFamily,
    rejects: EventFamily,
    short_circuits: EventFamily,
    timeouts: EventFamily,
    fallback_successes: EventFamily,
    fallback_failures: EventFamily,
    successes: EventFamily,
    total_duration: SecondsGaugeFamily,
    run_duration: SecondsCounterFamily,
}

impl CircuitMetrics {
    /// Counter base names and help suffixes. The encoder appends `_total`.
    fn event_families(&self) -> [(&'static str, &'static str, &EventFamily); 9] {
        [
            ("attempts", "attempts", &self.attempts),
            ("errors", "errors", &self.errors),
            ("failures", "failures", &self.failures),
            ("rejects", "rejects", &self.rejects),
            ("short_circuits", "short circuits", &self.short_circuits),
            ("timeouts", "timeouts", &self.timeouts),
            ("fallback_success", "fallback successes", &self.fallback_successes),
            ("fallback_failures", "fallback failures", &self.fallback_failures),
            ("success", "successes", &self.successes),
        ]
    }

    fn register(
        &self,
        registry: &mut MetricsRegistry,
        namespace: &str,
        help_prefix: &str,
    ) -> RegistrationResult<()> {
        let events = self.event_families();
        let qualify = |base: &str| qualified_name(namespace, base);

        // All or nothing: a conflict must leave the registry untouched.
        let mut full_names: Vec<String> =
            events.iter().map(|&(base, _, _)| qualify(base)).collect();
        full_names.push(qualify("total_duration_seconds"));
        full_names.push(qualify("run_duration_seconds"));
        registry.ensure_vacant(full_names.iter().map(String::as_str))?;

        for (base, help, family) in events {
            registry.register(
                &qualify(base),
                format!("{} {}", help_prefix, help),
                None,
                family.clone(),
            )?;
        }

        registry.register(
            &qualify("total_duration"),
            format!("{} total duration", help_prefix),
            Some(Unit::Seconds),
            self.total_duration.clone(),
        )?;
        registry.register(
            &qualify("run_duration"),
            format!("{} run duration", help_prefix),
            Some(Unit::Seconds),
            self.run_duration.clone(),
        )?;

        Ok(())
    }
}

fn qualified_name(namespace: &str, base: &str) -> String {
    format!("{}_{}", namespace, base)
}

/// Values of every series for one circuit at a point in time.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CircuitSnapshot {
    /// `attempts_total`
    pub attempts: u64,
    /// `errors_total`
    pub errors: u64,
    /// `failures_total`
    pub failures: u64,
    /// `rejects_total`
    pub rejects: u64,
    /// `short_circuits_total`
    pub short_circuits: u64,
    /// `timeouts_total`
    pub timeouts: u64,
    /// `fallback_success_total`
    pub fallback_successes: u64,
    /// `fallback_failures_total`
    pub fallback_failures: u64,
    /// `success_total`
    pub successes: u64,
    /// `total_duration_seconds`
    pub total_duration_seconds: f64,
    /// `run_duration_seconds_total`
    pub run_duration_seconds: f64,
}

/// Builds [`PrometheusCollector`]s that share one set of registered series.
///
/// Build it once at startup with the registry the application scrapes, then
/// hand [`CollectorFactory::into_constructor`] (or clones of the factory) to
/// whatever creates circuit breakers.
#[derive(Clone, Debug)]
pub struct CollectorFactory {
    metrics: Arc<CircuitMetrics>,
    namespace: String,
}

impl CollectorFactory {
    /// Creates a new builder for customizing the factory.
    pub fn builder() -> CollectorBuilder {
        CollectorBuilder::new()
    }

    /// Registers the series under the default `hystrix` namespace.
    ///
    /// Fails with [`RegistrationError::Duplicate`](crate::RegistrationError)
    /// if `registry` already holds them.
    pub fn build(registry: &mut MetricsRegistry) -> RegistrationResult<Self> {
        Self::builder().build(registry)
    }

    pub(crate) fn register(
        registry: &mut MetricsRegistry,
        namespace: &str,
        help_prefix: &str,
    ) -> RegistrationResult<Self> {
        let metrics = CircuitMetrics::default();
        metrics.register(registry, namespace, help_prefix)?;

        tracing::debug!(namespace, "registered circuit metric series");

        Ok(Self {
            metrics: Arc::new(metrics),
            namespace: namespace.to_string(),
        })
    }

    /// Namespace prefixed to every series name.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Returns a collector bound to `circuit_name`.
    pub fn collector(&self, circuit_name: impl Into<String>) -> PrometheusCollector {
        let circuit_name = circuit_name.into();
        tracing::debug!(
            circuit_name = %circuit_name,
            namespace = %self.namespace,
            "creating prometheus collector"
        );

        PrometheusCollector {
            labels: CircuitLabels { circuit_name },
            metrics: Arc::clone(&self.metrics),
        }
    }

    /// Converts the factory into a constructor closure for a collector registry.
    pub fn into_constructor(
        self,
    ) -> impl Fn(&str) -> Box<dyn MetricCollector> + Send + Sync + 'static {
        move |circuit_name: &str| -> Box<dyn MetricCollector> {
            Box::new(self.collector(circuit_name))
        }
    }

    /// Reads every series for `circuit_name`.
    ///
    /// Reading an unseen circuit materializes its series at zero.
    pub fn snapshot(&self, circuit_name: &str) -> CircuitSnapshot {
        self.metrics.snapshot(&CircuitLabels {
            circuit_name: circuit_name.to_string(),
        })
    }
}

impl CircuitMetrics {
    fn snapshot(&self, labels: &CircuitLabels) -> CircuitSnapshot {
        CircuitSnapshot {
            attempts: self.attempts.get_or_create(labels).get(),
            errors: self.errors.get_or_create(labels).get(),
            failures: self.failures.get_or_create(labels).get(),
            rejects: self.rejects.get_or_create(labels).get(),
            short_circuits: self.short_circuits.get_or_create(labels).get(),
            timeouts: self.timeouts.get_or_create(labels).get(),
            fallback_successes: self.fallback_successes.get_or_create(labels).get(),
            fallback_failures: self.fallback_failures.get_or_create(labels).get(),
            successes: self.successes.get_or_create(labels).get(),
            total_duration_seconds: self.total_duration.get_or_create(labels).get(),
            run_duration_seconds: self.run_duration.get_or_create(labels).get(),
        }
    }
}

/// Collector that records one circuit's events into Prometheus series.
///
/// Holds only the circuit label and a handle to the shared series. Collectors
/// created with the same name update the same series.
#[derive(Clone, Debug)]
pub struct PrometheusCollector {
    labels: CircuitLabels,
    metrics: Arc<CircuitMetrics>,
}

impl PrometheusCollector {
    /// Name of the circuit this collector reports for.
    pub fn circuit_name(&self) -> &str {
        &self.labels.circuit_name
    }

    /// Reads every series for this collector's circuit.
    pub fn snapshot(&self) -> CircuitSnapshot {
        self.metrics.snapshot(&self.labels)
    }
}

impl MetricCollector for PrometheusCollector {
    fn increment_attempts(&self) {
        self.metrics.attempts.get_or_create(&self.labels).inc();
    }

    fn increment_errors(&self) {
        self.metrics.errors.get_or_create(&self.labels).inc();
    }

    fn increment_successes(&self) {
        self.metrics.successes.get_or_create(&self.labels).inc();
    }

    fn increment_failures(&self) {
        self.metrics.failures.get_or_create(&self.labels).inc();
    }

    fn increment_rejects(&self) {
        self.metrics.rejects.get_or_create(&self.labels).inc();
    }

    fn increment_short_circuits(&self) {
        self.metrics.short_circuits.get_or_create(&self.labels).inc();
    }

    fn increment_timeouts(&self) {
        self.metrics.timeouts.get_or_create(&self.labels).inc();
    }

    fn increment_fallback_successes(&self) {
        self.metrics
            .fallback_successes
            .get_or_create(&self.labels)
            .inc();
    }

    fn increment_fallback_failures(&self) {
        self.metrics
            .fallback_failures
            .get_or_create(&self.labels)
            .inc();
    }

    fn update_total_duration(&self, time_since_start: Duration) {
        self.metrics
            .total_duration
            .get_or_create(&self.labels)
            .set(time_since_start.as_secs_f64());
    }

    fn update_run_duration(&self, run_duration: Duration) {
        self.metrics
            .run_duration
            .get_or_create(&self.labels)
            .inc_by(run_duration.as_secs_f64());
    }

    // Cumulative series; nothing to reset.
    fn reset(&self) {
        tracing::trace!(circuit_name = %self.labels.circuit_name, "ignoring collector reset");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn factory() -> CollectorFactory {
        let mut registry = MetricsRegistry::new();
        CollectorFactory::build(&mut registry).unwrap()
    }

    #[test]
    fn registers_all_series_names() {
        let mut registry = MetricsRegistry::new();
        CollectorFactory::build(&mut registry).unwrap();

        for name in [
            "hystrix_attempts",
            "hystrix_errors",
            "hystrix_failures",
            "hystrix_rejects",
            "hystrix_short_circuits",
            "hystrix_timeouts",
            "hystrix_fallback_success",
            "hystrix_fallback_failures",
            "hystrix_success",
            "hystrix_total_duration_seconds",
            "hystrix_run_duration_seconds",
        ] {
            assert!(registry.contains(name), "missing {}", name);
        }
    }

    #[test]
    fn each_method_updates_its_own_series() {
        let collector = factory().collector("orders");

        collector.increment_attempts();
        collector.increment_errors();
        collector.increment_successes();
        collector.increment_failures();
        collector.increment_rejects();
        collector.increment_short_circuits();
        collector.increment_timeouts();
        collector.increment_fallback_successes();
        collector.increment_fallback_failures();
        collector.update_total_duration(Duration::from_secs(3));
        collector.update_run_duration(Duration::from_millis(500));

        assert_eq!(
            collector.snapshot(),
            CircuitSnapshot {
                attempts: 1,
                errors: 1,
                failures: 1,
                rejects: 1,
                short_circuits: 1,
                timeouts: 1,
                fallback_successes: 1,
                fallback_failures: 1,
                successes: 1,
                total_duration_seconds: 3.0,
                run_duration_seconds: 0.5,
            }
        );
    }

    #[test]
    fn unseen_circuit_reads_zero() {
        assert_eq!(factory().snapshot("nobody"), CircuitSnapshot::default());
    }

    #[test]
    fn constructor_keeps_circuit_name() {
        let factory = factory();
        let build = factory.clone().into_constructor();

        let boxed = build("search");
        boxed.increment_timeouts();

        assert_eq!(factory.snapshot("search").timeouts, 1);
        assert_eq!(factory.collector("search").circuit_name(), "search");
    }
}

//! # hystrix-prometheus
//!
//! A Prometheus metric collector for Hystrix-style circuit breakers.
//!
//! A circuit breaker reports what happens to each guarded call (attempted,
//! succeeded, failed, timed out, rejected, short-circuited, fallback outcome,
//! durations) through the [`MetricCollector`] trait. This crate provides the
//! trait, a no-op implementation, and a Prometheus implementation that keeps
//! one labeled series per event kind, partitioned by circuit name.
//!
//! ## Basic Usage
//!
//! ```rust
//! use hystrix_prometheus::{CollectorFactory, MetricCollector, MetricsRegistry};
//! use std::time::Duration;
//!
//! // Register the series once, at startup.
//! let mut registry = MetricsRegistry::new();
//! let factory = CollectorFactory::build(&mut registry).expect("series registered once");
//!
//! // One collector per circuit.
//! let payments = factory.collector("payments");
//! payments.increment_attempts();
//! payments.increment_successes();
//! payments.update_run_duration(Duration::from_millis(150));
//!
//! assert_eq!(payments.snapshot().attempts, 1);
//!
//! // Serve this from your scrape endpoint.
//! let exposition = registry.encode().unwrap();
//! assert!(exposition.contains(r#"hystrix_attempts_total{circuit_name="payments"} 1"#));
//! ```
//!
//! Building a second factory against the same registry with the same
//! namespace fails with [`RegistrationError::Duplicate`].
//!
//! ## Several Backends
//!
//! ```rust
//! use hystrix_prometheus::{CollectorFactory, CollectorRegistry, MetricsRegistry, NullMetricCollector};
//!
//! let mut registry = MetricsRegistry::new();
//! let collectors = CollectorRegistry::new();
//! collectors.register(CollectorFactory::build(&mut registry).unwrap().into_constructor());
//! collectors.register(|_| Box::new(NullMetricCollector));
//!
//! assert_eq!(collectors.initialize("payments").len(), 2);
//! ```
//!
//! ## Features
//!
//! - `prometheus` - Prometheus collector via `prometheus-client` (default)

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod collectors;
#[cfg(feature = "prometheus")]
mod config;
mod error;
mod metrics;
pub mod prelude;
#[cfg(feature = "prometheus")]
mod prometheus;

// Re-exports
pub use collectors::{CollectorRegistry, Collectors};
#[cfg(feature = "prometheus")]
pub use config::{CollectorBuilder, DEFAULT_HELP_PREFIX, DEFAULT_NAMESPACE};
pub use error::{RegistrationError, RegistrationResult};
pub use metrics::{MetricCollector, MetricResult, NullMetricCollector};
#[cfg(feature = "prometheus")]
pub use prometheus::{CircuitSnapshot, CollectorFactory, MetricsRegistry, PrometheusCollector};

//! Prometheus backend built on `prometheus-client`.
//!
//! Series are exposed as (with the default `hystrix` namespace):
//!
//! | Series | Kind |
//! |---|---|
//! | `hystrix_attempts_total` | counter |
//! | `hystrix_errors_total` | counter |
//! | `hystrix_failures_total` | counter |
//! | `hystrix_rejects_total` | counter |
//! | `hystrix_short_circuits_total` | counter |
//! | `hystrix_timeouts_total` | counter |
//! | `hystrix_fallback_success_total` | counter |
//! | `hystrix_fallback_failures_total` | counter |
//! | `hystrix_success_total` | counter |
//! | `hystrix_total_duration_seconds` | gauge |
//! | `hystrix_run_duration_seconds_total` | counter |
//!
//! Every series carries a single `circuit_name` label.
//!
//! The Go `hystrix` Prometheus collector exposes the run duration as
//! `hystrix_run_duration_seconds`; here it carries the OpenMetrics counter
//! suffix, `hystrix_run_duration_seconds_total`, so dashboards need renaming.

mod collector;
mod registry;

pub use collector::{CircuitSnapshot, CollectorFactory, PrometheusCollector};
pub use registry::MetricsRegistry;

//! Re-exports common types for convenient usage.
//!
//! # Example
//! ```rust,no_run
//! use hystrix_prometheus::prelude::*;
//!
//! let mut registry = MetricsRegistry::new();
//! let collector = CollectorFactory::build(&mut registry).unwrap().collector("payments");
//! collector.increment_attempts();
//! ```

pub use crate::collectors::CollectorRegistry;
pub use crate::error::{RegistrationError, RegistrationResult};
pub use crate::metrics::{MetricCollector, MetricResult, NullMetricCollector};
#[cfg(feature = "prometheus")]
pub use crate::prometheus::{CollectorFactory, MetricsRegistry, PrometheusCollector};

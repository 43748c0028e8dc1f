//! Registry of collector constructors shared by every circuit.

use crate::metrics::MetricCollector;
use parking_lot::RwLock;
use smallvec::SmallVec;
use std::sync::Arc;

type ConstructorFn = Arc<dyn Fn(&str) -> Box<dyn MetricCollector> + Send + Sync + 'static>;

/// Collectors built for a single circuit.
pub type Collectors = SmallVec<[Box<dyn MetricCollector>; 2]>;

/// A registry of collector constructors.
///
/// Each registered constructor yields one collector per circuit, so a breaker
/// can report the same events to several backends.
pub struct CollectorRegistry {
    constructors: RwLock<Vec<ConstructorFn>>,
}

impl Default for CollectorRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl CollectorRegistry {
    /// Creates a new empty collector registry.
    pub fn new() -> Self {
        Self {
            constructors: RwLock::new(Vec::new()),
        }
    }

    /// Adds a constructor that builds a collector for a circuit name.
    pub fn register<F>(&self, f: F)
    where
        F: Fn(&str) -> Box<dyn MetricCollector> + Send + Sync + 'static,
    {
        self.constructors.write().push(Arc::new(f));
    }

    /// Builds one collector per registered constructor for `circuit_name`.
    pub fn initialize(&self, circuit_name: &str) -> Collectors {
        // Clone out so constructors run without holding the lock.
        let constructors: SmallVec<[ConstructorFn; 2]> =
            self.constructors.read().iter().cloned().collect();

        tracing::debug!(
            circuit_name,
            collectors = constructors.len(),
            "initializing metric collectors"
        );

        constructors.iter().map(|f| f(circuit_name)).collect()
    }

    /// Number of registered constructors.
    pub fn len(&self) -> usize {
        self.constructors.read().len()
    }

    /// Returns true if no constructors are registered.
    pub fn is_empty(&self) -> bool {
        self.constructors.read().is_empty()
    }
}

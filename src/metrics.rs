//! Collector capability and per-call event summaries.

use std::time::Duration;

/// Trait for metric backends that receive circuit breaker events.
///
/// A breaker holds one collector per circuit and calls these methods
/// synchronously as calls progress. Implementations must not fail and must
/// not block; errors inside a backend stay inside the backend.
pub trait MetricCollector: Send + Sync + 'static {
    /// Increments the number of calls attempted on this circuit.
    fn increment_attempts(&self);

    /// Increments the number of unsuccessful attempts.
    ///
    /// Errors are any attempt outcome that is not a success: rejects,
    /// short-circuits, timeouts and failures.
    fn increment_errors(&self);

    /// Increments the number of attempts that succeeded.
    fn increment_successes(&self);

    /// Increments the number of attempts whose operation failed.
    fn increment_failures(&self);

    /// Increments the number of attempts rejected by concurrency limits.
    fn increment_rejects(&self);

    /// Increments the number of attempts blocked because the circuit was open.
    fn increment_short_circuits(&self);

    /// Increments the number of attempts that exceeded their deadline.
    fn increment_timeouts(&self);

    /// Increments the number of fallbacks that succeeded.
    fn increment_fallback_successes(&self);

    /// Increments the number of fallbacks that failed.
    fn increment_fallback_failures(&self);

    /// Sets how long the circuit has been active.
    fn update_total_duration(&self, time_since_start: Duration);

    /// Adds the duration of the last run.
    fn update_run_duration(&self, run_duration: Duration);

    /// Resets collector state. Backends with cumulative series ignore this.
    fn reset(&self);

    /// Applies every event in `result` through the individual methods.
    ///
    /// Meant for per-call summaries, where counts are 0 or 1. Each count is
    /// replayed one increment at a time, so cost grows with the counts.
    fn update(&self, result: &MetricResult) {
        let events: [(u64, fn(&Self)); 9] = [
            (result.attempts, Self::increment_attempts),
            (result.errors, Self::increment_errors),
            (result.successes, Self::increment_successes),
            (result.failures, Self::increment_failures),
            (result.rejects, Self::increment_rejects),
            (result.short_circuits, Self::increment_short_circuits),
            (result.timeouts, Self::increment_timeouts),
            (result.fallback_successes, Self::increment_fallback_successes),
            (result.fallback_failures, Self::increment_fallback_failures),
        ];

        for (count, record) in events {
            for _ in 0..count {
                record(self);
            }
        }

        self.update_total_duration(result.total_duration);
        if let Some(run) = result.run_duration {
            self.update_run_duration(run);
        }
    }
}

impl<C: MetricCollector + ?Sized> MetricCollector for Box<C> {
    fn increment_attempts(&self) {
        (**self).increment_attempts()
    }
    fn increment_errors(&self) {
        (**self).increment_errors()
    }
    fn increment_successes(&self) {
        (**self).increment_successes()
    }
    fn increment_failures(&self) {
        (**self).increment_failures()
    }
    fn increment_rejects(&self) {
        (**self).increment_rejects()
    }
    fn increment_short_circuits(&self) {
        (**self).increment_short_circuits()
    }
    fn increment_timeouts(&self) {
        (**self).increment_timeouts()
    }
    fn increment_fallback_successes(&self) {
        (**self).increment_fallback_successes()
    }
    fn increment_fallback_failures(&self) {
        (**self).increment_fallback_failures()
    }
    fn update_total_duration(&self, time_since_start: Duration) {
        (**self).update_total_duration(time_since_start)
    }
    fn update_run_duration(&self, run_duration: Duration) {
        (**self).update_run_duration(run_duration)
    }
    fn reset(&self) {
        (**self).reset()
    }
    fn update(&self, result: &MetricResult) {
        (**self).update(result)
    }
}

/// A null collector that discards all events.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullMetricCollector;

impl MetricCollector for NullMetricCollector {
    fn increment_attempts(&self) {}
    fn increment_errors(&self) {}
    fn increment_successes(&self) {}
    fn increment_failures(&self) {}
    fn increment_rejects(&self) {}
    fn increment_short_circuits(&self) {}
    fn increment_timeouts(&self) {}
    fn increment_fallback_successes(&self) {}
    fn increment_fallback_failures(&self) {}
    fn update_total_duration(&self, _time_since_start: Duration) {}
    fn update_run_duration(&self, _run_duration: Duration) {}
    fn reset(&self) {}
    fn update(&self, _result: &MetricResult) {}
}

/// Summary of the events produced by one guarded call.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MetricResult {
    /// Calls attempted.
    pub attempts: u64,
    /// Attempts that did not succeed.
    pub errors: u64,
    /// Attempts that succeeded.
    pub successes: u64,
    /// Attempts whose operation failed.
    pub failures: u64,
    /// Attempts rejected by concurrency limits.
    pub rejects: u64,
    /// Attempts blocked by an open circuit.
    pub short_circuits: u64,
    /// Attempts that timed out.
    pub timeouts: u64,
    /// Fallbacks that succeeded.
    pub fallback_successes: u64,
    /// Fallbacks that failed.
    pub fallback_failures: u64,
    /// Time the circuit has been active.
    pub total_duration: Duration,
    /// Duration of the run, if the operation actually ran.
    pub run_duration: Option<Duration>,
}

impl MetricResult {
    /// A call whose operation ran and succeeded.
    pub fn success(run_duration: Duration, total_duration: Duration) -> Self {
        Self {
            attempts: 1,
            successes: 1,
            run_duration: Some(run_duration),
            total_duration,
            ..Self::default()
        }
    }

    /// A call whose operation ran and failed.
    pub fn failure(run_duration: Duration, total_duration: Duration) -> Self {
        Self {
            attempts: 1,
            errors: 1,
            failures: 1,
            run_duration: Some(run_duration),
            total_duration,
            ..Self::default()
        }
    }

    /// A call that ran past its deadline.
    pub fn timeout(run_duration: Duration, total_duration: Duration) -> Self {
        Self {
            attempts: 1,
            errors: 1,
            timeouts: 1,
            run_duration: Some(run_duration),
            total_duration,
            ..Self::default()
        }
    }

    /// A call rejected before running because of concurrency limits.
    pub fn rejected(total_duration: Duration) -> Self {
        Self {
            attempts: 1,
            errors: 1,
            rejects: 1,
            total_duration,
            ..Self::default()
        }
    }

    /// A call blocked before running because the circuit was open.
    pub fn short_circuited(total_duration: Duration) -> Self {
        Self {
            attempts: 1,
            errors: 1,
            short_circuits: 1,
            total_duration,
            ..Self::default()
        }
    }

    /// Records the outcome of a fallback that ran after this call.
    pub fn with_fallback(mut self, succeeded: bool) -> Self {
        if succeeded {
            self.fallback_successes += 1;
        } else {
            self.fallback_failures += 1;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering};

    #[derive(Default)]
    struct Tally {
        attempts: AtomicU64,
        errors: AtomicU64,
        fallback_failures: AtomicU64,
        runs: AtomicU64,
    }

    impl MetricCollector for Tally {
        fn increment_attempts(&self) {
            self.attempts.fetch_add(1, Ordering::Relaxed);
        }
        fn increment_errors(&self) {
            self.errors.fetch_add(1, Ordering::Relaxed);
        }
        fn increment_successes(&self) {}
        fn increment_failures(&self) {}
        fn increment_rejects(&self) {}
        fn increment_short_circuits(&self) {}
        fn increment_timeouts(&self) {}
        fn increment_fallback_successes(&self) {}
        fn increment_fallback_failures(&self) {
            self.fallback_failures.fetch_add(1, Ordering::Relaxed);
        }
        fn update_total_duration(&self, _time_since_start: Duration) {}
        fn update_run_duration(&self, _run_duration: Duration) {
            self.runs.fetch_add(1, Ordering::Relaxed);
        }
        fn reset(&self) {}
    }

    #[test]
    fn update_fans_out_counts() {
        let tally = Tally::default();
        let result = MetricResult {
            attempts: 3,
            errors: 2,
            ..MetricResult::default()
        };

        tally.update(&result);

        assert_eq!(tally.attempts.load(Ordering::Relaxed), 3);
        assert_eq!(tally.errors.load(Ordering::Relaxed), 2);
        assert_eq!(tally.runs.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn short_circuit_with_failed_fallback() {
        let tally = Box::new(Tally::default());
        let result = MetricResult::short_circuited(Duration::from_secs(1)).with_fallback(false);

        tally.update(&result);

        assert_eq!(tally.attempts.load(Ordering::Relaxed), 1);
        assert_eq!(tally.errors.load(Ordering::Relaxed), 1);
        assert_eq!(tally.fallback_failures.load(Ordering::Relaxed), 1);
        assert_eq!(tally.runs.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn outcome_constructors_count_errors() {
        let total = Duration::from_secs(10);
        let run = Duration::from_millis(20);

        assert_eq!(MetricResult::success(run, total).errors, 0);
        assert_eq!(MetricResult::failure(run, total).errors, 1);
        assert_eq!(MetricResult::timeout(run, total).timeouts, 1);
        assert_eq!(MetricResult::rejected(total).run_duration, None);
        assert_eq!(MetricResult::short_circuited(total).short_circuits, 1);
    }
}

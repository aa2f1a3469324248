//! Read workload counters

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use crate::error::BenchError;
use crate::record::FieldValue;

/// Counters for one access mode, shared by all worker threads.
#[derive(Debug, Default)]
pub struct ReadStats {
    /// Lookups issued
    pub reads: AtomicU64,
    /// Lookups that returned the expected field value
    pub field_hits: AtomicU64,
    /// Lookups that found no record
    pub not_found: AtomicU64,
    /// Lookups that returned the wrong value
    pub violations: AtomicU64,
    /// Lookups that failed for any other reason
    pub errors: AtomicU64,
    /// Total latency in nanoseconds
    pub total_latency_ns: AtomicU64,
    /// Samples behind `total_latency_ns`
    pub latency_count: AtomicU64,
}

impl ReadStats {
    /// Create new read stats
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the outcome of one lookup
    pub fn record_result(&self, result: &Result<FieldValue, BenchError>) {
        self.reads.fetch_add(1, Ordering::Relaxed);
        let counter = match result {
            Ok(_) => &self.field_hits,
            Err(BenchError::KeyNotFound(_)) => &self.not_found,
            Err(BenchError::ConsistencyViolation { .. }) => &self.violations,
            Err(_) => &self.errors,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a batch of `count` lookups that all hit
    pub fn record_hits(&self, count: u64) {
        self.reads.fetch_add(count, Ordering::Relaxed);
        self.field_hits.fetch_add(count, Ordering::Relaxed);
    }

    /// Record lookup latency
    pub fn record_latency(&self, duration: Duration) {
        self.total_latency_ns
            .fetch_add(duration.as_nanos() as u64, Ordering::Relaxed);
        self.latency_count.fetch_add(1, Ordering::Relaxed);
    }

    /// Get failed lookups
    pub fn failures(&self) -> u64 {
        self.not_found.load(Ordering::Relaxed)
            + self.violations.load(Ordering::Relaxed)
            + self.errors.load(Ordering::Relaxed)
    }

    /// Get average latency
    pub fn average_latency(&self) -> Duration {
        let count = self.latency_count.load(Ordering::Relaxed);
        if count == 0 {
            return Duration::ZERO;
        }
        let total_ns = self.total_latency_ns.load(Ordering::Relaxed);
        Duration::from_nanos(total_ns / count)
    }

    /// Get hit rate
    pub fn hit_rate(&self) -> f64 {
        let reads = self.reads.load(Ordering::Relaxed);
        if reads == 0 {
            return 0.0;
        }
        self.field_hits.load(Ordering::Relaxed) as f64 / reads as f64
    }

    /// Reset all statistics
    pub fn reset(&self) {
        self.reads.store(0, Ordering::Relaxed);
        self.field_hits.store(0, Ordering::Relaxed);
        self.not_found.store(0, Ordering::Relaxed);
        self.violations.store(0, Ordering::Relaxed);
        self.errors.store(0, Ordering::Relaxed);
        self.total_latency_ns.store(0, Ordering::Relaxed);
        self.latency_count.store(0, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::Key;
    use crate::status::Status;

    #[test]
    fn test_record_result() {
        let stats = ReadStats::new();
        stats.record_result(&Ok(FieldValue::Int(1)));
        stats.record_result(&Ok(FieldValue::Int(2)));
        stats.record_result(&Err(BenchError::KeyNotFound(Key::Int(0))));
        stats.record_result(&Err(BenchError::ConsistencyViolation {
            key: Key::Int(1),
            expected: FieldValue::Int(1),
            observed: FieldValue::Int(2),
        }));
        stats.record_result(&Err(BenchError::Store(Status::Corruption)));

        assert_eq!(stats.reads.load(Ordering::Relaxed), 5);
        assert_eq!(stats.field_hits.load(Ordering::Relaxed), 2);
        assert_eq!(stats.not_found.load(Ordering::Relaxed), 1);
        assert_eq!(stats.violations.load(Ordering::Relaxed), 1);
        assert_eq!(stats.errors.load(Ordering::Relaxed), 1);
        assert_eq!(stats.failures(), 3);
        assert!((stats.hit_rate() - 0.4).abs() < f64::EPSILON);
    }

    #[test]
    fn test_latency_and_reset() {
        let stats = ReadStats::new();
        assert_eq!(stats.average_latency(), Duration::ZERO);
        stats.record_latency(Duration::from_nanos(100));
        stats.record_latency(Duration::from_nanos(300));
        assert_eq!(stats.average_latency(), Duration::from_nanos(200));

        stats.record_hits(10);
        stats.reset();
        assert_eq!(stats.reads.load(Ordering::Relaxed), 0);
        assert_eq!(stats.average_latency(), Duration::ZERO);
        assert_eq!(stats.hit_rate(), 0.0);
    }
}

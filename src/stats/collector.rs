//! Statistics collector
//!
//! Pairs [`ReadStats`] with the access mode and a start time so a finished run
//! can be turned into a [`ReadStatsSnapshot`].

use std::sync::atomic::Ordering;
use std::time::{Duration, Instant};

use serde::Serialize;

use crate::access::AccessMode;
use crate::stats::metrics::ReadStats;

/// Statistics collector for one access mode.
#[derive(Debug)]
pub struct StatsCollector {
    mode: AccessMode,
    threads: usize,
    /// Counters shared by the workers
    pub stats: ReadStats,
    start_time: Instant,
}

impl StatsCollector {
    /// Create a new collector; the clock starts now.
    pub fn new(mode: AccessMode, threads: usize) -> Self {
        Self {
            mode,
            threads,
            stats: ReadStats::new(),
            start_time: Instant::now(),
        }
    }

    /// Access mode being measured
    pub fn mode(&self) -> AccessMode {
        self.mode
    }

    /// Get elapsed time since collection started
    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Restart the clock and clear the counters
    pub fn reset(&mut self) {
        self.stats.reset();
        self.start_time = Instant::now();
    }

    /// Get a snapshot of current statistics
    pub fn snapshot(&self) -> ReadStatsSnapshot {
        let elapsed = self.elapsed();
        let reads = self.stats.reads.load(Ordering::Relaxed);
        let throughput = if elapsed.is_zero() {
            0.0
        } else {
            reads as f64 / elapsed.as_secs_f64()
        };

        ReadStatsSnapshot {
            mode: self.mode,
            threads: self.threads,
            elapsed_ms: elapsed.as_millis() as u64,
            reads,
            field_hits: self.stats.field_hits.load(Ordering::Relaxed),
            not_found: self.stats.not_found.load(Ordering::Relaxed),
            violations: self.stats.violations.load(Ordering::Relaxed),
            errors: self.stats.errors.load(Ordering::Relaxed),
            hit_rate: self.stats.hit_rate(),
            throughput,
            avg_latency_ns: self.stats.average_latency().as_nanos() as u64,
        }
    }
}

/// Point-in-time copy of a collector's counters.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReadStatsSnapshot {
    /// Access mode
    pub mode: AccessMode,
    /// Worker threads
    pub threads: usize,
    /// Elapsed wall time in milliseconds
    pub elapsed_ms: u64,
    /// Lookups issued
    pub reads: u64,
    /// Lookups that returned the expected value
    pub field_hits: u64,
    /// Lookups that found no record
    pub not_found: u64,
    /// Lookups that returned the wrong value
    pub violations: u64,
    /// Other failures
    pub errors: u64,
    /// `field_hits / reads`
    pub hit_rate: f64,
    /// Lookups per second
    pub throughput: f64,
    /// Average sampled latency in nanoseconds
    pub avg_latency_ns: u64,
}

impl ReadStatsSnapshot {
    /// Whether every lookup returned the expected value.
    pub fn is_clean(&self) -> bool {
        self.not_found == 0 && self.violations == 0 && self.errors == 0
    }
}

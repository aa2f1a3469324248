//! Read statistics
//!
//! Counters updated by benchmark workers, snapshots of a finished run, and
//! text/JSON/compact reporting.

pub mod collector;
pub mod metrics;
pub mod reporter;

pub use collector::{ReadStatsSnapshot, StatsCollector};
pub use metrics::ReadStats;
pub use reporter::{ReportFormat, StatsReporter};

//! Statistics reporter
//!
//! Formats per-mode snapshots for the terminal or for machine consumption.

use std::fmt::Write;
use std::str::FromStr;

use crate::stats::collector::ReadStatsSnapshot;

/// Output format for statistics reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportFormat {
    /// Human-readable text format
    #[default]
    Text,
    /// JSON array of snapshots
    Json,
    /// Compact one-line format
    Compact,
}

impl FromStr for ReportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            "compact" => Ok(Self::Compact),
            _ => Err(format!("unknown report format: {s}")),
        }
    }
}

/// Statistics reporter
pub struct StatsReporter {
    format: ReportFormat,
}

impl StatsReporter {
    /// Create a new reporter with the given format
    pub fn new(format: ReportFormat) -> Self {
        Self { format }
    }

    /// Create a reporter with text format
    pub fn text() -> Self {
        Self::new(ReportFormat::Text)
    }

    /// Create a reporter with JSON format
    pub fn json() -> Self {
        Self::new(ReportFormat::Json)
    }

    /// Generate a report covering every snapshot
    pub fn report(&self, snapshots: &[ReadStatsSnapshot]) -> String {
        match self.format {
            ReportFormat::Text => snapshots.iter().map(format_text).collect(),
            ReportFormat::Json => format_json(snapshots),
            ReportFormat::Compact => snapshots.iter().map(format_compact).collect(),
        }
    }
}

fn format_text(snapshot: &ReadStatsSnapshot) -> String {
    let mut output = String::new();

    writeln!(output, "=== {} ===", snapshot.mode).unwrap();
    writeln!(output, "Elapsed: {} ms ({} threads)", snapshot.elapsed_ms, snapshot.threads)
        .unwrap();
    writeln!(
        output,
        "Reads:   {} (hits: {}, rate: {:.2}%)",
        snapshot.reads,
        snapshot.field_hits,
        snapshot.hit_rate * 100.0
    )
    .unwrap();
    if !snapshot.is_clean() {
        writeln!(
            output,
            "Failures: not found {}, violations {}, errors {}",
            snapshot.not_found, snapshot.violations, snapshot.errors
        )
        .unwrap();
    }
    writeln!(output, "Throughput: {:.2} reads/sec", snapshot.throughput).unwrap();
    writeln!(output, "Avg Latency: {} ns", snapshot.avg_latency_ns).unwrap();
    writeln!(output).unwrap();

    output
}

fn format_json(snapshots: &[ReadStatsSnapshot]) -> String {
    match serde_json::to_string_pretty(snapshots) {
        Ok(mut json) => {
            json.push('\n');
            json
        }
        Err(err) => format!("{{\"error\": \"{err}\"}}\n"),
    }
}

fn format_compact(snapshot: &ReadStatsSnapshot) -> String {
    format!(
        "{}: reads={} hits={} fail={} tput={:.0}/s lat={}ns\n",
        snapshot.mode,
        snapshot.reads,
        snapshot.field_hits,
        snapshot.not_found + snapshot.violations + snapshot.errors,
        snapshot.throughput,
        snapshot.avg_latency_ns
    )
}

// Read probe - populates a store, checks one key through every read path, then
// measures each configured access mode for a fixed duration.
//
// Usage:
//   cargo run --release --bin read_probe -- [--config bench.toml] [--size N] [--seconds S]

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::{Duration, Instant};

use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing_subscriber::EnvFilter;

use readbench::config::BenchConfig;
use readbench::stats::{ReadStatsSnapshot, ReportFormat, StatsCollector, StatsReporter};
use readbench::{AccessMode, BenchError, Fixture, KeyShape, MemStore, WorkloadConfig};

#[derive(Parser, Debug)]
#[command(name = "read_probe")]
#[command(about = "Point-read probe for the fixed-schema record store", long_about = None)]
struct Args {
    /// TOML config file (defaults to $READBENCH_CONFIG)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Number of records to populate
    #[arg(short, long)]
    size: Option<u64>,

    /// Key shape: integer or text
    #[arg(short, long)]
    key_shape: Option<KeyShape>,

    /// Access modes to measure, comma separated
    #[arg(short, long, value_delimiter = ',')]
    modes: Vec<AccessMode>,

    /// Worker threads per mode
    #[arg(short, long)]
    threads: Option<usize>,

    /// Reads between deadline checks
    #[arg(long)]
    bulk_reads: Option<u64>,

    /// Seconds to run each mode; 0 runs the probe only
    #[arg(long, default_value = "3")]
    seconds: u64,

    /// Report format: text, json or compact
    #[arg(short, long, default_value = "text")]
    format: ReportFormat,

    /// RNG seed for population and reads
    #[arg(long)]
    seed: Option<u64>,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %err, "read probe failed");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<(), BenchError> {
    let config = match &args.config {
        Some(path) => {
            let mut config = BenchConfig::load_from_path(path)?;
            config.apply_env_overrides()?;
            config
        }
        None => BenchConfig::load_from_env()?,
    };

    let mut population = config.to_population_config();
    if let Some(size) = args.size {
        population.size = size;
    }
    if let Some(key_shape) = args.key_shape {
        population.key_shape = key_shape;
    }
    if let Some(seed) = args.seed {
        population.seed = Some(seed);
    }

    let mut workload = config.to_workload_config();
    if !args.modes.is_empty() {
        workload.modes = args.modes.clone();
    }
    if let Some(threads) = args.threads {
        workload.threads = threads.max(1);
    }
    if let Some(bulk_reads) = args.bulk_reads {
        workload.bulk_reads = bulk_reads;
    }

    let fixture = Fixture::in_memory(&population, config.to_store_config(), &mut population.rng())?;

    probe(&fixture, &mut population.rng())?;

    if args.seconds > 0 {
        let duration = Duration::from_secs(args.seconds);
        let snapshots = workload
            .modes
            .iter()
            .map(|&mode| measure(&fixture, mode, &workload, duration, population.seed))
            .collect::<Vec<_>>();
        print!("{}", StatsReporter::new(args.format).report(&snapshots));
    }

    fixture.teardown()
}

/// Pick one key and read its key-echo field through both handle paths.
fn probe(fixture: &Fixture<MemStore>, rng: &mut StdRng) -> Result<(), BenchError> {
    let key = fixture.key_space().pick(rng);
    for mode in [AccessMode::LazyField, AccessMode::LazyFieldReadUncommitted] {
        let value = fixture.workload(mode).read_key(fixture.store(), &key)?;
        println!("{mode}: key {key} field1 = {value}");
    }
    Ok(())
}

fn measure(
    fixture: &Fixture<MemStore>,
    mode: AccessMode,
    config: &WorkloadConfig,
    duration: Duration,
    seed: Option<u64>,
) -> ReadStatsSnapshot {
    let workload = fixture.workload(mode);
    let collector = StatsCollector::new(mode, config.threads);
    let deadline = Instant::now() + duration;
    let batch = config.bulk_reads.max(1);

    std::thread::scope(|scope| {
        for thread_id in 0..config.threads {
            let workload = &workload;
            let collector = &collector;
            scope.spawn(move || {
                let mut rng = match seed {
                    Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(thread_id as u64 + 1)),
                    None => StdRng::from_entropy(),
                };
                while Instant::now() < deadline {
                    for _ in 0..batch {
                        let start = Instant::now();
                        let result = workload.read_once(fixture.store(), &mut rng);
                        collector.stats.record_latency(start.elapsed());
                        collector.stats.record_result(&result);
                    }
                }
            });
        }
    });

    let snapshot = collector.snapshot();
    if !snapshot.is_clean() {
        tracing::warn!(
            mode = %mode,
            not_found = snapshot.not_found,
            violations = snapshot.violations,
            errors = snapshot.errors,
            "reads failed during measurement"
        );
    }
    snapshot
}

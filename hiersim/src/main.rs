use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::PathBuf;
use std::time::Instant;
use anyhow::{bail, Context};
use clap::{ArgAction, Parser, ValueEnum};
use tracing::{debug, info};
use hierlib::config::HierarchyConfig;
use hierlib::io::read_trace_file;
use hierlib::simulator::Simulator;
use hierlib::trace::{write_trace, TraceEntry};
use hierlib::workload::{Workload, DEFAULT_ACCESS_COUNT};

#[cfg(debug_assertions)]
const DEBUG_DEFAULT: bool = true;

#[cfg(not(debug_assertions))]
const DEBUG_DEFAULT: bool = false;

#[derive(Copy, Clone, Debug, ValueEnum)]
enum WorkloadArg {
    Uniform,
    Localized,
    Sequential,
}

#[derive(Parser, Debug)]
#[command(about = String::from("Latency simulator for write-back cache hierarchies"))]
struct Args {
    /// JSON hierarchy configuration
    config: PathBuf,

    /// Trace file, one `[R|W] <address>` per line
    #[arg(short, long, conflicts_with = "workload", required_unless_present = "workload")]
    trace: Option<PathBuf>,

    /// Generate a synthetic trace instead of reading one
    #[arg(short, long, value_enum)]
    workload: Option<WorkloadArg>,

    /// Accesses in a uniform or localized workload
    #[arg(short, long, default_value_t = DEFAULT_ACCESS_COUNT)]
    count: usize,

    /// Seed for the workload generator
    #[arg(short, long, default_value_t = 42)]
    seed: u64,

    /// Also write the generated trace to this file
    #[arg(long)]
    dump_trace: Option<PathBuf>,

    #[arg(short, long)]
    performance: bool,

    /// Print the parsed configuration and line usage, `--debug false` turns it off in debug builds
    #[arg(short, long, action = ArgAction::Set, default_value_t = DEBUG_DEFAULT)]
    debug: bool,

    /// Log hierarchy events
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let start = Instant::now();
    let args = Args::parse();

    let filter = if args.verbose { "hierlib=debug,hiersim=debug" } else { "hierlib=warn,hiersim=info" };
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
        .with_writer(std::io::stderr)
        .init();

    let config_file = File::open(&args.config).with_context(|| format!("Couldn't open the config file at path {}", args.config.display()))?;
    let config = HierarchyConfig::from_reader(BufReader::new(config_file)).context("Couldn't parse the config file")?;
    let mut simulator = Simulator::new(&config).context("Invalid cache configuration")?;
    info!(levels = config.levels.len(), memory_latency = config.memory_latency, "configuration loaded");

    let trace = load_trace(&args, &config)?;
    if let Some(path) = &args.dump_trace {
        let out = File::create(path).with_context(|| format!("Couldn't create {}", path.display()))?;
        write_trace(BufWriter::new(out), &trace)?;
        debug!(path = %path.display(), "wrote trace");
    }

    let result = simulator.simulate(&trace);
    println!("{}", serde_json::to_string_pretty(result).context("Couldn't serialise the output")?);
    if args.performance {
        let simulation_time = simulator.get_execution_time();
        let total_time = start.elapsed();
        println!("Simulation time: {}s", simulation_time.as_nanos() as f64 / 1e9);
        println!("Total execution time (includes initial parsing, configuration, and output): {}s", total_time.as_nanos() as f64 / 1e9)
    }
    if args.debug {
        #[cfg(debug_assertions)]
        println!("Running the debug binary, debug mode is enabled by default. If benchmarking, do not use this binary, re-compile with the --release argument when using cargo run");
        println!("Parsed input configuration: {config:?}");
        let invalid_lines = simulator.get_invalid_line_counts();
        let formatted = config.level_names()
            .iter()
            .zip(invalid_lines.iter())
            .map(|(name, count)| format!("{name}: {count}"))
            .collect::<Vec<_>>()
            .join(", ");
        println!("Invalid cache lines by level: ({formatted})");
        println!("Total invalid cache lines: {}", invalid_lines.iter().sum::<u64>())
    }
    Ok(())
}

fn load_trace(args: &Args, config: &HierarchyConfig) -> anyhow::Result<Vec<TraceEntry>> {
    if let Some(path) = &args.trace {
        return read_trace_file(path).with_context(|| format!("Couldn't read the trace file at path {}", path.display()));
    }
    let workload = match args.workload {
        Some(WorkloadArg::Uniform) => Workload::uniform(args.count),
        Some(WorkloadArg::Localized) => Workload::localized(args.count),
        Some(WorkloadArg::Sequential) => {
            // Build already checked there's at least one level
            Workload::sequential(config.levels[0].block_size)
        }
        None => bail!("Either a trace file or a workload is required"),
    };
    info!(?workload, seed = args.seed, "generating workload");
    Ok(workload.generate(args.seed)?)
}

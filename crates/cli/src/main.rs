//! IPV cache replacement simulator CLI.
//!
//! This binary provides a single entry point for trace replay. It performs:
//! 1. **Trace run:** Replay a text trace through the cache (and optionally the gselect
//!    predictor) and print statistics.
//! 2. **Vector inspection:** Print a promotion vector and the rank transitions it encodes.
//!
//! Configuration comes from built-in defaults, an optional JSON file, and command-line
//! overrides, applied in that order.

use std::process;

use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use ipvsim_core::common::SimError;
use ipvsim_core::config::{Config, PromotionPreset};
use ipvsim_core::sim::{Simulator, load_trace};
use ipvsim_core::stats::STATS_SECTIONS;

#[derive(Parser, Debug)]
#[command(
    name = "ipvsim",
    author,
    version,
    about = "Insertion/promotion-vector cache replacement simulator",
    long_about = "Replay a memory/branch trace through a set-associative cache driven by an IPV \
                  replacement policy.\n\nExamples:\n  ipvsim run -t traces/loop.trc\n  \
                  ipvsim run -t traces/scan.trc --ways 4 --size 4096 --preset lip\n  \
                  ipvsim vector --ways 16"
)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace). RUST_LOG overrides.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Replay a trace and print statistics.
    Run {
        /// Trace file to replay.
        #[arg(short, long)]
        trace: String,

        /// JSON configuration file.
        #[arg(short, long)]
        config: Option<String>,

        #[command(flatten)]
        cache: CacheArgs,

        /// Model the gselect branch predictor.
        #[arg(long)]
        bp: bool,

        /// Statistics sections to print (default: all).
        #[arg(long, value_delimiter = ',', value_parser = clap::builder::PossibleValuesParser::new(STATS_SECTIONS))]
        stats: Vec<String>,
    },

    /// Print a promotion vector and its rank transitions.
    Vector {
        #[command(flatten)]
        cache: CacheArgs,

        /// Print the vector as a JSON array.
        #[arg(long)]
        json: bool,
    },
}

/// Cache overrides shared by both subcommands.
#[derive(Args, Debug)]
struct CacheArgs {
    /// Associativity (power of two).
    #[arg(long)]
    ways: Option<usize>,

    /// Number of sets, as an alternative to `--size`.
    #[arg(long, conflicts_with = "size")]
    sets: Option<usize>,

    /// Total cache size in bytes.
    #[arg(long)]
    size: Option<usize>,

    /// Line size in bytes.
    #[arg(long)]
    line: Option<usize>,

    /// Promotion vector preset.
    #[arg(long, value_enum)]
    preset: Option<PresetArg>,

    /// Explicit promotion vector, comma separated, insertion rank last.
    #[arg(long, value_delimiter = ',')]
    vector: Option<Vec<usize>>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum PresetArg {
    Paper,
    Lru,
    Lip,
}

impl From<PresetArg> for PromotionPreset {
    fn from(arg: PresetArg) -> Self {
        match arg {
            PresetArg::Paper => Self::Paper,
            PresetArg::Lru => Self::Lru,
            PresetArg::Lip => Self::Lip,
        }
    }
}

impl CacheArgs {
    /// Applies the command-line overrides on top of `config`.
    fn apply(&self, config: &mut Config) {
        let cache = &mut config.cache;
        if let Some(ways) = self.ways {
            cache.ways = ways;
        }
        if let Some(size) = self.size {
            cache.size_bytes = size;
        }
        if let Some(line) = self.line {
            cache.line_bytes = line;
        }
        if let Some(sets) = self.sets {
            cache.size_bytes = sets.saturating_mul(cache.ways).saturating_mul(cache.line_bytes);
        }
        if let Some(preset) = self.preset {
            cache.preset = preset.into();
            cache.promotion_vector = None;
        }
        if let Some(vector) = &self.vector {
            cache.promotion_vector = Some(vector.clone());
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::Run {
            trace,
            config,
            cache,
            bp,
            stats,
        } => cmd_run(&trace, config.as_deref(), &cache, bp, &stats),
        Commands::Vector { cache, json } => cmd_vector(&cache, json),
    };

    if let Err(e) = result {
        eprintln!("[!] FATAL: {e}");
        process::exit(1);
    }
}

/// Installs the log subscriber. `RUST_LOG` wins over `-v`.
fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Builds the configuration from defaults, an optional file and overrides.
fn load_config(path: Option<&str>, cache: &CacheArgs) -> Result<Config, SimError> {
    let mut config = match path {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };
    cache.apply(&mut config);
    debug!(?config, "configuration");
    Ok(config)
}

/// Replays `trace_path` and prints the statistics.
fn cmd_run(
    trace_path: &str,
    config_path: Option<&str>,
    cache: &CacheArgs,
    bp: bool,
    sections: &[String],
) -> Result<(), SimError> {
    let mut config = load_config(config_path, cache)?;
    if bp {
        config.branch_predictor.enabled = true;
    }
    let mut sim = Simulator::new(&config)?;

    let events = load_trace(trace_path)?;
    info!(path = trace_path, events = events.len(), "trace loaded");

    println!(
        "[*] {} sets x {} ways, {}-byte lines, vector {:?}",
        sim.cache.num_sets(),
        sim.cache.ways(),
        sim.cache.line_bytes(),
        sim.cache.policy().vector().entries()
    );

    sim.run(&events);
    sim.stats().print_sections(sections);
    Ok(())
}

/// Prints the resolved promotion vector.
fn cmd_vector(cache: &CacheArgs, json: bool) -> Result<(), SimError> {
    let config = load_config(None, cache)?;
    let vector = config.cache.promotion_vector()?;

    if json {
        println!("{}", serde_json::Value::from(vector.entries().to_vec()));
        return Ok(());
    }

    println!("IPV for {} ways: {:?}", vector.ways(), vector.entries());
    for rank in 0..vector.ways() {
        let to = vector.promotion(rank);
        let note = match to.cmp(&rank) {
            std::cmp::Ordering::Less => "promote",
            std::cmp::Ordering::Equal => "stay",
            std::cmp::Ordering::Greater => "demote",
        };
        println!("  hit  @ {rank:>2} -> {to:>2}  ({note})");
    }
    println!("  fill      -> {:>2}", vector.insertion());
    Ok(())
}

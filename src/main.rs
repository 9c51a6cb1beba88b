//! # Main — CLI Entry Point
//!
//! Thin front end over the `primegen` library: builds a prime table for the
//! requested range and counts, lists or queries it.
//!
//! ## Global Options
//!
//! - `--threads` / `PRIMEGEN_THREADS`: rayon pool size for parallel
//!   construction (0 = all cores).
//! - `--serial`: force single-threaded marking.
//!
//! Logging: `LOG_FORMAT=json` for JSON lines, human-readable on stderr
//! otherwise; `RUST_LOG` sets the level (default `info`).

mod cli;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[derive(Parser)]
#[command(name = "primegen", about = "Build a prime table and query it")]
struct Cli {
    /// Number of rayon worker threads for table construction (0 = all cores)
    #[arg(long, env = "PRIMEGEN_THREADS")]
    threads: Option<usize>,

    /// Mark composites on a single thread regardless of table size
    #[arg(long)]
    serial: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Count the primes in [low, high)
    Count {
        /// Inclusive lower bound
        #[arg(long, default_value_t = 0)]
        low: u64,
        /// Exclusive upper bound
        #[arg(long)]
        high: u64,
    },
    /// Print the primes in [low, high), one per line
    List {
        /// Inclusive lower bound
        #[arg(long, default_value_t = 0)]
        low: u64,
        /// Exclusive upper bound
        #[arg(long)]
        high: u64,
        /// Print a single JSON array instead
        #[arg(long)]
        json: bool,
    },
    /// Report whether each value is prime
    Check {
        /// Values to classify
        #[arg(required = true)]
        values: Vec<u64>,
        /// Table bound (defaults to the largest value + 1)
        #[arg(long)]
        high: Option<u64>,
    },
    /// Print the first N primes at or above a starting value
    First {
        /// How many primes to print
        #[arg(long)]
        n: usize,
        /// Smallest value to consider
        #[arg(long, default_value_t = 2)]
        start: u64,
        /// Print a single JSON array instead
        #[arg(long)]
        json: bool,
    },
    /// Print a JSON summary (count, first, last, build time) of [low, high)
    Summary {
        /// Inclusive lower bound
        #[arg(long, default_value_t = 0)]
        low: u64,
        /// Exclusive upper bound
        #[arg(long)]
        high: u64,
    },
}

fn main() -> Result<()> {
    let _ = dotenvy::dotenv();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_default();
    if log_format == "json" {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .init();
    }

    let cli = Cli::parse();
    cli::configure_rayon(cli.threads);
    let strategy = cli::strategy(cli.serial);

    match &cli.command {
        Commands::Count { low, high } => cli::run_count(*low, *high, strategy),
        Commands::List { low, high, json } => cli::run_list(*low, *high, *json, strategy),
        Commands::Check { values, high } => cli::run_check(values, *high, strategy),
        Commands::First { n, start, json } => cli::run_first(*n, *start, *json, strategy),
        Commands::Summary { low, high } => cli::run_summary(*low, *high, strategy),
    }
}

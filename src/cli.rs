//! # CLI — Subcommand Runners
//!
//! One `run_*` function per subcommand. Each builds a [`Sieve`] for the
//! requested range, queries it, and writes results to stdout. Diagnostics go
//! through `tracing` (stderr), so stdout stays machine-readable.

use anyhow::{Context, Result};
use primegen::{bound, Sieve, Strategy};
use serde::Serialize;
use std::io::{BufWriter, Write};
use std::time::Instant;
use tracing::{info, warn};

/// Configure the global rayon pool used by parallel sieve construction.
///
/// `None` or `Some(0)` keeps rayon's default of one thread per logical core.
pub fn configure_rayon(threads: Option<usize>) {
    let num_threads = threads.unwrap_or(0);
    if num_threads == 0 {
        return;
    }
    match rayon::ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .build_global()
    {
        Ok(()) => info!(threads = num_threads, "rayon thread pool configured"),
        Err(e) => warn!(error = %e, "Could not configure rayon thread pool"),
    }
}

pub fn strategy(serial: bool) -> Strategy {
    if serial {
        Strategy::Serial
    } else {
        Strategy::Auto
    }
}

fn build(low: u64, high: u64, strategy: Strategy) -> Result<Sieve> {
    Sieve::with_strategy(low, high, strategy)
        .with_context(|| format!("building prime table for [{}, {})", low, high))
}

pub fn run_count(low: u64, high: u64, strategy: Strategy) -> Result<()> {
    let sieve = build(low, high, strategy)?;
    println!("{}", sieve.count_primes());
    Ok(())
}

pub fn run_list(low: u64, high: u64, json: bool, strategy: Strategy) -> Result<()> {
    let sieve = build(low, high, strategy)?;
    let stdout = std::io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    if json {
        let primes: Vec<u64> = sieve.iter().collect();
        serde_json::to_writer(&mut out, &primes)?;
        writeln!(out)?;
    } else {
        for p in &sieve {
            writeln!(out, "{}", p)?;
        }
    }
    out.flush()?;
    Ok(())
}

pub fn run_check(values: &[u64], high: Option<u64>, strategy: Strategy) -> Result<()> {
    let max = values.iter().copied().max().unwrap_or(0);
    let high = high.unwrap_or(max.saturating_add(1)).max(1);
    let sieve = build(0, high, strategy)?;
    for &n in values {
        let verdict = if sieve.is_prime(n)? { "prime" } else { "not prime" };
        println!("{}: {}", n, verdict);
    }
    Ok(())
}

pub fn run_first(n: usize, start: u64, json: bool, strategy: Strategy) -> Result<()> {
    let primes = bound::first_primes_with(start, n, strategy)
        .with_context(|| format!("finding the first {} primes from {}", n, start))?;
    if json {
        println!("{}", serde_json::to_string(&primes)?);
    } else {
        let stdout = std::io::stdout();
        let mut out = BufWriter::new(stdout.lock());
        for p in primes {
            writeln!(out, "{}", p)?;
        }
        out.flush()?;
    }
    Ok(())
}

/// JSON report printed by the `summary` subcommand.
#[derive(Debug, Serialize)]
pub struct Summary {
    pub low: u64,
    pub high: u64,
    pub count: usize,
    pub first: Option<u64>,
    pub last: Option<u64>,
    pub elapsed_ms: u64,
}

pub fn run_summary(low: u64, high: u64, strategy: Strategy) -> Result<()> {
    let started = Instant::now();
    let sieve = build(low, high, strategy)?;
    let elapsed_ms = started.elapsed().as_millis() as u64;
    let summary = Summary {
        low,
        high,
        count: sieve.count_primes(),
        first: sieve.iter().next(),
        last: sieve.iter().next_back(),
        elapsed_ms,
    };
    info!(count = summary.count, elapsed_ms, "prime table summarized");
    println!("{}", serde_json::to_string(&summary)?);
    Ok(())
}

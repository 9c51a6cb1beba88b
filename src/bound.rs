//! # Bound — Choosing Sieve Bounds for "First N Primes" Queries
//!
//! A [`Sieve`] is built for a fixed range and never grows. Callers that need
//! a given number of primes rather than a given range pick an over-estimate
//! of where the n-th prime lies, sieve up to it, and retry with a wider range
//! if the estimate fell short. This module packages that policy.

use crate::sieve::{Sieve, SieveError, Strategy};
use tracing::debug;

/// Smallest bound handed out, so tiny requests still get a useful table.
const MIN_BOUND: u64 = 100;

/// Over-estimate of the n-th prime (1-based: the 1st prime is 2).
///
/// Rosser's theorem gives `p_n < n (ln n + ln ln n)` for `n >= 6`; below
/// that, and for tiny results, [`MIN_BOUND`] covers everything. The result
/// is an exclusive bound: `p_n` is strictly below it.
pub fn nth_prime_upper_bound(n: u64) -> u64 {
    if n < 6 {
        return MIN_BOUND;
    }
    let nf = n as f64;
    let estimate = nf * (nf.ln() + nf.ln().ln());
    (estimate.ceil() as u64).saturating_add(1).max(MIN_BOUND)
}

/// The first `n` primes `>= start`, ascending.
///
/// The initial width comes from [`nth_prime_upper_bound`], which counts
/// primes from 0, and every [`Sieve`] holds a table over `[0, high]`. Memory
/// therefore scales with `start + width`, not with `width`: a large `start`
/// costs a table of `start / 8` bytes even when `n` is 1.
pub fn first_primes(start: u64, n: usize) -> Result<Vec<u64>, SieveError> {
    first_primes_with(start, n, Strategy::Auto)
}

/// Like [`first_primes`], marking each sieve with the given strategy.
pub fn first_primes_with(
    start: u64,
    n: usize,
    strategy: Strategy,
) -> Result<Vec<u64>, SieveError> {
    first_primes_within(start, n, nth_prime_upper_bound(n as u64), strategy)
}

/// Like [`first_primes_with`], starting from a sieve over
/// `[start, start + width)` and doubling `width` until `n` primes have been
/// found.
///
/// Fails with [`SieveError::TooLarge`] if the range outgrows
/// [`crate::sieve::MAX_HIGH`] first.
pub fn first_primes_within(
    start: u64,
    n: usize,
    width: u64,
    strategy: Strategy,
) -> Result<Vec<u64>, SieveError> {
    if n == 0 {
        return Ok(Vec::new());
    }
    let mut width = width.max(1);
    loop {
        let high = start.saturating_add(width);
        let sieve = Sieve::with_strategy(start, high, strategy)?;
        let mut primes = Vec::with_capacity(n);
        primes.extend(sieve.iter().take(n));
        if primes.len() == n {
            return Ok(primes);
        }
        debug!(
            start,
            high,
            found = primes.len(),
            wanted = n,
            "bound too small, doubling"
        );
        width = width.saturating_mul(2);
    }
}

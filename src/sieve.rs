//! # Sieve — Bit-Packed Sieve of Eratosthenes
//!
//! Builds a composite table over `[0, high]` once, then answers two kinds of
//! request against it:
//!
//! 1. **Membership**: [`Sieve::is_prime`] (bounds-checked) and
//!    [`Sieve::contains`] (fast path), both O(1).
//! 2. **Ordered iteration**: [`Sieve::iter`] yields the primes of the
//!    half-open range `[low, high)` lazily. `high` itself is never yielded;
//!    the cursor reaching `high` is the end-of-range sentinel and is never
//!    dereferenced. Iterators borrow the sieve and can be re-created freely.
//!
//! ## Algorithm
//!
//! 1. Allocate a clear table of `high + 1` bits; mark 0 and 1.
//! 2. `boundary = isqrt(high)`, computed exactly (see [`isqrt`]).
//! 3. Serial pass: sieve `[0, boundary]` with primes up to `isqrt(boundary)`
//!    to obtain the base primes.
//! 4. Marking pass: for each base prime `p`, strike `p², p² + p, ...` up to
//!    `high`. The table is cut into word-aligned chunks of [`CHUNK_WORDS`]
//!    words; each chunk is struck independently by every base prime whose
//!    square falls below the chunk's end.
//!
//! Chunks are disjoint slices of the table, so the marking pass runs either
//! on the calling thread ([`Strategy::Serial`]) or on the rayon pool
//! ([`Strategy::Parallel`]) with no locks or atomics. Both produce
//! bit-identical tables. Complexity: O(n log log n) time, O(n/64) words.

use crate::bits::{CompositeTable, WORD_BITS};
use rayon::prelude::*;
use std::iter::FusedIterator;
use std::time::Instant;
use tracing::debug;

/// Largest supported `high`. Keeps `high + 1` and every index computation
/// well inside `u64`/`usize` on 64-bit targets; a table this size is 32 TiB.
pub const MAX_HIGH: u64 = 1 << 48;

/// [`Strategy::Auto`] switches to parallel marking at this bound.
pub const PARALLEL_THRESHOLD: u64 = 1 << 22;

/// Words per marking chunk (32 KiB of table, about one L1 data cache).
pub const CHUNK_WORDS: usize = 4096;

/// Errors from sieve construction and checked queries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SieveError {
    /// `high <= low`: the requested range is empty or inverted.
    InvalidRange { low: u64, high: u64 },
    /// `high` exceeds [`MAX_HIGH`] or is not addressable on this target.
    TooLarge { high: u64 },
    /// Checked query for a value beyond the table.
    OutOfRange { n: u64, high: u64 },
}

impl std::fmt::Display for SieveError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SieveError::InvalidRange { low, high } => {
                write!(f, "invalid range: high ({}) must exceed low ({})", high, low)
            }
            SieveError::TooLarge { high } => {
                write!(f, "bound {} exceeds the supported maximum {}", high, MAX_HIGH)
            }
            SieveError::OutOfRange { n, high } => {
                write!(f, "{} is outside the sieved range [0, {}]", n, high)
            }
        }
    }
}

impl std::error::Error for SieveError {}

/// How the marking pass is scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Strategy {
    /// Parallel at or above [`PARALLEL_THRESHOLD`], serial below.
    #[default]
    Auto,
    /// All chunks on the calling thread.
    Serial,
    /// Chunks distributed over the current rayon pool.
    Parallel,
}

impl Strategy {
    fn resolve(self, high: u64) -> Strategy {
        match self {
            Strategy::Auto if high >= PARALLEL_THRESHOLD => Strategy::Parallel,
            Strategy::Auto => Strategy::Serial,
            other => other,
        }
    }
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Strategy::Auto => write!(f, "auto"),
            Strategy::Serial => write!(f, "serial"),
            Strategy::Parallel => write!(f, "parallel"),
        }
    }
}

/// Exact integer square root: the largest `r` with `r² <= n`.
///
/// Starts from the `f64` estimate, which can be off by one near perfect
/// squares once `n` exceeds 2^52, then corrects with checked arithmetic.
pub fn isqrt(n: u64) -> u64 {
    let mut r = (n as f64).sqrt() as u64;
    while r.checked_mul(r).is_none_or(|sq| sq > n) {
        r -= 1;
    }
    while (r + 1).checked_mul(r + 1).is_some_and(|sq| sq <= n) {
        r += 1;
    }
    r
}

/// Immutable prime table over `[0, high]` with iteration over `[low, high)`.
#[derive(Clone, PartialEq, Eq)]
pub struct Sieve {
    low: u64,
    high: u64,
    table: CompositeTable,
}

impl Sieve {
    /// Build a sieve for `[low, high)`, choosing the marking strategy by size.
    pub fn new(low: u64, high: u64) -> Result<Self, SieveError> {
        Self::with_strategy(low, high, Strategy::Auto)
    }

    /// Build a sieve with an explicit marking strategy.
    ///
    /// Validates the bounds before allocating: `high > low` and
    /// `high <= MAX_HIGH`. `low == 0` is allowed.
    pub fn with_strategy(low: u64, high: u64, strategy: Strategy) -> Result<Self, SieveError> {
        if high <= low {
            return Err(SieveError::InvalidRange { low, high });
        }
        if high > MAX_HIGH {
            return Err(SieveError::TooLarge { high });
        }
        let len = usize::try_from(high)
            .ok()
            .and_then(|h| h.checked_add(1))
            .ok_or(SieveError::TooLarge { high })?;

        let strategy = strategy.resolve(high);
        let started = Instant::now();
        debug!(low, high, strategy = %strategy, "building prime table");

        let mut table = CompositeTable::new(len);
        let primes = base_primes(isqrt(high) as usize);
        let chunk_bits = CHUNK_WORDS * WORD_BITS;
        match strategy {
            Strategy::Parallel => table
                .words_mut()
                .par_chunks_mut(CHUNK_WORDS)
                .enumerate()
                .for_each(|(ci, words)| strike_chunk(words, ci * chunk_bits, len, &primes)),
            _ => table
                .words_mut()
                .chunks_mut(CHUNK_WORDS)
                .enumerate()
                .for_each(|(ci, words)| strike_chunk(words, ci * chunk_bits, len, &primes)),
        }
        table.set(0);
        table.set(1);

        debug!(
            low,
            high,
            base_primes = primes.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "prime table ready"
        );
        Ok(Sieve { low, high, table })
    }

    /// Inclusive lower bound of iteration.
    #[inline]
    pub fn low(&self) -> u64 {
        self.low
    }

    /// Exclusive upper bound of iteration; the last value `is_prime` accepts.
    #[inline]
    pub fn high(&self) -> u64 {
        self.high
    }

    /// Checked primality query for any `n <= high`.
    pub fn is_prime(&self, n: u64) -> Result<bool, SieveError> {
        if n > self.high {
            return Err(SieveError::OutOfRange { n, high: self.high });
        }
        Ok(self.contains(n))
    }

    /// Unchecked primality query. The caller guarantees `n <= high`; debug
    /// builds assert it, release builds give an unspecified answer or panic
    /// on the slice index.
    #[inline]
    pub fn contains(&self, n: u64) -> bool {
        debug_assert!(n <= self.high, "{} is above the sieve bound {}", n, self.high);
        !self.table.test(n as usize)
    }

    /// Primes in `[low, high)`, ascending.
    pub fn iter(&self) -> Primes<'_> {
        Primes {
            sieve: self,
            front: self.low,
            back: self.high,
        }
    }

    /// Primes in `[from, to)` intersected with `[low, high)`.
    pub fn range(&self, from: u64, to: u64) -> Primes<'_> {
        let front = from.max(self.low);
        let back = to.min(self.high).max(front);
        Primes {
            sieve: self,
            front,
            back,
        }
    }

    /// Number of primes in `[low, high)`.
    pub fn count_primes(&self) -> usize {
        self.table.count_clear(self.low as usize, self.high as usize)
    }
}

impl std::fmt::Debug for Sieve {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sieve")
            .field("low", &self.low)
            .field("high", &self.high)
            .field("table", &self.table)
            .finish()
    }
}

impl<'a> IntoIterator for &'a Sieve {
    type Item = u64;
    type IntoIter = Primes<'a>;

    fn into_iter(self) -> Primes<'a> {
        self.iter()
    }
}

/// Lazy ascending iterator over the primes of a [`Sieve`].
///
/// Holds only two cursors and a shared reference; yields values in
/// `[front, back)` and never allocates.
#[derive(Debug, Clone)]
pub struct Primes<'a> {
    sieve: &'a Sieve,
    front: u64,
    back: u64,
}

impl Iterator for Primes<'_> {
    type Item = u64;

    #[inline]
    fn next(&mut self) -> Option<u64> {
        match self
            .sieve
            .table
            .next_clear(self.front as usize, self.back as usize)
        {
            Some(i) => {
                self.front = i as u64 + 1;
                Some(i as u64)
            }
            None => {
                self.front = self.back;
                None
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some((self.back - self.front) as usize))
    }

    fn count(self) -> usize {
        self.sieve
            .table
            .count_clear(self.front as usize, self.back as usize)
    }
}

impl DoubleEndedIterator for Primes<'_> {
    fn next_back(&mut self) -> Option<u64> {
        match self
            .sieve
            .table
            .prev_clear(self.front as usize, self.back as usize)
        {
            Some(i) => {
                self.back = i as u64;
                Some(i as u64)
            }
            None => {
                self.back = self.front;
                None
            }
        }
    }
}

impl FusedIterator for Primes<'_> {}

/// Primes in `[2, boundary]` from a plain serial sieve.
fn base_primes(boundary: usize) -> Vec<usize> {
    if boundary < 2 {
        return Vec::new();
    }
    let mut small = CompositeTable::new(boundary + 1);
    let root = isqrt(boundary as u64) as usize;
    for p in 2..=root {
        if small.test(p) {
            continue;
        }
        for m in (p * p..=boundary).step_by(p) {
            small.set(m);
        }
    }
    (2..=boundary).filter(|&n| !small.test(n)).collect()
}

/// Strike multiples of `primes` inside one chunk of the table.
///
/// `words` covers bit indices `[first, first + words.len() * 64)`, clipped
/// to the table length `len`. `primes` must be ascending.
fn strike_chunk(words: &mut [u64], first: usize, len: usize, primes: &[usize]) {
    let end = (first + words.len() * WORD_BITS).min(len);
    for &p in primes {
        let square = p * p;
        if square >= end {
            break;
        }
        // First multiple of p at or above max(p², first).
        let mut m = if square >= first {
            square
        } else {
            first.div_ceil(p) * p
        };
        while m < end {
            let offset = m - first;
            words[offset / WORD_BITS] |= 1u64 << (offset % WORD_BITS);
            m += p;
        }
    }
}

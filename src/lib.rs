//! # primegen — Prime Tables for Number Puzzles
//!
//! A bit-packed Sieve of Eratosthenes built once per range and queried many
//! times:
//!
//! - [`sieve`]: the [`Sieve`] itself: construction (serial or rayon-parallel
//!   marking), O(1) membership and lazy ascending iteration.
//! - [`bits`]: the word-packed composite table the sieve owns.
//! - [`bound`]: picking a sieve bound when the caller needs "the first N
//!   primes" instead of "the primes below H", with doubling on shortfall.
//!
//! ```
//! use primegen::Sieve;
//!
//! let sieve = Sieve::new(10, 30)?;
//! let primes: Vec<u64> = sieve.iter().collect();
//! assert_eq!(primes, [11, 13, 17, 19, 23, 29]);
//! assert_eq!(sieve.is_prime(29), Ok(true));
//! # Ok::<(), primegen::SieveError>(())
//! ```

pub mod bits;
pub mod bound;
pub mod sieve;

pub use sieve::{Primes, Sieve, SieveError, Strategy};

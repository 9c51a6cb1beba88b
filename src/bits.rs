//! # Bits — Word-Packed Composite Table
//!
//! Owned bit storage behind [`crate::sieve::Sieve`]. One bit per integer:
//! bit `i` lives in word `i / 64` at position `i % 64`. A set bit (1) marks
//! `i` as composite (or excluded, like 0 and 1); a clear bit (0) means `i` is
//! prime.
//!
//! 8× memory reduction over `Vec<bool>`: a table up to 10^9 takes ~119 MiB
//! instead of ~954 MiB, which matters because sieving large bounds is bound by
//! memory traffic rather than arithmetic.
//!
//! Scans (`next_clear`, `prev_clear`, `count_clear`) work a word at a time:
//! the word is inverted so that primes become ones, masked to the requested
//! window, and resolved with `trailing_zeros` / `leading_zeros` / `count_ones`.

/// Bits per storage word.
pub const WORD_BITS: usize = 64;

/// Packed bit table where a set bit marks a composite.
#[derive(Clone, PartialEq, Eq)]
pub struct CompositeTable {
    words: Vec<u64>,
    len: usize,
}

impl CompositeTable {
    /// Create a table of `len` bits, all clear (every index assumed prime).
    pub fn new(len: usize) -> Self {
        CompositeTable {
            words: vec![0u64; len.div_ceil(WORD_BITS)],
            len,
        }
    }

    /// Number of addressable bits.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns `true` if bit `index` is set (`index` is composite).
    ///
    /// # Panics
    /// Debug builds panic if `index >= len`.
    #[inline]
    pub fn test(&self, index: usize) -> bool {
        debug_assert!(
            index < self.len,
            "CompositeTable index out of bounds: {} >= {}",
            index,
            self.len
        );
        self.words[index / WORD_BITS] & (1u64 << (index % WORD_BITS)) != 0
    }

    /// Mark `index` as composite.
    #[inline]
    pub fn set(&mut self, index: usize) {
        debug_assert!(index < self.len);
        self.words[index / WORD_BITS] |= 1u64 << (index % WORD_BITS);
    }

    /// Backing words, for segment-wise marking. Bits past `len` in the last
    /// word carry no meaning and are never read by the scans below.
    #[inline]
    pub(crate) fn words_mut(&mut self) -> &mut [u64] {
        &mut self.words
    }

    /// Smallest clear index in `[from, end)`, if any. Requires `end <= len`.
    pub fn next_clear(&self, from: usize, end: usize) -> Option<usize> {
        if from >= end {
            return None;
        }
        debug_assert!(end <= self.len);
        let mut wi = from / WORD_BITS;
        let mut word = !self.words[wi] & (u64::MAX << (from % WORD_BITS));
        loop {
            if word != 0 {
                let index = wi * WORD_BITS + word.trailing_zeros() as usize;
                return (index < end).then_some(index);
            }
            wi += 1;
            if wi * WORD_BITS >= end {
                return None;
            }
            word = !self.words[wi];
        }
    }

    /// Largest clear index in `[start, end)`, if any. Requires `end <= len`.
    pub fn prev_clear(&self, start: usize, end: usize) -> Option<usize> {
        if start >= end {
            return None;
        }
        debug_assert!(end <= self.len);
        let last = end - 1;
        let mut wi = last / WORD_BITS;
        let mut word = !self.words[wi] & (u64::MAX >> (WORD_BITS - 1 - last % WORD_BITS));
        loop {
            if word != 0 {
                let index = wi * WORD_BITS + (WORD_BITS - 1) - word.leading_zeros() as usize;
                return (index >= start).then_some(index);
            }
            if wi * WORD_BITS <= start {
                return None;
            }
            wi -= 1;
            word = !self.words[wi];
        }
    }

    /// Number of clear bits in `[start, end)` using hardware POPCNT.
    pub fn count_clear(&self, start: usize, end: usize) -> usize {
        if start >= end {
            return 0;
        }
        debug_assert!(end <= self.len);
        let first = start / WORD_BITS;
        let last = (end - 1) / WORD_BITS;
        let mut total = 0usize;
        for wi in first..=last {
            let mut word = !self.words[wi];
            if wi == first {
                word &= u64::MAX << (start % WORD_BITS);
            }
            if wi == last {
                word &= u64::MAX >> (WORD_BITS - 1 - (end - 1) % WORD_BITS);
            }
            total += word.count_ones() as usize;
        }
        total
    }
}

impl std::fmt::Debug for CompositeTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompositeTable")
            .field("len", &self.len)
            .field("words", &self.words.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    //! Tests for the packed composite table: word-boundary addressing,
    //! forward/backward scans across empty words, and popcount windows.

    use super::*;

    /// A table with every bit set except the given indices.
    fn only_clear(len: usize, clear: &[usize]) -> CompositeTable {
        let mut t = CompositeTable::new(len);
        for i in 0..len {
            if !clear.contains(&i) {
                t.set(i);
            }
        }
        t
    }

    #[test]
    fn new_table_is_all_clear() {
        let t = CompositeTable::new(130);
        assert_eq!(t.len(), 130);
        assert!(!t.is_empty());
        assert!((0..130).all(|i| !t.test(i)));
        assert_eq!(t.count_clear(0, 130), 130);
    }

    #[test]
    fn empty_table() {
        let t = CompositeTable::new(0);
        assert!(t.is_empty());
        assert_eq!(t.next_clear(0, 0), None);
        assert_eq!(t.prev_clear(0, 0), None);
        assert_eq!(t.count_clear(0, 0), 0);
    }

    /// Bits 63, 64 and 127 straddle the first two word boundaries.
    #[test]
    fn set_across_word_boundary() {
        let mut t = CompositeTable::new(200);
        for i in [0, 63, 64, 127, 128, 199] {
            t.set(i);
        }
        for i in 0..200 {
            let expected = matches!(i, 0 | 63 | 64 | 127 | 128 | 199);
            assert_eq!(t.test(i), expected, "bit {}", i);
        }
    }

    #[test]
    fn set_is_idempotent() {
        let mut a = CompositeTable::new(100);
        let mut b = CompositeTable::new(100);
        a.set(42);
        b.set(42);
        b.set(42);
        assert_eq!(a, b);
    }

    /// The only clear bits are far apart, so the forward scan has to skip
    /// several all-ones words.
    #[test]
    fn next_clear_skips_full_words() {
        let t = only_clear(1000, &[5, 300, 999]);
        assert_eq!(t.next_clear(0, 1000), Some(5));
        assert_eq!(t.next_clear(5, 1000), Some(5));
        assert_eq!(t.next_clear(6, 1000), Some(300));
        assert_eq!(t.next_clear(301, 1000), Some(999));
        assert_eq!(t.next_clear(301, 999), None);
        assert_eq!(t.next_clear(6, 300), None);
    }

    #[test]
    fn prev_clear_skips_full_words() {
        let t = only_clear(1000, &[0, 64, 700]);
        assert_eq!(t.prev_clear(0, 1000), Some(700));
        assert_eq!(t.prev_clear(0, 700), Some(64));
        assert_eq!(t.prev_clear(65, 700), None);
        assert_eq!(t.prev_clear(0, 64), Some(0));
        assert_eq!(t.prev_clear(1, 64), None);
    }

    /// Padding bits past `len` in the last word are clear but must never be
    /// reported.
    #[test]
    fn scans_ignore_padding_bits() {
        let t = only_clear(70, &[]);
        assert_eq!(t.next_clear(0, 70), None);
        assert_eq!(t.count_clear(0, 70), 0);
    }

    #[test]
    fn count_clear_matches_scan() {
        let t = only_clear(500, &[1, 2, 63, 64, 65, 128, 250, 499]);
        for (start, end) in [(0, 500), (2, 64), (63, 66), (64, 65), (129, 499), (0, 1)] {
            let expected = (start..end).filter(|&i| !t.test(i)).count();
            assert_eq!(t.count_clear(start, end), expected, "[{}, {})", start, end);
        }
    }
}

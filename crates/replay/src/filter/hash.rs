//! Hash function and k-wise hasher policies for the Bloom filters.
//!
//! A [`DefaultHashFunction`] wraps one [`H3`] family member behind an
//! input-length check. A [`Hasher`] turns a single key into the `k` digests a
//! filter needs; two policies are provided:
//! 1. **Independent:** `k` hash functions with distinct seeds.
//! 2. **Double hashing:** two hash functions combined linearly, cheaper to
//!    construct when `k` is large.
//!
//! [`make_hasher`] picks the policy and derives all seeds from one PRNG, so a
//! `(k, seed, double_hashing)` triple always reproduces the same hasher.

use super::h3::{H3, MinStdRand};
use super::FilterError;

/// A single bounded-length hash function over byte slices.
pub struct DefaultHashFunction {
    h3: H3,
}

impl DefaultHashFunction {
    /// Longest input `hash_bytes` accepts.
    pub const MAX_INPUT_BYTES: usize = super::h3::BYTE_SPAN;

    /// Creates a hash function seeded with `seed`.
    pub fn new(seed: u64) -> Self {
        Self { h3: H3::new(seed) }
    }

    /// Hashes an arbitrary byte slice.
    ///
    /// Inputs longer than [`Self::MAX_INPUT_BYTES`] fail with
    /// [`FilterError::InputTooLong`]; the empty input hashes to zero.
    pub fn hash_bytes(&self, data: &[u8]) -> Result<u64, FilterError> {
        if data.len() > Self::MAX_INPUT_BYTES {
            return Err(FilterError::InputTooLong {
                len: data.len(),
                max: Self::MAX_INPUT_BYTES,
            });
        }
        if data.is_empty() {
            return Ok(0);
        }
        Ok(self.h3.hash(data, 0))
    }

    /// Hashes a 64-bit key (little-endian bytes). Infallible: eight bytes
    /// always fit the table window.
    pub fn hash_u64(&self, key: u64) -> u64 {
        self.h3.hash(&key.to_le_bytes(), 0)
    }
}

/// Produces `k` digests for a key.
pub trait Hasher {
    /// Hashes `key` once per hash position.
    fn digests(&self, key: u64) -> Vec<u64>;

    /// Number of digests produced per key.
    fn k(&self) -> usize;
}

/// `k` independently seeded hash functions.
pub struct IndependentHasher {
    functions: Vec<DefaultHashFunction>,
}

impl IndependentHasher {
    /// Creates an independent hasher from pre-seeded functions.
    pub fn new(functions: Vec<DefaultHashFunction>) -> Self {
        assert!(!functions.is_empty(), "hasher requires at least one function");
        Self { functions }
    }
}

impl Hasher for IndependentHasher {
    fn digests(&self, key: u64) -> Vec<u64> {
        self.functions.iter().map(|f| f.hash_u64(key)).collect()
    }

    fn k(&self) -> usize {
        self.functions.len()
    }
}

/// Two hash functions expanded to `k` digests by linear combination:
/// digest `i` is `h1 + i * h2` in wrapping 64-bit arithmetic.
pub struct DoubleHasher {
    k: usize,
    h1: DefaultHashFunction,
    h2: DefaultHashFunction,
}

impl DoubleHasher {
    /// Creates a double hasher producing `k` digests.
    pub fn new(k: usize, h1: DefaultHashFunction, h2: DefaultHashFunction) -> Self {
        assert!(k > 0, "hasher requires at least one digest");
        Self { k, h1, h2 }
    }
}

impl Hasher for DoubleHasher {
    fn digests(&self, key: u64) -> Vec<u64> {
        let d1 = self.h1.hash_u64(key);
        let d2 = self.h2.hash_u64(key);
        (0..self.k as u64)
            .map(|i| d1.wrapping_add(i.wrapping_mul(d2)))
            .collect()
    }

    fn k(&self) -> usize {
        self.k
    }
}

/// Builds a hasher with `k` hash positions.
///
/// Seeds for the underlying hash functions are drawn from a single
/// minstd PRNG seeded with `seed`, so the configuration is reproducible from
/// the argument triple alone.
///
/// # Panics
///
/// Panics if `k == 0`.
pub fn make_hasher(k: usize, seed: u64, double_hashing: bool) -> Box<dyn Hasher> {
    assert!(k > 0, "hasher requires at least one hash function");
    let mut prng = MinStdRand::new(seed);
    if double_hashing {
        let h1 = DefaultHashFunction::new(prng.next());
        let h2 = DefaultHashFunction::new(prng.next());
        Box::new(DoubleHasher::new(k, h1, h2))
    } else {
        let functions = (0..k)
            .map(|_| DefaultHashFunction::new(prng.next()))
            .collect();
        Box::new(IndependentHasher::new(functions))
    }
}

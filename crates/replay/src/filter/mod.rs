//! Probabilistic filters backing the squash buffers.
//!
//! This module provides the filter stack, leaves first:
//! 1. **Counter vector:** packed fixed-width counters with saturating adds.
//! 2. **H3 / hashers:** table-driven universal hashing, independent or
//!    double-hashing k-wise policies.
//! 3. **Bloom filters:** standard (bit-per-cell) and counting variants with
//!    derived `(m, k)` sizing and optional partitioned placement.

use std::fmt;

/// Packed fixed-width counters.
pub mod counter_vector;
/// H3 hash function family.
pub mod h3;
/// Hash function wrapper and k-wise hasher policies.
pub mod hash;

/// Standard Bloom filter and parameter derivation.
pub mod bloom;
/// Counting Bloom filter.
pub mod counting;

pub use bloom::{BloomFilter, BloomParameters, OptimalParameters};
pub use counter_vector::CounterVector;
pub use counting::CountingBloomFilter;
pub use hash::{make_hasher, DefaultHashFunction, Hasher};

/// Errors reported by filter construction and hashing.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterError {
    /// Hash input longer than the precomputed H3 table window.
    InputTooLong {
        /// Rejected input length in bytes.
        len: usize,
        /// Longest accepted input length in bytes.
        max: usize,
    },
    /// Bloom parameters with a zero projected element count.
    InvalidElementCount,
    /// Bloom parameters with a false-positive probability outside (0, 1).
    InvalidFalsePositiveProbability(f64),
}

impl fmt::Display for FilterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterError::InputTooLong { len, max } => {
                write!(f, "hash input of {} bytes exceeds maximum of {}", len, max)
            }
            FilterError::InvalidElementCount => {
                write!(f, "projected element count must be non-zero")
            }
            FilterError::InvalidFalsePositiveProbability(p) => {
                write!(f, "false positive probability {} outside (0, 1)", p)
            }
        }
    }
}

impl std::error::Error for FilterError {}

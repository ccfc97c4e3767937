//! Standard Bloom filter with derived sizing.
//!
//! Sizing follows the textbook formulas: for `n` projected elements and
//! target false-positive probability `p`, the optimal bit count is
//! `m = -n ln p / (ln 2)^2` and the optimal hash count `k = (m/n) ln 2`.
//! Parameter validation happens before any allocation.

use bitvec::prelude::*;

use super::hash::Hasher;
use super::FilterError;

/// User-supplied Bloom filter parameters.
#[derive(Debug, Clone, Copy)]
pub struct BloomParameters {
    /// Expected number of distinct keys the filter will hold.
    pub projected_element_count: u64,
    /// Target false-positive probability, exclusive (0, 1).
    pub false_positive_probability: f64,
    /// Seed for the hash-function PRNG; fixed seeds give repeatable runs.
    pub random_seed: u64,
}

/// Derived filter geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OptimalParameters {
    /// Number of hash positions per key.
    pub number_of_hashes: usize,
    /// Number of cells in the filter table.
    pub table_size: usize,
}

impl BloomParameters {
    /// Creates a parameter set.
    pub fn new(projected_element_count: u64, false_positive_probability: f64, random_seed: u64) -> Self {
        Self {
            projected_element_count,
            false_positive_probability,
            random_seed,
        }
    }

    /// Derives the optimal `(m, k)` geometry.
    ///
    /// Fails before any allocation when `projected_element_count == 0` or the
    /// probability is outside the open unit interval.
    pub fn compute_optimal(&self) -> Result<OptimalParameters, FilterError> {
        if self.projected_element_count == 0 {
            return Err(FilterError::InvalidElementCount);
        }
        let p = self.false_positive_probability;
        if !(p > 0.0 && p < 1.0) {
            return Err(FilterError::InvalidFalsePositiveProbability(p));
        }

        let n = self.projected_element_count as f64;
        let ln2 = std::f64::consts::LN_2;
        let m = (-n * p.ln() / (ln2 * ln2)).ceil();
        let k = (m / n * ln2).round();

        Ok(OptimalParameters {
            number_of_hashes: (k as usize).max(1),
            table_size: (m as usize).max(1),
        })
    }
}

/// Bit-per-cell membership filter.
///
/// Placement is either a single shared array (each digest taken modulo `m`)
/// or partitioned: `k` disjoint slices of `m / k` bits with digest `i`
/// confined to slice `i`. The flag is fixed at construction and does not
/// change the external contract.
pub struct BloomFilter {
    bits: BitVec<usize, Lsb0>,
    hasher: Box<dyn Hasher>,
    partitioned: bool,
}

impl BloomFilter {
    /// Creates a filter of `table_size` bits using `hasher`.
    ///
    /// # Panics
    ///
    /// Panics if `table_size == 0`, or in partitioned mode if the table is
    /// smaller than the hash count.
    pub fn new(table_size: usize, hasher: Box<dyn Hasher>, partitioned: bool) -> Self {
        assert!(table_size > 0, "bloom filter requires a non-empty table");
        if partitioned {
            assert!(
                table_size / hasher.k() > 0,
                "partitioned table of {} bits cannot host {} slices",
                table_size,
                hasher.k()
            );
        }
        Self {
            bits: bitvec![usize, Lsb0; 0; table_size],
            hasher,
            partitioned,
        }
    }

    /// Creates a filter sized from `parameters`, with its own independent
    /// hasher seeded from `parameters.random_seed`.
    pub fn from_parameters(parameters: &BloomParameters) -> Result<Self, FilterError> {
        let optimal = parameters.compute_optimal()?;
        let hasher = super::hash::make_hasher(optimal.number_of_hashes, parameters.random_seed, false);
        Ok(Self::new(optimal.table_size, hasher, false))
    }

    fn cells(&self, key: u64) -> Vec<usize> {
        let digests = self.hasher.digests(key);
        if self.partitioned {
            let slice = self.bits.len() / digests.len();
            digests
                .iter()
                .enumerate()
                .map(|(i, d)| i * slice + (*d as usize) % slice)
                .collect()
        } else {
            let m = self.bits.len();
            digests.iter().map(|d| (*d as usize) % m).collect()
        }
    }

    /// Marks `key` present.
    pub fn add(&mut self, key: u64) {
        for cell in self.cells(key) {
            self.bits.set(cell, true);
        }
    }

    /// Membership test; false positives possible, false negatives not.
    pub fn contains(&self, key: u64) -> bool {
        self.cells(key).into_iter().all(|cell| self.bits[cell])
    }

    /// Minimum cell value over the key's positions (0 or 1).
    pub fn lookup(&self, key: u64) -> usize {
        usize::from(self.contains(key))
    }

    /// Removes every key.
    pub fn clear(&mut self) {
        self.bits.fill(false);
    }

    /// Table size in bits.
    pub fn table_size(&self) -> usize {
        self.bits.len()
    }
}

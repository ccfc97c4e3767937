//! Counting Bloom filter over fixed-width saturating counters.

use super::counter_vector::CounterVector;
use super::hash::Hasher;

/// Membership filter whose cells are counters, supporting removal.
pub struct CountingBloomFilter {
    cells: CounterVector,
    hasher: Box<dyn Hasher>,
    partitioned: bool,
}

impl CountingBloomFilter {
    /// Creates a filter of `cells` counters, `width` bits each.
    ///
    /// # Panics
    ///
    /// Panics on zero `cells` or `width`, or in partitioned mode if the table
    /// is smaller than the hash count.
    pub fn new(cells: usize, width: usize, hasher: Box<dyn Hasher>, partitioned: bool) -> Self {
        if partitioned {
            assert!(
                cells / hasher.k() > 0,
                "partitioned table of {} cells cannot host {} slices",
                cells,
                hasher.k()
            );
        }
        Self {
            cells: CounterVector::new(cells, width),
            hasher,
            partitioned,
        }
    }

    fn indices(&self, key: u64) -> Vec<usize> {
        let digests = self.hasher.digests(key);
        if self.partitioned {
            let slice = self.cells.size() / digests.len();
            digests
                .iter()
                .enumerate()
                .map(|(i, d)| i * slice + (*d as usize) % slice)
                .collect()
        } else {
            let m = self.cells.size();
            digests.iter().map(|d| (*d as usize) % m).collect()
        }
    }

    /// Increments every cell the key maps to.
    ///
    /// Returns `false` when at least one of those cells overflowed and
    /// saturated; the cell stays at all-ones and the lost increment cannot be
    /// recovered by `remove`.
    pub fn add(&mut self, key: u64) -> bool {
        let mut ok = true;
        for cell in self.indices(key) {
            if !self.cells.increment(cell, 1) {
                ok = false;
            }
        }
        ok
    }

    /// Frequency estimate for `key`: the minimum counter over its cells.
    pub fn lookup(&self, key: u64) -> usize {
        self.indices(key)
            .into_iter()
            .map(|cell| self.cells.count(cell))
            .min()
            .unwrap_or(0)
    }

    /// Decrements every cell the key maps to, clamped at zero.
    ///
    /// Removing a key that was never added is a no-op at already-zero cells
    /// but may depress other keys' counts; callers must match removes with
    /// prior adds. Saturated cells are decremented like any other: counts
    /// lost to saturation make later matched removes under-count, so a cell
    /// can reach zero while insertions are still logically outstanding.
    pub fn remove(&mut self, key: u64) {
        for cell in self.indices(key) {
            if self.cells.count(cell) > 0 {
                self.cells.decrement(cell, 1);
            }
        }
    }

    /// Zeroes every counter.
    pub fn clear(&mut self) {
        self.cells.clear();
    }

    /// Number of counter cells.
    pub fn table_size(&self) -> usize {
        self.cells.size()
    }

    /// Largest representable counter value.
    pub fn max_count(&self) -> usize {
        self.cells.max()
    }
}

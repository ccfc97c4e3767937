//! Single-generation squash buffer.
//!
//! Keeps one flat set of squashed addresses, valid for the lifetime of the
//! oldest outstanding squash source. When that source clears (or turns out to
//! have been squashed itself), the whole generation flushes at once.

use std::collections::HashSet;

use log::{debug, trace};

use crate::config::{SbStructure, SimConfig, TraceConfig};
use crate::filter::{BloomFilter, BloomParameters};
use crate::inst::InstDescriptor;
use crate::stats::SbStats;

use super::SquashBuffer;

/// One-generation store keyed by the oldest outstanding squash source.
///
/// The address set is always maintained as ground truth; when the Bloom
/// backing is enabled the filter answers queries and every disagreement with
/// the set is tallied as filter inaccuracy.
pub struct SimpleSquashBuffer {
    shadow: HashSet<u64>,
    oldest_sq_src: u64,
    filter: Option<BloomFilter>,
    max_size: usize,
    trace: TraceConfig,
    stats: SbStats,
}

impl SimpleSquashBuffer {
    /// Builds the buffer from the subsystem configuration.
    ///
    /// # Panics
    ///
    /// Panics when Bloom mode is selected with invalid filter parameters
    /// (zero projected elements or probability outside (0, 1)); a bad
    /// configuration is a bug in the caller, not a runtime condition.
    pub fn new(config: &SimConfig) -> Self {
        let sb = &config.squash_buffer;
        let filter = if sb.structure == SbStructure::Bloom {
            let parameters = BloomParameters::new(
                sb.projected_elem_cnt,
                sb.false_positive_probability,
                sb.random_seed,
            );
            let optimal = match parameters.compute_optimal() {
                Ok(optimal) => optimal,
                Err(e) => panic!("invalid Bloom filter parameters: {}", e),
            };
            debug!(
                "squash buffer Bloom filter: n={} p={} k={} m={}",
                sb.projected_elem_cnt,
                sb.false_positive_probability,
                optimal.number_of_hashes,
                optimal.table_size
            );
            match BloomFilter::from_parameters(&parameters) {
                Ok(filter) => Some(filter),
                Err(e) => panic!("invalid Bloom filter parameters: {}", e),
            }
        } else {
            None
        };

        Self {
            shadow: HashSet::new(),
            oldest_sq_src: u64::MAX,
            filter,
            max_size: sb.max_size,
            trace: config.trace.clone(),
            stats: SbStats::new(sb.max_size, sb.max_size),
        }
    }

    fn flush(&mut self) {
        self.stats.max_entries.sample(self.shadow.len() as u64);
        self.oldest_sq_src = u64::MAX;
        if let Some(filter) = &mut self.filter {
            filter.clear();
        }
        self.shadow.clear();
        self.stats.clears += 1;
    }
}

impl SquashBuffer for SimpleSquashBuffer {
    fn check(&mut self, inst: &InstDescriptor) -> bool {
        self.stats.checks += 1;
        let found = if let Some(filter) = &self.filter {
            let in_filter = filter.contains(inst.addr);
            let in_shadow = self.shadow.contains(&inst.addr);
            if in_filter && !in_shadow {
                self.stats.filter_false_positives += 1;
            } else if !in_filter && in_shadow {
                self.stats.filter_false_negatives += 1;
            }
            in_filter
        } else {
            self.shadow.contains(&inst.addr)
        };
        if found {
            self.stats.hits += 1;
        } else {
            self.stats.misses += 1;
        }
        found
    }

    fn insert(&mut self, inst: &InstDescriptor) {
        if self.trace.in_window(inst.seq) {
            trace!("{}: [Insert2Buffer] remain: {}", inst, self.shadow.len());
        }
        if let Some(filter) = &mut self.filter {
            filter.add(inst.addr);
        }
        self.shadow.insert(inst.addr);
        self.stats.inserts += 1;
    }

    fn squash(&mut self, inst: &InstDescriptor) {
        if inst.seq < self.oldest_sq_src {
            self.oldest_sq_src = inst.seq;
        }
    }

    fn retire(&mut self, _inst: &InstDescriptor) {
        panic!("simple squash buffer does not support retire");
    }

    fn clear(&mut self, inst: &InstDescriptor) -> bool {
        if self.trace.in_window(inst.seq) {
            trace!("{}: [Try2Clear] oldest seq: {}", inst, self.oldest_sq_src);
        }
        if inst.seq == self.oldest_sq_src {
            self.flush();
            true
        } else if inst.seq > self.oldest_sq_src {
            // The oldest squash source was itself squashed and never cleared.
            self.flush();
            self.stats.seq_changes += 1;
            true
        } else {
            false
        }
    }

    fn full(&self) -> bool {
        // The filter is fixed-size; only the exact set can fill up.
        if self.filter.is_some() {
            false
        } else {
            self.shadow.len() >= self.max_size
        }
    }

    fn max_size(&self) -> usize {
        self.max_size
    }

    fn stats(&self) -> &SbStats {
        &self.stats
    }
}

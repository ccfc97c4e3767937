//! Generation-indexed squash buffer.
//!
//! State is keyed by epoch: each epoch owns an ideal shadow map (the ground
//! truth for accuracy accounting), an optional Bloom or counting-Bloom
//! backing filter, and (for saturating backings) a counter-overflow buffer
//! recording increments lost beyond saturation. At most `active_records`
//! epochs may hold live records; inserts beyond the budget are dropped from
//! the backing and answered conservatively until the overflowed epochs age
//! out.

use std::collections::{BTreeMap, HashMap};

use log::{debug, trace};

use crate::config::{SbStructure, SimConfig, TraceConfig};
use crate::filter::{make_hasher, BloomFilter, BloomParameters, CountingBloomFilter, OptimalParameters};
use crate::inst::InstDescriptor;
use crate::stats::SbStats;

use super::SquashBuffer;

/// Per-epoch address counts.
type RecordMap = HashMap<u64, u64>;

/// Generation-indexed store with active-record budgeting and overflow
/// fallback.
pub struct EpochSquashBuffer {
    structure: SbStructure,
    check_all_records: bool,
    delete_on_retire: bool,
    counter_size: usize,
    max_counter: u64,
    max_active: usize,
    max_size: usize,

    /// Derived filter geometry; present for the Bloom backings.
    optimal: Option<OptimalParameters>,
    filter_seed: u64,
    hasher_seed: u64,

    /// Ground-truth shadow: epoch -> addr -> outstanding count.
    ideal: BTreeMap<u64, RecordMap>,
    /// Increments lost to saturation: epoch -> addr -> delta.
    overflow: BTreeMap<u64, RecordMap>,
    bloom: BTreeMap<u64, BloomFilter>,
    counting: BTreeMap<u64, CountingBloomFilter>,

    ar_overflowed: bool,
    overflowed_epoch: u64,

    trace: TraceConfig,
    stats: SbStats,
}

impl EpochSquashBuffer {
    /// Builds the buffer from the subsystem configuration.
    ///
    /// # Panics
    ///
    /// Panics when a Bloom backing is selected with invalid filter
    /// parameters, or when `counter_size` does not fit a machine word.
    pub fn new(config: &SimConfig) -> Self {
        let sb = &config.squash_buffer;
        assert!(
            sb.counter_size > 0 && sb.counter_size <= usize::BITS as usize,
            "counter size {} does not fit a machine word",
            sb.counter_size
        );

        let optimal = match sb.structure {
            SbStructure::Bloom | SbStructure::CountingBloom => {
                let parameters = BloomParameters::new(
                    sb.projected_elem_cnt,
                    sb.false_positive_probability,
                    sb.random_seed,
                );
                let optimal = match parameters.compute_optimal() {
                    Ok(optimal) => optimal,
                    Err(e) => panic!("invalid Bloom filter parameters: {}", e),
                };
                let table_size = if sb.structure == SbStructure::CountingBloom && !sb.delete_on_retire {
                    optimal.table_size * sb.counter_size
                } else {
                    optimal.table_size
                };
                debug!(
                    "epoch squash buffer filter: n={} p={} k={} m={}",
                    sb.projected_elem_cnt,
                    sb.false_positive_probability,
                    optimal.number_of_hashes,
                    table_size
                );
                Some(optimal)
            }
            SbStructure::Ideal => None,
        };

        Self {
            structure: sb.structure,
            check_all_records: sb.check_all_records,
            delete_on_retire: sb.delete_on_retire,
            counter_size: sb.counter_size,
            max_counter: (u64::MAX >> (u64::BITS as usize - sb.counter_size)),
            max_active: sb.active_records,
            max_size: sb.max_size,
            optimal,
            filter_seed: sb.random_seed,
            hasher_seed: sb.hasher_seed(),
            ideal: BTreeMap::new(),
            overflow: BTreeMap::new(),
            bloom: BTreeMap::new(),
            counting: BTreeMap::new(),
            ar_overflowed: false,
            overflowed_epoch: 0,
            trace: config.trace.clone(),
            stats: SbStats::new(sb.max_size, sb.active_records),
        }
    }

    /// Number of epochs with a live record in the backing structure.
    fn tracked_records(&self) -> usize {
        match self.structure {
            SbStructure::Bloom => self.bloom.len(),
            SbStructure::CountingBloom => self.counting.len(),
            SbStructure::Ideal => self.ideal.len(),
        }
    }

    fn needs_new_entry(&self, epoch: u64) -> bool {
        match self.structure {
            SbStructure::Bloom => !self.bloom.contains_key(&epoch),
            SbStructure::CountingBloom => !self.counting.contains_key(&epoch),
            SbStructure::Ideal => !self.ideal.contains_key(&epoch),
        }
    }

    /// Shadow count for `(epoch, addr)` minus the known saturation delta:
    /// what a saturating physical structure would still observe as present.
    fn live_ideal_count(&self, epoch: u64, addr: u64) -> u64 {
        let count = self
            .ideal
            .get(&epoch)
            .and_then(|records| records.get(&addr))
            .copied()
            .unwrap_or(0);
        let delta = self
            .overflow
            .get(&epoch)
            .and_then(|deltas| deltas.get(&addr))
            .copied()
            .unwrap_or(0);
        count.saturating_sub(delta)
    }

    fn new_counting_filter(&self) -> CountingBloomFilter {
        let optimal = self
            .optimal
            .unwrap_or_else(|| panic!("counting filter requested without derived parameters"));
        let hasher = make_hasher(optimal.number_of_hashes, self.hasher_seed, false);
        if self.delete_on_retire {
            CountingBloomFilter::new(optimal.table_size, self.counter_size, hasher, false)
        } else {
            // Retirement-driven deletion disabled: spend the counter bits on
            // a wider plain-membership table instead.
            CountingBloomFilter::new(optimal.table_size * self.counter_size, 1, hasher, false)
        }
    }

    fn new_bloom_filter(&self) -> BloomFilter {
        let optimal = self
            .optimal
            .unwrap_or_else(|| panic!("bloom filter requested without derived parameters"));
        let hasher = make_hasher(optimal.number_of_hashes, self.filter_seed, false);
        BloomFilter::new(optimal.table_size, hasher, false)
    }

    /// Drops every epoch strictly below `bound` from `map`, returning the
    /// dropped entries.
    fn drop_below<V>(map: &mut BTreeMap<u64, V>, bound: u64) -> BTreeMap<u64, V> {
        let kept = map.split_off(&bound);
        std::mem::replace(map, kept)
    }
}

impl SquashBuffer for EpochSquashBuffer {
    fn check(&mut self, inst: &InstDescriptor) -> bool {
        self.stats.checks += 1;
        let addr = inst.addr;
        let epoch = inst.epoch;

        let found_set = if self.check_all_records {
            self.ideal
                .values()
                .any(|records| records.get(&addr).is_some_and(|&c| c > 0))
        } else {
            self.ideal
                .get(&epoch)
                .and_then(|records| records.get(&addr))
                .is_some_and(|&c| c > 0)
        };

        let (found, hit_filter) = match self.structure {
            SbStructure::Bloom => {
                self.stats.active_records.sample(self.bloom.len() as u64);
                let found = if self.check_all_records {
                    self.bloom.values().any(|filter| filter.contains(addr))
                } else {
                    self.bloom.get(&epoch).is_some_and(|filter| filter.contains(addr))
                };
                (found, self.bloom.contains_key(&epoch))
            }
            SbStructure::CountingBloom => {
                self.stats.active_records.sample(self.counting.len() as u64);
                let found = if self.check_all_records {
                    self.counting.values().any(|filter| filter.lookup(addr) > 0)
                } else {
                    self.counting
                        .get(&epoch)
                        .is_some_and(|filter| filter.lookup(addr) > 0)
                };
                (found, self.counting.contains_key(&epoch))
            }
            SbStructure::Ideal => {
                self.stats.active_records.sample(self.ideal.len() as u64);
                let found = if self.check_all_records {
                    self.ideal
                        .keys()
                        .any(|&e| self.live_ideal_count(e, addr) > 0)
                } else {
                    self.live_ideal_count(epoch, addr) > 0
                };
                (found, self.ideal.contains_key(&epoch))
            }
        };

        if found {
            self.stats.hits += 1;
        } else {
            self.stats.misses += 1;
        }
        if found && !found_set {
            self.stats.filter_false_positives += 1;
        } else if !found && found_set {
            self.stats.filter_false_negatives += 1;
        }

        if self.ar_overflowed && !hit_filter {
            // A record for this epoch may have been dropped on budget
            // exhaustion; fence anything at or below the overflowed epoch.
            epoch <= self.overflowed_epoch
        } else {
            found
        }
    }

    fn insert(&mut self, inst: &InstDescriptor) {
        if self.trace.in_window(inst.seq) {
            trace!("{}: [Insert2Buffer] records: {}", inst, self.ideal.len());
        }
        self.stats.inserts += 1;
        let addr = inst.addr;
        let epoch = inst.epoch;

        if self.full() && self.needs_new_entry(epoch) {
            self.stats.overflows += 1;
            self.ar_overflowed = true;
            self.overflowed_epoch = self.overflowed_epoch.max(epoch);
            return;
        }

        match self.structure {
            SbStructure::Bloom => {
                if !self.bloom.contains_key(&epoch) {
                    let filter = self.new_bloom_filter();
                    self.bloom.insert(epoch, filter);
                }
                if let Some(filter) = self.bloom.get_mut(&epoch) {
                    filter.add(addr);
                }
            }
            SbStructure::CountingBloom => {
                if let Some(filter) = self.counting.get_mut(&epoch) {
                    if filter.lookup(addr) as u64 >= self.max_counter {
                        self.stats.counter_overflows += 1;
                    }
                    filter.add(addr);
                } else {
                    let mut filter = self.new_counting_filter();
                    filter.add(addr);
                    self.counting.insert(epoch, filter);
                }
            }
            SbStructure::Ideal => {
                let current = self
                    .ideal
                    .get(&epoch)
                    .and_then(|records| records.get(&addr))
                    .copied()
                    .unwrap_or(0);
                if self.ideal.contains_key(&epoch) && current >= self.max_counter {
                    self.stats.counter_overflows += 1;
                    *self
                        .overflow
                        .entry(epoch)
                        .or_default()
                        .entry(addr)
                        .or_insert(0) += 1;
                }
            }
        }

        *self
            .ideal
            .entry(epoch)
            .or_default()
            .entry(addr)
            .or_insert(0) += 1;
    }

    fn squash(&mut self, _inst: &InstDescriptor) {
        // The epoch buffer ages by generation, not by a single oldest source.
    }

    fn retire(&mut self, inst: &InstDescriptor) {
        let addr = inst.addr;
        let epoch = inst.epoch;

        match self.structure {
            SbStructure::Bloom => return,
            SbStructure::CountingBloom => {
                if let Some(filter) = self.counting.get_mut(&epoch) {
                    if filter.lookup(addr) > 0 {
                        filter.remove(addr);
                        self.stats.retire_deletions += 1;
                    }
                }
            }
            SbStructure::Ideal => {
                let count = self
                    .ideal
                    .get(&epoch)
                    .and_then(|records| records.get(&addr))
                    .copied();
                if let (Some(count), Some(deltas)) = (count, self.overflow.get_mut(&epoch)) {
                    if let Some(delta) = deltas.get_mut(&addr) {
                        // Every remaining logical count was lost to
                        // saturation; consume a delta instead of the cell.
                        if count == *delta {
                            *delta -= 1;
                            if *delta == 0 {
                                deltas.remove(&addr);
                            }
                        }
                    }
                }
                self.stats.retire_deletions += 1;
            }
        }

        if let Some(records) = self.ideal.get_mut(&epoch) {
            if let Some(count) = records.get_mut(&addr) {
                *count -= 1;
                if *count == 0 {
                    records.remove(&addr);
                }
            }
        }
    }

    fn clear(&mut self, inst: &InstDescriptor) -> bool {
        if self.trace.in_window(inst.seq) {
            trace!("{}: [Try2Clear] clearing epochs below {}", inst, inst.epoch);
        }

        if inst.epoch > self.overflowed_epoch {
            self.overflowed_epoch = 0;
            self.ar_overflowed = false;
        }

        let bound = inst.epoch;
        match self.structure {
            SbStructure::Bloom => {
                let dropped = Self::drop_below(&mut self.bloom, bound);
                self.stats.clears += dropped.len() as u64;
            }
            SbStructure::CountingBloom => {
                Self::drop_below(&mut self.counting, bound);
            }
            SbStructure::Ideal => {
                Self::drop_below(&mut self.overflow, bound);
            }
        }

        let dropped = Self::drop_below(&mut self.ideal, bound);
        for records in dropped.values() {
            self.stats.max_entries.sample(records.len() as u64);
        }
        if self.structure == SbStructure::Ideal {
            self.stats.clears += dropped.len() as u64;
        }

        true
    }

    fn full(&self) -> bool {
        self.tracked_records() >= self.max_active
    }

    fn max_size(&self) -> usize {
        self.max_size
    }

    fn stats(&self) -> &SbStats {
        &self.stats
    }
}

//! Squash-buffer statistics collection and reporting.
//!
//! This module tracks the counters the replay-detection study reads out:
//! 1. **Traffic:** checks, inserts, clears, hits, misses.
//! 2. **Capacity events:** active-record overflows, counter saturations,
//!    sequence-number resets, retirement deletions.
//! 3. **Filter accuracy:** false positives/negatives against the ideal shadow.
//! 4. **Distributions:** buffer occupancy at flush and live active records.

/// Fixed-bucket histogram over a closed integer range.
///
/// Samples below the range clamp into the first bucket, samples above into
/// the last, so the bucket count chosen at construction never changes.
#[derive(Debug, Clone)]
pub struct Distribution {
    min: u64,
    bucket_size: u64,
    buckets: Vec<u64>,
    samples: u64,
    sum: u64,
}

impl Distribution {
    /// Creates a histogram over `[min, max]` with `buckets` buckets.
    ///
    /// # Panics
    ///
    /// Panics if `max < min` or `buckets == 0`.
    pub fn new(min: u64, max: u64, buckets: usize) -> Self {
        assert!(max >= min, "distribution range is empty");
        assert!(buckets > 0, "distribution requires at least one bucket");
        let span = max - min + 1;
        let bucket_size = span.div_ceil(buckets as u64).max(1);
        Self {
            min,
            bucket_size,
            buckets: vec![0; buckets],
            samples: 0,
            sum: 0,
        }
    }

    /// Records one sample.
    pub fn sample(&mut self, value: u64) {
        let index = (value.saturating_sub(self.min) / self.bucket_size) as usize;
        let index = index.min(self.buckets.len() - 1);
        self.buckets[index] += 1;
        self.samples += 1;
        self.sum += value;
    }

    /// Number of samples recorded.
    pub fn samples(&self) -> u64 {
        self.samples
    }

    /// Mean of all samples, or 0.0 when empty.
    pub fn mean(&self) -> f64 {
        if self.samples == 0 {
            0.0
        } else {
            self.sum as f64 / self.samples as f64
        }
    }

    /// Per-bucket sample counts.
    pub fn buckets(&self) -> &[u64] {
        &self.buckets
    }

    /// Width of each bucket in sample units.
    pub fn bucket_size(&self) -> u64 {
        self.bucket_size
    }
}

/// Counter bank exposed read-only by every squash-buffer variant.
#[derive(Debug, Clone)]
pub struct SbStats {
    /// Number of membership queries.
    pub checks: u64,
    /// Number of per-generation flushes (Simple) or epoch drops (Epoch).
    pub clears: u64,
    /// Number of inserted records.
    pub inserts: u64,
    /// Queries that reported a replay.
    pub hits: u64,
    /// Queries that reported no replay.
    pub misses: u64,
    /// Inserts dropped because the active-record budget was exhausted.
    pub overflows: u64,
    /// Clears that fired through the forward-jump rule.
    pub seq_changes: u64,
    /// Records deleted by retirement.
    pub retire_deletions: u64,
    /// Increments observed against an already-saturated counter.
    pub counter_overflows: u64,
    /// Filter said present, ideal shadow said absent.
    pub filter_false_positives: u64,
    /// Filter said absent, ideal shadow said present.
    pub filter_false_negatives: u64,

    /// Buffer occupancy sampled at each flush, over `[0, max_size]`.
    pub max_entries: Distribution,
    /// Live per-epoch records sampled at each check, over `[0, max_active]`.
    pub active_records: Distribution,
}

/// Bucket count for the occupancy distribution.
const MAX_ENTRIES_BUCKETS: usize = 20;

impl SbStats {
    /// Creates a zeroed counter bank sized to the buffer geometry.
    pub fn new(max_size: usize, max_active: usize) -> Self {
        let active_buckets = (max_active / 10).max(1);
        Self {
            checks: 0,
            clears: 0,
            inserts: 0,
            hits: 0,
            misses: 0,
            overflows: 0,
            seq_changes: 0,
            retire_deletions: 0,
            counter_overflows: 0,
            filter_false_positives: 0,
            filter_false_negatives: 0,
            max_entries: Distribution::new(0, max_size.max(1) as u64, MAX_ENTRIES_BUCKETS),
            active_records: Distribution::new(0, max_active.max(1) as u64, active_buckets),
        }
    }
}

/// Section names for selective stats output.
///
/// Valid identifiers: `"summary"`, `"filter"`, `"distributions"`. Pass an
/// empty slice to `print_sections` to print all sections.
pub const STATS_SECTIONS: &[&str] = &["summary", "filter", "distributions"];

impl SbStats {
    /// Prints only the requested statistics sections to stdout.
    ///
    /// Each element of `sections` should be one of the names in
    /// [`STATS_SECTIONS`]; an empty slice prints everything.
    pub fn print_sections(&self, sections: &[String]) {
        let want = |s: &str| sections.is_empty() || sections.iter().any(|x| x == s);

        if want("summary") {
            let queried = self.hits + self.misses;
            let hit_rate = if queried > 0 {
                100.0 * self.hits as f64 / queried as f64
            } else {
                0.0
            };
            println!("\n==========================================================");
            println!("SQUASH BUFFER STATISTICS");
            println!("==========================================================");
            println!("sb.checks                {}", self.checks);
            println!("sb.inserts               {}", self.inserts);
            println!("sb.clears                {}", self.clears);
            println!("sb.hits                  {}", self.hits);
            println!("sb.misses                {}", self.misses);
            println!("sb.hit_rate              {:.2}%", hit_rate);
            println!("sb.overflows             {}", self.overflows);
            println!("sb.seq_changes           {}", self.seq_changes);
            println!("sb.retire_deletions      {}", self.retire_deletions);
            println!("sb.counter_overflows     {}", self.counter_overflows);
            println!("----------------------------------------------------------");
        }
        if want("filter") {
            println!("FILTER ACCURACY");
            println!("  filter.false_positives {}", self.filter_false_positives);
            println!("  filter.false_negatives {}", self.filter_false_negatives);
            println!("----------------------------------------------------------");
        }
        if want("distributions") {
            let print_dist = |name: &str, dist: &Distribution| {
                println!(
                    "  {:<22} samples: {:<8} mean: {:.2}",
                    name,
                    dist.samples(),
                    dist.mean()
                );
                for (i, count) in dist.buckets().iter().enumerate() {
                    if *count > 0 {
                        let lo = i as u64 * dist.bucket_size();
                        let hi = lo + dist.bucket_size() - 1;
                        println!("    [{:>5}, {:>5}]       {}", lo, hi, count);
                    }
                }
            };
            println!("DISTRIBUTIONS");
            print_dist("max_entries", &self.max_entries);
            print_dist("active_records", &self.active_records);
        }
        println!("==========================================================");
    }

    /// Prints all statistics sections to stdout.
    pub fn print(&self) {
        self.print_sections(&[]);
    }
}

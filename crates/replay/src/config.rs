//! Configuration for the replay-detection subsystem.
//!
//! This module defines all configuration structures and enums used to
//! parameterize the squash buffer and counter cache. It provides:
//! 1. **Defaults:** baseline hardware constants (buffer sizes, filter sizing,
//!    cache geometry).
//! 2. **Structures:** hierarchical config for detection policy, squash
//!    buffer, counter cache, and debug tracing.
//! 3. **Enums:** hardware mode, detection scheme, threat point, buffer
//!    backing structure, and epoch granularity.
//!
//! Configuration is supplied as JSON (deserialized with `serde_json`) or via
//! `SimConfig::default()`; every field is set once before the subsystem is
//! constructed and treated as immutable thereafter.

use serde::Deserialize;

/// Default configuration constants for the subsystem.
///
/// These values define the baseline configuration when not explicitly
/// overridden in a JSON configuration file.
mod defaults {
    /// Maximum instruction count before the simulation stops (0 = unlimited).
    pub const MAX_INSTS: u64 = 0;

    /// Replay count at which an instruction is considered suspicious.
    pub const MAX_REPLAYS: u32 = 1;

    /// Capacity of the simple squash buffer's address set.
    pub const MAX_SB_SIZE: usize = 256;

    /// Projected element count used to size the Bloom filters.
    pub const PROJECTED_ELEM_CNT: u64 = 4096;

    /// Target Bloom false-positive probability (1 in 100).
    pub const FALSE_POSITIVE_PROBABILITY: f64 = 0.01;

    /// Filter PRNG seed; fixed for repeatable results.
    pub const RANDOM_SEED: u64 = 0xA5A5_A5A5;

    /// Seed for the counting-filter hasher PRNG.
    pub const HASHER_SEED: u64 = 0x5bd1_e995;

    /// Width in bits of the counting-filter / ideal saturating counters.
    pub const COUNTER_SIZE: usize = 2;

    /// Cap on simultaneously tracked epochs.
    pub const ACTIVE_RECORDS: usize = 16;

    /// Counter-cache associativity.
    pub const CC_ASSOC: usize = 4;

    /// Counter-cache set count.
    pub const CC_SETS: usize = 64;

    /// Counter-cache miss latency in cycles.
    pub const CC_MISS_LATENCY: u64 = 30;

    /// Number of hardware threads (one counter cache each).
    pub const THREADS: usize = 1;
}

/// Baseline hardware defense applied by the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum HardwareMode {
    /// No protection at all.
    #[default]
    Unsafe,
    /// Fence loads only.
    Fence,
    /// Fence every instruction.
    #[serde(alias = "FENCE_ALL")]
    FenceAll,
}

/// Replay-detection scheme driving the squash buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum ReplayDetection {
    /// No replay detection.
    #[default]
    #[serde(alias = "NO_DETECT")]
    NoDetect,
    /// Per-instruction replay counters only.
    Counter,
    /// Single-generation squash buffer.
    Buffer,
    /// Generation-indexed squash buffer.
    Epoch,
}

/// Pipeline stage at which a replayed instruction is considered a threat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum ThreatPoint {
    /// Threat is issue.
    #[default]
    Issue,
    /// Threat is execute.
    Exec,
}

/// Backing structure of the squash buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum SbStructure {
    /// Exact map; no hardware cost model.
    #[default]
    Ideal,
    /// Standard Bloom filter.
    Bloom,
    /// Counting Bloom filter.
    #[serde(alias = "COUNTING_BLOOM")]
    CountingBloom,
}

/// Granularity at which the front-end assigns epoch identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum EpochScale {
    /// Epoch information absent.
    Invalid,
    /// One epoch per loop iteration.
    #[default]
    Iteration,
    /// One epoch per loop.
    Loop,
    /// One epoch per routine.
    Routine,
}

/// Detection policy applied by the surrounding pipeline.
#[derive(Debug, Clone, Deserialize)]
pub struct DetectionConfig {
    /// Baseline hardware defense.
    #[serde(default)]
    pub hardware: HardwareMode,

    /// Replay-detection scheme.
    #[serde(default)]
    pub replay: ReplayDetection,

    /// Threat point for fencing decisions.
    #[serde(default)]
    pub threat: ThreatPoint,

    /// Instruction budget for the run (0 = unlimited).
    #[serde(default = "DetectionConfig::default_max_insts")]
    pub max_insts: u64,

    /// Replay count threshold before fencing.
    #[serde(default = "DetectionConfig::default_max_replays")]
    pub max_replays: u32,
}

impl DetectionConfig {
    fn default_max_insts() -> u64 {
        defaults::MAX_INSTS
    }

    fn default_max_replays() -> u32 {
        defaults::MAX_REPLAYS
    }
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            hardware: HardwareMode::default(),
            replay: ReplayDetection::default(),
            threat: ThreatPoint::default(),
            max_insts: defaults::MAX_INSTS,
            max_replays: defaults::MAX_REPLAYS,
        }
    }
}

/// Squash-buffer geometry and policy.
#[derive(Debug, Clone, Deserialize)]
pub struct SquashBufferConfig {
    /// Backing structure for the buffer.
    #[serde(default)]
    pub structure: SbStructure,

    /// Capacity of the simple buffer's address set.
    #[serde(default = "SquashBufferConfig::default_max_size")]
    pub max_size: usize,

    /// Projected element count driving Bloom `(m, k)` sizing.
    #[serde(default = "SquashBufferConfig::default_projected_elem_cnt")]
    pub projected_elem_cnt: u64,

    /// Target Bloom false-positive probability.
    #[serde(default = "SquashBufferConfig::default_false_positive_probability")]
    pub false_positive_probability: f64,

    /// Filter PRNG seed.
    #[serde(default = "SquashBufferConfig::default_random_seed")]
    pub random_seed: u64,

    /// Epoch granularity assigned by the front-end.
    #[serde(default)]
    pub epoch_scale: EpochScale,

    /// Enables retirement-driven deletion (requires a counter-capable filter).
    #[serde(default)]
    pub delete_on_retire: bool,

    /// Cap on simultaneously tracked epochs.
    #[serde(default = "SquashBufferConfig::default_active_records")]
    pub active_records: usize,

    /// If set, `check` scans all epochs rather than the instruction's own.
    #[serde(default)]
    pub check_all_records: bool,

    /// Width in bits of counting-filter / ideal saturating counters.
    #[serde(default = "SquashBufferConfig::default_counter_size")]
    pub counter_size: usize,
}

impl SquashBufferConfig {
    fn default_max_size() -> usize {
        defaults::MAX_SB_SIZE
    }

    fn default_projected_elem_cnt() -> u64 {
        defaults::PROJECTED_ELEM_CNT
    }

    fn default_false_positive_probability() -> f64 {
        defaults::FALSE_POSITIVE_PROBABILITY
    }

    fn default_random_seed() -> u64 {
        defaults::RANDOM_SEED
    }

    fn default_active_records() -> usize {
        defaults::ACTIVE_RECORDS
    }

    fn default_counter_size() -> usize {
        defaults::COUNTER_SIZE
    }

    /// Seed for the counting-filter hasher PRNG.
    pub fn hasher_seed(&self) -> u64 {
        defaults::HASHER_SEED
    }
}

impl Default for SquashBufferConfig {
    fn default() -> Self {
        Self {
            structure: SbStructure::default(),
            max_size: defaults::MAX_SB_SIZE,
            projected_elem_cnt: defaults::PROJECTED_ELEM_CNT,
            false_positive_probability: defaults::FALSE_POSITIVE_PROBABILITY,
            random_seed: defaults::RANDOM_SEED,
            epoch_scale: EpochScale::default(),
            delete_on_retire: false,
            active_records: defaults::ACTIVE_RECORDS,
            check_all_records: false,
            counter_size: defaults::COUNTER_SIZE,
        }
    }
}

/// Counter-cache geometry and behaviour.
#[derive(Debug, Clone, Deserialize)]
pub struct CounterCacheConfig {
    /// When false, the replay-detection layer skips the cache entirely.
    #[serde(default = "CounterCacheConfig::default_enable")]
    pub enable: bool,

    /// Ideal mode: every reference hits and returns the table value.
    #[serde(default)]
    pub ideal: bool,

    /// Ways per set.
    #[serde(default = "CounterCacheConfig::default_assoc")]
    pub assoc: usize,

    /// Number of sets.
    #[serde(default = "CounterCacheConfig::default_sets")]
    pub sets: usize,

    /// Miss latency in cycles.
    #[serde(default = "CounterCacheConfig::default_miss_latency")]
    pub miss_latency: u64,
}

impl CounterCacheConfig {
    fn default_enable() -> bool {
        true
    }

    fn default_assoc() -> usize {
        defaults::CC_ASSOC
    }

    fn default_sets() -> usize {
        defaults::CC_SETS
    }

    fn default_miss_latency() -> u64 {
        defaults::CC_MISS_LATENCY
    }
}

impl Default for CounterCacheConfig {
    fn default() -> Self {
        Self {
            enable: true,
            ideal: false,
            assoc: defaults::CC_ASSOC,
            sets: defaults::CC_SETS,
            miss_latency: defaults::CC_MISS_LATENCY,
        }
    }
}

/// Sequence-number window restricting per-instruction debug tracing.
///
/// A bound is active when the corresponding field is present; absent fields
/// leave that side of the window open.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TraceConfig {
    /// Lowest sequence number traced, inclusive.
    #[serde(default)]
    pub lower_seq: Option<u64>,

    /// Highest sequence number traced, inclusive.
    #[serde(default)]
    pub upper_seq: Option<u64>,
}

impl TraceConfig {
    /// Whether an instruction with sequence number `seq` should be traced.
    pub fn in_window(&self, seq: u64) -> bool {
        self.lower_seq.map_or(true, |lo| seq >= lo) && self.upper_seq.map_or(true, |hi| seq <= hi)
    }
}

/// Root configuration for the replay-detection subsystem.
///
/// # Examples
///
/// Creating a default configuration:
///
/// ```
/// use replay_core::config::SimConfig;
///
/// let config = SimConfig::default();
/// assert_eq!(config.squash_buffer.counter_size, 2);
/// assert!(config.counter_cache.enable);
/// ```
///
/// Deserializing from JSON:
///
/// ```
/// use replay_core::config::{ReplayDetection, SbStructure, SimConfig};
///
/// let json = r#"{
///     "detection": { "replay": "Epoch" },
///     "squash_buffer": {
///         "structure": "CountingBloom",
///         "delete_on_retire": true,
///         "active_records": 8,
///         "counter_size": 3
///     },
///     "counter_cache": { "assoc": 2, "sets": 16, "miss_latency": 10 },
///     "trace": { "lower_seq": 100 }
/// }"#;
///
/// let config: SimConfig = serde_json::from_str(json).unwrap();
/// assert_eq!(config.detection.replay, ReplayDetection::Epoch);
/// assert_eq!(config.squash_buffer.structure, SbStructure::CountingBloom);
/// assert!(config.trace.in_window(100));
/// assert!(!config.trace.in_window(99));
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct SimConfig {
    /// Detection policy settings.
    #[serde(default)]
    pub detection: DetectionConfig,

    /// Squash-buffer settings.
    #[serde(default)]
    pub squash_buffer: SquashBufferConfig,

    /// Counter-cache settings.
    #[serde(default)]
    pub counter_cache: CounterCacheConfig,

    /// Debug trace window.
    #[serde(default)]
    pub trace: TraceConfig,

    /// Hardware thread count (one counter cache per thread).
    #[serde(default = "SimConfig::default_threads")]
    pub threads: usize,
}

impl SimConfig {
    fn default_threads() -> usize {
        defaults::THREADS
    }
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            detection: DetectionConfig::default(),
            squash_buffer: SquashBufferConfig::default(),
            counter_cache: CounterCacheConfig::default(),
            trace: TraceConfig::default(),
            threads: defaults::THREADS,
        }
    }
}

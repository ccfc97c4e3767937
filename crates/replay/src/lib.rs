//! Squash-buffer subsystem of an out-of-order replay-detection simulator.
//!
//! This crate implements the data structures a processor simulator uses to
//! decide whether an instruction is a replay of previously squashed work:
//! 1. **Filters:** bit-packed counter vectors, the H3 hash family, and
//!    standard/counting Bloom filters with derived sizing.
//! 2. **Squash buffers:** the single-generation and epoch-indexed variants,
//!    each with an ideal accuracy shadow and a statistics bank.
//! 3. **Counter cache:** a set-associative LRU cache modelling the latency of
//!    fetching replay counters from memory.
//! 4. **Bridge:** read-only configuration plus the shared component bank,
//!    with a trace-replay entry point for the CLI.

/// Read-only tunables and the shared component bank.
pub mod bridge;
/// Counter cache with miss-latency modelling.
pub mod cache;
/// Configuration (defaults, enums, hierarchical structures).
pub mod config;
/// Probabilistic filters (counter vector, H3, Bloom variants).
pub mod filter;
/// Instruction descriptor supplied by the pipeline.
pub mod inst;
/// Squash-buffer variants and their capability trait.
pub mod sb;
/// Statistics counters and distributions.
pub mod stats;
/// Event-trace loader for replaying recorded pipelines.
pub mod trace;

/// Root configuration type; use `SimConfig::default()` or deserialize JSON.
pub use crate::config::SimConfig;
/// Shared-resource owner; construct with `ReplayBridge::new`.
pub use crate::bridge::ReplayBridge;
/// Instruction view consumed by every squash-buffer event.
pub use crate::inst::InstDescriptor;
/// Capability set shared by the squash-buffer variants.
pub use crate::sb::SquashBuffer;

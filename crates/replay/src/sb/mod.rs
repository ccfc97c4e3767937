//! Squash buffers tracking replayed instruction addresses.
//!
//! A squash buffer records the addresses of squashed instructions so the
//! pipeline can recognize a later fetch of the same address as a replay. Two
//! variants share one capability set:
//! 1. **Simple:** one generation keyed by the oldest outstanding squash
//!    source.
//! 2. **Epoch:** per-epoch records with an active-record budget, retirement
//!    decrement, and counter-overflow fallback.

use crate::config::{ReplayDetection, SimConfig};
use crate::inst::InstDescriptor;
use crate::stats::SbStats;

/// Generation-indexed buffer.
pub mod epoch;
/// Single-generation buffer.
pub mod simple;

pub use epoch::EpochSquashBuffer;
pub use simple::SimpleSquashBuffer;

/// Capability set shared by the squash-buffer variants.
///
/// Events arrive in caller order and run to completion; decisions are
/// returned synchronously.
pub trait SquashBuffer {
    /// Queries whether the instruction looks like a replay of squashed work.
    fn check(&mut self, inst: &InstDescriptor) -> bool;

    /// Records a squashed instruction's address.
    fn insert(&mut self, inst: &InstDescriptor);

    /// Reports a squash event originating at this instruction.
    fn squash(&mut self, inst: &InstDescriptor);

    /// Reports that the instruction committed.
    fn retire(&mut self, inst: &InstDescriptor);

    /// Ages out state the instruction makes stale. Returns whether anything
    /// was flushed.
    fn clear(&mut self, inst: &InstDescriptor) -> bool;

    /// Whether the buffer cannot accept a new record.
    fn full(&self) -> bool;

    /// Configured capacity.
    fn max_size(&self) -> usize;

    /// Read-only statistics bank.
    fn stats(&self) -> &SbStats;
}

/// Builds the squash-buffer variant the detection scheme calls for, or `None`
/// when the scheme does not use one.
pub fn build_squash_buffer(config: &SimConfig) -> Option<Box<dyn SquashBuffer>> {
    match config.detection.replay {
        ReplayDetection::Buffer => Some(Box::new(SimpleSquashBuffer::new(config))),
        ReplayDetection::Epoch => Some(Box::new(EpochSquashBuffer::new(config))),
        ReplayDetection::NoDetect | ReplayDetection::Counter => None,
    }
}

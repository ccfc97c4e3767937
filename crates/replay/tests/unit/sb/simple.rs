//! Simple Squash Buffer Unit Tests.
//!
//! Exercises the single-generation lifecycle: squash lowers the oldest
//! source, clear flushes when that source (or a younger survivor) commits,
//! and the forward-jump rule catches a squash source that disappeared.

use replay_core::config::SbStructure;
use replay_core::sb::{SimpleSquashBuffer, SquashBuffer};

use crate::common::{buffer_config, init_logging, inst};

fn ideal_sb() -> SimpleSquashBuffer {
    init_logging();
    SimpleSquashBuffer::new(&buffer_config(SbStructure::Ideal))
}

fn bloom_sb() -> SimpleSquashBuffer {
    init_logging();
    SimpleSquashBuffer::new(&buffer_config(SbStructure::Bloom))
}

const ADDR_A: u64 = 0x0040_0000;
const ADDR_B: u64 = 0x0040_1000;

// ══════════════════════════════════════════════════════════
// 1. Insert / Check
// ══════════════════════════════════════════════════════════

#[test]
fn inserted_address_is_found() {
    let mut sb = ideal_sb();
    sb.insert(&inst(ADDR_A, 10, 0));
    assert!(sb.check(&inst(ADDR_A, 11, 0)));
    assert!(!sb.check(&inst(ADDR_B, 12, 0)));

    assert_eq!(sb.stats().inserts, 1);
    assert_eq!(sb.stats().checks, 2);
    assert_eq!(sb.stats().hits, 1);
    assert_eq!(sb.stats().misses, 1);
}

#[test]
fn duplicate_inserts_count_once_in_the_set() {
    let mut sb = ideal_sb();
    sb.insert(&inst(ADDR_A, 10, 0));
    sb.insert(&inst(ADDR_A, 11, 0));
    assert_eq!(sb.stats().inserts, 2);
    assert!(!sb.full(), "one distinct address does not fill a 4-entry buffer");
}

// ══════════════════════════════════════════════════════════
// 2. Clear Semantics
// ══════════════════════════════════════════════════════════

/// Clearing with the oldest squash source flushes everything.
#[test]
fn clear_on_oldest_source_flushes() {
    let mut sb = ideal_sb();
    sb.squash(&inst(ADDR_B, 50, 0));
    sb.insert(&inst(ADDR_A, 51, 0));

    assert!(sb.clear(&inst(ADDR_B, 50, 0)));
    assert!(!sb.check(&inst(ADDR_A, 52, 0)));
    assert_eq!(sb.stats().clears, 1);
    assert_eq!(sb.stats().seq_changes, 0);
}

/// A second clear with the same sequence number removes nothing further.
#[test]
fn clear_is_idempotent() {
    let mut sb = ideal_sb();
    sb.squash(&inst(ADDR_B, 50, 0));
    sb.insert(&inst(ADDR_A, 51, 0));

    assert!(sb.clear(&inst(ADDR_B, 50, 0)));
    assert!(!sb.clear(&inst(ADDR_B, 50, 0)), "oldest source already reset");
    assert_eq!(sb.stats().clears, 1);
}

/// Squash(100), insert, squash(80), clear(100): the original oldest source
/// was itself squashed, so the forward-jump rule flushes and counts a
/// sequence change.
#[test]
fn forward_jump_rule_flushes_and_counts() {
    let mut sb = ideal_sb();
    sb.squash(&inst(ADDR_B, 100, 0));
    sb.insert(&inst(ADDR_A, 101, 0));
    sb.squash(&inst(ADDR_B, 80, 0));

    assert!(sb.clear(&inst(ADDR_B, 100, 0)));
    assert_eq!(sb.stats().seq_changes, 1);
    assert_eq!(sb.stats().clears, 1);
    assert!(!sb.check(&inst(ADDR_A, 102, 0)));
}

/// A clear older than the oldest source does nothing.
#[test]
fn clear_below_oldest_source_is_ignored() {
    let mut sb = ideal_sb();
    sb.squash(&inst(ADDR_B, 50, 0));
    sb.insert(&inst(ADDR_A, 51, 0));

    assert!(!sb.clear(&inst(ADDR_B, 40, 0)));
    assert!(sb.check(&inst(ADDR_A, 52, 0)));
    assert_eq!(sb.stats().clears, 0);
}

// ══════════════════════════════════════════════════════════
// 3. Capacity
// ══════════════════════════════════════════════════════════

#[test]
fn ideal_buffer_fills_at_max_size() {
    let mut sb = ideal_sb();
    for i in 0..4u64 {
        assert!(!sb.full());
        sb.insert(&inst(ADDR_A + i * 8, 10 + i, 0));
    }
    assert!(sb.full());
    assert_eq!(sb.max_size(), 4);
}

#[test]
fn bloom_buffer_never_fills() {
    let mut sb = bloom_sb();
    for i in 0..64u64 {
        sb.insert(&inst(ADDR_A + i * 8, 10 + i, 0));
    }
    assert!(!sb.full(), "the filter is fixed-size");
}

// ══════════════════════════════════════════════════════════
// 4. Bloom Accuracy Shadow
// ══════════════════════════════════════════════════════════

/// The address set stays the ground truth; the filter answers queries and
/// can never produce a false negative.
#[test]
fn bloom_mode_has_no_false_negatives() {
    let mut sb = bloom_sb();
    for i in 0..32u64 {
        sb.insert(&inst(ADDR_A + i * 8, 10 + i, 0));
    }
    for i in 0..32u64 {
        assert!(sb.check(&inst(ADDR_A + i * 8, 100 + i, 0)));
    }
    assert!(!sb.check(&inst(0x1234_5678, 200, 0)));
    assert_eq!(sb.stats().filter_false_negatives, 0);
}

#[test]
fn bloom_mode_flushes_filter_on_clear() {
    let mut sb = bloom_sb();
    sb.squash(&inst(ADDR_B, 50, 0));
    sb.insert(&inst(ADDR_A, 51, 0));
    assert!(sb.clear(&inst(ADDR_B, 50, 0)));
    assert!(!sb.check(&inst(ADDR_A, 52, 0)));
}

// ══════════════════════════════════════════════════════════
// 5. Retire Contract
// ══════════════════════════════════════════════════════════

#[test]
#[should_panic(expected = "does not support retire")]
fn retire_is_a_contract_violation() {
    let mut sb = ideal_sb();
    sb.retire(&inst(ADDR_A, 10, 0));
}

//! Hasher Policy Unit Tests.
//!
//! Both hasher policies must be reproducible from `(k, seed, double)` alone,
//! and double hashing must expand its two digests linearly.

use replay_core::filter::make_hasher;

// ══════════════════════════════════════════════════════════
// 1. Factory
// ══════════════════════════════════════════════════════════

#[test]
fn independent_hasher_produces_k_digests() {
    let hasher = make_hasher(4, 7, false);
    assert_eq!(hasher.k(), 4);
    assert_eq!(hasher.digests(0xCAFE).len(), 4);
}

#[test]
fn double_hasher_produces_k_digests() {
    let hasher = make_hasher(5, 7, true);
    assert_eq!(hasher.k(), 5);
    assert_eq!(hasher.digests(0xCAFE).len(), 5);
}

#[test]
#[should_panic(expected = "at least one hash function")]
fn zero_k_panics() {
    make_hasher(0, 7, false);
}

// ══════════════════════════════════════════════════════════
// 2. Reproducibility
// ══════════════════════════════════════════════════════════

/// The same `(k, seed, double)` triple always yields the same digests.
#[test]
fn configurations_are_reproducible() {
    for double in [false, true] {
        let a = make_hasher(3, 0x5bd1_e995, double);
        let b = make_hasher(3, 0x5bd1_e995, double);
        assert_eq!(a.digests(42), b.digests(42));
        assert_eq!(a.digests(u64::MAX), b.digests(u64::MAX));
    }
}

#[test]
fn seed_changes_digests() {
    let a = make_hasher(3, 1, false);
    let b = make_hasher(3, 2, false);
    assert_ne!(a.digests(42), b.digests(42));
}

#[test]
fn independent_digests_are_distinct() {
    let hasher = make_hasher(4, 9, false);
    let digests = hasher.digests(0x4000_0000);
    for i in 0..digests.len() {
        for j in i + 1..digests.len() {
            assert_ne!(digests[i], digests[j], "positions {} and {} collide", i, j);
        }
    }
}

// ══════════════════════════════════════════════════════════
// 3. Double-Hashing Structure
// ══════════════════════════════════════════════════════════

/// Digest `i` is `h1 + i * h2`, so consecutive digests differ by a constant.
#[test]
fn double_hashing_is_linear() {
    let hasher = make_hasher(6, 13, true);
    let digests = hasher.digests(0xF00D);
    let step = digests[1].wrapping_sub(digests[0]);
    for window in digests.windows(2) {
        assert_eq!(window[1].wrapping_sub(window[0]), step);
    }
}

//! Configuration Unit Tests.
//!
//! Verifies default values, JSON deserialization with partial overrides and
//! enum aliases, and the trace-window predicate.

use replay_core::config::{
    EpochScale, HardwareMode, ReplayDetection, SbStructure, SimConfig, ThreatPoint, TraceConfig,
};

// ══════════════════════════════════════════════════════════
// 1. Defaults
// ══════════════════════════════════════════════════════════

#[test]
fn default_configuration_values() {
    let config = SimConfig::default();

    assert_eq!(config.detection.hardware, HardwareMode::Unsafe);
    assert_eq!(config.detection.replay, ReplayDetection::NoDetect);
    assert_eq!(config.detection.threat, ThreatPoint::Issue);
    assert_eq!(config.detection.max_insts, 0);
    assert_eq!(config.detection.max_replays, 1);

    assert_eq!(config.squash_buffer.structure, SbStructure::Ideal);
    assert_eq!(config.squash_buffer.max_size, 256);
    assert_eq!(config.squash_buffer.projected_elem_cnt, 4096);
    assert_eq!(config.squash_buffer.counter_size, 2);
    assert_eq!(config.squash_buffer.active_records, 16);
    assert_eq!(config.squash_buffer.epoch_scale, EpochScale::Iteration);
    assert!(!config.squash_buffer.delete_on_retire);
    assert!(!config.squash_buffer.check_all_records);

    assert!(config.counter_cache.enable);
    assert!(!config.counter_cache.ideal);
    assert_eq!(config.counter_cache.assoc, 4);
    assert_eq!(config.counter_cache.sets, 64);
    assert_eq!(config.counter_cache.miss_latency, 30);

    assert_eq!(config.threads, 1);
    assert!(config.trace.lower_seq.is_none());
    assert!(config.trace.upper_seq.is_none());
}

// ══════════════════════════════════════════════════════════
// 2. JSON Deserialization
// ══════════════════════════════════════════════════════════

#[test]
fn full_json_round_trip() {
    let json = r#"{
        "detection": {
            "hardware": "Fence",
            "replay": "Epoch",
            "threat": "Exec",
            "max_insts": 1000000,
            "max_replays": 3
        },
        "squash_buffer": {
            "structure": "CountingBloom",
            "max_size": 128,
            "projected_elem_cnt": 2048,
            "epoch_scale": "Loop",
            "delete_on_retire": true,
            "active_records": 8,
            "check_all_records": true,
            "counter_size": 3
        },
        "counter_cache": {
            "enable": true,
            "ideal": false,
            "assoc": 2,
            "sets": 32,
            "miss_latency": 12
        },
        "trace": { "lower_seq": 500, "upper_seq": 900 },
        "threads": 4
    }"#;

    let config: SimConfig = serde_json::from_str(json).unwrap();
    assert_eq!(config.detection.hardware, HardwareMode::Fence);
    assert_eq!(config.detection.replay, ReplayDetection::Epoch);
    assert_eq!(config.detection.threat, ThreatPoint::Exec);
    assert_eq!(config.squash_buffer.structure, SbStructure::CountingBloom);
    assert_eq!(config.squash_buffer.epoch_scale, EpochScale::Loop);
    assert_eq!(config.squash_buffer.counter_size, 3);
    assert!(config.squash_buffer.delete_on_retire);
    assert_eq!(config.counter_cache.sets, 32);
    assert_eq!(config.threads, 4);
    assert_eq!(config.trace.lower_seq, Some(500));
}

#[test]
fn partial_json_fills_defaults() {
    let json = r#"{ "squash_buffer": { "structure": "Bloom" } }"#;
    let config: SimConfig = serde_json::from_str(json).unwrap();

    assert_eq!(config.squash_buffer.structure, SbStructure::Bloom);
    assert_eq!(config.squash_buffer.max_size, 256, "untouched field keeps default");
    assert_eq!(config.detection.replay, ReplayDetection::NoDetect);
    assert_eq!(config.threads, 1);
}

#[test]
fn enum_aliases_accepted() {
    let json = r#"{
        "detection": { "hardware": "FENCE_ALL", "replay": "NO_DETECT" },
        "squash_buffer": { "structure": "COUNTING_BLOOM" }
    }"#;
    let config: SimConfig = serde_json::from_str(json).unwrap();
    assert_eq!(config.detection.hardware, HardwareMode::FenceAll);
    assert_eq!(config.detection.replay, ReplayDetection::NoDetect);
    assert_eq!(config.squash_buffer.structure, SbStructure::CountingBloom);
}

#[test]
fn unknown_enum_value_rejected() {
    let json = r#"{ "squash_buffer": { "structure": "Cuckoo" } }"#;
    assert!(serde_json::from_str::<SimConfig>(json).is_err());
}

// ══════════════════════════════════════════════════════════
// 3. Trace Window
// ══════════════════════════════════════════════════════════

#[test]
fn open_window_traces_everything() {
    let trace = TraceConfig::default();
    assert!(trace.in_window(0));
    assert!(trace.in_window(u64::MAX));
}

#[test]
fn bounds_are_inclusive() {
    let trace = TraceConfig {
        lower_seq: Some(100),
        upper_seq: Some(200),
    };
    assert!(!trace.in_window(99));
    assert!(trace.in_window(100));
    assert!(trace.in_window(200));
    assert!(!trace.in_window(201));
}

#[test]
fn half_open_windows() {
    let lower_only = TraceConfig {
        lower_seq: Some(50),
        upper_seq: None,
    };
    assert!(!lower_only.in_window(49));
    assert!(lower_only.in_window(u64::MAX));

    let upper_only = TraceConfig {
        lower_seq: None,
        upper_seq: Some(50),
    };
    assert!(upper_only.in_window(0));
    assert!(!upper_only.in_window(51));
}

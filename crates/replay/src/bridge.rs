//! Bridge owning the subsystem's shared, read-mostly resources.
//!
//! The surrounding pipeline constructs one [`ReplayBridge`] from a
//! [`SimConfig`] and the external counter table, then hands out references:
//! the configuration is immutable after construction, the counter-cache bank
//! holds one cache per hardware thread, and the squash buffer is the variant
//! the detection scheme selects.

use log::debug;

use crate::cache::{CounterCache, SharedCounterMap};
use crate::config::SimConfig;
use crate::inst::InstDescriptor;
use crate::sb::{build_squash_buffer, SquashBuffer};
use crate::trace::TraceEvent;

/// Read-only tunables plus the shared component bank.
pub struct ReplayBridge {
    /// Immutable subsystem configuration.
    pub config: SimConfig,
    /// One counter cache per hardware thread; empty when disabled.
    pub counter_caches: Vec<CounterCache>,
    /// The configured squash buffer, if the detection scheme uses one.
    pub squash_buffer: Option<Box<dyn SquashBuffer>>,
}

impl ReplayBridge {
    /// Builds the bridge: per-thread counter caches over `counter_table` and
    /// the squash-buffer variant selected by `config`.
    pub fn new(config: SimConfig, counter_table: SharedCounterMap) -> Self {
        debug!(
            "replay bridge: hw={:?} detection={:?} threat={:?} structure={:?}",
            config.detection.hardware,
            config.detection.replay,
            config.detection.threat,
            config.squash_buffer.structure
        );

        let cc = &config.counter_cache;
        let counter_caches = if cc.enable {
            (0..config.threads)
                .map(|_| {
                    CounterCache::new(
                        cc.assoc,
                        cc.sets,
                        counter_table.clone(),
                        cc.miss_latency,
                        cc.ideal,
                    )
                })
                .collect()
        } else {
            Vec::new()
        };

        let squash_buffer = build_squash_buffer(&config);

        Self {
            config,
            counter_caches,
            squash_buffer,
        }
    }

    /// Applies one trace event to the owned components.
    ///
    /// Squash-buffer events without a configured buffer and cache events for
    /// an unknown thread are ignored; a disabled or missing component is a
    /// configuration choice, not an error in the event stream.
    pub fn apply(&mut self, event: &TraceEvent) {
        match event {
            TraceEvent::Insert(inst) => self.sb_apply(|sb, i| sb.insert(i), inst),
            TraceEvent::Check(inst) => {
                if let Some(sb) = self.squash_buffer.as_deref_mut() {
                    sb.check(inst);
                }
            }
            TraceEvent::Squash(inst) => self.sb_apply(|sb, i| sb.squash(i), inst),
            TraceEvent::Retire(inst) => self.sb_apply(|sb, i| sb.retire(i), inst),
            TraceEvent::Clear(inst) => {
                if let Some(sb) = self.squash_buffer.as_deref_mut() {
                    sb.clear(inst);
                }
            }
            TraceEvent::Refer { thread, pc, tick } => {
                if let Some(cache) = self.counter_caches.get_mut(*thread) {
                    cache.refer(*pc, *tick);
                }
            }
            TraceEvent::Fetch { thread, pc, tick } => {
                if let Some(cache) = self.counter_caches.get_mut(*thread) {
                    cache.fetch(*pc, *tick);
                }
            }
        }
    }

    fn sb_apply(&mut self, op: impl FnOnce(&mut dyn SquashBuffer, &InstDescriptor), inst: &InstDescriptor) {
        if let Some(sb) = self.squash_buffer.as_deref_mut() {
            op(sb, inst);
        }
    }

    /// Prints the squash-buffer report followed by counter-cache totals.
    pub fn print_stats(&self, sections: &[String]) {
        if let Some(sb) = &self.squash_buffer {
            sb.stats().print_sections(sections);
        }
        for (thread, cache) in self.counter_caches.iter().enumerate() {
            println!(
                "counter_cache[{}]  refs: {}  hits: {}  hit_rate: {:.2}%  replacements: {}",
                thread,
                cache.ref_count(),
                cache.hit_count(),
                cache.hit_rate() * 100.0,
                cache.replacements().iter().sum::<u64>()
            );
        }
    }
}

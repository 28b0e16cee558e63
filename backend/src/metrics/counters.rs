use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Minimal counters for operational visibility.
#[derive(Clone, Default)]
pub struct Counters {
    pub rotations: Arc<AtomicU64>,
    pub rotation_fallbacks: Arc<AtomicU64>,

    pub fetch_dispatched: Arc<AtomicU64>,
    pub fetch_applied: Arc<AtomicU64>,
    pub fetch_failed: Arc<AtomicU64>,

    // results that resolved after the rotation moved on
    pub fetch_stale: Arc<AtomicU64>,
}

/// Point-in-time copy of `Counters`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CountersSnapshot {
    pub rotations: u64,
    pub rotation_fallbacks: u64,
    pub fetch_dispatched: u64,
    pub fetch_applied: u64,
    pub fetch_failed: u64,
    pub fetch_stale: u64,
}

impl Counters {
    pub fn incr(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> CountersSnapshot {
        CountersSnapshot {
            rotations: self.rotations.load(Ordering::Relaxed),
            rotation_fallbacks: self.rotation_fallbacks.load(Ordering::Relaxed),
            fetch_dispatched: self.fetch_dispatched.load(Ordering::Relaxed),
            fetch_applied: self.fetch_applied.load(Ordering::Relaxed),
            fetch_failed: self.fetch_failed.load(Ordering::Relaxed),
            fetch_stale: self.fetch_stale.load(Ordering::Relaxed),
        }
    }
}

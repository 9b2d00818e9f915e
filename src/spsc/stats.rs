//! Transport statistics: plain relaxed counters plus a depth gauge.

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

/// Counters maintained by the channel. All updates are relaxed; readers get
/// a best-effort view that is good enough to drive dashboards and tests.
#[derive(Debug, Default)]
pub struct SpscStats {
    /// Successful pushes.
    pub push_ok: AtomicU64,
    /// Successful pops.
    pub pop_ok: AtomicU64,
    /// Pushes rejected by Drop-mode backpressure or a full ring.
    pub drops_total: AtomicU64,
    /// Most recently observed queue depth.
    pub depth_gauge: AtomicU64,
    /// Highest depth ever observed.
    pub max_depth: AtomicU64,
}

impl SpscStats {
    /// Record a depth observation: store the gauge and raise the maximum via
    /// a relaxed compare-and-swap loop.
    pub fn observe_depth(&self, depth: u64) {
        self.depth_gauge.store(depth, Ordering::Relaxed);
        let mut seen = self.max_depth.load(Ordering::Relaxed);
        while seen < depth {
            match self.max_depth.compare_exchange_weak(
                seen,
                depth,
                Ordering::Relaxed,
                Ordering::Relaxed,
            ) {
                Ok(_) => break,
                Err(current) => seen = current,
            }
        }
    }

    /// A point-in-time copy of every counter.
    #[must_use]
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            push_ok: self.push_ok.load(Ordering::Relaxed),
            pop_ok: self.pop_ok.load(Ordering::Relaxed),
            drops_total: self.drops_total.load(Ordering::Relaxed),
            depth: self.depth_gauge.load(Ordering::Relaxed),
            max_depth: self.max_depth.load(Ordering::Relaxed),
        }
    }
}

/// Serializable copy of [`SpscStats`] for bench summaries and logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatsSnapshot {
    /// Successful pushes.
    pub push_ok: u64,
    /// Successful pops.
    pub pop_ok: u64,
    /// Rejected pushes.
    pub drops_total: u64,
    /// Last observed depth.
    pub depth: u64,
    /// Highest observed depth.
    pub max_depth: u64,
}

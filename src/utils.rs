//! Timebase and CPU helpers shared by the library and the harness binaries.

use std::sync::OnceLock;
use std::time::{Instant, SystemTime, UNIX_EPOCH};
use tracing::warn;

static EPOCH: OnceLock<Instant> = OnceLock::new();

/// Monotonic nanoseconds since the first call in this process. Suitable for
/// latency measurement and order timestamps; never goes backwards.
#[must_use]
pub fn now_ns() -> u64 {
    EPOCH.get_or_init(Instant::now).elapsed().as_nanos() as u64
}

/// Wall-clock milliseconds since the Unix epoch, for logs and summaries.
#[must_use]
pub fn current_time_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Simple monotonic stopwatch.
#[derive(Debug, Clone, Copy)]
pub struct Stopwatch {
    start: Instant,
}

impl Default for Stopwatch {
    fn default() -> Self {
        Self::new()
    }
}

impl Stopwatch {
    /// Start timing now.
    #[must_use]
    pub fn new() -> Self {
        Stopwatch {
            start: Instant::now(),
        }
    }

    /// Restart from zero.
    pub fn reset(&mut self) {
        self.start = Instant::now();
    }

    /// Elapsed time in seconds.
    #[must_use]
    pub fn elapsed_secs(&self) -> f64 {
        self.start.elapsed().as_secs_f64()
    }

    /// Elapsed time in nanoseconds.
    #[must_use]
    pub fn elapsed_ns(&self) -> u64 {
        self.start.elapsed().as_nanos() as u64
    }
}

/// Pin the current thread to a CPU core. Best-effort: returns `false` (and
/// logs) when the core does not exist or affinity cannot be set.
pub fn pin_to_core(core_index: usize) -> bool {
    let Some(cores) = core_affinity::get_core_ids() else {
        warn!("cannot enumerate CPU cores, leaving thread unpinned");
        return false;
    };
    match cores.into_iter().find(|c| c.id == core_index) {
        Some(core) => {
            let ok = core_affinity::set_for_current(core);
            if !ok {
                warn!(core_index, "failed to pin thread");
            }
            ok
        }
        None => {
            warn!(core_index, "no such CPU core, leaving thread unpinned");
            false
        }
    }
}

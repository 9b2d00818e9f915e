//! SPSC channel: a ring plus a backpressure policy with hysteresis.
//!
//! The producer half applies one of three policies when the queue runs deep:
//! drop the value, spin until the consumer drains, or sleep between retries.
//! Spin and Sleep use two watermarks: backpressure engages at `high_wm` and
//! releases only once depth has fallen to `low_wm`, so the producer does not
//! oscillate at the boundary. A caller-supplied stop flag aborts any wait.

use super::ring::{self, RingConsumer, RingError, RingFull, RingProducer};
use super::stats::SpscStats;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use thiserror::Error;

/// What the producer does when the queue is deeper than `high_wm`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BpMode {
    /// Reject the push immediately and count a drop (default).
    #[default]
    Drop,
    /// Busy-wait with a CPU relaxation hint until depth falls to `low_wm`.
    Spin,
    /// Suspend for `sleep` between retries until depth falls to `low_wm`.
    Sleep,
}

impl std::fmt::Display for BpMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BpMode::Drop => write!(f, "drop"),
            BpMode::Spin => write!(f, "spin"),
            BpMode::Sleep => write!(f, "sleep"),
        }
    }
}

/// Failed to parse a [`BpMode`] from a CLI string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown backpressure mode {0:?}, expected drop, spin, or sleep")]
pub struct ParseBpModeError(String);

impl FromStr for BpMode {
    type Err = ParseBpModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "drop" => Ok(BpMode::Drop),
            "spin" => Ok(BpMode::Spin),
            "sleep" => Ok(BpMode::Sleep),
            other => Err(ParseBpModeError(other.to_string())),
        }
    }
}

/// Backpressure configuration. Requires `low_wm <= high_wm <= capacity`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackpressureCfg {
    /// Depth at or above which backpressure engages.
    pub high_wm: usize,
    /// Hysteresis release point for Spin and Sleep.
    pub low_wm: usize,
    /// Policy applied while backpressure is engaged.
    pub mode: BpMode,
    /// Retry interval for [`BpMode::Sleep`].
    pub sleep: Duration,
}

impl BackpressureCfg {
    /// Config with both watermarks at `high_wm`, Drop mode, and a 5 µs sleep
    /// interval. Adjust fields directly for other policies.
    #[must_use]
    pub fn new(high_wm: usize) -> Self {
        BackpressureCfg {
            high_wm,
            low_wm: high_wm,
            mode: BpMode::Drop,
            sleep: Duration::from_nanos(5_000),
        }
    }
}

/// Channel construction failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ChannelError {
    /// The underlying ring rejected the capacity.
    #[error(transparent)]
    Ring(#[from] RingError),

    /// Watermarks must satisfy `low_wm <= high_wm <= capacity`.
    #[error("invalid watermarks: low={low_wm} high={high_wm} capacity={capacity}")]
    InvalidWatermarks {
        /// Configured low watermark.
        low_wm: usize,
        /// Configured high watermark.
        high_wm: usize,
        /// Ring capacity.
        capacity: usize,
    },
}

/// Create a channel of `capacity` slots governed by `cfg`, returning the
/// producer and consumer halves. Both share one [`SpscStats`] instance.
///
/// # Errors
/// [`ChannelError::Ring`] for a bad capacity, or
/// [`ChannelError::InvalidWatermarks`] when `cfg` violates
/// `low_wm <= high_wm <= capacity`.
pub fn channel<T>(
    capacity: usize,
    cfg: BackpressureCfg,
) -> Result<(ChannelProducer<T>, ChannelConsumer<T>), ChannelError> {
    let (tx, rx) = ring::ring(capacity)?;
    if cfg.low_wm > cfg.high_wm || cfg.high_wm > capacity {
        return Err(ChannelError::InvalidWatermarks {
            low_wm: cfg.low_wm,
            high_wm: cfg.high_wm,
            capacity,
        });
    }
    let stats = Arc::new(SpscStats::default());
    Ok((
        ChannelProducer {
            inner: tx,
            cfg,
            stats: Arc::clone(&stats),
            gated: false,
        },
        ChannelConsumer { inner: rx, stats },
    ))
}

/// Producing half of the channel.
pub struct ChannelProducer<T> {
    inner: RingProducer<T>,
    cfg: BackpressureCfg,
    stats: Arc<SpscStats>,
    /// Hysteresis latch for Spin/Sleep: set when depth reaches `high_wm`,
    /// cleared only once depth has drained to `low_wm`.
    gated: bool,
}

impl<T> std::fmt::Debug for ChannelProducer<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChannelProducer")
            .field("cfg", &self.cfg)
            .field("gated", &self.gated)
            .finish_non_exhaustive()
    }
}

impl<T> ChannelProducer<T> {
    /// Push under the configured backpressure policy.
    ///
    /// Returns `false` when the value was dropped (Drop mode at the
    /// watermark or on a full ring) or when `stop` was observed set during a
    /// wait. Spin and Sleep only return `false` via the stop flag.
    pub fn push(&mut self, value: T, stop: Option<&AtomicBool>) -> bool {
        let mut value = value;
        loop {
            if stop.is_some_and(|flag| flag.load(Ordering::Relaxed)) {
                return false;
            }

            let depth = self.inner.len();
            self.stats.observe_depth(depth as u64);

            // Engage at the high watermark to keep latency predictable; in
            // Spin/Sleep, stay engaged until depth drains to the low one.
            match self.cfg.mode {
                BpMode::Drop => {
                    if depth >= self.cfg.high_wm {
                        self.stats.drops_total.fetch_add(1, Ordering::Relaxed);
                        return false;
                    }
                }
                BpMode::Spin => {
                    if depth >= self.cfg.high_wm || (self.gated && depth > self.cfg.low_wm) {
                        self.gated = true;
                        std::hint::spin_loop();
                        continue;
                    }
                    self.gated = false;
                }
                BpMode::Sleep => {
                    if depth >= self.cfg.high_wm || (self.gated && depth > self.cfg.low_wm) {
                        self.gated = true;
                        std::thread::sleep(self.cfg.sleep);
                        continue;
                    }
                    self.gated = false;
                }
            }

            match self.inner.try_push(value) {
                Ok(()) => {
                    self.stats.push_ok.fetch_add(1, Ordering::Relaxed);
                    return true;
                }
                Err(RingFull(rejected)) => {
                    // Ring truly full; races past the watermark land here.
                    value = rejected;
                    match self.cfg.mode {
                        BpMode::Drop => {
                            self.stats.drops_total.fetch_add(1, Ordering::Relaxed);
                            return false;
                        }
                        BpMode::Spin => std::hint::spin_loop(),
                        BpMode::Sleep => std::thread::sleep(self.cfg.sleep),
                    }
                }
            }
        }
    }

    /// Best-effort depth.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.inner.capacity()
    }

    /// Shared counters for this channel.
    #[must_use]
    pub fn stats(&self) -> Arc<SpscStats> {
        Arc::clone(&self.stats)
    }
}

/// Consuming half of the channel.
pub struct ChannelConsumer<T> {
    inner: RingConsumer<T>,
    stats: Arc<SpscStats>,
}

impl<T> std::fmt::Debug for ChannelConsumer<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChannelConsumer").finish_non_exhaustive()
    }
}

impl<T> ChannelConsumer<T> {
    /// Unconditional non-blocking pop; refreshes the depth gauge on success.
    pub fn pop(&mut self) -> Option<T> {
        let out = self.inner.try_pop();
        if out.is_some() {
            self.stats.pop_ok.fetch_add(1, Ordering::Relaxed);
            self.stats.observe_depth(self.inner.len() as u64);
        }
        out
    }

    /// Best-effort depth.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.inner.capacity()
    }

    /// Shared counters for this channel.
    #[must_use]
    pub fn stats(&self) -> Arc<SpscStats> {
        Arc::clone(&self.stats)
    }
}

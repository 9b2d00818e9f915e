//! Bounded lock-free single-producer/single-consumer ring.
//!
//! Capacity must be a power of two; slot index is `seq & (capacity - 1)`.
//! Two monotonically increasing 64-bit counters drive the queue: `head`,
//! written only by the producer, and `tail`, written only by the consumer.
//! Each side loads the counterpart with `Acquire` and publishes its own
//! counter with `Release`; that pairing is the only synchronization edge and
//! carries the produced value across threads. Counters sit on separate cache
//! lines so push and pop never contend on the same line.
//!
//! The ring is exposed as a split [`RingProducer`]/[`RingConsumer`] pair, so
//! the one-producer/one-consumer contract is enforced by ownership rather
//! than convention. Both halves are `Send`; neither is `Clone`.

use crossbeam::utils::CachePadded;
use std::cell::UnsafeCell;
use std::fmt;
use std::mem::MaybeUninit;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use thiserror::Error;

/// Construction failure: the requested capacity cannot be masked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RingError {
    /// Capacity must be a non-zero power of two.
    #[error("ring capacity must be a non-zero power of two, got {0}")]
    CapacityNotPowerOfTwo(usize),
}

/// `try_push` found the ring full; the rejected value is handed back.
pub struct RingFull<T>(pub T);

impl<T> fmt::Debug for RingFull<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("RingFull(..)")
    }
}

impl<T> fmt::Display for RingFull<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ring is full")
    }
}

impl<T> std::error::Error for RingFull<T> {}

/// Shared storage and counters. Slots in `[tail, head)` hold live values;
/// everything else is uninitialized.
struct RingCore<T> {
    head: CachePadded<AtomicU64>,
    tail: CachePadded<AtomicU64>,
    cap: u64,
    mask: u64,
    buf: Box<[UnsafeCell<MaybeUninit<T>>]>,
}

// Values move across the ring, so T: Send suffices for both directions.
unsafe impl<T: Send> Send for RingCore<T> {}
unsafe impl<T: Send> Sync for RingCore<T> {}

impl<T> RingCore<T> {
    #[inline]
    fn len(&self) -> usize {
        let head = self.head.load(Ordering::Acquire);
        let tail = self.tail.load(Ordering::Acquire);
        head.wrapping_sub(tail) as usize
    }
}

impl<T> Drop for RingCore<T> {
    fn drop(&mut self) {
        // Sole owner at this point; destroy whatever is still in flight.
        let head = *self.head.get_mut();
        let mut tail = *self.tail.get_mut();
        while tail != head {
            let idx = (tail & self.mask) as usize;
            unsafe { (*self.buf[idx].get()).assume_init_drop() };
            tail = tail.wrapping_add(1);
        }
    }
}

/// Create a ring of `capacity` slots, returning the producer and consumer
/// halves.
///
/// # Errors
/// [`RingError::CapacityNotPowerOfTwo`] when `capacity` is zero or not a
/// power of two. This is the only hard failure in the transport.
pub fn ring<T>(capacity: usize) -> Result<(RingProducer<T>, RingConsumer<T>), RingError> {
    if capacity == 0 || !capacity.is_power_of_two() {
        return Err(RingError::CapacityNotPowerOfTwo(capacity));
    }
    let buf: Box<[UnsafeCell<MaybeUninit<T>>]> = (0..capacity)
        .map(|_| UnsafeCell::new(MaybeUninit::uninit()))
        .collect();
    let core = Arc::new(RingCore {
        head: CachePadded::new(AtomicU64::new(0)),
        tail: CachePadded::new(AtomicU64::new(0)),
        cap: capacity as u64,
        mask: capacity as u64 - 1,
        buf,
    });
    Ok((
        RingProducer {
            core: Arc::clone(&core),
        },
        RingConsumer { core },
    ))
}

/// The producing half of a ring. Exactly one exists per ring.
pub struct RingProducer<T> {
    core: Arc<RingCore<T>>,
}

impl<T> RingProducer<T> {
    /// Non-blocking push. Constructs the value in its slot before publishing
    /// the new head, so a consumer that observes the head sees the value.
    #[inline]
    pub fn try_push(&mut self, value: T) -> Result<(), RingFull<T>> {
        let core = &*self.core;
        let head = core.head.load(Ordering::Relaxed);
        let tail = core.tail.load(Ordering::Acquire);
        if head.wrapping_sub(tail) == core.cap {
            return Err(RingFull(value));
        }
        let idx = (head & core.mask) as usize;
        // SAFETY: head - tail < cap, so this slot is outside [tail, head)
        // and holds no live value; only this producer writes it.
        unsafe { (*core.buf[idx].get()).write(value) };
        core.head.store(head.wrapping_add(1), Ordering::Release);
        Ok(())
    }

    /// Push up to `max` values drawn from `produce`, stopping early when the
    /// ring fills. Returns the number pushed. `produce` is only invoked for
    /// slots that are actually available.
    pub fn try_push_bulk<F>(&mut self, max: usize, mut produce: F) -> usize
    where
        F: FnMut() -> T,
    {
        let core = &*self.core;
        let mut pushed = 0;
        while pushed < max {
            let head = core.head.load(Ordering::Relaxed);
            let tail = core.tail.load(Ordering::Acquire);
            if head.wrapping_sub(tail) == core.cap {
                break;
            }
            let idx = (head & core.mask) as usize;
            // SAFETY: same slot argument as `try_push`.
            unsafe { (*core.buf[idx].get()).write(produce()) };
            core.head.store(head.wrapping_add(1), Ordering::Release);
            pushed += 1;
        }
        pushed
    }

    /// Best-effort depth; may be stale under concurrent pops.
    #[must_use]
    #[inline]
    pub fn len(&self) -> usize {
        self.core.len()
    }

    #[must_use]
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    #[inline]
    pub fn is_full(&self) -> bool {
        self.len() == self.core.cap as usize
    }

    #[must_use]
    #[inline]
    pub fn capacity(&self) -> usize {
        self.core.cap as usize
    }
}

/// The consuming half of a ring. Exactly one exists per ring.
pub struct RingConsumer<T> {
    core: Arc<RingCore<T>>,
}

impl<T> RingConsumer<T> {
    /// Non-blocking pop. Moves the value out of its slot, then publishes the
    /// new tail so the producer may reuse it.
    #[inline]
    pub fn try_pop(&mut self) -> Option<T> {
        let core = &*self.core;
        let tail = core.tail.load(Ordering::Relaxed);
        let head = core.head.load(Ordering::Acquire);
        if head == tail {
            return None;
        }
        let idx = (tail & core.mask) as usize;
        // SAFETY: tail < head, so this slot holds a value the producer
        // published before its Release store; only this consumer reads it.
        let value = unsafe { (*core.buf[idx].get()).assume_init_read() };
        core.tail.store(tail.wrapping_add(1), Ordering::Release);
        Some(value)
    }

    /// Pop up to `max` values, handing each to `consume`. Returns the number
    /// popped.
    pub fn try_pop_bulk<F>(&mut self, max: usize, mut consume: F) -> usize
    where
        F: FnMut(T),
    {
        let core = &*self.core;
        let mut popped = 0;
        while popped < max {
            let tail = core.tail.load(Ordering::Relaxed);
            let head = core.head.load(Ordering::Acquire);
            if head == tail {
                break;
            }
            let idx = (tail & core.mask) as usize;
            // SAFETY: same slot argument as `try_pop`.
            let value = unsafe { (*core.buf[idx].get()).assume_init_read() };
            core.tail.store(tail.wrapping_add(1), Ordering::Release);
            consume(value);
            popped += 1;
        }
        popped
    }

    /// Best-effort depth; may be stale under concurrent pushes.
    #[must_use]
    #[inline]
    pub fn len(&self) -> usize {
        self.core.len()
    }

    #[must_use]
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    #[inline]
    pub fn is_full(&self) -> bool {
        self.len() == self.core.cap as usize
    }

    #[must_use]
    #[inline]
    pub fn capacity(&self) -> usize {
        self.core.cap as usize
    }
}

//! Event bus: an SPSC ring specialized to the [`Event`] sum type.

use super::events::Event;
use crate::spsc::{RingConsumer, RingError, RingProducer, ring};

/// Default bus capacity (1M events).
pub const DEFAULT_BUS_CAPACITY: usize = 1 << 20;

/// Constructor for the engine's event transport. There is exactly one
/// publisher and one poller per bus; ownership of the halves enforces the
/// single-producer/single-consumer contract.
pub struct EventBus;

impl EventBus {
    /// Bus with the default capacity.
    ///
    /// # Errors
    /// Never fails in practice; the default capacity is a power of two.
    pub fn new() -> Result<(EventPublisher, EventPoller), RingError> {
        Self::with_capacity(DEFAULT_BUS_CAPACITY)
    }

    /// Bus with an explicit capacity (must be a power of two).
    ///
    /// # Errors
    /// [`RingError::CapacityNotPowerOfTwo`] for an unusable capacity.
    pub fn with_capacity(capacity: usize) -> Result<(EventPublisher, EventPoller), RingError> {
        let (tx, rx) = ring(capacity)?;
        Ok((EventPublisher { tx }, EventPoller { rx }))
    }
}

/// Producer half; owned by the engine thread.
pub struct EventPublisher {
    tx: RingProducer<Event>,
}

impl EventPublisher {
    /// Publish without blocking. Returns `false` when the bus is full; the
    /// event is lost, which the operator observes through drained counts.
    #[inline]
    pub fn try_publish(&mut self, event: Event) -> bool {
        self.tx.try_push(event).is_ok()
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.tx.capacity()
    }

    /// Best-effort backlog.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tx.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tx.is_empty()
    }
}

/// Consumer half; owned by the drain thread.
pub struct EventPoller {
    rx: RingConsumer<Event>,
}

impl EventPoller {
    /// Pop the next event, if any.
    #[inline]
    pub fn try_poll(&mut self) -> Option<Event> {
        self.rx.try_pop()
    }

    /// Drain up to `max` events into `consume`; returns the number drained.
    pub fn poll_bulk<F>(&mut self, max: usize, consume: F) -> usize
    where
        F: FnMut(Event),
    {
        self.rx.try_pop_bulk(max, consume)
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.rx.capacity()
    }

    /// Best-effort backlog.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rx.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }
}

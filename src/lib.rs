//! # Low-Latency Limit Order Book Matching Engine
//!
//! A price-time priority limit order book with a lock-free
//! single-producer/single-consumer event transport, written for low-latency
//! trading workloads. The crate has three layers:
//!
//! - [`orderbook`] is the book itself: FIFO price levels over a node arena,
//!   cross/post matching with Day/IOC/FOK time-in-force handling, an
//!   all-or-nothing FOK pre-check, self-trade prevention, priority-aware
//!   replace, and a whole-book invariant checker.
//! - [`spsc`] is the transport: a power-of-two SPSC ring with acquire/release
//!   sequencing and cache-line isolated counters, plus a channel layering a
//!   drop/spin/sleep backpressure policy with hysteresis on top of it.
//! - [`engine`] is the orchestrator: forwards caller operations to the book
//!   and publishes fills, cancels, and book-change notifications onto the
//!   bus without ever blocking.
//!
//! ## Threading model
//!
//! One producer thread owns the [`engine::MatchEngine`] (and therefore the
//! book); one consumer thread owns the [`engine::EventPoller`] and drains
//! events. The ring's release/acquire pair on its sequence counters is the
//! sole synchronization edge between them: a consumer that observes an event
//! also observes every book write that preceded its publication.
//!
//! Ownership enforces the SPSC contract: each transport constructor returns
//! a producer/consumer handle pair, and neither handle is `Clone`.
//!
//! ## Design notes
//!
//! - Prices and quantities are plain integers; there is no floating point in
//!   the matching path.
//! - Order nodes live in a slab arena addressed by `u32` indices; levels
//!   hold head/tail indices instead of pointers, so a steady-state book does
//!   not allocate per order.
//! - Business failures (duplicate id, crossing add, FOK shortfall,
//!   ownership mismatch) are value returns, never panics. The only hard
//!   constructor failure is a ring capacity that is not a power of two.
//!
//! ## Example
//!
//! ```
//! use matchbook_rs::prelude::*;
//!
//! let (publisher, mut poller) = EventBus::with_capacity(1 << 10).unwrap();
//! let mut engine = MatchEngine::new(publisher);
//!
//! // Two resting asks at 100, then a bid that sweeps both.
//! engine.add(1, Side::Ask, 100, 3);
//! engine.add(2, Side::Ask, 100, 5);
//! engine.add(42, Side::Bid, 100, 6);
//!
//! let mut fills = Vec::new();
//! while let Some(ev) = poller.try_poll() {
//!     if let Event::Fill(f) = ev {
//!         fills.push((f.maker_id, f.qty));
//!     }
//! }
//! // FIFO at the level: id 1 fills first, id 2 takes the remainder.
//! assert_eq!(fills, vec![(1, 3), (2, 3)]);
//! assert_eq!(engine.book().level_qty(Side::Ask, 100), 2);
//! ```

pub mod engine;
pub mod orderbook;
pub mod prelude;
pub mod spsc;
mod utils;

pub use engine::{
    BookChangeEvent, CancelEvent, DEFAULT_BUS_CAPACITY, Event, EventBus, EventPoller,
    EventPublisher, FillEvent, MatchEngine,
};
pub use orderbook::{
    BestOfBook, Book, BookConfig, CancelResult, MatchFill, MatchResult, OrderId, OrderNode,
    OrderType, Price, PriceLevel, Qty, ReplaceResult, Side, StpPolicy, TimeInForce, TimeNs,
    TraderId,
};
pub use spsc::{
    BackpressureCfg, BpMode, ChannelConsumer, ChannelError, ChannelProducer, RingConsumer,
    RingError, RingFull, RingProducer, SpscStats, StatsSnapshot,
};
pub use utils::{Stopwatch, current_time_millis, now_ns, pin_to_core};

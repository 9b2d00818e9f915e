//! Prelude module that re-exports the commonly used types.
//!
//! Instead of importing each type individually, you can use:
//!
//! ```rust
//! use matchbook_rs::prelude::*;
//! ```

// Order book
pub use crate::orderbook::{
    BestOfBook, Book, BookConfig, CancelResult, MatchFill, MatchResult, OrderId, OrderType, Price,
    Qty, ReplaceResult, Side, StpPolicy, TimeInForce, TimeNs, TraderId,
};

// Engine and events
pub use crate::engine::{
    BookChangeEvent, CancelEvent, Event, EventBus, EventPoller, EventPublisher, FillEvent,
    MatchEngine,
};

// Transport
pub use crate::spsc::{
    BackpressureCfg, BpMode, ChannelConsumer, ChannelError, ChannelProducer, RingConsumer,
    RingError, RingProducer, SpscStats, channel, ring,
};

// Timebase helpers
pub use crate::{Stopwatch, current_time_millis, now_ns, pin_to_core};

//! Matching engine and its event transport.

mod bus;
mod events;
mod match_engine;

pub use bus::{DEFAULT_BUS_CAPACITY, EventBus, EventPoller, EventPublisher};
pub use events::{BookChangeEvent, CancelEvent, Event, FillEvent};
pub use match_engine::MatchEngine;

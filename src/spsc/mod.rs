//! Lock-free single-producer/single-consumer transport.

mod channel;
mod ring;
mod stats;

pub use channel::{
    BackpressureCfg, BpMode, ChannelConsumer, ChannelError, ChannelProducer, ParseBpModeError,
    channel,
};
pub use ring::{RingConsumer, RingError, RingFull, RingProducer, ring};
pub use stats::{SpscStats, StatsSnapshot};

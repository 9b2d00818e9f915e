//! Limit order book: price levels, matching, and invariant checking.

mod arena;
mod book;
mod invariants;
mod level;
mod matching;
mod operations;
mod stp;
mod types;

#[cfg(test)]
mod tests;

pub use arena::OrderNode;
pub use book::{Book, BookConfig};
pub use level::PriceLevel;
pub use stp::StpPolicy;
pub use types::{
    BestOfBook, CancelResult, MatchFill, MatchResult, OrderId, OrderType, Price, Qty,
    ReplaceResult, Side, TimeInForce, TimeNs, TraderId,
};

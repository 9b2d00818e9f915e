//! Scalar types and core enums shared across the order book.
//!
//! Prices and quantities are plain integers: prices are signed tick counts,
//! quantities are signed so that matching arithmetic can pass through zero
//! transiently while a node is being unlinked. No floating point is used
//! anywhere in the book itself.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique order identifier.
pub type OrderId = u64;

/// Price in integer ticks.
pub type Price = i64;

/// Quantity in integer units. At least 1 while an order is resting; zero is
/// a transient state inside matching, just before the node is destroyed.
pub type Qty = i64;

/// Monotonic timestamp in nanoseconds.
pub type TimeNs = u64;

/// Trader identity for ownership and self-trade prevention. Zero denotes an
/// unknown (anonymous) owner.
pub type TraderId = u64;

/// Side of the book an order rests on or attacks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Side {
    /// Buy side. Best bid is the highest resting price.
    Bid = 0,
    /// Sell side. Best ask is the lowest resting price.
    Ask = 1,
}

impl Side {
    /// Legacy alias used by boundary callers; identical to [`Side::Bid`].
    pub const BUY: Side = Side::Bid;
    /// Legacy alias used by boundary callers; identical to [`Side::Ask`].
    pub const SELL: Side = Side::Ask;

    /// The side a marketable order on `self` trades against.
    #[must_use]
    #[inline]
    pub fn opposite(self) -> Side {
        match self {
            Side::Bid => Side::Ask,
            Side::Ask => Side::Bid,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Bid => write!(f, "BID"),
            Side::Ask => write!(f, "ASK"),
        }
    }
}

/// Whether an incoming order carries a limit price or takes whatever is there.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum OrderType {
    /// Executes at `px` or better; any remainder may rest (subject to TIF).
    Limit = 0,
    /// Executes against the best available prices; never rests.
    Market = 1,
}

/// Time-in-force policy for an incoming order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum TimeInForce {
    /// Rest any unfilled remainder in the book (default).
    #[default]
    Day = 0,
    /// Immediate-or-cancel: execute what crosses now, discard the rest.
    Ioc = 1,
    /// Fill-or-kill: execute the entire quantity atomically or do nothing.
    Fok = 2,
}

impl fmt::Display for TimeInForce {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimeInForce::Day => write!(f, "DAY"),
            TimeInForce::Ioc => write!(f, "IOC"),
            TimeInForce::Fok => write!(f, "FOK"),
        }
    }
}

/// Snapshot of the top of the book.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BestOfBook {
    /// Highest resting bid price, if any.
    pub bid: Option<Price>,
    /// Lowest resting ask price, if any.
    pub ask: Option<Price>,
}

impl BestOfBook {
    /// Arithmetic midpoint of best bid and best ask.
    #[must_use]
    pub fn mid(&self) -> Option<f64> {
        match (self.bid, self.ask) {
            (Some(b), Some(a)) => Some(0.5 * (b as f64 + a as f64)),
            _ => None,
        }
    }

    /// Best ask minus best bid.
    #[must_use]
    pub fn spread(&self) -> Option<Price> {
        match (self.bid, self.ask) {
            (Some(b), Some(a)) => Some(a - b),
            _ => None,
        }
    }
}

/// A single execution produced by [`crate::orderbook::Book::submit`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchFill {
    /// Incoming (aggressive) order id.
    pub taker_id: OrderId,
    /// Resting (passive) order id.
    pub maker_id: OrderId,
    /// Execution price, always the maker's resting price.
    pub px: Price,
    /// Executed quantity.
    pub qty: Qty,
}

/// Outcome of a matching submit.
#[derive(Debug, Clone, Default)]
pub struct MatchResult {
    /// Executions in the order they occurred.
    pub fills: Vec<MatchFill>,
    /// Whether any resting state changed (fills, STP cancels, posting).
    pub book_changed: bool,
    /// Quantity left resting in the book (zero for Market/IOC/FOK).
    pub posted_qty: Qty,
}

impl MatchResult {
    /// Total quantity executed across all fills.
    #[must_use]
    pub fn executed_qty(&self) -> Qty {
        self.fills.iter().map(|f| f.qty).sum()
    }
}

/// Outcome of a cancel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CancelResult {
    /// Whether the order existed and was removed.
    pub ok: bool,
    /// Quantity that was resting at the time of the cancel.
    pub qty_canceled: Qty,
    /// Price the order was resting at.
    pub px: Price,
    /// Side the order was resting on.
    pub side: Side,
}

impl CancelResult {
    pub(crate) fn not_found() -> Self {
        CancelResult {
            ok: false,
            qty_canceled: 0,
            px: 0,
            side: Side::Bid,
        }
    }
}

/// Outcome of a replace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplaceResult {
    /// Whether the replace took effect. A FOK resubmit that neither fills
    /// nor posts reports `false` even though the original is already gone.
    pub ok: bool,
    /// The order id the replace addressed (reused on resubmit).
    pub id: OrderId,
}

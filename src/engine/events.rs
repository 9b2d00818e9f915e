//! Events carried on the bus.
//!
//! Every variant is a small plain-old-data struct so the bus can construct
//! payloads in place; nothing here allocates.

use crate::orderbook::{OrderId, Price, Qty, Side};
use serde::{Deserialize, Serialize};

/// One execution between a taker and a resting maker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FillEvent {
    /// Incoming (aggressive) order id.
    pub taker_id: OrderId,
    /// Resting (passive) order id.
    pub maker_id: OrderId,
    /// Side of the submitting (taker) order.
    pub taker_side: Side,
    /// Execution price (the maker's resting price).
    pub px: Price,
    /// Executed quantity.
    pub qty: Qty,
}

/// A resting order was removed on request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CancelEvent {
    /// The canceled order id.
    pub id: OrderId,
    /// Side it rested on.
    pub side: Side,
    /// Price it rested at.
    pub px: Price,
    /// Quantity removed.
    pub qty_canceled: Qty,
}

/// Resting depth changed at a price level.
///
/// `px == 0 && level_qty == 0` is the coarse sentinel meaning "an
/// unspecified best level changed", emitted for market orders where the
/// engine does not pin a price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookChangeEvent {
    /// Side of the affected level.
    pub side: Side,
    /// Affected price, or `0` for the sentinel.
    pub px: Price,
    /// Total resting quantity at `px` after the change, or `0` for the
    /// sentinel.
    pub level_qty: Qty,
}

/// Tagged union of everything the engine publishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Event {
    /// An execution occurred.
    Fill(FillEvent),
    /// A resting order was canceled.
    Cancel(CancelEvent),
    /// A price level's depth changed.
    BookChange(BookChangeEvent),
}

impl Event {
    /// The fill payload, when this is a fill.
    #[must_use]
    pub fn as_fill(&self) -> Option<&FillEvent> {
        match self {
            Event::Fill(f) => Some(f),
            _ => None,
        }
    }

    /// The cancel payload, when this is a cancel.
    #[must_use]
    pub fn as_cancel(&self) -> Option<&CancelEvent> {
        match self {
            Event::Cancel(c) => Some(c),
            _ => None,
        }
    }

    /// The book-change payload, when this is a book change.
    #[must_use]
    pub fn as_book_change(&self) -> Option<&BookChangeEvent> {
        match self {
            Event::BookChange(b) => Some(b),
            _ => None,
        }
    }
}

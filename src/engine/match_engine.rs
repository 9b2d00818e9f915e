//! Thin orchestrator between callers, the book, and the event bus.
//!
//! Every operation calls the book first, then serializes the outcome into
//! events. Publication happens strictly after the book mutation completes,
//! so a consumer that observes an event also observes every state write that
//! preceded the corresponding push. The engine never blocks: when the bus is
//! full the event is dropped.

use super::bus::EventPublisher;
use super::events::{BookChangeEvent, CancelEvent, Event, FillEvent};
use crate::orderbook::{
    Book, BookConfig, MatchResult, OrderId, OrderType, Price, Qty, Side, TimeInForce, TraderId,
};
use tracing::trace;

/// One book plus the producing half of one event bus.
pub struct MatchEngine {
    book: Book,
    bus: EventPublisher,
}

impl MatchEngine {
    /// Engine over an empty book with the default configuration.
    #[must_use]
    pub fn new(bus: EventPublisher) -> Self {
        Self::with_config(bus, BookConfig::default())
    }

    /// Engine over an empty book with an explicit configuration (STP policy).
    #[must_use]
    pub fn with_config(bus: EventPublisher, cfg: BookConfig) -> Self {
        MatchEngine {
            book: Book::with_config(cfg),
            bus,
        }
    }

    /// Read access to the book for queries and invariant checks.
    #[must_use]
    pub fn book(&self) -> &Book {
        &self.book
    }

    /// Submit an anonymous Day limit order.
    pub fn add(&mut self, id: OrderId, side: Side, px: Price, qty: Qty) {
        self.add_for_trader(0, id, side, px, qty, TimeInForce::Day);
    }

    /// Submit a limit order for `trader` with an explicit time in force.
    pub fn add_for_trader(
        &mut self,
        trader: TraderId,
        id: OrderId,
        side: Side,
        px: Price,
        qty: Qty,
        tif: TimeInForce,
    ) {
        let r = self
            .book
            .submit(trader, side, px, qty, id, OrderType::Limit, tif);
        self.publish_fills(&r, side);
        if r.posted_qty > 0 || r.book_changed {
            let level_qty = self.book.level_qty(side, px);
            self.publish(Event::BookChange(BookChangeEvent {
                side,
                px,
                level_qty,
            }));
        }
    }

    /// Submit an anonymous market order (IOC).
    pub fn market(&mut self, id: OrderId, side: Side, qty: Qty) {
        self.market_for_trader(0, id, side, qty, TimeInForce::Ioc);
    }

    /// Submit a market order for `trader` with an explicit time in force.
    pub fn market_for_trader(
        &mut self,
        trader: TraderId,
        id: OrderId,
        side: Side,
        qty: Qty,
        tif: TimeInForce,
    ) {
        let r = self
            .book
            .submit(trader, side, 0, qty, id, OrderType::Market, tif);
        self.publish_fills(&r, side);
        if r.book_changed {
            // Sentinel: a best level changed, price not pinned.
            self.publish(Event::BookChange(BookChangeEvent {
                side,
                px: 0,
                level_qty: 0,
            }));
        }
    }

    /// Amend a resting order. On success, conservative book-change
    /// notifications are published for both sides at the amended price.
    pub fn replace(
        &mut self,
        trader: TraderId,
        id: OrderId,
        new_px: Price,
        new_qty: Qty,
        tif: TimeInForce,
    ) {
        let rr = self.book.replace(trader, id, new_px, new_qty, tif);
        if rr.ok {
            for side in [Side::Bid, Side::Ask] {
                let level_qty = self.book.level_qty(side, new_px);
                self.publish(Event::BookChange(BookChangeEvent {
                    side,
                    px: new_px,
                    level_qty,
                }));
            }
        }
    }

    /// Cancel a resting order, publishing the cancel and the resulting
    /// level depth.
    pub fn cancel(&mut self, id: OrderId) {
        let c = self.book.cancel(id);
        if c.ok {
            self.publish(Event::Cancel(CancelEvent {
                id,
                side: c.side,
                px: c.px,
                qty_canceled: c.qty_canceled,
            }));
            let level_qty = self.book.level_qty(c.side, c.px);
            self.publish(Event::BookChange(BookChangeEvent {
                side: c.side,
                px: c.px,
                level_qty,
            }));
        }
    }

    fn publish_fills(&mut self, r: &MatchResult, taker_side: Side) {
        for f in &r.fills {
            self.publish(Event::Fill(FillEvent {
                taker_id: f.taker_id,
                maker_id: f.maker_id,
                taker_side,
                px: f.px,
                qty: f.qty,
            }));
        }
    }

    #[inline]
    fn publish(&mut self, event: Event) {
        if !self.bus.try_publish(event) {
            // Bus full: the consumer is behind. Dropping here keeps the
            // matching path non-blocking.
            trace!("event bus full, dropping {event:?}");
        }
    }
}

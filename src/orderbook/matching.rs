//! The matching engine core: marketable submits.
//!
//! Matching is strict price-time priority: levels are consumed from the best
//! opposite price outward, and within a level strictly head-first (FIFO on
//! arrival). Self-trade prevention only consumes or skips the head; it never
//! reorders the queue.

use super::book::Book;
use super::level::PriceLevel;
use super::stp::StpPolicy;
use super::types::{
    MatchFill, MatchResult, OrderId, OrderType, Price, Qty, Side, TimeInForce, TraderId,
};
use tracing::trace;

impl Book {
    /// Submit an order for matching.
    ///
    /// Crosses against the opposite side while marketable, then disposes of
    /// any remainder according to `kind` and `tif`: Market and IOC discard
    /// it, Day limits post it at `px` under `trader`'s ownership, and FOK
    /// never has one thanks to the pre-check.
    ///
    /// Returns an empty result (no fills, nothing posted, no state change)
    /// when `qty` is not positive, when a limit order carries a non-positive
    /// price, when `id` is already resting in the book, or when a FOK order
    /// cannot be filled in full.
    #[allow(clippy::too_many_arguments)]
    pub fn submit(
        &mut self,
        trader: TraderId,
        side: Side,
        px: Price,
        qty: Qty,
        id: OrderId,
        kind: OrderType,
        tif: TimeInForce,
    ) -> MatchResult {
        let mut out = MatchResult::default();
        if qty <= 0 {
            return out;
        }
        if kind == OrderType::Limit && px <= 0 {
            return out;
        }
        if self.id_index.contains_key(&id) {
            return out; // duplicate id
        }
        trace!("submit trader={trader} id={id} {side} px={px} qty={qty} {kind:?} {tif}");

        // All-or-nothing pre-check: reject before touching the book.
        if tif == TimeInForce::Fok && self.reachable_qty(side, px, kind, qty) < qty {
            return out;
        }

        let mut taker_qty = qty;
        let stp = self.cfg.stp;
        let (opposite, opposite_total) = match side {
            Side::Bid => (&mut self.asks, &mut self.asks_total),
            Side::Ask => (&mut self.bids, &mut self.bids_total),
        };

        while taker_qty > 0 {
            let best = match side {
                Side::Bid => opposite.first_key_value().map(|(p, _)| *p),
                Side::Ask => opposite.last_key_value().map(|(p, _)| *p),
            };
            let Some(best_px) = best else { break };
            if kind != OrderType::Market && !Book::crosses(side, px, best_px) {
                break;
            }
            let Some(lvl) = opposite.get_mut(&best_px) else {
                break;
            };

            // FIFO within the level: always the oldest node first.
            while taker_qty > 0 {
                let Some(head) = lvl.front() else { break };
                let (maker_id, maker_qty) = {
                    let maker = self.arena.get(head);
                    (maker.id, maker.qty)
                };

                let maker_owner = self.owners.get(&maker_id).copied().unwrap_or(0);
                if stp.is_enabled() && maker_owner != 0 && maker_owner == trader {
                    let overlap = taker_qty.min(maker_qty);
                    match stp {
                        StpPolicy::Allow => {}
                        StpPolicy::CancelTaker => {
                            // Maker untouched; drop the incoming overlap and
                            // re-examine the (same) head until drained.
                            taker_qty -= overlap;
                            continue;
                        }
                        StpPolicy::CancelMaker => {
                            let remains = lvl.reduce(&mut self.arena, head, overlap);
                            *opposite_total -= overlap;
                            if !remains {
                                lvl.unlink(&mut self.arena, head);
                                self.arena.free(head);
                                self.id_index.remove(&maker_id);
                                self.owners.remove(&maker_id);
                            }
                            out.book_changed = true;
                            // Drop the taker so one submission cannot keep
                            // cancelling further resting orders of this owner.
                            taker_qty = 0;
                            continue;
                        }
                        StpPolicy::CancelBoth => {
                            taker_qty -= overlap;
                            let remains = lvl.reduce(&mut self.arena, head, overlap);
                            *opposite_total -= overlap;
                            if !remains {
                                lvl.unlink(&mut self.arena, head);
                                self.arena.free(head);
                                self.id_index.remove(&maker_id);
                                self.owners.remove(&maker_id);
                            }
                            out.book_changed = true;
                            continue;
                        }
                    }
                }

                let traded = taker_qty.min(maker_qty);
                let remains = lvl.reduce(&mut self.arena, head, traded);
                taker_qty -= traded;
                *opposite_total -= traded;
                out.fills.push(MatchFill {
                    taker_id: id,
                    maker_id,
                    px: best_px,
                    qty: traded,
                });
                out.book_changed = true;
                if !remains {
                    lvl.unlink(&mut self.arena, head);
                    self.arena.free(head);
                    self.id_index.remove(&maker_id);
                    self.owners.remove(&maker_id);
                }
            }

            if lvl.is_empty() {
                opposite.remove(&best_px);
            }
        }

        // Market and IOC discard the remainder: no post, no resting id.
        if kind == OrderType::Market || tif == TimeInForce::Ioc {
            return out;
        }

        // Day limit: post the remainder at the taker's own price.
        if taker_qty > 0 && kind == OrderType::Limit {
            let idx = self.arena.alloc(id, side, px, taker_qty, 0);
            let map = match side {
                Side::Bid => &mut self.bids,
                Side::Ask => &mut self.asks,
            };
            map.entry(px)
                .or_insert_with(|| PriceLevel::new(px))
                .push_back(&mut self.arena, idx);
            self.id_index.insert(id, idx);
            self.owners.insert(id, trader);
            match side {
                Side::Bid => self.bids_total += taker_qty,
                Side::Ask => self.asks_total += taker_qty,
            }
            out.posted_qty = taker_qty;
            out.book_changed = true;
        }

        out
    }

    /// Opposite-side quantity reachable by a taker with limit `px` (or any
    /// price for Market), summed from the best level outward. Stops early
    /// once `needed` is reachable. Side-effect free.
    fn reachable_qty(&self, side: Side, px: Price, kind: OrderType, needed: Qty) -> Qty {
        let mut reachable: Qty = 0;
        let levels: Box<dyn Iterator<Item = (&Price, &PriceLevel)> + '_> = match side {
            Side::Bid => Box::new(self.asks.iter()),
            Side::Ask => Box::new(self.bids.iter().rev()),
        };
        for (&level_px, lvl) in levels {
            if kind != OrderType::Market && !Book::crosses(side, px, level_px) {
                break;
            }
            reachable += lvl.total_qty;
            if reachable >= needed {
                break;
            }
        }
        reachable
    }
}

//! Non-matching book operations: add, reduce, cancel, replace.
//!
//! All business failures are reported through the return value; none of these
//! operations panic or mutate state on a failed validation.

use super::book::Book;
use super::level::PriceLevel;
use super::types::{
    CancelResult, OrderId, OrderType, Price, Qty, ReplaceResult, Side, TimeInForce, TimeNs,
    TraderId,
};
use tracing::trace;

impl Book {
    /// Insert a resting order without matching.
    ///
    /// Fails (returns `false`, no state change) when the id already exists,
    /// `qty` is not positive, or the order would lock or cross the book
    /// (bid at or above the best ask, ask at or below the best bid).
    ///
    /// Orders added this way carry owner `0` (unknown); use
    /// [`Book::submit`] to attach a trader identity.
    pub fn add(&mut self, id: OrderId, side: Side, px: Price, qty: Qty, ts_ns: TimeNs) -> bool {
        if qty <= 0 || self.id_index.contains_key(&id) {
            return false;
        }
        match side {
            Side::Bid => {
                if self.best_ask().is_some_and(|ask| px >= ask) {
                    return false; // would lock/cross
                }
            }
            Side::Ask => {
                if self.best_bid().is_some_and(|bid| px <= bid) {
                    return false; // would lock/cross
                }
            }
        }

        let idx = self.arena.alloc(id, side, px, qty, ts_ns);
        let map = match side {
            Side::Bid => &mut self.bids,
            Side::Ask => &mut self.asks,
        };
        map.entry(px)
            .or_insert_with(|| PriceLevel::new(px))
            .push_back(&mut self.arena, idx);
        self.id_index.insert(id, idx);
        self.owners.insert(id, 0);
        match side {
            Side::Bid => self.bids_total += qty,
            Side::Ask => self.asks_total += qty,
        }
        trace!("add id={id} {side} px={px} qty={qty}");
        true
    }

    /// Decrease a resting order's quantity by `dq`.
    ///
    /// `dq == 0` is a no-op success. Fails when `dq` is negative, the id is
    /// unknown, or `dq` exceeds the remaining quantity. Reducing to zero
    /// removes the order, exactly like [`Book::cancel`].
    pub fn reduce(&mut self, id: OrderId, dq: Qty) -> bool {
        if dq <= 0 {
            return dq == 0;
        }
        let Some(&idx) = self.id_index.get(&id) else {
            return false;
        };
        let (side, px, qty) = {
            let node = self.arena.get(idx);
            (node.side, node.px, node.qty)
        };
        if dq > qty {
            return false;
        }

        let (map, side_total) = match side {
            Side::Bid => (&mut self.bids, &mut self.bids_total),
            Side::Ask => (&mut self.asks, &mut self.asks_total),
        };
        let Some(lvl) = map.get_mut(&px) else {
            return false;
        };
        let remains = lvl.reduce(&mut self.arena, idx, dq);
        *side_total -= dq;
        if !remains {
            self.remove_node(idx);
        }
        trace!("reduce id={id} dq={dq} remains={remains}");
        true
    }

    /// Remove a resting order entirely.
    ///
    /// Returns the canceled quantity, price, and side on success; `ok` is
    /// `false` only when the id is unknown. A cancel never touches the
    /// opposite side of the book.
    pub fn cancel(&mut self, id: OrderId) -> CancelResult {
        let Some(&idx) = self.id_index.get(&id) else {
            return CancelResult::not_found();
        };
        let (side, px, qty) = {
            let node = self.arena.get(idx);
            (node.side, node.px, node.qty)
        };
        match side {
            Side::Bid => self.bids_total -= qty,
            Side::Ask => self.asks_total -= qty,
        }
        self.remove_node(idx);
        trace!("cancel id={id} {side} px={px} qty={qty}");
        CancelResult {
            ok: true,
            qty_canceled: qty,
            px,
            side,
        }
    }

    /// Amend a resting order's price and/or quantity.
    ///
    /// When the price is unchanged and the quantity does not increase, the
    /// order is reduced in place and keeps its position in the FIFO. Any
    /// other change cancels the original and resubmits a fresh limit order
    /// under the same id, resetting time priority and honoring `tif`.
    ///
    /// Fails with no changes when the id is unknown, the recorded owner is
    /// non-zero and differs from `trader`, or `new_qty` is not positive. A
    /// FOK resubmit that neither fills nor posts reports `ok == false`; the
    /// original order is gone either way (no stranded ids).
    pub fn replace(
        &mut self,
        trader: TraderId,
        id: OrderId,
        new_px: Price,
        new_qty: Qty,
        tif: TimeInForce,
    ) -> ReplaceResult {
        let Some(&idx) = self.id_index.get(&id) else {
            return ReplaceResult { ok: false, id };
        };
        let owner = self.owners.get(&id).copied().unwrap_or(0);
        if owner != 0 && owner != trader {
            return ReplaceResult { ok: false, id };
        }
        if new_qty <= 0 {
            return ReplaceResult { ok: false, id };
        }

        let (side, px, qty) = {
            let node = self.arena.get(idx);
            (node.side, node.px, node.qty)
        };

        // Same price, same or smaller size: amend in place, keep priority.
        if new_px == px && new_qty <= qty {
            let delta = qty - new_qty;
            if delta > 0 {
                let (map, side_total) = match side {
                    Side::Bid => (&mut self.bids, &mut self.bids_total),
                    Side::Ask => (&mut self.asks, &mut self.asks_total),
                };
                let Some(lvl) = map.get_mut(&px) else {
                    return ReplaceResult { ok: false, id };
                };
                // new_qty >= 1, so the node always survives the reduce
                lvl.reduce(&mut self.arena, idx, delta);
                *side_total -= delta;
            }
            trace!("replace id={id} in-place px={px} qty {qty}->{new_qty}");
            return ReplaceResult { ok: true, id };
        }

        // Price change or size increase: cancel then resubmit, new priority.
        let canceled = self.cancel(id);
        if !canceled.ok {
            return ReplaceResult { ok: false, id };
        }
        let resubmit = self.submit(
            trader,
            canceled.side,
            new_px,
            new_qty,
            id,
            OrderType::Limit,
            tif,
        );
        let ok = if tif == TimeInForce::Fok {
            !resubmit.fills.is_empty() || resubmit.posted_qty > 0
        } else {
            true
        };
        trace!("replace id={id} resubmit px={new_px} qty={new_qty} {tif} ok={ok}");
        ReplaceResult { ok, id }
    }
}

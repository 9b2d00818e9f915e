//! Whole-book structural invariant checker.
//!
//! A non-empty result is a bug in the book, not a runtime condition. The
//! property fuzzer and the soak driver run this after every mutation and
//! treat any diagnostic as fatal.

use super::arena::NIL;
use super::book::Book;
use super::level::PriceLevel;
use super::types::{Price, Qty, Side};
use std::collections::BTreeMap;

impl Book {
    /// Verify every structural invariant; returns one diagnostic string per
    /// violation. An empty vector means the book is healthy.
    ///
    /// Checked, per side:
    /// - each level's list is well-formed (head has no prev, tail has no
    ///   next, prev/next mutually consistent) and walking it visits exactly
    ///   `count` nodes whose quantities sum to `total_qty`;
    /// - every walked node carries the level's price and side, positive
    ///   quantity, and an id-index entry pointing back at its slot;
    /// - no empty level is retained in the map;
    /// - level totals sum to the cached side total.
    ///
    /// Globally: the id index has exactly one entry per linked node, and the
    /// book is never locked or crossed (best bid strictly below best ask).
    #[must_use]
    pub fn check_invariants(&self) -> Vec<String> {
        let mut errs = Vec::new();

        let bid_nodes = self.check_side(&self.bids, Side::Bid, self.bids_total, &mut errs);
        let ask_nodes = self.check_side(&self.asks, Side::Ask, self.asks_total, &mut errs);

        let linked = bid_nodes + ask_nodes;
        if linked != self.id_index.len() {
            errs.push(format!(
                "id_index size mismatch: {} entries, {} linked nodes",
                self.id_index.len(),
                linked
            ));
        }
        if self.arena.len() != self.id_index.len() {
            errs.push(format!(
                "arena leak: {} live slots, {} indexed orders",
                self.arena.len(),
                self.id_index.len()
            ));
        }
        if self.owners.len() != self.id_index.len() {
            errs.push(format!(
                "owner map size mismatch: {} owners, {} indexed orders",
                self.owners.len(),
                self.id_index.len()
            ));
        }

        if let (Some(bid), Some(ask)) = (self.best_bid(), self.best_ask()) {
            if bid >= ask {
                errs.push(format!(
                    "locked/crossed book: best_bid {bid} >= best_ask {ask}"
                ));
            }
        }

        errs
    }

    /// Walk one side; returns the number of linked nodes seen.
    fn check_side(
        &self,
        side_map: &BTreeMap<Price, PriceLevel>,
        side: Side,
        side_total: Qty,
        errs: &mut Vec<String>,
    ) -> usize {
        let mut sum_levels: Qty = 0;
        let mut nodes_seen = 0usize;

        for (&px, lvl) in side_map {
            if lvl.price != px {
                errs.push(format!("level key/price mismatch @{px}"));
            }
            if lvl.is_empty() {
                errs.push(format!("empty level retained @{px}"));
            }
            if (lvl.count == 0) != (lvl.head == NIL && lvl.tail == NIL) {
                errs.push(format!("empty level head/tail mismatch @{px}"));
            }

            let mut walk_qty: Qty = 0;
            let mut walked = 0usize;
            let mut prev = NIL;
            let mut cur = lvl.head;
            while cur != NIL {
                let node = self.arena.get(cur);
                walked += 1;
                walk_qty += node.qty;
                nodes_seen += 1;

                if node.qty <= 0 {
                    errs.push(format!("non-positive resting qty id={}", node.id));
                }
                if node.px != px || node.side != side {
                    errs.push(format!("node/level mismatch id={}", node.id));
                }
                if node.prev != prev {
                    errs.push(format!("broken prev link @{px}"));
                }
                match self.id_index.get(&node.id) {
                    Some(&idx) if idx == cur => {}
                    _ => errs.push(format!("id_index mismatch id={}", node.id)),
                }

                prev = cur;
                cur = node.next;
            }
            if prev != lvl.tail {
                errs.push(format!("tail link mismatch @{px}"));
            }
            if walked != lvl.count {
                errs.push(format!("level.count mismatch @{px}"));
            }
            if walk_qty != lvl.total_qty {
                errs.push(format!("level.total_qty mismatch @{px}"));
            }
            sum_levels += lvl.total_qty;
        }

        if sum_levels != side_total {
            errs.push(format!("side total mismatch {side}"));
        }
        nodes_seen
    }
}

//! Core limit order book: two price-ordered sides plus an id index.
//!
//! The book is owned by exactly one thread (the engine's producer thread).
//! All operations take `&mut self`; cross-thread visibility of their effects
//! is provided by the event bus, not by the book itself.

use super::arena::{NodeArena, OrderNode};
use super::level::PriceLevel;
use super::stp::StpPolicy;
use super::types::{BestOfBook, OrderId, Price, Qty, Side, TraderId};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Book-level configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookConfig {
    /// Self-Trade Prevention policy. Defaults to [`StpPolicy::Allow`].
    pub stp: StpPolicy,
}

/// A price-time priority limit order book for a single symbol.
///
/// Bids and asks are ordered maps from price to [`PriceLevel`]; the best bid
/// is the highest key on the bid map and the best ask the lowest key on the
/// ask map. A hash index maps live order ids to their arena slots, and an
/// owner map records the trader behind each resting order for STP and
/// replace-ownership checks.
pub struct Book {
    /// Bid-side levels keyed by price; best bid = highest key.
    pub(super) bids: BTreeMap<Price, PriceLevel>,

    /// Ask-side levels keyed by price; best ask = lowest key.
    pub(super) asks: BTreeMap<Price, PriceLevel>,

    /// Live order id to arena slot. Exactly one entry per resting node.
    pub(super) id_index: HashMap<OrderId, u32>,

    /// Live order id to owning trader; `0` means unknown owner.
    pub(super) owners: HashMap<OrderId, TraderId>,

    /// Node storage shared by both sides.
    pub(super) arena: NodeArena,

    /// Cached sum of resting bid quantity across all bid levels.
    pub(super) bids_total: Qty,

    /// Cached sum of resting ask quantity across all ask levels.
    pub(super) asks_total: Qty,

    /// Book configuration (STP policy).
    pub(super) cfg: BookConfig,
}

impl Default for Book {
    fn default() -> Self {
        Self::new()
    }
}

impl Book {
    /// Create an empty book with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(BookConfig::default())
    }

    /// Create an empty book with an explicit configuration.
    #[must_use]
    pub fn with_config(cfg: BookConfig) -> Self {
        Book {
            bids: BTreeMap::new(),
            asks: BTreeMap::new(),
            id_index: HashMap::new(),
            owners: HashMap::new(),
            arena: NodeArena::with_capacity(1024),
            bids_total: 0,
            asks_total: 0,
            cfg,
        }
    }

    /// The active STP policy.
    #[must_use]
    #[inline]
    pub fn stp_policy(&self) -> StpPolicy {
        self.cfg.stp
    }

    /// Change the STP policy. Takes effect for subsequent submits only.
    pub fn set_stp_policy(&mut self, stp: StpPolicy) {
        self.cfg.stp = stp;
    }

    /// Whether an order with this id is resting in the book.
    #[must_use]
    #[inline]
    pub fn has(&self, id: OrderId) -> bool {
        self.id_index.contains_key(&id)
    }

    /// The resting node for `id`, if present.
    #[must_use]
    pub fn order(&self, id: OrderId) -> Option<&OrderNode> {
        self.id_index.get(&id).map(|&idx| self.arena.get(idx))
    }

    /// The recorded owner of `id`; `0` when unknown or not resting.
    #[must_use]
    pub fn owner(&self, id: OrderId) -> TraderId {
        self.owners.get(&id).copied().unwrap_or(0)
    }

    /// Top of book on both sides.
    #[must_use]
    pub fn best(&self) -> BestOfBook {
        BestOfBook {
            bid: self.best_bid(),
            ask: self.best_ask(),
        }
    }

    /// Highest resting bid price.
    #[must_use]
    #[inline]
    pub fn best_bid(&self) -> Option<Price> {
        self.bids.last_key_value().map(|(px, _)| *px)
    }

    /// Lowest resting ask price.
    #[must_use]
    #[inline]
    pub fn best_ask(&self) -> Option<Price> {
        self.asks.first_key_value().map(|(px, _)| *px)
    }

    /// Total resting quantity at `(side, px)`, zero when the level is absent.
    #[must_use]
    pub fn level_qty(&self, side: Side, px: Price) -> Qty {
        let map = match side {
            Side::Bid => &self.bids,
            Side::Ask => &self.asks,
        };
        map.get(&px).map_or(0, |lvl| lvl.total_qty)
    }

    /// Cached total resting quantity on one side.
    #[must_use]
    #[inline]
    pub fn side_total(&self, side: Side) -> Qty {
        match side {
            Side::Bid => self.bids_total,
            Side::Ask => self.asks_total,
        }
    }

    /// Number of resting orders across both sides.
    #[must_use]
    pub fn order_count(&self) -> usize {
        self.id_index.len()
    }

    /// Number of non-empty price levels on one side.
    #[must_use]
    pub fn level_count(&self, side: Side) -> usize {
        match side {
            Side::Bid => self.bids.len(),
            Side::Ask => self.asks.len(),
        }
    }

    /// Whether a taker on `taker_side` with limit `px` trades at `best`, the
    /// best opposite price.
    #[inline]
    pub(super) fn crosses(taker_side: Side, px: Price, best: Price) -> bool {
        match taker_side {
            Side::Bid => px >= best,
            Side::Ask => px <= best,
        }
    }

    /// Fully unlink a resting node and drop every reference to it: level
    /// list, id index, owner map, arena slot. Removes the level when it
    /// becomes empty. Side totals are the caller's responsibility.
    pub(super) fn remove_node(&mut self, idx: u32) {
        let (id, side, px) = {
            let node = self.arena.get(idx);
            (node.id, node.side, node.px)
        };
        let map = match side {
            Side::Bid => &mut self.bids,
            Side::Ask => &mut self.asks,
        };
        if let Some(lvl) = map.get_mut(&px) {
            lvl.unlink(&mut self.arena, idx);
            if lvl.is_empty() {
                map.remove(&px);
            }
        }
        self.id_index.remove(&id);
        self.owners.remove(&id);
        self.arena.free(idx);
    }
}

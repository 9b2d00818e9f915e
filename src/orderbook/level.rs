//! A single price level: a FIFO queue of resting orders at one price.
//!
//! The queue is a doubly-linked list threaded through the node arena by slot
//! index. `total_qty` and `count` are cached so that depth queries and the
//! FOK pre-check never walk the list.

use super::arena::{NIL, NodeArena};
use super::types::{Price, Qty};

/// Resting orders at one price, oldest first.
#[derive(Debug, Clone)]
pub struct PriceLevel {
    /// The level's price; every linked node carries the same price.
    pub price: Price,
    /// Sum of remaining quantities of all linked nodes.
    pub total_qty: Qty,
    /// Number of linked nodes.
    pub count: usize,
    pub(super) head: u32,
    pub(super) tail: u32,
}

impl PriceLevel {
    pub(super) fn new(price: Price) -> Self {
        PriceLevel {
            price,
            total_qty: 0,
            count: 0,
            head: NIL,
            tail: NIL,
        }
    }

    /// Index of the oldest resting node, or `None` when the level is empty.
    #[inline]
    pub(super) fn front(&self) -> Option<u32> {
        (self.head != NIL).then_some(self.head)
    }

    #[must_use]
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Append a node at the tail, preserving arrival order.
    pub(super) fn push_back(&mut self, arena: &mut NodeArena, idx: u32) {
        let old_tail = self.tail;
        {
            let node = arena.get_mut(idx);
            node.prev = old_tail;
            node.next = NIL;
        }
        if old_tail != NIL {
            arena.get_mut(old_tail).next = idx;
        } else {
            self.head = idx;
        }
        self.tail = idx;
        self.count += 1;
        self.total_qty += arena.get(idx).qty;
    }

    /// Unlink a node from the list and clear its links. The node's remaining
    /// quantity is deducted from the level total; the slot is not freed here.
    pub(super) fn unlink(&mut self, arena: &mut NodeArena, idx: u32) {
        let (prev, next, qty) = {
            let node = arena.get(idx);
            (node.prev, node.next, node.qty)
        };
        if prev != NIL {
            arena.get_mut(prev).next = next;
        } else {
            self.head = next;
        }
        if next != NIL {
            arena.get_mut(next).prev = prev;
        } else {
            self.tail = prev;
        }
        {
            let node = arena.get_mut(idx);
            node.prev = NIL;
            node.next = NIL;
        }
        self.count -= 1;
        self.total_qty -= qty;
    }

    /// Subtract `dq` from a node and from the level total. Returns whether
    /// the node still has positive remaining quantity.
    ///
    /// Precondition: `0 <= dq <= node.qty`.
    pub(super) fn reduce(&mut self, arena: &mut NodeArena, idx: u32, dq: Qty) -> bool {
        let node = arena.get_mut(idx);
        debug_assert!(dq >= 0 && dq <= node.qty);
        node.qty -= dq;
        self.total_qty -= dq;
        node.qty > 0
    }
}

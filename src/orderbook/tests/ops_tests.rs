//! Non-matching operations: add, reduce, cancel, and the ghost-freedom
//! guarantees around them.

use super::test_helpers::{assert_healthy, post};
use crate::orderbook::{Book, OrderType, Side, TimeInForce};

#[test]
fn add_rests_and_updates_totals() {
    let mut book = Book::new();
    assert!(book.add(1, Side::Bid, 100, 7, 11));
    assert!(book.add(2, Side::Ask, 105, 3, 12));

    assert!(book.has(1));
    assert_eq!(book.best().bid, Some(100));
    assert_eq!(book.best().ask, Some(105));
    assert_eq!(book.side_total(Side::Bid), 7);
    assert_eq!(book.side_total(Side::Ask), 3);
    assert_eq!(book.owner(1), 0);
    assert_eq!(book.order(1).map(|n| n.ts_ns), Some(11));
    assert_healthy(&book);
}

#[test]
fn add_rejects_duplicate_id() {
    let mut book = Book::new();
    assert!(book.add(1, Side::Bid, 100, 5, 0));
    assert!(!book.add(1, Side::Bid, 99, 5, 0));
    assert!(!book.add(1, Side::Ask, 105, 5, 0));
    assert_eq!(book.order_count(), 1);
    assert_healthy(&book);
}

#[test]
fn add_rejects_non_positive_qty() {
    let mut book = Book::new();
    assert!(!book.add(1, Side::Bid, 100, 0, 0));
    assert!(!book.add(2, Side::Bid, 100, -4, 0));
    assert_eq!(book.order_count(), 0);
}

#[test]
fn add_rejects_locking_or_crossing() {
    let mut book = Book::new();
    assert!(book.add(1, Side::Ask, 100, 5, 0));

    // Bid at the ask (lock) or above it (cross): both rejected.
    assert!(!book.add(2, Side::Bid, 100, 5, 0));
    assert!(!book.add(3, Side::Bid, 101, 5, 0));
    assert!(book.add(4, Side::Bid, 99, 5, 0));

    // Mirror for asks against the best bid.
    assert!(!book.add(5, Side::Ask, 99, 5, 0));
    assert!(!book.add(6, Side::Ask, 98, 5, 0));
    assert_healthy(&book);
}

#[test]
fn reduce_zero_is_a_no_op_success() {
    let mut book = Book::new();
    assert!(book.add(1, Side::Bid, 100, 5, 0));
    assert!(book.reduce(1, 0));
    assert_eq!(book.order(1).map(|n| n.qty), Some(5));
    assert_healthy(&book);
}

#[test]
fn reduce_rejects_negative_excess_and_unknown() {
    let mut book = Book::new();
    assert!(book.add(1, Side::Bid, 100, 5, 0));
    assert!(!book.reduce(1, -1));
    assert!(!book.reduce(1, 6));
    assert!(!book.reduce(99, 1));
    assert_eq!(book.order(1).map(|n| n.qty), Some(5));
    assert_eq!(book.side_total(Side::Bid), 5);
    assert_healthy(&book);
}

#[test]
fn reduce_partial_updates_node_and_totals() {
    let mut book = Book::new();
    assert!(book.add(1, Side::Bid, 100, 5, 0));
    assert!(book.reduce(1, 3));
    assert_eq!(book.order(1).map(|n| n.qty), Some(2));
    assert_eq!(book.level_qty(Side::Bid, 100), 2);
    assert_eq!(book.side_total(Side::Bid), 2);
    assert_healthy(&book);
}

#[test]
fn reduce_to_zero_is_equivalent_to_cancel() {
    let mut reduced = Book::new();
    let mut canceled = Book::new();
    for book in [&mut reduced, &mut canceled] {
        assert!(book.add(1, Side::Bid, 100, 5, 0));
        assert!(book.add(2, Side::Bid, 100, 3, 0));
    }

    assert!(reduced.reduce(1, 5));
    assert!(canceled.cancel(1).ok);

    for book in [&reduced, &canceled] {
        assert!(!book.has(1));
        assert_eq!(book.level_qty(Side::Bid, 100), 3);
        assert_eq!(book.side_total(Side::Bid), 3);
        assert_eq!(book.order_count(), 1);
        assert_healthy(book);
    }
}

#[test]
fn cancel_returns_resting_state_and_removes_level() {
    let mut book = Book::new();
    assert!(book.add(10, Side::Bid, 101, 7, 0));

    let c = book.cancel(10);
    assert!(c.ok);
    assert_eq!(c.qty_canceled, 7);
    assert_eq!(c.px, 101);
    assert_eq!(c.side, Side::Bid);

    assert!(!book.has(10));
    assert_eq!(book.level_count(Side::Bid), 0);
    assert_eq!(book.side_total(Side::Bid), 0);
    assert_healthy(&book);
}

#[test]
fn cancel_unknown_id_fails_cleanly() {
    let mut book = Book::new();
    let c = book.cancel(42);
    assert!(!c.ok);
    assert_eq!(c.qty_canceled, 0);
}

#[test]
fn cancel_is_local_to_its_side() {
    let mut book = Book::new();
    assert!(book.add(1, Side::Bid, 100, 5, 0));
    assert!(book.add(2, Side::Ask, 105, 5, 0));

    assert!(book.cancel(1).ok);
    assert_eq!(book.side_total(Side::Ask), 5);
    assert_eq!(book.best_ask(), Some(105));
    assert_healthy(&book);
}

#[test]
fn cancel_middle_of_level_preserves_fifo() {
    let mut book = Book::new();
    post(&mut book, 1, Side::Ask, 100, 1, 1);
    post(&mut book, 2, Side::Ask, 100, 2, 2);
    post(&mut book, 3, Side::Ask, 100, 3, 3);

    assert!(book.cancel(2).ok);
    assert_eq!(book.level_qty(Side::Ask, 100), 4);

    let r = book.submit(4, Side::Bid, 100, 4, 5, OrderType::Limit, TimeInForce::Ioc);
    assert_eq!(
        r.fills.iter().map(|f| f.maker_id).collect::<Vec<_>>(),
        vec![1, 3]
    );
    assert_healthy(&book);
}

#[test]
fn canceled_id_does_not_reappear() {
    let mut book = Book::new();
    assert!(book.add(1, Side::Bid, 100, 5, 0));
    assert!(book.cancel(1).ok);

    // Unrelated traffic never resurrects id 1.
    assert!(book.add(2, Side::Bid, 99, 5, 0));
    book.submit(3, Side::Ask, 99, 2, 4, OrderType::Limit, TimeInForce::Ioc);
    assert!(!book.has(1));

    // Re-adding the same id explicitly is allowed.
    assert!(book.add(1, Side::Bid, 98, 5, 0));
    assert!(book.has(1));
    assert_healthy(&book);
}

#[test]
fn empty_book_invariants_hold() {
    let book = Book::new();
    assert!(book.check_invariants().is_empty());
    assert_eq!(book.best(), Default::default());
    assert_eq!(book.order_count(), 0);
}

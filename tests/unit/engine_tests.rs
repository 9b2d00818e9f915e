//! End-to-end scenarios through the engine and the event bus.

use matchbook_rs::prelude::*;

fn engine_with_bus(cap: usize) -> (MatchEngine, EventPoller) {
    let (publisher, poller) = EventBus::with_capacity(cap).unwrap();
    (MatchEngine::new(publisher), poller)
}

fn drain(poller: &mut EventPoller) -> Vec<Event> {
    let mut out = Vec::new();
    while let Some(ev) = poller.try_poll() {
        out.push(ev);
    }
    out
}

#[test]
fn fifo_partial_fill_emits_two_fills() {
    let (mut engine, mut poller) = engine_with_bus(1 << 16);

    // Maker side: two sells at 100, FIFO 3 then 5.
    engine.add(1, Side::SELL, 100, 3);
    engine.add(2, Side::SELL, 100, 5);

    // Taker buy for 6: fills 3 from id 1, then 3 from id 2.
    engine.add(42, Side::BUY, 100, 6);

    let fills: Vec<FillEvent> = drain(&mut poller)
        .iter()
        .filter_map(|ev| ev.as_fill().copied())
        .collect();
    assert_eq!(fills.len(), 2);
    assert_eq!(fills.iter().map(|f| f.qty).sum::<Qty>(), 6);
    assert_eq!(fills[0].maker_id, 1);
    assert_eq!(fills[1].maker_id, 2);
    assert!(fills.iter().all(|f| f.taker_id == 42 && f.px == 100));
    assert!(fills.iter().all(|f| f.taker_side == Side::Bid));

    // Post-state: ask id 2 keeps 2 at 100; no bid posted.
    assert_eq!(engine.book().level_qty(Side::Ask, 100), 2);
    assert!(!engine.book().has(42));
    assert!(engine.book().check_invariants().is_empty());
}

#[test]
fn cancel_emits_cancel_and_book_change() {
    let (mut engine, mut poller) = engine_with_bus(1 << 16);

    engine.add(10, Side::BUY, 101, 7);
    drain(&mut poller);

    engine.cancel(10);
    let events = drain(&mut poller);

    let cancels: Vec<&CancelEvent> = events.iter().filter_map(Event::as_cancel).collect();
    assert_eq!(cancels.len(), 1);
    assert_eq!(cancels[0].id, 10);
    assert_eq!(cancels[0].side, Side::Bid);
    assert_eq!(cancels[0].px, 101);
    assert_eq!(cancels[0].qty_canceled, 7);

    let changes: Vec<&BookChangeEvent> =
        events.iter().filter_map(Event::as_book_change).collect();
    assert_eq!(changes.len(), 1);
    assert_eq!((changes[0].side, changes[0].px, changes[0].level_qty), (Side::Bid, 101, 0));

    assert_eq!(engine.book().level_count(Side::Bid), 0);
}

#[test]
fn posting_add_emits_book_change_with_level_depth() {
    let (mut engine, mut poller) = engine_with_bus(1 << 16);

    engine.add(1, Side::BUY, 100, 4);
    engine.add(2, Side::BUY, 100, 6);

    let changes: Vec<BookChangeEvent> = drain(&mut poller)
        .iter()
        .filter_map(|ev| ev.as_book_change().copied())
        .collect();
    assert_eq!(changes.len(), 2);
    assert_eq!(changes[0].level_qty, 4);
    assert_eq!(changes[1].level_qty, 10);
}

#[test]
fn ioc_not_marketable_emits_nothing() {
    let (mut engine, mut poller) = engine_with_bus(1 << 16);

    engine.add(101, Side::SELL, 100, 5);
    drain(&mut poller);

    engine.add_for_trader(2, 202, Side::BUY, 99, 10, TimeInForce::Ioc);
    let events = drain(&mut poller);
    assert!(events.is_empty(), "unexpected events: {events:?}");
    assert!(!engine.book().has(202));
    assert_eq!(engine.book().level_qty(Side::Ask, 100), 5);
}

#[test]
fn market_order_emits_sentinel_book_change() {
    let (mut engine, mut poller) = engine_with_bus(1 << 16);

    engine.add(1, Side::SELL, 100, 5);
    drain(&mut poller);

    engine.market(7, Side::BUY, 3);
    let events = drain(&mut poller);

    let fills: Vec<&FillEvent> = events.iter().filter_map(Event::as_fill).collect();
    assert_eq!(fills.len(), 1);
    assert_eq!(fills[0].qty, 3);

    let changes: Vec<&BookChangeEvent> =
        events.iter().filter_map(Event::as_book_change).collect();
    assert_eq!(changes.len(), 1);
    assert_eq!((changes[0].px, changes[0].level_qty), (0, 0));
    assert_eq!(changes[0].side, Side::Bid);
}

#[test]
fn market_against_empty_book_emits_nothing() {
    let (mut engine, mut poller) = engine_with_bus(1 << 16);
    engine.market(7, Side::BUY, 3);
    assert!(drain(&mut poller).is_empty());
}

#[test]
fn fok_insufficient_then_sufficient() {
    let (mut engine, mut poller) = engine_with_bus(1 << 16);

    engine.add(11, Side::SELL, 100, 5);
    drain(&mut poller);

    // FOK for 6 against 5 available: rejected, no events, no ghost id.
    engine.add_for_trader(2, 22, Side::BUY, 100, 6, TimeInForce::Fok);
    assert!(drain(&mut poller).is_empty());
    assert!(!engine.book().has(22));
    assert_eq!(engine.book().level_qty(Side::Ask, 100), 5);

    // Add 3 more; FOK for 6 now fills in full.
    engine.add(33, Side::SELL, 100, 3);
    drain(&mut poller);
    engine.add_for_trader(2, 44, Side::BUY, 100, 6, TimeInForce::Fok);

    let events = drain(&mut poller);
    let filled: Qty = events
        .iter()
        .filter_map(Event::as_fill)
        .map(|f| f.qty)
        .sum();
    assert_eq!(filled, 6);
    assert!(!engine.book().has(44));
    assert!(engine.book().check_invariants().is_empty());
}

#[test]
fn replace_keeps_priority_on_decrease() {
    let (mut engine, mut poller) = engine_with_bus(1 << 16);

    engine.add_for_trader(1, 10, Side::BUY, 100, 10, TimeInForce::Day);
    engine.add_for_trader(2, 20, Side::BUY, 100, 10, TimeInForce::Day);
    drain(&mut poller);

    engine.replace(1, 10, 100, 6, TimeInForce::Day);
    drain(&mut poller);

    engine.market(30, Side::SELL, 6);
    let first_fill = drain(&mut poller)
        .iter()
        .filter_map(|ev| ev.as_fill().copied())
        .next()
        .expect("expected a fill");
    assert_eq!(first_fill.maker_id, 10);
}

#[test]
fn replace_price_change_loses_priority() {
    let (mut engine, mut poller) = engine_with_bus(1 << 16);

    engine.add_for_trader(1, 10, Side::BUY, 100, 10, TimeInForce::Day);
    engine.add_for_trader(2, 20, Side::BUY, 100, 10, TimeInForce::Day);
    drain(&mut poller);

    engine.replace(1, 10, 101, 10, TimeInForce::Day);
    let changes: Vec<BookChangeEvent> = drain(&mut poller)
        .iter()
        .filter_map(|ev| ev.as_book_change().copied())
        .collect();
    // Conservative notifications for both sides at the amended price.
    assert_eq!(changes.len(), 2);
    assert!(changes.iter().any(|c| c.side == Side::Bid && c.level_qty == 10));

    engine.market(30, Side::SELL, 10);
    let first_fill = drain(&mut poller)
        .iter()
        .filter_map(|ev| ev.as_fill().copied())
        .next()
        .expect("expected a fill");
    assert_eq!(first_fill.px, 101);
    assert_eq!(first_fill.maker_id, 10);
}

#[test]
fn ghost_free_fok_replace() {
    let (mut engine, mut poller) = engine_with_bus(1 << 16);

    // Bid id 10 (owner 9), then an ask at the same price, which crosses it:
    // both fill and the book is left empty.
    engine.add_for_trader(9, 10, Side::BUY, 100, 5, TimeInForce::Day);
    engine.add_for_trader(1, 11, Side::SELL, 100, 5, TimeInForce::Day);
    drain(&mut poller);

    // Replace of the now-gone id 10 reports failure; no stranded id either
    // way.
    engine.replace(9, 10, 100, 12, TimeInForce::Fok);
    assert!(drain(&mut poller).is_empty());
    assert!(!engine.book().has(10));
    assert!(engine.book().check_invariants().is_empty());
}

#[test]
fn stp_cancel_taker_through_engine() {
    let (publisher, mut poller) = EventBus::with_capacity(1 << 16).unwrap();
    let cfg = BookConfig {
        stp: StpPolicy::CancelTaker,
    };
    let mut engine = MatchEngine::with_config(publisher, cfg);

    engine.add_for_trader(7, 101, Side::SELL, 100, 10, TimeInForce::Day);
    drain(&mut poller);

    engine.market_for_trader(7, 202, Side::BUY, 12, TimeInForce::Ioc);
    let events = drain(&mut poller);
    assert!(events.iter().all(|ev| ev.as_fill().is_none()));
    assert_eq!(engine.book().level_qty(Side::Ask, 100), 10);
}

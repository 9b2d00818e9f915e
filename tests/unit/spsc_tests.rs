//! Threaded transport tests: ring FIFO across threads, drop-mode counting,
//! and backpressure hysteresis.

use matchbook_rs::spsc::{BackpressureCfg, BpMode, channel, ring};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::thread;
use std::time::Duration;

#[test]
fn ring_is_fifo_across_threads() {
    const N: u32 = 200_000;
    let (mut tx, mut rx) = ring::<u32>(1 << 10).unwrap();

    let producer = thread::spawn(move || {
        let mut next = 0u32;
        while next < N {
            if tx.try_push(next).is_ok() {
                next += 1;
            } else {
                std::hint::spin_loop();
            }
        }
    });

    let mut expected = 0u32;
    while expected < N {
        if let Some(v) = rx.try_pop() {
            assert_eq!(v, expected, "values reordered or lost");
            expected += 1;
        } else {
            std::hint::spin_loop();
        }
    }
    producer.join().unwrap();
    assert_eq!(rx.try_pop(), None);
}

#[test]
fn ring_bulk_transfer_across_threads() {
    const N: u64 = 100_000;
    let (mut tx, mut rx) = ring::<u64>(1 << 8).unwrap();

    let producer = thread::spawn(move || {
        let mut next = 0u64;
        while next < N {
            let remaining = (N - next) as usize;
            let before = next;
            let pushed = tx.try_push_bulk(remaining.min(64), || {
                let v = next;
                next += 1;
                v
            });
            if pushed == 0 {
                std::hint::spin_loop();
            }
            assert_eq!(next, before + pushed as u64);
        }
    });

    let mut expected = 0u64;
    while expected < N {
        let before = expected;
        rx.try_pop_bulk(64, |v| {
            assert_eq!(v, expected);
            expected += 1;
        });
        if expected == before {
            std::hint::spin_loop();
        }
    }
    producer.join().unwrap();
}

#[test]
fn drop_mode_never_blocks_and_counts_drops() {
    let mut cfg = BackpressureCfg::new(2);
    cfg.mode = BpMode::Drop;
    let (mut tx, rx) = channel::<u32>(8, cfg).unwrap();

    // Consumer stalled (never pops): first two land, the rest drop.
    let mut accepted = 0;
    for i in 0..10 {
        if tx.push(i, None) {
            accepted += 1;
        }
    }
    assert_eq!(accepted, 2);

    let snap = rx.stats().snapshot();
    assert_eq!(snap.push_ok, 2);
    assert_eq!(snap.drops_total, 8);
    assert_eq!(rx.len(), 2);
}

#[test]
fn spin_mode_hysteresis_gates_the_producer() {
    let mut cfg = BackpressureCfg::new(4);
    cfg.low_wm = 2;
    cfg.mode = BpMode::Spin;
    let (mut tx, mut rx) = channel::<u32>(8, cfg).unwrap();

    let pushed = Arc::new(AtomicU64::new(0));
    let pushed_in_thread = Arc::clone(&pushed);
    let producer = thread::spawn(move || {
        for i in 0..10u32 {
            assert!(tx.push(i, None));
            pushed_in_thread.fetch_add(1, Ordering::SeqCst);
        }
    });

    // Producer fills to the high watermark, then stalls.
    thread::sleep(Duration::from_millis(200));
    assert_eq!(pushed.load(Ordering::SeqCst), 4);
    assert_eq!(rx.len(), 4);

    // Draining to a depth still above low_wm does not release it.
    assert_eq!(rx.pop(), Some(0));
    thread::sleep(Duration::from_millis(200));
    assert_eq!(pushed.load(Ordering::SeqCst), 4);

    // Falling to low_wm releases the producer; it pushes the rest.
    assert_eq!(rx.pop(), Some(1));
    let mut expected = 2u32;
    while expected < 10 {
        if let Some(v) = rx.pop() {
            assert_eq!(v, expected);
            expected += 1;
        } else {
            std::hint::spin_loop();
        }
    }
    producer.join().unwrap();

    let snap = rx.stats().snapshot();
    assert_eq!(snap.push_ok, 10);
    assert_eq!(snap.pop_ok, 10);
    assert_eq!(snap.drops_total, 0);
}

#[test]
fn sleep_mode_recovers_after_drain() {
    let mut cfg = BackpressureCfg::new(4);
    cfg.low_wm = 1;
    cfg.mode = BpMode::Sleep;
    cfg.sleep = Duration::from_micros(50);
    let (mut tx, mut rx) = channel::<u32>(8, cfg).unwrap();

    let producer = thread::spawn(move || {
        for i in 0..50u32 {
            assert!(tx.push(i, None));
        }
    });

    let mut expected = 0u32;
    while expected < 50 {
        if let Some(v) = rx.pop() {
            assert_eq!(v, expected);
            expected += 1;
        } else {
            thread::sleep(Duration::from_micros(20));
        }
    }
    producer.join().unwrap();
}

#[test]
fn stop_flag_releases_a_stalled_producer() {
    let mut cfg = BackpressureCfg::new(2);
    cfg.low_wm = 1;
    cfg.mode = BpMode::Spin;
    let (mut tx, _rx) = channel::<u32>(8, cfg).unwrap();

    let stop = Arc::new(AtomicBool::new(false));
    let stop_in_thread = Arc::clone(&stop);
    let producer = thread::spawn(move || {
        assert!(tx.push(0, Some(&stop_in_thread)));
        assert!(tx.push(1, Some(&stop_in_thread)));
        // Depth now at high watermark with no consumer: this push spins
        // until the stop flag aborts it.
        tx.push(2, Some(&stop_in_thread))
    });

    thread::sleep(Duration::from_millis(100));
    stop.store(true, Ordering::Relaxed);
    assert!(!producer.join().unwrap());
}

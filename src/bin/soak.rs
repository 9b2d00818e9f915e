//! Randomized soak: random adds, cancels, reduces, and marketable submits
//! through the engine, with the whole-book invariant checker run along the
//! way and a consumer thread draining the bus concurrently.

use anyhow::{Result, bail};
use clap::Parser;
use matchbook_rs::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::thread;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "soak", about = "Randomized order book + bus soak driver")]
struct Args {
    /// Number of random operations to apply.
    #[arg(long, default_value_t = 200_000)]
    steps: u64,

    /// RNG seed, for reproducible runs.
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Run the invariant checker every N steps (1 = every step).
    #[arg(long, default_value_t = 1)]
    check_every: u64,

    /// Event bus capacity; must be a power of two.
    #[arg(long, default_value_t = 1 << 16)]
    bus_cap: usize,
}

#[derive(Debug, Serialize)]
struct SoakSummary {
    steps: u64,
    adds: u64,
    cancels: u64,
    reduces: u64,
    submits: u64,
    fills_seen: u64,
    cancels_seen: u64,
    book_changes_seen: u64,
    resting_at_end: usize,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();
    let args = Args::parse();

    let (publisher, mut poller) = EventBus::with_capacity(args.bus_cap)?;
    let mut engine = MatchEngine::new(publisher);

    let stop = Arc::new(AtomicBool::new(false));
    let fills_seen = Arc::new(AtomicU64::new(0));
    let cancels_seen = Arc::new(AtomicU64::new(0));
    let book_changes_seen = Arc::new(AtomicU64::new(0));

    let drain = {
        let stop = Arc::clone(&stop);
        let fills = Arc::clone(&fills_seen);
        let cancels = Arc::clone(&cancels_seen);
        let changes = Arc::clone(&book_changes_seen);
        thread::spawn(move || {
            loop {
                let drained = poller.poll_bulk(256, |ev| {
                    match ev {
                        Event::Fill(_) => fills.fetch_add(1, Ordering::Relaxed),
                        Event::Cancel(_) => cancels.fetch_add(1, Ordering::Relaxed),
                        Event::BookChange(_) => changes.fetch_add(1, Ordering::Relaxed),
                    };
                });
                if drained == 0 {
                    if stop.load(Ordering::Relaxed) && poller.is_empty() {
                        break;
                    }
                    std::hint::spin_loop();
                }
            }
        })
    };

    let mut rng = StdRng::seed_from_u64(args.seed);
    let mut live: Vec<OrderId> = Vec::new();
    let mut next_id: OrderId = 1;
    let (mut adds, mut cancels, mut reduces, mut submits) = (0u64, 0u64, 0u64, 0u64);

    info!(steps = args.steps, seed = args.seed, "soak running");
    for step in 0..args.steps {
        let op: u32 = rng.random_range(0..10);

        if op <= 4 || live.is_empty() {
            let id = next_id;
            next_id += 1;
            let side = if rng.random_range(0..2) == 0 {
                Side::Bid
            } else {
                Side::Ask
            };
            let px: Price = rng.random_range(1_000..=1_100);
            let qty: Qty = rng.random_range(1..=50);
            let tif = if rng.random_range(0..4) == 0 {
                TimeInForce::Ioc
            } else {
                TimeInForce::Day
            };
            engine.add_for_trader(rng.random_range(1u64..=8), id, side, px, qty, tif);
            adds += 1;
            if engine.book().has(id) {
                live.push(id);
            }
        } else if op <= 6 {
            let id = live[rng.random_range(0..live.len())];
            engine.cancel(id);
            cancels += 1;
            live.retain(|&x| x != id);
        } else if op <= 8 {
            // Reduce through the book-facing replace path: same price,
            // smaller size keeps priority.
            let id = live[rng.random_range(0..live.len())];
            if let Some(node) = engine.book().order(id) {
                let (px, qty) = (node.px, node.qty);
                let owner = engine.book().owner(id);
                let new_qty = rng.random_range(1..=qty);
                engine.replace(owner, id, px, new_qty, TimeInForce::Day);
            }
            reduces += 1;
        } else {
            let id = next_id;
            next_id += 1;
            let side = if rng.random_range(0..2) == 0 {
                Side::Bid
            } else {
                Side::Ask
            };
            let qty: Qty = rng.random_range(1..=20);
            engine.market(id, side, qty);
            submits += 1;
        }

        // Fills and STP may remove ids underneath us; prune lazily.
        if step % 64 == 0 {
            let book = engine.book();
            live.retain(|&id| book.has(id));
        }

        if args.check_every > 0 && step % args.check_every == 0 {
            let errs = engine.book().check_invariants();
            if !errs.is_empty() {
                stop.store(true, Ordering::Relaxed);
                bail!("invariant failure at step {step}: {errs:?}");
            }
        }
    }

    let errs = engine.book().check_invariants();
    if !errs.is_empty() {
        bail!("invariant failure at end: {errs:?}");
    }

    stop.store(true, Ordering::Relaxed);
    drain.join().expect("drain thread panicked");

    let summary = SoakSummary {
        steps: args.steps,
        adds,
        cancels,
        reduces,
        submits,
        fills_seen: fills_seen.load(Ordering::Relaxed),
        cancels_seen: cancels_seen.load(Ordering::Relaxed),
        book_changes_seen: book_changes_seen.load(Ordering::Relaxed),
        resting_at_end: engine.book().order_count(),
    };
    println!("{}", serde_json::to_string_pretty(&summary)?);
    println!("soak: OK");
    Ok(())
}

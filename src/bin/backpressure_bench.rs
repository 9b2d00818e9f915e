//! Backpressure harness: a pinned producer pushing through the channel
//! policy against a deliberately slow consumer.

use anyhow::Result;
use clap::Parser;
use matchbook_rs::spsc::{BackpressureCfg, BpMode, channel};
use matchbook_rs::{Stopwatch, pin_to_core};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;
use tracing::info;

#[derive(Parser, Debug)]
#[command(
    name = "backpressure_bench",
    about = "SPSC channel backpressure benchmark"
)]
struct Args {
    /// Timed run length in seconds.
    #[arg(long, default_value_t = 5)]
    seconds: u64,

    /// Channel capacity; must be a power of two.
    #[arg(long, default_value_t = 1 << 18)]
    cap: usize,

    /// High watermark: backpressure engages at this depth.
    #[arg(long, default_value_t = (1 << 18) * 3 / 4)]
    high: usize,

    /// Low watermark: Spin/Sleep release once depth drains to this.
    #[arg(long, default_value_t = 1 << 17)]
    low: usize,

    /// Backpressure mode: drop, spin, or sleep.
    #[arg(long, default_value_t = BpMode::Drop)]
    mode: BpMode,

    /// Simulated consumer work per pop, in nanoseconds.
    #[arg(long, default_value_t = 0)]
    cons_slow_ns: u64,

    /// Pin the producer thread to this CPU.
    #[arg(long)]
    pin_prod: Option<usize>,

    /// Pin the consumer thread to this CPU.
    #[arg(long)]
    pin_cons: Option<usize>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();
    let args = Args::parse();

    let cfg = BackpressureCfg {
        high_wm: args.high,
        low_wm: args.low,
        mode: args.mode,
        sleep: Duration::from_nanos(5_000),
    };
    let (mut tx, mut rx) = channel::<u32>(args.cap, cfg)?;
    let stats = rx.stats();

    let start = Arc::new(AtomicBool::new(false));
    let stop = Arc::new(AtomicBool::new(false));

    let prod = {
        let start = Arc::clone(&start);
        let stop = Arc::clone(&stop);
        let pin = args.pin_prod;
        thread::spawn(move || -> u64 {
            if let Some(cpu) = pin {
                pin_to_core(cpu);
            }
            let mut produced = 0u64;
            let mut x = 0u32;
            while !start.load(Ordering::Acquire) {
                std::hint::spin_loop();
            }
            while !stop.load(Ordering::Relaxed) {
                if tx.push(x, Some(&stop)) {
                    produced += 1;
                    x = x.wrapping_add(1);
                }
            }
            produced
        })
    };

    let cons = {
        let start = Arc::clone(&start);
        let stop = Arc::clone(&stop);
        let pin = args.pin_cons;
        let slow = Duration::from_nanos(args.cons_slow_ns);
        thread::spawn(move || -> u64 {
            if let Some(cpu) = pin {
                pin_to_core(cpu);
            }
            let mut consumed = 0u64;
            while !start.load(Ordering::Acquire) {
                std::hint::spin_loop();
            }
            while !stop.load(Ordering::Relaxed) {
                if rx.pop().is_some() {
                    consumed += 1;
                    if !slow.is_zero() {
                        thread::sleep(slow);
                    }
                }
            }
            consumed
        })
    };

    thread::sleep(Duration::from_millis(50));
    start.store(true, Ordering::Release);
    info!(mode = %args.mode, cap = args.cap, "backpressure bench running");

    let sw = Stopwatch::new();
    while sw.elapsed_secs() < args.seconds as f64 {
        thread::sleep(Duration::from_millis(100));
    }
    stop.store(true, Ordering::Release);

    let produced = prod.join().expect("producer thread panicked");
    let consumed = cons.join().expect("consumer thread panicked");

    let secs = sw.elapsed_secs();
    let mops = consumed as f64 / 1e6 / secs;
    let snap = stats.snapshot();

    println!(
        "mode={} cap={} high={} low={} cons_slow_ns={}",
        args.mode, args.cap, args.high, args.low, args.cons_slow_ns
    );
    println!("consumed={consumed} in {secs:.3} s -> {mops:.2} Mops/s");
    println!(
        "produced={produced} drops={} max_depth={} depth_now={}",
        snap.drops_total, snap.max_depth, snap.depth
    );
    println!("summary {}", serde_json::to_string(&snap)?);
    Ok(())
}

//! SPSC ring throughput harness: one pinned producer, one pinned consumer,
//! timed run, ops/sec report.

use anyhow::Result;
use clap::Parser;
use matchbook_rs::{Stopwatch, pin_to_core, spsc};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "spsc_bench", about = "SPSC ring throughput benchmark")]
struct Args {
    /// Timed run length in seconds.
    #[arg(long, default_value_t = 3)]
    seconds: u64,

    /// Ring capacity; must be a power of two.
    #[arg(long, default_value_t = 1 << 20)]
    cap: usize,

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

    let (mut tx, mut rx) = spsc::ring::<u32>(args.cap)?;

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
                if tx.try_push(x).is_ok() {
                    produced += 1;
                    x = x.wrapping_add(1);
                } else {
                    std::hint::spin_loop();
                }
            }
            produced
        })
    };

    let cons = {
        let start = Arc::clone(&start);
        let stop = Arc::clone(&stop);
        let pin = args.pin_cons;
        thread::spawn(move || -> u64 {
            if let Some(cpu) = pin {
                pin_to_core(cpu);
            }
            let mut consumed = 0u64;
            while !start.load(Ordering::Acquire) {
                std::hint::spin_loop();
            }
            while !stop.load(Ordering::Relaxed) {
                if rx.try_pop().is_some() {
                    consumed += 1;
                } else {
                    std::hint::spin_loop();
                }
            }
            consumed
        })
    };

    // Warmup, then open the gate for the timed run.
    thread::sleep(Duration::from_millis(50));
    start.store(true, Ordering::Release);
    info!(cap = args.cap, seconds = args.seconds, "spsc bench running");

    let sw = Stopwatch::new();
    while sw.elapsed_secs() < args.seconds as f64 {
        thread::sleep(Duration::from_millis(50));
    }
    stop.store(true, Ordering::Release);

    let produced = prod.join().expect("producer thread panicked");
    let consumed = cons.join().expect("consumer thread panicked");

    let secs = sw.elapsed_secs();
    let mops = consumed as f64 / 1e6 / secs;
    println!("SPSC: {consumed} msgs in {secs:.3} s -> {mops:.2} Mops/s");
    println!(
        "produced={produced} consumed={consumed} backlog={}",
        produced - consumed
    );
    Ok(())
}

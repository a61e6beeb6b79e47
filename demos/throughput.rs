//! Throughput example
//!
//! Runs bounded increments for a fixed time, then the same duration
//! of client-side read-then-write, and prints how many of each completed.
//!
//! Usage: cargo run --release --example throughput [millis]

use bounded_counter::{BoundedCounter, MemoryStore, Options, ScriptStore};
use std::sync::Arc;
use std::time::{Duration, Instant};

fn run_incr_with_limit(store: &Arc<MemoryStore>, time: Duration) -> anyhow::Result<u64> {
    let counter = BoundedCounter::with_store(Arc::clone(store));
    counter.init()?;

    let start = Instant::now();
    let mut n = 0u64;
    while start.elapsed() < time {
        counter.incr_with_limit("countIncrWithLimit", 1_000_000)?;
        n += 1;
    }
    counter.quit()?;
    Ok(n)
}

fn run_read_write(store: &MemoryStore, time: Duration) -> anyhow::Result<u64> {
    let start = Instant::now();
    let mut n = 0u64;
    while start.elapsed() < time {
        let current: i64 = store
            .get(b"countIncr")?
            .and_then(|raw| String::from_utf8(raw).ok())
            .and_then(|s| s.parse().ok())
            .unwrap_or(0);
        store.set(b"countIncr", (current + 1).to_string().as_bytes())?;
        n += 1;
    }
    Ok(n)
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let millis = std::env::args().nth(1).map(|s| s.parse()).transpose()?.unwrap_or(1000);
    let time = Duration::from_millis(millis);
    let store = Arc::new(MemoryStore::new(&Options::default()));

    let n = run_incr_with_limit(&store, time)?;
    println!("incrWithLimit: completed {} operations within {:?}", n, time);

    let n = run_read_write(&store, time)?;
    println!("read+write: completed {} operations within {:?}", n, time);

    store.close()?;
    Ok(())
}

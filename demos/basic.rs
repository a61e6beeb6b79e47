//! Basic usage example for bounded counters
//!
//! This example demonstrates:
//! - Opening a counter with its own store
//! - Registering the bounded-increment script
//! - Incrementing up to a limit
//! - Shutting down

use bounded_counter::{BoundedCounter, IncrOutcome, Options};

fn main() -> anyhow::Result<()> {
    // Initialize logger
    env_logger::init();

    let counter = BoundedCounter::open(Options::default())?;
    counter.init()?;

    for _ in 0..25 {
        match counter.incr_with_limit("count", 20)? {
            IncrOutcome::Value(v) => println!("count = {}", v),
            IncrOutcome::LimitExceeded => {
                println!("limit of 20 reached, count stays at {}", counter.get("count")?)
            }
        }
    }

    // Larger steps and decrements
    println!("+5 -> {:?}", counter.incr_by_with_limit("tokens", 5, 10)?);
    println!("+6 -> {:?}", counter.incr_by_with_limit("tokens", 6, 10)?);
    println!("-5 -> {:?}", counter.incr_by_with_limit("tokens", -5, 10)?);
    println!("-1 -> {:?}", counter.incr_by_with_limit("tokens", -1, 10)?);

    counter.quit()?;
    Ok(())
}

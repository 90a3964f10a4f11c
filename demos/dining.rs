//! Five philosophers around a table with five forks.
//!
//! Each philosopher alternates between thinking and eating, and must hold
//! both adjacent forks to eat. The [`RingArbiter`] guarantees the table
//! never deadlocks regardless of timing; the grant statistics are printed
//! as JSON at the end.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::Result;
use lockstep::RingArbiter;
use rand::Rng;

const SEATS: usize = 5;
const MEALS: usize = 20;

fn main() -> Result<()> {
    tracing_subscriber::fmt().with_target(false).init();

    let arbiter = Arc::new(RingArbiter::new(SEATS)?);
    thread::scope(|s| {
        for seat in 0..SEATS {
            let arbiter = Arc::clone(&arbiter);
            s.spawn(move || {
                let mut rng = rand::thread_rng();
                for meal in 0..MEALS {
                    thread::sleep(Duration::from_millis(rng.gen_range(1..8)));
                    tracing::info!(seat, meal, "hungry");
                    let guard = arbiter.acquire(seat);
                    tracing::info!(seat, meal, "eating");
                    thread::sleep(Duration::from_millis(rng.gen_range(1..8)));
                    drop(guard);
                    tracing::info!(seat, meal, "thinking");
                }
            });
        }
    });

    let stats = arbiter.stats();
    assert_eq!(stats.total_grants(), (SEATS * MEALS) as u64);
    // The very first acquisition finds an idle table, so at least one meal
    // was a double grant.
    assert!(stats.double_grants >= 1);
    println!("{}", serde_json::to_string_pretty(&stats)?);
    Ok(())
}

//! Ten workers cross three parts of a job in lockstep.
//!
//! Every worker does part A at its own pace, then waits at the barrier; no
//! worker starts part B until the slowest has finished part A, and likewise
//! for part C. Run with `RUST_LOG=info` to watch the phase boundaries: all
//! ten "A" lines appear before any "B" line, for every interleaving.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::Result;
use lockstep::ReusableBarrier;
use rand::Rng;

const WORKERS: usize = 10;
const PARTS: [&str; 3] = ["A", "B", "C"];

fn main() -> Result<()> {
    tracing_subscriber::fmt().with_target(false).init();

    let barrier = Arc::new(ReusableBarrier::new(WORKERS)?);
    thread::scope(|s| {
        for worker in 0..WORKERS {
            let barrier = Arc::clone(&barrier);
            s.spawn(move || {
                let mut rng = rand::thread_rng();
                for (index, part) in PARTS.iter().enumerate() {
                    thread::sleep(Duration::from_millis(rng.gen_range(1..25)));
                    tracing::info!(worker, part, "finished");
                    if index + 1 < PARTS.len() {
                        let crossing = barrier.wait();
                        if crossing.is_leader() {
                            tracing::info!(phase = crossing.phase(), "--- all workers crossed ---");
                        }
                    }
                }
            });
        }
    });

    assert_eq!(barrier.phases(), (PARTS.len() - 1) as u64);
    tracing::info!(phases = barrier.phases(), "all parts complete");
    Ok(())
}

//! Producers and consumers over a bounded queue.
//!
//! Three producers push fifty items each through a queue of capacity eight;
//! two consumers drain it. The small capacity makes backpressure visible:
//! producers block whenever the consumers fall behind. Closing the queue
//! after the producers finish is what lets the consumers terminate.

use std::thread;
use std::time::Duration;

use anyhow::Result;
use lockstep::BoundedQueue;
use rand::Rng;

const PRODUCERS: usize = 3;
const CONSUMERS: usize = 2;
const ITEMS_PER_PRODUCER: usize = 50;
const CAPACITY: usize = 8;

fn main() -> Result<()> {
    tracing_subscriber::fmt().with_target(false).init();

    let queue = BoundedQueue::new(CAPACITY)?;
    let queue = &queue;

    let consumed: usize = thread::scope(|s| {
        let producers: Vec<_> = (0..PRODUCERS)
            .map(|producer| {
                s.spawn(move || {
                    let mut rng = rand::thread_rng();
                    for item in 0..ITEMS_PER_PRODUCER {
                        thread::sleep(Duration::from_micros(rng.gen_range(10..200)));
                        queue
                            .push((producer, item))
                            .expect("queue closed while producing");
                    }
                    tracing::info!(producer, "done producing");
                })
            })
            .collect();

        let consumers: Vec<_> = (0..CONSUMERS)
            .map(|consumer| {
                s.spawn(move || {
                    let mut taken = 0;
                    while let Some((producer, item)) = queue.pop() {
                        tracing::debug!(consumer, producer, item, "consumed");
                        taken += 1;
                    }
                    tracing::info!(consumer, taken, "queue drained");
                    taken
                })
            })
            .collect();

        for producer in producers {
            producer.join().unwrap();
        }
        queue.close();

        consumers.into_iter().map(|c| c.join().unwrap()).sum()
    });

    assert_eq!(consumed, PRODUCERS * ITEMS_PER_PRODUCER);
    tracing::info!(consumed, "pipeline complete");
    Ok(())
}

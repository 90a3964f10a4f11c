//! Loom model checks: every interleaving of a small schedule.
//!
//! Run with `RUSTFLAGS="--cfg loom" cargo test --test loom --release`.
#![cfg(loom)]

use loom::sync::Arc;
use loom::thread;

use lockstep::{BoundedQueue, ReusableBarrier, RingArbiter};

#[test]
fn barrier_two_workers_two_phases() {
    loom::model(|| {
        let barrier = Arc::new(ReusableBarrier::new(2).unwrap());
        let partner = Arc::clone(&barrier);

        let worker = thread::spawn(move || {
            for expected in 0..2u64 {
                assert_eq!(partner.wait().phase(), expected);
            }
        });
        for expected in 0..2u64 {
            assert_eq!(barrier.wait().phase(), expected);
        }
        worker.join().unwrap();

        assert_eq!(barrier.phases(), 2);
    });
}

#[test]
fn ring_of_two_always_completes() {
    loom::model(|| {
        let arbiter = Arc::new(RingArbiter::new(2).unwrap());
        let neighbour = Arc::clone(&arbiter);

        let worker = thread::spawn(move || {
            drop(neighbour.acquire(1));
        });
        drop(arbiter.acquire(0));
        worker.join().unwrap();

        let stats = arbiter.stats();
        assert_eq!(stats.total_grants(), 2);
        assert!(stats.double_grants >= 1);
    });
}

#[test]
fn queue_handoff_through_a_close() {
    loom::model(|| {
        let queue = Arc::new(BoundedQueue::new(1).unwrap());
        let producer = Arc::clone(&queue);

        let worker = thread::spawn(move || {
            producer.push(1u8).unwrap();
            producer.push(2u8).unwrap();
            producer.close();
        });
        let mut sum = 0;
        while let Some(item) = queue.pop() {
            sum += item;
        }
        worker.join().unwrap();

        assert_eq!(sum, 3);
    });
}

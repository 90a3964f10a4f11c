//! Bounded queue totals, backpressure, and close semantics.

mod util;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use lockstep::{BoundedQueue, Closed};
use util::deadline;

const GENEROUS: Duration = Duration::from_secs(30);

#[test]
fn everything_produced_is_consumed_exactly_once() {
    deadline(GENEROUS, || {
        const PRODUCERS: usize = 4;
        const CONSUMERS: usize = 3;
        const PER_PRODUCER: usize = 250;

        let queue = Arc::new(BoundedQueue::new(8).unwrap());

        let consumed: Vec<usize> = thread::scope(|s| {
            let producers: Vec<_> = (0..PRODUCERS)
                .map(|producer| {
                    let queue = Arc::clone(&queue);
                    s.spawn(move || {
                        for item in 0..PER_PRODUCER {
                            queue.push(producer * PER_PRODUCER + item).unwrap();
                        }
                    })
                })
                .collect();

            let consumers: Vec<_> = (0..CONSUMERS)
                .map(|_| {
                    let queue = Arc::clone(&queue);
                    s.spawn(move || {
                        let mut taken = Vec::new();
                        while let Some(item) = queue.pop() {
                            taken.push(item);
                        }
                        taken
                    })
                })
                .collect();

            for producer in producers {
                producer.join().unwrap();
            }
            queue.close();

            consumers
                .into_iter()
                .flat_map(|c| c.join().unwrap())
                .collect()
        });

        let mut consumed = consumed;
        consumed.sort_unstable();
        assert_eq!(consumed, (0..PRODUCERS * PER_PRODUCER).collect::<Vec<_>>());
    });
}

#[test]
fn full_queue_applies_backpressure() {
    deadline(GENEROUS, || {
        let queue = Arc::new(BoundedQueue::new(1).unwrap());
        queue.push(1).unwrap();

        let second_push_done = Arc::new(AtomicBool::new(false));
        thread::scope(|s| {
            let queue_clone = Arc::clone(&queue);
            let done = Arc::clone(&second_push_done);
            s.spawn(move || {
                queue_clone.push(2).unwrap();
                done.store(true, Ordering::SeqCst);
            });

            thread::sleep(Duration::from_millis(50));
            assert!(
                !second_push_done.load(Ordering::SeqCst),
                "push must block while the queue is full"
            );

            assert_eq!(queue.pop(), Some(1));
        });

        assert!(second_push_done.load(Ordering::SeqCst));
        assert_eq!(queue.pop(), Some(2));
    });
}

#[test]
fn close_wakes_a_blocked_producer_and_returns_its_item() {
    deadline(GENEROUS, || {
        let queue = Arc::new(BoundedQueue::new(1).unwrap());
        queue.push('x').unwrap();

        thread::scope(|s| {
            let queue_clone = Arc::clone(&queue);
            let blocked = s.spawn(move || queue_clone.push('y'));

            thread::sleep(Duration::from_millis(20));
            queue.close();

            assert_eq!(blocked.join().unwrap(), Err(Closed('y')));
        });

        // The element accepted before the close still drains.
        assert_eq!(queue.pop(), Some('x'));
        assert_eq!(queue.pop(), None);
    });
}

#[test]
fn close_wakes_a_blocked_consumer() {
    deadline(GENEROUS, || {
        let queue = Arc::new(BoundedQueue::<u8>::new(4).unwrap());

        thread::scope(|s| {
            let queue_clone = Arc::clone(&queue);
            let blocked = s.spawn(move || queue_clone.pop());

            thread::sleep(Duration::from_millis(20));
            queue.close();

            assert_eq!(blocked.join().unwrap(), None);
        });
    });
}

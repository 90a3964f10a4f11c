//! Blocking bounded FIFO queue with close semantics.

use std::collections::VecDeque;
use std::fmt;

use thiserror::Error;

use crate::error::ConfigError;
use crate::loom::{Condvar, Mutex};

/// The queue was closed; the rejected element is handed back.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("queue is closed")]
pub struct Closed<T>(
    /// The element the queue refused.
    pub T,
);

/// A bounded multi-producer multi-consumer queue.
///
/// `push` blocks while the queue is full, `pop` blocks while it is empty.
/// [`close`](Self::close) ends the stream: blocked producers fail with
/// [`Closed`], and consumers drain the remaining elements before seeing
/// `None`. This is the buffered-channel contract expressed as a monitor:
/// one mutex around the buffer, one condvar per direction.
///
/// # Example
///
/// ```
/// use lockstep::BoundedQueue;
/// use std::thread;
///
/// let queue = BoundedQueue::new(4)?;
/// let queue = &queue;
/// let total: u32 = thread::scope(|s| {
///     s.spawn(move || {
///         for i in 1..=10 {
///             queue.push(i).unwrap();
///         }
///         queue.close();
///     });
///     let consumer = s.spawn(move || {
///         let mut sum = 0;
///         while let Some(i) = queue.pop() {
///             sum += i;
///         }
///         sum
///     });
///     consumer.join().unwrap()
/// });
/// assert_eq!(total, 55);
/// # Ok::<(), lockstep::ConfigError>(())
/// ```
pub struct BoundedQueue<T> {
    capacity: usize,
    inner: Mutex<Inner<T>>,
    not_empty: Condvar,
    not_full: Condvar,
}

struct Inner<T> {
    items: VecDeque<T>,
    closed: bool,
}

impl<T> BoundedQueue<T> {
    /// Creates a queue holding at most `capacity` elements.
    ///
    /// # Errors
    ///
    /// `ConfigError::ZeroCapacity` if `capacity` is 0. A zero-capacity
    /// rendezvous queue is a different primitive and is not silently
    /// substituted.
    pub fn new(capacity: usize) -> Result<Self, ConfigError> {
        if capacity == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        Ok(Self {
            capacity,
            inner: Mutex::new(Inner {
                items: VecDeque::with_capacity(capacity),
                closed: false,
            }),
            not_empty: Condvar::new(),
            not_full: Condvar::new(),
        })
    }

    /// Maximum number of elements the queue holds.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Current number of queued elements.
    pub fn len(&self) -> usize {
        self.inner.lock().unwrap().items.len()
    }

    /// Whether the queue currently holds no elements.
    pub fn is_empty(&self) -> bool {
        self.inner.lock().unwrap().items.is_empty()
    }

    /// Whether [`close`](Self::close) has been called.
    pub fn is_closed(&self) -> bool {
        self.inner.lock().unwrap().closed
    }

    /// Appends `item`, blocking while the queue is full.
    ///
    /// # Errors
    ///
    /// Returns `Closed(item)` if the queue is closed before space opens up;
    /// the element is never silently dropped.
    pub fn push(&self, item: T) -> Result<(), Closed<T>> {
        let mut inner = self.inner.lock().unwrap();
        while inner.items.len() == self.capacity && !inner.closed {
            inner = self.not_full.wait(inner).unwrap();
        }
        if inner.closed {
            return Err(Closed(item));
        }
        inner.items.push_back(item);
        drop(inner);
        self.not_empty.notify_one();
        Ok(())
    }

    /// Removes the oldest element, blocking while the queue is empty and
    /// open. Returns `None` once the queue is closed and drained.
    pub fn pop(&self) -> Option<T> {
        let mut inner = self.inner.lock().unwrap();
        while inner.items.is_empty() && !inner.closed {
            inner = self.not_empty.wait(inner).unwrap();
        }
        let item = inner.items.pop_front();
        drop(inner);
        if item.is_some() {
            self.not_full.notify_one();
        }
        item
    }

    /// Closes the queue: producers fail from now on, consumers drain what
    /// remains. Idempotent; wakes every blocked thread.
    pub fn close(&self) {
        let mut inner = self.inner.lock().unwrap();
        if inner.closed {
            return;
        }
        inner.closed = true;
        tracing::trace!(remaining = inner.items.len(), "queue closed");
        drop(inner);
        self.not_empty.notify_all();
        self.not_full.notify_all();
    }
}

impl<T> fmt::Debug for BoundedQueue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundedQueue")
            .field("capacity", &self.capacity)
            .finish_non_exhaustive()
    }
}

#[cfg(all(test, not(loom)))]
mod tests {
    use super::*;

    #[test]
    fn zero_capacity_rejected() {
        assert_eq!(
            BoundedQueue::<u8>::new(0).unwrap_err(),
            ConfigError::ZeroCapacity
        );
    }

    #[test]
    fn fifo_order() {
        let queue = BoundedQueue::new(3).unwrap();
        queue.push(1).unwrap();
        queue.push(2).unwrap();
        queue.push(3).unwrap();
        assert_eq!(queue.len(), 3);
        assert_eq!(queue.pop(), Some(1));
        assert_eq!(queue.pop(), Some(2));
        assert_eq!(queue.pop(), Some(3));
        assert!(queue.is_empty());
    }

    #[test]
    fn close_hands_the_element_back() {
        let queue = BoundedQueue::new(2).unwrap();
        queue.push('a').unwrap();
        queue.close();
        assert_eq!(queue.push('b').unwrap_err(), Closed('b'));
        // The element queued before the close still drains.
        assert_eq!(queue.pop(), Some('a'));
        assert_eq!(queue.pop(), None);
    }

    #[test]
    fn close_is_idempotent() {
        let queue = BoundedQueue::<u8>::new(1).unwrap();
        queue.close();
        queue.close();
        assert!(queue.is_closed());
        assert_eq!(queue.pop(), None);
    }
}

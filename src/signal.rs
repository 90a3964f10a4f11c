//! One-shot broadcast gate.

use crate::loom::atomic::{AtomicBool, Ordering};
use crate::loom::{Condvar, Mutex};

/// A one-shot broadcast gate: created closed, opened exactly once, open
/// forever after. Opening releases every current and future waiter at once.
///
/// `Signal` is deliberately not resettable. A reusable rendezvous point (see
/// [`ReusableBarrier`](crate::ReusableBarrier)) swaps in a fresh `Signal` per
/// phase instead of reopening an old one, so stragglers blocked on a previous
/// phase can never be confused with early arrivals of the next.
#[derive(Debug)]
pub struct Signal {
    /// Fast path: once open, waiters return without touching the lock.
    opened: AtomicBool,
    lock: Mutex<bool>,
    cond: Condvar,
}

impl Signal {
    /// Creates a closed gate.
    pub fn new() -> Self {
        Self {
            opened: AtomicBool::new(false),
            lock: Mutex::new(false),
            cond: Condvar::new(),
        }
    }

    /// Opens the gate and wakes every waiter. Idempotent.
    pub fn set(&self) {
        let mut open = self.lock.lock().unwrap();
        *open = true;
        // Publish the fast-path flag while still holding the lock so a
        // concurrent waiter either sees it or is parked on the condvar.
        self.opened.store(true, Ordering::Release);
        drop(open);
        self.cond.notify_all();
    }

    /// Blocks the calling thread until the gate is open. Returns immediately
    /// if it already is.
    pub fn wait(&self) {
        if self.opened.load(Ordering::Acquire) {
            return;
        }
        self.wait_slow();
    }

    #[cold]
    fn wait_slow(&self) {
        let mut open = self.lock.lock().unwrap();
        while !*open {
            open = self.cond.wait(open).unwrap();
        }
    }

    /// Returns `true` once the gate has been opened.
    pub fn is_set(&self) -> bool {
        self.opened.load(Ordering::Acquire)
    }
}

impl Default for Signal {
    fn default() -> Self {
        Self::new()
    }
}

//! A deadlock-free arbiter for cyclically dependent workers.
//!
//! [`RingArbiter`] coordinates `n` workers (*seats*) arranged in a ring,
//! where seat `i` must hold both of its adjacent resources — `i` and
//! `(i + 1) % n` — exclusively before doing its critical work. This is the
//! dining-philosophers pattern, and the naive rendition deadlocks: every
//! seat grabs its left resource simultaneously and waits forever for its
//! right one.
//!
//! The arbiter breaks the cycle with two rules:
//!
//! - **Double grant.** The first seat to ask while the table is completely
//!   idle (no resource held, nobody queued) claims *both* of its resources
//!   in one critical section. It never waits while holding anything.
//! - **Ascending order.** Every other seat takes its two resources strictly
//!   in ascending resource index, parking on a condvar between them. Any
//!   chain of "holds one, waits for the next" therefore runs up the resource
//!   indices and must terminate; no cycle can form.
//!
//! Each resource additionally hands off to its waiters in FIFO order, so a
//! wait is bounded by queue length times bounded hold time — at most two
//! seats ever compete for one resource, which precludes starvation under
//! bounded think/eat times.
//!
//! The mutex guarding the bookkeeping is only ever held across a state
//! check-and-update. All blocking happens in condvar waits, which release
//! the mutex while parked.

use std::collections::VecDeque;
use std::fmt;

use serde::Serialize;

use crate::error::ConfigError;
use crate::loom::{Condvar, Mutex};

/// An arbiter for a ring of workers sharing pairwise-adjacent resources.
///
/// Shared by reference (typically `Arc`); all synchronization is internal.
/// See the [module docs](self) for the deadlock-avoidance policy.
///
/// # Example
///
/// ```
/// use lockstep::RingArbiter;
/// use std::sync::Arc;
/// use std::thread;
///
/// let arbiter = Arc::new(RingArbiter::new(5)?);
/// thread::scope(|s| {
///     for seat in 0..5 {
///         let arbiter = Arc::clone(&arbiter);
///         s.spawn(move || {
///             for _ in 0..10 {
///                 let guard = arbiter.acquire(seat);
///                 // critical work while both resources are held
///                 drop(guard);
///             }
///         });
///     }
/// });
/// assert_eq!(arbiter.stats().total_grants(), 50);
/// # Ok::<(), lockstep::ConfigError>(())
/// ```
pub struct RingArbiter {
    seats: usize,
    table: Mutex<Table>,
    /// Signalled whenever resources are freed (both at once on release).
    freed: Condvar,
}

/// Bookkeeping behind the mutex. Every invariant lives here: `holders` is a
/// function from resource to at most one seat, `seated` counts seats holding
/// at least one resource, and `queued` counts seats parked in some `waiting`
/// queue.
struct Table {
    /// Resource index → seat currently holding it.
    holders: Vec<Option<usize>>,
    /// Resource index → FIFO of seats waiting for it.
    waiting: Vec<VecDeque<usize>>,
    seated: usize,
    queued: usize,
    /// Seat → current hold was taken via the idle fast path.
    double_grant: Vec<bool>,
    /// Seat → completed grants, for [`ArbiterStats`].
    grants: Vec<u64>,
    double_grants: u64,
}

impl Table {
    /// Nobody holds anything and nobody is queued: the next acquirer may
    /// take both of its resources at once without contending with anyone.
    fn is_idle(&self) -> bool {
        self.seated == 0 && self.queued == 0
    }

    fn holds_any(&self, seat: usize, left: usize, right: usize) -> bool {
        self.holders[left] == Some(seat) || self.holders[right] == Some(seat)
    }
}

/// Exclusive possession of a seat's two adjacent resources.
///
/// Returned by [`RingArbiter::acquire`]; dropping it releases both resources
/// in a single atomic step. There is no release call to forget or to call
/// twice — releasing without holding is unrepresentable.
#[must_use = "dropping the guard is what releases the resources"]
pub struct SeatGuard<'a> {
    arbiter: &'a RingArbiter,
    seat: usize,
}

/// A snapshot of an arbiter's grant counters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArbiterStats {
    /// Completed grants per seat, indexed by seat.
    pub grants: Vec<u64>,
    /// How many of those grants took the idle fast path.
    pub double_grants: u64,
}

impl ArbiterStats {
    /// Total completed grants across all seats.
    pub fn total_grants(&self) -> u64 {
        self.grants.iter().sum()
    }
}

impl RingArbiter {
    /// Creates an arbiter for a ring of `seats` workers.
    ///
    /// # Errors
    ///
    /// `ConfigError::RingTooSmall` if `seats < 2`: a one-seat ring is
    /// self-adjacent, so its "two" resources are the same resource and a
    /// paired grant can never be satisfied.
    pub fn new(seats: usize) -> Result<Self, ConfigError> {
        if seats < 2 {
            return Err(ConfigError::RingTooSmall(seats));
        }
        Ok(Self {
            seats,
            table: Mutex::new(Table {
                holders: vec![None; seats],
                waiting: (0..seats).map(|_| VecDeque::new()).collect(),
                seated: 0,
                queued: 0,
                double_grant: vec![false; seats],
                grants: vec![0; seats],
                double_grants: 0,
            }),
            freed: Condvar::new(),
        })
    }

    /// Number of seats (and resources) in the ring.
    pub fn seats(&self) -> usize {
        self.seats
    }

    /// Snapshot of the grant counters.
    pub fn stats(&self) -> ArbiterStats {
        let table = self.table.lock().unwrap();
        ArbiterStats {
            grants: table.grants.clone(),
            double_grants: table.double_grants,
        }
    }

    /// Blocks until `seat` holds both of its adjacent resources, then
    /// returns the guard representing that possession.
    ///
    /// Seats block indefinitely by design; bounded waiting comes from the
    /// arbitration policy, not from timeouts. The guard's `Drop` releases
    /// both resources at once.
    ///
    /// # Panics
    ///
    /// If `seat` is out of range, or if the seat already holds one of its
    /// resources (re-entrant acquisition is caller misuse).
    pub fn acquire(&self, seat: usize) -> SeatGuard<'_> {
        assert!(seat < self.seats, "seat {seat} out of range for ring of {}", self.seats);
        let (lo, hi) = self.pair(seat);

        let mut table = self.table.lock().unwrap();
        assert!(
            !table.holds_any(seat, lo, hi),
            "seat {seat} acquired while already holding a resource"
        );

        if table.is_idle() {
            // Both resources are necessarily free; claim the pair in one
            // critical section. This seat is the symmetry breaker: it never
            // holds one resource while waiting for the other.
            table.holders[lo] = Some(seat);
            table.holders[hi] = Some(seat);
            table.seated += 1;
            table.double_grant[seat] = true;
            table.grants[seat] += 1;
            table.double_grants += 1;
            tracing::trace!(seat, "double grant from idle table");
            return SeatGuard { arbiter: self, seat };
        }

        for resource in [lo, hi] {
            table.waiting[resource].push_back(seat);
            table.queued += 1;
            while table.holders[resource].is_some()
                || table.waiting[resource].front() != Some(&seat)
            {
                table = self.freed.wait(table).unwrap();
            }
            table.waiting[resource].pop_front();
            table.queued -= 1;
            if !table.holds_any(seat, lo, hi) {
                table.seated += 1;
            }
            table.holders[resource] = Some(seat);
        }
        table.grants[seat] += 1;
        tracing::trace!(seat, "ordered grant");
        SeatGuard { arbiter: self, seat }
    }

    /// Resource pair for `seat`, in ascending index order.
    fn pair(&self, seat: usize) -> (usize, usize) {
        let left = seat;
        let right = (seat + 1) % self.seats;
        (left.min(right), left.max(right))
    }

    fn release(&self, seat: usize) {
        let (lo, hi) = self.pair(seat);
        let mut table = self.table.lock().unwrap();
        debug_assert_eq!(table.holders[lo], Some(seat));
        debug_assert_eq!(table.holders[hi], Some(seat));
        // Both resources become free in the same critical section; no
        // observer can see the pair half-released.
        table.holders[lo] = None;
        table.holders[hi] = None;
        table.seated -= 1;
        let was_double = std::mem::replace(&mut table.double_grant[seat], false);
        tracing::trace!(seat, was_double, "released both resources");
        drop(table);
        self.freed.notify_all();
    }
}

impl fmt::Debug for RingArbiter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RingArbiter")
            .field("seats", &self.seats)
            .finish_non_exhaustive()
    }
}

impl SeatGuard<'_> {
    /// The seat this guard belongs to.
    pub fn seat(&self) -> usize {
        self.seat
    }
}

impl Drop for SeatGuard<'_> {
    fn drop(&mut self) {
        self.arbiter.release(self.seat);
    }
}

impl fmt::Debug for SeatGuard<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SeatGuard").field("seat", &self.seat).finish()
    }
}

#[cfg(all(test, not(loom)))]
mod tests {
    use super::*;

    #[test]
    fn tiny_rings_rejected() {
        assert_eq!(RingArbiter::new(0).unwrap_err(), ConfigError::RingTooSmall(0));
        assert_eq!(RingArbiter::new(1).unwrap_err(), ConfigError::RingTooSmall(1));
    }

    #[test]
    fn solo_acquires_are_double_grants() {
        let arbiter = RingArbiter::new(5).unwrap();
        for seat in 0..5 {
            let guard = arbiter.acquire(seat);
            assert_eq!(guard.seat(), seat);
            drop(guard);
        }
        let stats = arbiter.stats();
        assert_eq!(stats.grants, vec![1; 5]);
        assert_eq!(stats.double_grants, 5);
        assert_eq!(stats.total_grants(), 5);
    }

    #[test]
    fn guard_drop_frees_the_pair() {
        let arbiter = RingArbiter::new(3).unwrap();
        drop(arbiter.acquire(0));
        // Seat 1 shares resource 1 with seat 0; this would wedge if the
        // release had leaked either resource.
        drop(arbiter.acquire(1));
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn out_of_range_seat_panics() {
        let arbiter = RingArbiter::new(2).unwrap();
        let _ = arbiter.acquire(2);
    }
}

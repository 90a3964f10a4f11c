//! A reusable cyclic barrier.
//!
//! [`ReusableBarrier`] blocks a fixed party of workers until all of them have
//! arrived at a phase boundary, releases them together, and transparently
//! re-arms itself for the next phase. Unlike a naive counter reset, the
//! re-arm happens only after every worker has fully *left* the previous
//! phase, so a fast worker looping straight back into `wait` can never be
//! counted against a phase it did not belong to.
//!
//! The handshake is two counters and two gates per phase:
//!
//! 1. Workers capture the current phase's gate pair, then count themselves
//!    in. The arrival that completes the party (the *leader*) opens the
//!    enter gate, releasing everyone.
//! 2. Workers count themselves out. The last one to leave installs a fresh
//!    gate pair, resets both counters, and only then opens the leave gate.
//!
//! Gates are [`Signal`]s behind `Arc`s and are replaced, never reopened:
//! stragglers still blocked on an old gate hold their own references to it.

use crossbeam_utils::CachePadded;

use crate::error::ConfigError;
use crate::loom::atomic::{AtomicU64, AtomicUsize, Ordering};
use crate::loom::{Arc, Mutex};
use crate::signal::Signal;

/// A barrier a fixed party of workers crosses together, repeatedly.
///
/// Shared by reference (typically `Arc`); all synchronization is internal,
/// and independent barriers never interfere with each other.
///
/// # Example
///
/// ```
/// use lockstep::ReusableBarrier;
/// use std::sync::Arc;
/// use std::thread;
///
/// let barrier = Arc::new(ReusableBarrier::new(2)?);
/// let partner = Arc::clone(&barrier);
/// let worker = thread::spawn(move || {
///     for _ in 0..3 {
///         partner.wait();
///     }
/// });
/// for _ in 0..3 {
///     barrier.wait();
/// }
/// worker.join().unwrap();
/// assert_eq!(barrier.phases(), 3);
/// # Ok::<(), lockstep::ConfigError>(())
/// ```
#[derive(Debug)]
pub struct ReusableBarrier {
    parties: usize,
    /// Workers that have entered the current phase.
    arrivals: CachePadded<AtomicUsize>,
    /// Workers that have exited the current phase's enter gate.
    departures: CachePadded<AtomicUsize>,
    /// Completed phases.
    phase: AtomicU64,
    gates: Mutex<Gates>,
}

/// The current phase's gate pair. Replaced wholesale by the last departing
/// worker of each phase.
#[derive(Debug)]
struct Gates {
    enter: Arc<Signal>,
    leave: Arc<Signal>,
}

/// What a worker learns from one barrier crossing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitResult {
    phase: u64,
    is_leader: bool,
}

impl WaitResult {
    /// Index of the phase this crossing completed; the first phase is 0.
    pub fn phase(&self) -> u64 {
        self.phase
    }

    /// Whether this worker's arrival completed the party and triggered the
    /// release. Exactly one worker per phase observes `true`.
    pub fn is_leader(&self) -> bool {
        self.is_leader
    }
}

impl ReusableBarrier {
    /// Creates a barrier for a party of `parties` workers per phase.
    ///
    /// # Errors
    ///
    /// `ConfigError::ZeroParties` if `parties` is 0.
    pub fn new(parties: usize) -> Result<Self, ConfigError> {
        if parties == 0 {
            return Err(ConfigError::ZeroParties);
        }
        Ok(Self {
            parties,
            arrivals: CachePadded::new(AtomicUsize::new(0)),
            departures: CachePadded::new(AtomicUsize::new(0)),
            phase: AtomicU64::new(0),
            gates: Mutex::new(Gates {
                enter: Arc::new(Signal::new()),
                leave: Arc::new(Signal::new()),
            }),
        })
    }

    /// The fixed number of participants per phase.
    pub fn parties(&self) -> usize {
        self.parties
    }

    /// How many phases have completed (all workers in, all workers out).
    pub fn phases(&self) -> u64 {
        self.phase.load(Ordering::Acquire)
    }

    /// Blocks until all `parties` workers of the current phase have called
    /// `wait`, then releases them together.
    ///
    /// Safe to call again immediately for the next phase; no worker is
    /// counted into phase N+1 before every worker has fully exited phase N.
    ///
    /// # Panics
    ///
    /// Best-effort misuse detection: panics if more than `parties` workers
    /// enter a single phase. The party contract is the caller's to uphold.
    pub fn wait(&self) -> WaitResult {
        // Capture this phase's gates before touching the arrival count. A
        // worker that counted in first could otherwise race ahead, drain the
        // whole phase, and swap the gates out from under us.
        let (enter, leave) = {
            let gates = self.gates.lock().unwrap();
            (Arc::clone(&gates.enter), Arc::clone(&gates.leave))
        };
        let phase = self.phase.load(Ordering::Acquire);

        let arrived = self.arrivals.fetch_add(1, Ordering::AcqRel) + 1;
        assert!(
            arrived <= self.parties,
            "barrier misuse: more than {} workers entered phase {phase}",
            self.parties,
        );
        let is_leader = arrived == self.parties;
        if is_leader {
            tracing::trace!(phase, parties = self.parties, "party complete, releasing");
            enter.set();
        }
        enter.wait();

        let departed = self.departures.fetch_add(1, Ordering::AcqRel) + 1;
        if departed == self.parties {
            // Last worker out re-arms the barrier: fresh gates first, then
            // the counters, and only then the leave broadcast. Nobody can
            // re-enter until the leave gate opens, so the re-arm is invisible
            // to this phase and complete before the next one starts.
            {
                let mut gates = self.gates.lock().unwrap();
                gates.enter = Arc::new(Signal::new());
                gates.leave = Arc::new(Signal::new());
            }
            self.arrivals.store(0, Ordering::Release);
            self.departures.store(0, Ordering::Release);
            self.phase.fetch_add(1, Ordering::AcqRel);
            tracing::trace!(phase, "phase drained, barrier re-armed");
            leave.set();
        }
        leave.wait();

        WaitResult { phase, is_leader }
    }
}

//! # `lockstep` - Classic Concurrency Coordination Patterns
//!
//! Teaching-grade but production-shaped implementations of the classic
//! thread-coordination patterns: a reusable cyclic barrier, a deadlock-free
//! dining-philosophers arbiter, a blocking bounded queue, and a cellular
//! automaton whose generations can be stepped by barrier-synchronized
//! worker strips. The barrier and the arbiter are the core; the queue and
//! the grid exist for the demo programs in `demos/`.
//!
//! ## Coordination Guarantees
//!
//! - **Barrier phase atomicity**: no worker returns from
//!   [`ReusableBarrier::wait`] before all of the party has arrived, and no
//!   worker enters phase N+1 before every worker has fully exited phase N.
//!   Reuse needs no reset call: the barrier re-arms itself only after the
//!   previous phase has completely drained.
//! - **Deadlock freedom**: the [`RingArbiter`] grants each seat exclusive
//!   possession of both of its ring-adjacent resources without ever
//!   admitting a cyclic wait, via an idle-table double grant plus ascending
//!   resource ordering for everyone else.
//! - **No busy-waiting**: every blocking operation parks on a condvar;
//!   mutexes are held only across state check-and-update, never across a
//!   wait.
//! - **Invalid states are unrepresentable**: releasing resources you do not
//!   hold has no API surface ([`SeatGuard`] releases on drop), constructors
//!   reject configurations the algorithms cannot honor instead of coercing
//!   them, and double-held resources cannot be expressed in the arbiter's
//!   bookkeeping.
//!
//! ## Architecture
//!
//! [`Signal`] is the leaf: a one-shot broadcast gate. [`ReusableBarrier`]
//! composes two counters and two gates per phase, replacing gates instead
//! of reopening them so stragglers can never be confused with early
//! arrivals. [`RingArbiter`] is an independent monitor with FIFO handoff
//! per resource. [`BoundedQueue`] and [`Grid`] are self-contained demo
//! support.
//!
//! Every primitive owns its coordination state as instance fields shared by
//! `Arc`, so independent barriers and arbiters coexist without
//! interference. Under `RUSTFLAGS="--cfg loom"` the crate builds against
//! loom's model-checked sync types for exhaustive small-schedule testing.
//!
//! ## Example
//!
//! ```
//! use lockstep::ReusableBarrier;
//! use std::sync::Arc;
//! use std::thread;
//!
//! let barrier = Arc::new(ReusableBarrier::new(4)?);
//! thread::scope(|s| {
//!     for _ in 0..4 {
//!         let barrier = Arc::clone(&barrier);
//!         s.spawn(move || {
//!             // part A
//!             barrier.wait();
//!             // part B starts only after everyone finished part A
//!         });
//!     }
//! });
//! assert_eq!(barrier.phases(), 1);
//! # Ok::<(), lockstep::ConfigError>(())
//! ```

#![warn(missing_docs, clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

pub mod arbiter;
pub mod barrier;
pub mod error;
pub mod life;
mod loom;
pub mod queue;
pub mod signal;

pub use arbiter::{ArbiterStats, RingArbiter, SeatGuard};
pub use barrier::{ReusableBarrier, WaitResult};
pub use error::ConfigError;
pub use life::Grid;
pub use queue::{BoundedQueue, Closed};
pub use signal::Signal;

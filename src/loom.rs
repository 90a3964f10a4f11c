//! Sync primitive imports, swappable for loom's model-checked versions.
//!
//! Normal builds re-export the `std::sync` types. Under
//! `RUSTFLAGS="--cfg loom"` the same names resolve to `loom::sync`, so the
//! model checker in `tests/loom.rs` can drive the real barrier, arbiter, and
//! queue code through every interleaving of a small schedule.

#[cfg(loom)]
pub(crate) use ::loom::sync::{atomic, Arc, Condvar, Mutex};

#[cfg(not(loom))]
pub(crate) use std::sync::{atomic, Arc, Condvar, Mutex};

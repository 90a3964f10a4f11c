//! Constructor-time configuration errors.
//!
//! The coordination primitives in this crate have no transient failure
//! modes: once built, they either make progress or the caller has violated a
//! precondition. The only fallible surface is construction, which rejects
//! sizes the algorithms cannot honor instead of silently coercing them.

use thiserror::Error;

/// A configuration rejected at construction.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// A barrier needs at least one participant per phase.
    #[error("barrier party size must be at least 1")]
    ZeroParties,

    /// A one-seat ring is self-adjacent: its "two" neighboring resources are
    /// the same resource, so a paired grant can never be satisfied.
    #[error("arbiter ring must have at least 2 seats, got {0}")]
    RingTooSmall(usize),

    /// A bounded queue needs room for at least one element.
    #[error("queue capacity must be at least 1")]
    ZeroCapacity,

    /// A grid needs at least one row and one column.
    #[error("grid dimensions must be non-zero, got {width}x{height}")]
    EmptyGrid {
        /// Requested number of columns.
        width: usize,
        /// Requested number of rows.
        height: usize,
    },
}

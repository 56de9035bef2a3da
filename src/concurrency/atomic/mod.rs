//! Partition-local atomic primitives.
//!
//! These are the storage behind the shared traversal state: a one-shot latch for
//! the "found" cell and a word-packed bitset for visited markers. Every write they
//! expose is idempotent, so concurrent callers never need a lock.

/// One-shot boolean latch.
pub mod flag;
/// Word-packed atomic bitsets.
pub mod bitset;

pub use bitset::AtomicBitset;
pub use flag::AtomicFlag;

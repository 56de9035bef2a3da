//! Containers the traversal engine shares across partitions.
//!
//! - [`LocalSet`]: bucketed, internally synchronized set used as a shard.
//! - [`DistributedSet`]: hash-partitioned set (BFS frontiers).
//! - [`DistributedBitset`]: block-partitioned dense bitset (visited markers).
//! - [`DistributedFlag`]: single shared latch (the "found" cell).
//!
//! Every distributed container is created through [`Runtime::create`](crate::Runtime::create)
//! and comes back as an [`Owned`](crate::runtime::Owned) guard.

pub mod bitset;
pub mod flag;
pub mod local_set;
pub mod set;

pub use bitset::DistributedBitset;
pub use flag::DistributedFlag;
pub use local_set::LocalSet;
pub use set::DistributedSet;

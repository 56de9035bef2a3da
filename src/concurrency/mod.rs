//! Concurrency primitives shared by the distributed containers.
//!
//! Nothing here synchronizes across partitions by itself: each primitive is the
//! storage of one partition's shard, and the containers in
//! [`collections`](crate::collections) route operations to the owning shard.

pub mod atomic;

pub use atomic::{AtomicBitset, AtomicFlag};

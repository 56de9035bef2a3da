//! Block-partitioned distributed bitset.

use core::sync::atomic::Ordering;

use crate::concurrency::AtomicBitset;
use crate::runtime::{ObjectId, Owned, PartitionId, Runtime};

/// One partition's view of a fixed-length distributed bitset.
///
/// Bits are split into contiguous blocks, one per partition. Each bit is an
/// independent atomic cell: setting a set bit is a no-op, so concurrent writers
/// need no coordination beyond the single-word atomic.
pub struct DistributedBitset {
    runtime: Runtime,
    id: ObjectId<DistributedBitset>,
    partition: PartitionId,
    len: usize,
    block: usize,
    offset: usize,
    local: AtomicBitset,
}

impl DistributedBitset {
    /// Creates a bitset of `len` cleared bits.
    pub fn create(runtime: &Runtime, len: usize) -> Owned<Self> {
        let block = len.div_ceil(runtime.num_partitions()).max(1);
        runtime.create(|ctx| {
            let offset = (ctx.partition * block).min(len);
            let end = (offset + block).min(len);
            Self {
                runtime: ctx.runtime,
                id: ctx.id,
                partition: ctx.partition,
                len,
                block,
                offset,
                local: AtomicBitset::new(end - offset),
            }
        })
    }

    /// Global reference to this bitset.
    #[inline]
    pub fn id(&self) -> ObjectId<Self> {
        self.id
    }

    /// Total number of bits.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` for a zero-length bitset.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Partition owning `bit`.
    #[inline]
    pub fn owner_of(&self, bit: usize) -> PartitionId {
        bit / self.block
    }

    /// Returns whether `bit` is set.
    ///
    /// # Panics
    /// Panics if `bit >= len()`.
    pub fn is_set(&self, bit: usize) -> bool {
        self.with_block(bit, |local, i| local.is_set(i, Ordering::Acquire))
    }

    /// Sets `bit`.
    ///
    /// # Panics
    /// Panics if `bit >= len()`.
    pub fn set(&self, bit: usize) {
        self.with_block(bit, |local, i| local.set(i, Ordering::Release));
    }

    /// Sets `bit` and returns `true` iff this call observed it cleared.
    ///
    /// # Panics
    /// Panics if `bit >= len()`.
    pub fn test_and_set(&self, bit: usize) -> bool {
        self.with_block(bit, |local, i| local.test_and_set(i, Ordering::AcqRel))
    }

    /// Number of set bits across all partitions.
    pub fn count_ones(&self) -> usize {
        (0..self.runtime.num_partitions())
            .map(|p| self.with_partition(p, |b| b.local.count_ones()))
            .sum()
    }

    /// Clears every bit. Must not race with writers.
    pub fn clear_all(&self) {
        for p in 0..self.runtime.num_partitions() {
            self.with_partition(p, |b| b.local.clear_all());
        }
    }

    fn with_block<R>(&self, bit: usize, f: impl FnOnce(&AtomicBitset, usize) -> R) -> R {
        assert!(bit < self.len, "bit {bit} out of bounds for len {}", self.len);
        self.with_partition(self.owner_of(bit), |b| f(&b.local, bit - b.offset))
    }

    fn with_partition<R>(&self, partition: PartitionId, f: impl FnOnce(&Self) -> R) -> R {
        if partition == self.partition {
            f(self)
        } else {
            let peer = self.runtime.local_at(partition, self.id);
            f(&*peer)
        }
    }
}

impl std::fmt::Debug for DistributedBitset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DistributedBitset")
            .field("id", &self.id)
            .field("partition", &self.partition)
            .field("len", &self.len)
            .field("block", &(self.offset..self.offset + self.local.len()))
            .finish()
    }
}

//! Single-cell distributed latch.

use core::sync::atomic::Ordering;

use crossbeam_utils::CachePadded;

use crate::concurrency::AtomicFlag;
use crate::runtime::{ObjectId, Owned, PartitionId, Runtime};

/// Partition hosting the authoritative cell.
const HOME: PartitionId = 0;

/// One partition's view of a shared write-once boolean.
///
/// The cell lives on partition 0; other partitions' instances route to it.
pub struct DistributedFlag {
    runtime: Runtime,
    id: ObjectId<DistributedFlag>,
    partition: PartitionId,
    cell: CachePadded<AtomicFlag>,
}

impl DistributedFlag {
    /// Creates a lowered flag.
    pub fn create(runtime: &Runtime) -> Owned<Self> {
        runtime.create(|ctx| Self {
            runtime: ctx.runtime,
            id: ctx.id,
            partition: ctx.partition,
            cell: CachePadded::new(AtomicFlag::new()),
        })
    }

    /// Global reference to this flag.
    #[inline]
    pub fn id(&self) -> ObjectId<Self> {
        self.id
    }

    /// Returns whether the flag has been raised.
    pub fn is_set(&self) -> bool {
        self.with_home(|cell| cell.is_set(Ordering::Acquire))
    }

    /// Raises the flag; returns `true` iff this call performed the transition.
    pub fn set(&self) -> bool {
        self.with_home(|cell| cell.set(Ordering::AcqRel))
    }

    fn with_home<R>(&self, f: impl FnOnce(&AtomicFlag) -> R) -> R {
        if self.partition == HOME {
            f(&*self.cell)
        } else {
            let home = self.runtime.local_at(HOME, self.id);
            f(&*home.cell)
        }
    }
}

impl std::fmt::Debug for DistributedFlag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DistributedFlag")
            .field("id", &self.id)
            .field("partition", &self.partition)
            .finish_non_exhaustive()
    }
}

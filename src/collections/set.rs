//! Hash-partitioned distributed set.

use std::hash::Hash;
use std::sync::Arc;

use super::LocalSet;
use crate::runtime::{CompletionHandle, ObjectId, Owned, PartitionId, Runtime};

/// One partition's view of a distributed set.
///
/// Elements live on the partition [`Runtime::owner_of`] assigns them; every
/// operation may be called on any partition's instance and is routed there.
pub struct DistributedSet<T> {
    runtime: Runtime,
    id: ObjectId<DistributedSet<T>>,
    partition: PartitionId,
    local: LocalSet<T>,
}

impl<T> DistributedSet<T>
where
    T: Eq + Hash + Clone + Send + Sync + 'static,
{
    /// Creates an empty set sized for roughly `size_hint` elements in total.
    pub fn create(runtime: &Runtime, size_hint: usize) -> Owned<Self> {
        let shard_hint = size_hint.div_ceil(runtime.num_partitions());
        runtime.create(|ctx| Self {
            runtime: ctx.runtime,
            id: ctx.id,
            partition: ctx.partition,
            local: LocalSet::with_hint(shard_hint),
        })
    }

    /// Global reference to this set.
    #[inline]
    pub fn id(&self) -> ObjectId<Self> {
        self.id
    }

    /// Partition this instance belongs to.
    #[inline]
    pub fn partition(&self) -> PartitionId {
        self.partition
    }

    /// This partition's shard.
    #[inline]
    pub fn local(&self) -> &LocalSet<T> {
        &self.local
    }

    /// Inserts `value` into its owner's shard; returns `false` if it was present.
    pub fn insert(&self, value: T) -> bool {
        let owner = self.runtime.owner_of(&value);
        self.with_shard(owner, |shard| shard.insert(value))
    }

    /// Inserts `value` from a task on its owner partition.
    pub fn async_insert(&self, handle: &CompletionHandle, value: T) {
        let owner = self.runtime.owner_of(&value);
        let id = self.id;
        handle.async_execute_at(owner, move |h| {
            h.runtime().local(id).local.insert(value);
        });
    }

    /// Membership test.
    pub fn contains(&self, value: &T) -> bool {
        let owner = self.runtime.owner_of(value);
        self.with_shard(owner, |shard| shard.contains(value))
    }

    /// Total number of elements across all partitions.
    pub fn size(&self) -> usize {
        (0..self.runtime.num_partitions())
            .map(|p| self.with_shard(p, |shard| shard.len()))
            .sum()
    }

    /// Returns `true` if no partition holds an element.
    pub fn is_empty(&self) -> bool {
        (0..self.runtime.num_partitions()).all(|p| self.with_shard(p, |shard| shard.is_empty()))
    }

    /// Clears every shard and re-sizes it for `size_hint` total elements.
    ///
    /// Must not race with other operations on the same set.
    pub fn reset(&self, size_hint: usize) {
        let shard_hint = size_hint.div_ceil(self.runtime.num_partitions());
        for p in 0..self.runtime.num_partitions() {
            self.with_shard(p, |shard| shard.reset(shard_hint));
        }
    }

    /// Visits every element on the calling thread.
    pub fn for_each_element<F: FnMut(&T)>(&self, mut f: F) {
        for p in 0..self.runtime.num_partitions() {
            self.with_shard(p, |shard| shard.for_each(&mut f));
        }
    }

    /// Visits every element from tasks registered on `handle`.
    ///
    /// One task is started per partition; it fans out one further task per
    /// non-empty bucket, which runs `f` over a snapshot of that bucket. `f` may
    /// register more work on the handle it receives. Returns before any element
    /// is visited: join `handle` to observe completion.
    pub fn async_for_each_element<F>(&self, handle: &CompletionHandle, f: F)
    where
        F: Fn(&CompletionHandle, &T) + Send + Sync + 'static,
    {
        let f = Arc::new(f);
        let id = self.id;
        for p in 0..self.runtime.num_partitions() {
            let f = Arc::clone(&f);
            handle.async_execute_at(p, move |h| {
                let shard = h.runtime().local(id);
                for b in 0..shard.local.bucket_count() {
                    let elements = shard.local.snapshot_bucket(b);
                    if elements.is_empty() {
                        continue;
                    }
                    let f = Arc::clone(&f);
                    h.async_execute(move |h| {
                        for element in &elements {
                            f(h, element);
                        }
                    });
                }
            });
        }
    }

    fn with_shard<R>(&self, partition: PartitionId, f: impl FnOnce(&LocalSet<T>) -> R) -> R {
        if partition == self.partition {
            f(&self.local)
        } else {
            let peer = self.runtime.local_at(partition, self.id);
            f(&peer.local)
        }
    }
}

impl<T> std::fmt::Debug for DistributedSet<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DistributedSet")
            .field("id", &self.id)
            .field("partition", &self.partition)
            .field("local", &self.local)
            .finish()
    }
}

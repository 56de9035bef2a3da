//! Partition-local bucketed storage of adjacency entries.

use std::collections::HashMap;
use std::hash::Hash;

use parking_lot::RwLock;

use super::neighbors::AttrEdges;
use crate::collections::local_set::bucket_of;
use crate::config::EdgeIndexConfig;
use crate::runtime::hash_key;

type Bucket<V, A> = RwLock<HashMap<V, AttrEdges<V, A>>>;

/// Entries keyed by source vertex, spread over independently locked buckets.
///
/// Bucket count is `max(num_vertices / entries_per_bucket, 1)`. Readers of one
/// bucket share its lock; writers to different buckets never contend.
pub(crate) struct EdgeStorage<V, A> {
    buckets: Box<[Bucket<V, A>]>,
}

impl<V: Eq + Hash + Copy, A: Default> EdgeStorage<V, A> {
    pub(crate) fn new(num_vertices: usize, config: &EdgeIndexConfig) -> Self {
        let buckets = (0..config.bucket_count(num_vertices))
            .map(|_| RwLock::new(HashMap::new()))
            .collect();
        Self { buckets }
    }

    pub(crate) fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    #[inline]
    fn bucket(&self, src: &V) -> &Bucket<V, A> {
        &self.buckets[bucket_of(hash_key(src), self.buckets.len())]
    }

    /// Runs `f` on the entry for `src` under a shared lock.
    pub(crate) fn get<R>(&self, src: &V, f: impl FnOnce(&AttrEdges<V, A>) -> R) -> Option<R> {
        self.bucket(src).read().get(src).map(f)
    }

    /// Runs `f` on the existing entry for `src` under an exclusive lock.
    pub(crate) fn update<R>(
        &self,
        src: &V,
        f: impl FnOnce(&mut AttrEdges<V, A>) -> R,
    ) -> Option<R> {
        self.bucket(src).write().get_mut(src).map(f)
    }

    /// Runs `f` on the entry for `src`, creating a default-attributed one first.
    pub(crate) fn upsert<R>(&self, src: V, f: impl FnOnce(&mut AttrEdges<V, A>) -> R) -> R {
        let mut bucket = self.bucket(&src).write();
        f(bucket.entry(src).or_insert_with(|| AttrEdges::new(A::default())))
    }

    pub(crate) fn contains(&self, src: &V) -> bool {
        self.bucket(src).read().contains_key(src)
    }

    pub(crate) fn len(&self) -> usize {
        self.buckets.iter().map(|b| b.read().len()).sum()
    }

    pub(crate) fn num_edges(&self) -> usize {
        self.buckets
            .iter()
            .map(|b| b.read().values().map(|e| e.size()).sum::<usize>())
            .sum()
    }
}

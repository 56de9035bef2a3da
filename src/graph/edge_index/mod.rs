//! Sharded attributed edge index.
//!
//! Each source vertex is owned by one partition (by hash of its id). On that
//! partition its entry, an attribute value plus a neighbor set, lives in a
//! bucketed [`EdgeStorage`]. Every partition holds an
//! [`AttributedEdgeIndex`] instance under the same [`ObjectId`]; operations on
//! any instance are routed to the owner of the source vertex:
//!
//! - synchronous forms access the owner's storage directly and return once done;
//! - `async_*` forms ship the operation to the owner as a task registered on a
//!   [`CompletionHandle`] and may return before it runs.
//!
//! A source without an entry has no attribute and no neighbors. That is a normal
//! outcome, reported as `None`/`false`, never as an error.

mod chunk;
mod neighbors;
mod storage;

#[cfg(test)]
mod tests;

pub use chunk::{EdgeListChunk, FlatEdgeList};
pub use neighbors::AttrEdges;

use std::collections::BTreeMap;
use std::sync::Arc;

use self::storage::EdgeStorage;
use super::VertexId;
use crate::config::EdgeIndexConfig;
use crate::runtime::{CompletionHandle, ObjectId, Owned, PartitionId, Runtime};

/// Neighbor lists longer than this are visited by several tasks.
const NEIGHBOR_TASK_BATCH: usize = 256;

/// One partition's view of a distributed adjacency store with per-source attributes.
pub struct AttributedEdgeIndex<V, A = ()> {
    runtime: Runtime,
    id: ObjectId<AttributedEdgeIndex<V, A>>,
    partition: PartitionId,
    num_vertices: usize,
    storage: EdgeStorage<V, A>,
}

impl<V, A> AttributedEdgeIndex<V, A>
where
    V: VertexId,
    A: Default + Send + Sync + 'static,
{
    /// Creates an empty index for a graph of `num_vertices` vertices.
    pub fn create(runtime: &Runtime, num_vertices: usize) -> Owned<Self> {
        Self::create_with_config(runtime, num_vertices, EdgeIndexConfig::default())
    }

    /// Creates an empty index with explicit bucket sizing.
    pub fn create_with_config(
        runtime: &Runtime,
        num_vertices: usize,
        config: EdgeIndexConfig,
    ) -> Owned<Self> {
        runtime.create(|ctx| Self {
            runtime: ctx.runtime,
            id: ctx.id,
            partition: ctx.partition,
            num_vertices,
            storage: EdgeStorage::new(num_vertices, &config),
        })
    }

    /// Builds an index from `(src, dest)` pairs.
    ///
    /// Destinations are grouped per source and shipped to each owner as
    /// [`EdgeListChunk`]s. Blocks until every chunk is applied, so it must be
    /// called from outside the runtime's worker pools.
    ///
    /// # Panics
    /// Panics if an endpoint is not below `num_vertices`.
    pub fn from_edges<I>(runtime: &Runtime, num_vertices: usize, edges: I) -> Owned<Self>
    where
        I: IntoIterator<Item = (V, V)>,
    {
        let mut grouped: BTreeMap<V, Vec<V>> = BTreeMap::new();
        for (src, dest) in edges {
            assert_edge_in_bounds(num_vertices, src, dest);
            grouped.entry(src).or_default().push(dest);
        }

        let index = Self::create(runtime, num_vertices);
        let handle = CompletionHandle::new(runtime);
        for (src, dests) in &grouped {
            for chunk in EdgeListChunk::split(dests, false) {
                index.async_insert_edge_list_chunk(&handle, *src, chunk);
            }
        }
        handle.wait();
        tracing::debug!(
            object = index.id().raw(),
            sources = grouped.len(),
            edges = index.num_edges(),
            "edge index populated"
        );
        index
    }

    /// Global reference to this index.
    #[inline]
    pub fn id(&self) -> ObjectId<Self> {
        self.id
    }

    /// Runtime the index lives in.
    #[inline]
    pub fn runtime(&self) -> &Runtime {
        &self.runtime
    }

    /// Partition this instance belongs to.
    #[inline]
    pub fn partition(&self) -> PartitionId {
        self.partition
    }

    /// Vertex count the index was created for.
    #[inline]
    pub fn size(&self) -> usize {
        self.num_vertices
    }

    /// Number of storage buckets in this partition's shard.
    #[inline]
    pub fn local_bucket_count(&self) -> usize {
        self.storage.bucket_count()
    }

    /// Partition owning `src`'s entry.
    #[inline]
    pub fn owner_of(&self, src: V) -> PartitionId {
        self.runtime.owner_of(&src)
    }

    /// Number of source entries across all partitions.
    pub fn num_entries(&self) -> usize {
        (0..self.runtime.num_partitions())
            .map(|p| self.with_partition(p, |s| s.len()))
            .sum()
    }

    /// Number of stored edges across all partitions.
    pub fn num_edges(&self) -> usize {
        (0..self.runtime.num_partitions())
            .map(|p| self.with_partition(p, |s| s.num_edges()))
            .sum()
    }

    /// Returns `true` if `src` has an entry.
    pub fn contains_vertex(&self, src: V) -> bool {
        self.with_owner(src, |s| s.contains(&src))
    }

    /// Out-degree of `src`; zero when it has no entry.
    pub fn degree(&self, src: V) -> usize {
        self.with_owner(src, |s| s.get(&src, |e| e.size()))
            .unwrap_or(0)
    }

    /// Copy of `src`'s neighbor set, in no particular order.
    pub fn neighbors(&self, src: V) -> Vec<V> {
        self.with_owner(src, |s| s.get(&src, |e| e.snapshot()))
            .unwrap_or_default()
    }

    // ---------------------------------------------------------------------
    // Attributes
    // ---------------------------------------------------------------------

    /// Copy of `src`'s attribute value, or `None` if `src` has no entry.
    pub fn get_vertex_attributes(&self, src: V) -> Option<A>
    where
        A: Clone,
    {
        self.with_owner(src, |s| s.get(&src, |e| e.attributes().clone()))
    }

    /// Writes `src`'s attribute value into `out`.
    ///
    /// Returns `false` and leaves `out` untouched if `src` has no entry.
    pub fn get_vertex_attributes_into(&self, src: V, out: &mut A) -> bool
    where
        A: Clone,
    {
        match self.get_vertex_attributes(src) {
            Some(attributes) => {
                *out = attributes;
                true
            }
            None => false,
        }
    }

    /// Stores `attributes` for `src`, creating the entry if needed.
    ///
    /// # Panics
    /// Panics if `src` is not below `size()`.
    pub fn set_vertex_attributes(&self, src: V, attributes: A) {
        assert_vertex_in_bounds(self.num_vertices, src);
        self.with_owner(src, |s| s.upsert(src, |e| *e.attributes_mut() = attributes));
    }

    /// Calls `f(&src, &mut attributes)` on `src`'s stored attribute.
    ///
    /// No-op returning `false` if `src` has no entry. `f` runs under the entry's
    /// bucket lock and must not touch this index.
    pub fn vertex_attributes_apply<F>(&self, src: V, f: F) -> bool
    where
        F: FnOnce(&V, &mut A),
    {
        self.with_owner(src, |s| s.update(&src, |e| f(&src, e.attributes_mut())))
            .is_some()
    }

    /// Asynchronous [`vertex_attributes_apply`](Self::vertex_attributes_apply),
    /// run on the owner of `src`.
    pub fn async_vertex_attributes_apply<F>(&self, handle: &CompletionHandle, src: V, f: F)
    where
        F: FnOnce(&V, &mut A) + Send + 'static,
    {
        let id = self.id;
        handle.async_execute_at(self.owner_of(src), move |h| {
            h.runtime().local(id).vertex_attributes_apply(src, f);
        });
    }

    // ---------------------------------------------------------------------
    // Neighbor mutation
    // ---------------------------------------------------------------------

    /// Adds `dest` to `src`'s neighbors; returns `false` if it was present.
    ///
    /// # Panics
    /// Panics if either endpoint is not below `size()`.
    pub fn insert(&self, src: V, dest: V) -> bool {
        assert_edge_in_bounds(self.num_vertices, src, dest);
        self.with_owner(src, |s| s.upsert(src, |e| e.insert(dest)))
    }

    /// Asynchronous [`insert`](Self::insert).
    ///
    /// Endpoints are checked on the calling thread, before anything is shipped.
    pub fn async_insert(&self, handle: &CompletionHandle, src: V, dest: V) {
        assert_edge_in_bounds(self.num_vertices, src, dest);
        let id = self.id;
        handle.async_execute_at(self.owner_of(src), move |h| {
            h.runtime().local(id).insert(src, dest);
        });
    }

    /// Removes `dest` from `src`'s neighbors; returns `false` if it was absent.
    pub fn erase(&self, src: V, dest: V) -> bool {
        self.with_owner(src, |s| s.update(&src, |e| e.erase(&dest)))
            .unwrap_or(false)
    }

    /// Asynchronous [`erase`](Self::erase).
    pub fn async_erase(&self, handle: &CompletionHandle, src: V, dest: V) {
        let id = self.id;
        handle.async_execute_at(self.owner_of(src), move |h| {
            h.runtime().local(id).erase(src, dest);
        });
    }

    /// Applies a borrowed bulk list to `src`'s neighbors on the calling thread.
    ///
    /// # Panics
    /// Panics if `src` or any listed destination is not below `size()`.
    pub fn insert_edge_list(&self, src: V, list: FlatEdgeList<'_, V>) {
        self.assert_list_in_bounds(src, list.values);
        self.with_owner(src, |s| s.upsert(src, |e| e.apply_flat(list)));
    }

    /// Applies one chunk to `src`'s neighbors on the calling thread.
    ///
    /// # Panics
    /// Panics if `src` or any applied destination is not below `size()`.
    pub fn insert_edge_list_chunk(&self, src: V, chunk: &EdgeListChunk<V>) {
        self.assert_list_in_bounds(src, chunk.destinations());
        self.with_owner(src, |s| s.upsert(src, |e| e.apply_chunk(chunk)));
    }

    /// Ships `chunk` to the owner of `src` and applies it there.
    pub fn async_insert_edge_list_chunk(
        &self,
        handle: &CompletionHandle,
        src: V,
        chunk: EdgeListChunk<V>,
    ) {
        self.assert_list_in_bounds(src, chunk.destinations());
        let id = self.id;
        handle.async_execute_at(self.owner_of(src), move |h| {
            h.runtime().local(id).insert_edge_list_chunk(src, &chunk);
        });
    }

    // ---------------------------------------------------------------------
    // Neighbor iteration
    // ---------------------------------------------------------------------

    /// Calls `f` on every neighbor of `src` before returning.
    ///
    /// `f` runs under the entry's bucket lock and must not mutate this index.
    pub fn for_each_neighbor<F>(&self, src: V, mut f: F)
    where
        F: FnMut(&V),
    {
        self.with_owner(src, |s| s.get(&src, |e| e.for_each_neighbor(&mut f)));
    }

    /// Calls `f` on every neighbor of `src` from tasks registered on `handle`.
    ///
    /// Enumeration runs on the owner of `src` over a snapshot of the neighbor
    /// set, so `f` is free to mutate the index. Long lists are split across
    /// several tasks. No order is guaranteed and the call may return before any
    /// invocation has run: join `handle` to observe completion.
    pub fn async_for_each_neighbor<F>(&self, handle: &CompletionHandle, src: V, f: F)
    where
        F: Fn(&CompletionHandle, &V) + Send + Sync + 'static,
    {
        let id = self.id;
        let owner = self.owner_of(src);
        handle.async_execute_at(owner, move |h| {
            let index = h.runtime().local(id);
            let Some(neighbors) = index.storage.get(&src, |e| e.snapshot()) else {
                return;
            };
            if neighbors.len() <= NEIGHBOR_TASK_BATCH {
                neighbors.iter().for_each(|v| f(h, v));
                return;
            }
            let f = Arc::new(f);
            for batch in neighbors.chunks(NEIGHBOR_TASK_BATCH) {
                let batch = batch.to_vec();
                let f = Arc::clone(&f);
                h.async_execute_at(owner, move |h| batch.iter().for_each(|v| f(h, v)));
            }
        });
    }

    fn assert_list_in_bounds(&self, src: V, dests: &[V]) {
        assert_vertex_in_bounds(self.num_vertices, src);
        for &dest in dests {
            assert_edge_in_bounds(self.num_vertices, src, dest);
        }
    }

    fn with_owner<R>(&self, src: V, f: impl FnOnce(&EdgeStorage<V, A>) -> R) -> R {
        self.with_partition(self.owner_of(src), f)
    }

    fn with_partition<R>(
        &self,
        partition: PartitionId,
        f: impl FnOnce(&EdgeStorage<V, A>) -> R,
    ) -> R {
        if partition == self.partition {
            f(&self.storage)
        } else {
            let peer = self.runtime.local_at(partition, self.id);
            f(&peer.storage)
        }
    }
}

fn assert_vertex_in_bounds<V: VertexId>(num_vertices: usize, v: V) {
    assert!(
        v.index() < num_vertices,
        "vertex {v:?} is out of bounds for {num_vertices} vertices"
    );
}

fn assert_edge_in_bounds<V: VertexId>(num_vertices: usize, src: V, dest: V) {
    assert!(
        src.index() < num_vertices && dest.index() < num_vertices,
        "edge {src:?}->{dest:?} is out of bounds for {num_vertices} vertices"
    );
}

impl<V, A> std::fmt::Debug for AttributedEdgeIndex<V, A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AttributedEdgeIndex")
            .field("id", &self.id)
            .field("partition", &self.partition)
            .field("num_vertices", &self.num_vertices)
            .finish_non_exhaustive()
    }
}

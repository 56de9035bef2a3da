//! Level-synchronous unweighted shortest-path length.
//!
//! The engine keeps two frontier sets, a visited bitset and a found latch, all
//! created per query and released when the query returns. Each level:
//!
//! 1. every frontier vertex is expanded by a task on the partition that owns it;
//! 2. each expansion enumerates the vertex's neighbors asynchronously, and every
//!    neighbor visit marks it visited and adds it to the next frontier, or raises
//!    the found latch if it is the target;
//! 3. the driver joins the level's [`CompletionHandle`], which covers both
//!    layers of spawned tasks;
//! 4. the level counter advances and the driver stops, or resets and swaps the
//!    frontiers and goes again.
//!
//! Visits run in no particular order. Every shared write is idempotent (bit set,
//! latch raise, set insert), so any interleaving yields the same level outcome.

use crate::collections::{DistributedBitset, DistributedFlag, DistributedSet};
use crate::graph::{AttributedEdgeIndex, VertexId};
use crate::runtime::{CompletionHandle, ObjectId, Runtime};

/// Distance reported when the target cannot be reached.
///
/// No hop count on a graph that fits in memory can reach `usize::MAX`.
pub const NOT_REACHABLE: usize = usize::MAX;

/// Everything a neighbor visit needs, captured by value in every task.
struct VisitContext<V, A> {
    graph: ObjectId<AttributedEdgeIndex<V, A>>,
    next: ObjectId<DistributedSet<V>>,
    visited: ObjectId<DistributedBitset>,
    found: ObjectId<DistributedFlag>,
    target: V,
}

impl<V: Copy, A> Clone for VisitContext<V, A> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<V: Copy, A> Copy for VisitContext<V, A> {}

/// Number of hops on a shortest path from `src` to `dest`, or [`NOT_REACHABLE`].
///
/// Blocks the caller once per level, so it must be called from outside the
/// runtime's worker pools.
///
/// # Panics
/// Panics if `src` or `dest` is not below `graph.size()`.
#[tracing::instrument(level = "debug", skip(graph), fields(graph = graph.id().raw()))]
pub fn sssp_length<V, A>(graph: &AttributedEdgeIndex<V, A>, src: V, dest: V) -> usize
where
    V: VertexId,
    A: Default + Send + Sync + 'static,
{
    if src == dest {
        return 0;
    }

    let num_vertices = graph.size();
    assert!(
        src.index() < num_vertices,
        "source {src:?} out of bounds for {num_vertices} vertices"
    );
    assert!(
        dest.index() < num_vertices,
        "destination {dest:?} out of bounds for {num_vertices} vertices"
    );

    let runtime = graph.runtime();
    let hint = num_vertices / 2;

    // Guards: every per-query container is destroyed on return.
    let mut current = DistributedSet::<V>::create(runtime, hint);
    let mut next = DistributedSet::<V>::create(runtime, hint);
    let visited = DistributedBitset::create(runtime, num_vertices);
    let found = DistributedFlag::create(runtime);

    visited.set(src.index());
    current.insert(src);

    let mut level = 0usize;
    while !current.is_empty() {
        let ctx = VisitContext {
            graph: graph.id(),
            next: next.id(),
            visited: visited.id(),
            found: found.id(),
            target: dest,
        };

        let handle = CompletionHandle::new(runtime);
        current.async_for_each_element(&handle, move |h, &vertex| expand(h, ctx, vertex));
        handle.wait();

        level += 1;
        if found.is_set() {
            tracing::debug!(level, "target reached");
            return level;
        }

        current.reset(hint);
        std::mem::swap(&mut current, &mut next);
        tracing::debug!(level, frontier = current.size(), "level complete");
    }

    tracing::debug!(level, "frontier exhausted");
    NOT_REACHABLE
}

/// [`sssp_length`] for a graph named by its global reference.
///
/// # Panics
/// Panics if `graph` has been released, or on the conditions of [`sssp_length`].
pub fn shortest_path_length<V, A>(
    runtime: &Runtime,
    graph: ObjectId<AttributedEdgeIndex<V, A>>,
    src: V,
    dest: V,
) -> usize
where
    V: VertexId,
    A: Default + Send + Sync + 'static,
{
    let graph = runtime.local(graph);
    sssp_length(&*graph, src, dest)
}

/// [`sssp_length`] with the sentinel mapped to `None`.
pub fn sssp_hops<V, A>(graph: &AttributedEdgeIndex<V, A>, src: V, dest: V) -> Option<usize>
where
    V: VertexId,
    A: Default + Send + Sync + 'static,
{
    match sssp_length(graph, src, dest) {
        NOT_REACHABLE => None,
        hops => Some(hops),
    }
}

/// Frontier task: fan out over `vertex`'s neighbors on its owner partition.
fn expand<V, A>(handle: &CompletionHandle, ctx: VisitContext<V, A>, vertex: V)
where
    V: VertexId,
    A: Default + Send + Sync + 'static,
{
    let graph = handle.runtime().local(ctx.graph);
    graph.async_for_each_neighbor(handle, vertex, move |h, &neighbor| {
        visit(h.runtime(), ctx, neighbor);
    });
}

/// Neighbor task: claim `neighbor` for the next level, or report the target.
fn visit<V, A>(runtime: &Runtime, ctx: VisitContext<V, A>, neighbor: V)
where
    V: VertexId,
    A: Send + Sync + 'static,
{
    let visited = runtime.local(ctx.visited);
    let slot = neighbor.index();
    if visited.is_set(slot) {
        return;
    }
    if neighbor == ctx.target {
        runtime.local(ctx.found).set();
        return;
    }
    if visited.test_and_set(slot) {
        runtime.local(ctx.next).insert(neighbor);
    }
}

//! Tests for the attributed edge index.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use super::*;
use crate::config::DEFAULT_ENTRIES_PER_BUCKET;

fn runtime(partitions: usize) -> Runtime {
    Runtime::with_partitions(partitions).unwrap()
}

fn sorted<V: VertexId>(mut v: Vec<V>) -> Vec<V> {
    v.sort_unstable();
    v
}

#[test]
fn test_absent_source_is_not_an_error() {
    let rt = runtime(2);
    let index = AttributedEdgeIndex::<u32, u64>::create(&rt, 16);

    assert_eq!(index.get_vertex_attributes(3), None);
    let mut out = 77;
    assert!(!index.get_vertex_attributes_into(3, &mut out));
    assert_eq!(out, 77);
    assert!(!index.vertex_attributes_apply(3, |_, a| *a = 1));
    assert!(!index.erase(3, 4));
    assert_eq!(index.degree(3), 0);
    assert!(index.neighbors(3).is_empty());

    let mut calls = 0;
    index.for_each_neighbor(3, |_| calls += 1);
    assert_eq!(calls, 0);
}

#[test]
fn test_insert_creates_default_entry() {
    let rt = runtime(3);
    let index = AttributedEdgeIndex::<u32, u64>::create(&rt, 16);

    assert!(index.insert(1, 2));
    assert!(!index.insert(1, 2));
    assert!(index.insert(1, 5));
    assert!(index.contains_vertex(1));
    assert_eq!(index.get_vertex_attributes(1), Some(0));
    assert_eq!(sorted(index.neighbors(1)), vec![2, 5]);
    assert_eq!(index.num_entries(), 1);
    assert_eq!(index.num_edges(), 2);

    assert!(index.erase(1, 2));
    assert!(!index.erase(1, 2));
    assert_eq!(index.neighbors(1), vec![5]);
}

#[test]
fn test_attributes_apply_mutates_in_place() {
    let rt = runtime(2);
    let index = AttributedEdgeIndex::<u64, Vec<u64>>::create(&rt, 8);
    index.set_vertex_attributes(4, vec![1]);

    let extra = 9;
    assert!(index.vertex_attributes_apply(4, |src, attrs| {
        attrs.push(*src);
        attrs.push(extra);
    }));

    let mut out = Vec::new();
    assert!(index.get_vertex_attributes_into(4, &mut out));
    assert_eq!(out, vec![1, 4, 9]);

    index.set_vertex_attributes(4, vec![]);
    assert_eq!(index.get_vertex_attributes(4), Some(vec![]));
}

#[test]
fn test_every_partition_sees_the_same_index() {
    let rt = runtime(3);
    let index = AttributedEdgeIndex::<u32>::create(&rt, 64);
    for v in 0..32u32 {
        index.insert(v, (v + 1) % 32);
    }
    for p in 0..3 {
        let view = rt.resolve_at(p, index.id()).unwrap();
        assert_eq!(view.partition(), p);
        assert_eq!(view.num_edges(), 32);
        assert_eq!(view.neighbors(7), vec![8]);
    }
}

#[test]
fn test_bucket_count_follows_vertex_count() {
    let rt = runtime(1);
    let small = AttributedEdgeIndex::<u32>::create(&rt, 3);
    assert_eq!(small.local_bucket_count(), 1);

    let big = AttributedEdgeIndex::<u32>::create(&rt, DEFAULT_ENTRIES_PER_BUCKET * 10);
    assert_eq!(big.local_bucket_count(), 10);

    let tuned = AttributedEdgeIndex::<u32>::create_with_config(
        &rt,
        1000,
        EdgeIndexConfig { entries_per_bucket: 10 },
    );
    assert_eq!(tuned.local_bucket_count(), 100);
}

#[test]
fn test_async_mutations_join_on_handle() {
    let rt = runtime(4);
    let index = AttributedEdgeIndex::<u32, u32>::create(&rt, 256);

    let handle = CompletionHandle::new(&rt);
    for src in 0..64u32 {
        for dest in 0..8u32 {
            index.async_insert(&handle, src, dest);
        }
        index.async_erase(&handle, src, 99);
    }
    handle.wait();
    assert_eq!(index.num_entries(), 64);
    assert_eq!(index.num_edges(), 64 * 8);

    let handle = CompletionHandle::new(&rt);
    for src in 0..64u32 {
        index.async_vertex_attributes_apply(&handle, src, move |s, a| *a = s * 2);
    }
    handle.wait();
    assert_eq!(index.get_vertex_attributes(21), Some(42));
}

#[test]
fn test_async_for_each_neighbor_visits_all() {
    let rt = runtime(2);
    let index = AttributedEdgeIndex::<u64>::create(&rt, 2048);
    let dests: Vec<u64> = (1..1500).collect();
    index.insert_edge_list(0, FlatEdgeList::new(&dests, false));

    let sum = Arc::new(AtomicUsize::new(0));
    let count = Arc::new(AtomicUsize::new(0));
    let handle = CompletionHandle::new(&rt);
    {
        let sum = Arc::clone(&sum);
        let count = Arc::clone(&count);
        index.async_for_each_neighbor(&handle, 0, move |_, v| {
            sum.fetch_add(*v as usize, Ordering::Relaxed);
            count.fetch_add(1, Ordering::Relaxed);
        });
    }
    index.async_for_each_neighbor(&handle, 5, |_, _| panic!("vertex 5 has no neighbors"));
    handle.wait();

    assert_eq!(count.load(Ordering::Relaxed), dests.len());
    assert_eq!(sum.load(Ordering::Relaxed), dests.iter().sum::<u64>() as usize);
}

#[test]
fn test_async_neighbor_callbacks_may_mutate_index() {
    let rt = runtime(2);
    let index = AttributedEdgeIndex::<u32>::create(&rt, 16);
    index.insert_edge_list(0, FlatEdgeList::new(&[1, 2, 3], false));

    let handle = CompletionHandle::new(&rt);
    let id = index.id();
    index.async_for_each_neighbor(&handle, 0, move |h, &v| {
        let index = h.runtime().local(id);
        index.async_insert(h, v, 0);
    });
    handle.wait();

    for v in 1..=3 {
        assert_eq!(index.neighbors(v), vec![0]);
    }
}

#[test]
fn test_chunk_insert_overwrite_and_union() {
    let rt = runtime(2);
    let index = AttributedEdgeIndex::<u32>::create(&rt, 16);
    index.insert_edge_list(7, FlatEdgeList::new(&[1, 2, 3], false));

    index.insert_edge_list_chunk(7, &EdgeListChunk::new(&[3, 4], false));
    assert_eq!(sorted(index.neighbors(7)), vec![1, 2, 3, 4]);

    let handle = CompletionHandle::new(&rt);
    index.async_insert_edge_list_chunk(&handle, 7, EdgeListChunk::new(&[10, 11], true));
    handle.wait();
    assert_eq!(sorted(index.neighbors(7)), vec![10, 11]);
}

#[test]
fn test_chunk_insert_truncates_to_capacity() {
    let rt = runtime(1);
    let index = AttributedEdgeIndex::<u64>::create(&rt, 8192);
    let dests: Vec<u64> = (0..1000).collect();
    index.insert_edge_list(1, FlatEdgeList::new(&[5000], false));

    index.insert_edge_list_chunk(1, &EdgeListChunk::new(&dests, true));
    let got = sorted(index.neighbors(1));
    assert_eq!(got, dests[..EdgeListChunk::<u64>::CAPACITY].to_vec());
}

#[test]
fn test_from_edges_handles_multi_chunk_lists() {
    let rt = runtime(3);
    let mut edges: Vec<(u32, u32)> = (0..2000).map(|d| (0, d)).collect();
    edges.push((1, 0));
    edges.push((1, 0));
    let index = AttributedEdgeIndex::<u32>::from_edges(&rt, 2000, edges);

    assert_eq!(index.degree(0), 2000);
    assert_eq!(index.neighbors(1), vec![0]);
    assert_eq!(index.num_entries(), 2);
}

#[test]
#[should_panic(expected = "edge 1->5 is out of bounds for 3 vertices")]
fn test_from_edges_rejects_out_of_range_endpoint() {
    let rt = runtime(2);
    let _ = AttributedEdgeIndex::<u32>::from_edges(&rt, 3, [(0, 1), (1, 5)]);
}

#[test]
#[should_panic(expected = "out of bounds")]
fn test_insert_rejects_out_of_range_destination() {
    let rt = runtime(2);
    let index = AttributedEdgeIndex::<u32>::create(&rt, 3);
    index.insert(0, 3);
}

#[test]
#[should_panic(expected = "out of bounds")]
fn test_async_insert_checks_on_calling_thread() {
    let rt = runtime(2);
    let index = AttributedEdgeIndex::<u32>::create(&rt, 3);
    let handle = CompletionHandle::new(&rt);
    index.async_insert(&handle, 7, 0);
    handle.wait();
}

#[test]
#[should_panic(expected = "out of bounds")]
fn test_chunk_insert_rejects_out_of_range_destination() {
    let rt = runtime(1);
    let index = AttributedEdgeIndex::<u64>::create(&rt, 10);
    index.insert_edge_list_chunk(0, &EdgeListChunk::new(&[1, 2, 10], false));
}

#[test]
#[should_panic(expected = "out of bounds")]
fn test_flat_list_rejects_out_of_range_source() {
    let rt = runtime(1);
    let index = AttributedEdgeIndex::<u64>::create(&rt, 10);
    index.insert_edge_list(10, FlatEdgeList::new(&[1], false));
}

#[test]
fn test_wide_ids_cannot_alias_small_ones() {
    let rt = runtime(2);
    let index = AttributedEdgeIndex::<u128>::from_edges(&rt, 3, [(0, 1), (1, 2)]);
    let far: u128 = (1 << 64) | 2;
    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| index.insert(0, far)));
    assert!(result.is_err());
    assert_eq!(index.neighbors(0), vec![1]);
}

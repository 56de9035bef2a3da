use std::collections::{BTreeMap, BTreeSet};

use proptest::prelude::*;
use shardgraph::graph::{EdgeListChunk, FlatEdgeList};
use shardgraph::{AttributedEdgeIndex, CompletionHandle, Runtime};

#[derive(Debug, Clone)]
enum Mutation {
    Insert(u16, u16),
    Bulk(u16, Vec<u16>),
}

fn mutation() -> impl Strategy<Value = Mutation> {
    prop_oneof![
        (0u16..16, 0u16..64).prop_map(|(s, d)| Mutation::Insert(s, d)),
        (0u16..16, proptest::collection::vec(0u16..64, 0..20)).prop_map(|(s, d)| Mutation::Bulk(s, d)),
    ]
}

fn model(ops: &[Mutation]) -> BTreeMap<u16, BTreeSet<u16>> {
    let mut m: BTreeMap<u16, BTreeSet<u16>> = BTreeMap::new();
    for op in ops {
        match op {
            Mutation::Insert(s, d) => {
                m.entry(*s).or_default().insert(*d);
            }
            Mutation::Bulk(s, ds) => m.entry(*s).or_default().extend(ds.iter().copied()),
        }
    }
    m
}

fn contents(index: &AttributedEdgeIndex<u16>) -> BTreeMap<u16, BTreeSet<u16>> {
    (0u16..16)
        .filter(|&s| index.contains_vertex(s))
        .map(|s| (s, index.neighbors(s).into_iter().collect()))
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn test_neighbor_sets_ignore_insertion_order(
        ops in proptest::collection::vec(mutation(), 1..60)
            .prop_flat_map(|ops| (Just(ops.clone()), Just(ops).prop_shuffle()))
    ) {
        let (ops, shuffled) = ops;
        let rt = Runtime::with_partitions(3).unwrap();

        let sequential = AttributedEdgeIndex::<u16>::create(&rt, 64);
        for op in &ops {
            match op {
                Mutation::Insert(s, d) => { sequential.insert(*s, *d); }
                Mutation::Bulk(s, ds) => sequential.insert_edge_list(*s, FlatEdgeList::new(ds, false)),
            }
        }

        let concurrent = AttributedEdgeIndex::<u16>::create(&rt, 64);
        let handle = CompletionHandle::new(&rt);
        for op in shuffled {
            match op {
                Mutation::Insert(s, d) => concurrent.async_insert(&handle, s, d),
                Mutation::Bulk(s, ds) => {
                    concurrent.async_insert_edge_list_chunk(&handle, s, EdgeListChunk::new(&ds, false));
                }
            }
        }
        handle.wait();

        let expected = model(&ops);
        prop_assert_eq!(&contents(&sequential), &expected);
        prop_assert_eq!(&contents(&concurrent), &expected);
    }

    #[test]
    fn test_overwrite_chunk_replaces_neighbors(
        before in proptest::collection::vec(0u64..10_000, 0..50),
        list in proptest::collection::vec(0u64..10_000, 0..600),
    ) {
        let rt = Runtime::with_partitions(2).unwrap();
        let index = AttributedEdgeIndex::<u64>::create(&rt, 10_000);
        index.insert_edge_list(0, FlatEdgeList::new(&before, false));
        index.insert_edge_list_chunk(0, &EdgeListChunk::new(&list, true));

        let kept = list.len().min(EdgeListChunk::<u64>::CAPACITY);
        let expected: BTreeSet<u64> = list[..kept].iter().copied().collect();
        let got: BTreeSet<u64> = index.neighbors(0).into_iter().collect();
        prop_assert_eq!(got, expected);
    }
}

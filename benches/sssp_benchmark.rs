use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use shardgraph::graph::FlatEdgeList;
use shardgraph::{sssp_length, AttributedEdgeIndex, CompletionHandle, Runtime};

// Deterministic pseudo-random out-edges: `degree` per vertex plus a ring so
// every vertex is reachable.
fn random_edges(n: u32, degree: u32) -> Vec<(u32, u32)> {
    let mut state = 0x2545_f491_4f6c_dd1d_u64;
    let mut edges = Vec::with_capacity((n * (degree + 1)) as usize);
    for v in 0..n {
        edges.push((v, (v + 1) % n));
        for _ in 0..degree {
            state = state
                .wrapping_mul(6_364_136_223_846_793_005)
                .wrapping_add(1_442_695_040_888_963_407);
            edges.push((v, ((state >> 33) % u64::from(n)) as u32));
        }
    }
    edges
}

fn bench_sssp(c: &mut Criterion) {
    let n = 20_000u32;
    let edges = random_edges(n, 8);
    let mut group = c.benchmark_group("sssp_length");
    group.sample_size(20);

    for partitions in [1, 2, 4] {
        let rt = Runtime::with_partitions(partitions).unwrap();
        let graph = AttributedEdgeIndex::<u32>::from_edges(&rt, n as usize, edges.clone());

        group.bench_with_input(BenchmarkId::new("random_d8", partitions), &partitions, |b, _| {
            b.iter(|| black_box(sssp_length(&graph, 0, n / 2)));
        });
    }
    group.finish();
}

fn bench_edge_index_build(c: &mut Criterion) {
    let n = 10_000u32;
    let rt = Runtime::with_partitions(2).unwrap();
    let edges = random_edges(n, 8);

    c.bench_function("edge_index_async_insert", |b| {
        b.iter(|| {
            let graph = AttributedEdgeIndex::<u32>::create(&rt, n as usize);
            let handle = CompletionHandle::new(&rt);
            for &(s, d) in &edges {
                graph.async_insert(&handle, s, d);
            }
            handle.wait();
            black_box(graph.num_edges());
        });
    });

    let dests: Vec<u32> = (0..n).collect();
    c.bench_function("edge_index_flat_list", |b| {
        b.iter(|| {
            let graph = AttributedEdgeIndex::<u32>::create(&rt, n as usize);
            for src in 0..64 {
                graph.insert_edge_list(src, FlatEdgeList::new(&dests, false));
            }
            black_box(graph.degree(0));
        });
    });
}

criterion_group!(benches, bench_sssp, bench_edge_index_build);
criterion_main!(benches);

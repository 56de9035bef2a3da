//! Traversals over an [`AttributedEdgeIndex`](crate::graph::AttributedEdgeIndex).

pub mod sssp;

pub use sssp::{shortest_path_length, sssp_hops, sssp_length, NOT_REACHABLE};

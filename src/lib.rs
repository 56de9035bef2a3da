//! # `shardgraph` - Partitioned Graph Storage and Traversal
//!
//! A sharded adjacency store with per-vertex attributes, and a level-synchronous
//! shortest-path engine, both running on a small partitioned-global-address-space
//! task model.
//!
//! ## Architecture
//!
//! ### Runtime
//!
//! A [`Runtime`] hosts a fixed number of *partitions*, each with its own worker
//! pool and object registry. A logical container is named by an
//! [`ObjectId`](runtime::ObjectId); every partition resolves that id to its own
//! instance, which holds the partition's shard and knows how to reach the others.
//! Containers come back from creation as [`Owned`](runtime::Owned) guards that
//! release every shard when dropped.
//!
//! A [`CompletionHandle`] is the structured-concurrency join point: tasks started
//! on it may start more tasks on it, and `wait` returns only once the whole
//! transitive set has finished.
//!
//! ### Storage
//!
//! [`AttributedEdgeIndex`] partitions source vertices across partitions by hash
//! and across independently locked buckets within a partition. Each entry holds an
//! attribute value and a neighbor set. Mutation and iteration come in synchronous
//! and handle-tracked asynchronous forms, plus two bulk encodings: a borrowed
//! [`FlatEdgeList`](graph::FlatEdgeList) and a message-sized
//! [`EdgeListChunk`](graph::EdgeListChunk).
//!
//! ### Traversal
//!
//! [`sssp_length`] expands one BFS level at a time: a task per frontier vertex,
//! a task per neighbor batch, one join per level. Shared state (visited bitset,
//! found latch, next frontier) only ever receives idempotent writes, so no locks
//! are held across tasks.
//!
//! ## Example
//!
//! ```rust
//! use shardgraph::{sssp_length, AttributedEdgeIndex, Runtime, NOT_REACHABLE};
//!
//! let rt = Runtime::with_partitions(2).unwrap();
//! let graph = AttributedEdgeIndex::<u32>::from_edges(&rt, 5, [(0, 1), (1, 2), (2, 3), (3, 4)]);
//!
//! assert_eq!(sssp_length(&graph, 0, 4), 4);
//! assert_eq!(sssp_length(&graph, 0, 0), 0);
//! assert_eq!(sssp_length(&graph, 4, 0), NOT_REACHABLE);
//! ```

#![warn(missing_docs, clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

pub mod collections;
pub mod concurrency;
pub mod config;
pub mod error;
pub mod graph;
pub mod runtime;

pub use config::{EdgeIndexConfig, RuntimeConfig};
pub use error::{Error, Result};
pub use graph::algorithms::{shortest_path_length, sssp_hops, sssp_length, NOT_REACHABLE};
pub use graph::{AttributedEdgeIndex, VertexId};
pub use runtime::{CompletionHandle, Runtime};

//! Partitioned graph storage and traversal.
//!
//! - `edge_index`: the sharded attributed adjacency store
//! - `algorithms`: traversals driven through the partitioned runtime

pub mod algorithms;
pub mod edge_index;
mod vertex;

pub use edge_index::{AttrEdges, AttributedEdgeIndex, EdgeListChunk, FlatEdgeList};
pub use vertex::VertexId;

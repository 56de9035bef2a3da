//! Bulk neighbor-list encodings.
//!
//! [`FlatEdgeList`] borrows a contiguous slice and is applied in place by the
//! caller's thread. [`EdgeListChunk`] owns a bounded copy sized to one network
//! message, so it can be shipped to the partition that owns the source vertex.

use core::mem::size_of;

use serde::{Deserialize, Serialize};

use crate::config::EDGE_CHUNK_BYTES;

/// A borrowed view of destinations for in-memory bulk population.
#[derive(Debug, Clone, Copy)]
pub struct FlatEdgeList<'a, V> {
    /// Destinations to add.
    pub values: &'a [V],
    /// Replace the current neighbor set instead of extending it.
    pub overwrite: bool,
}

impl<'a, V> FlatEdgeList<'a, V> {
    /// Wraps `values`.
    pub fn new(values: &'a [V], overwrite: bool) -> Self {
        Self { values, overwrite }
    }
}

/// A fixed-capacity batch of destinations for one source vertex.
///
/// Capacity is [`EDGE_CHUNK_BYTES`] divided by the size of one destination. A
/// chunk built from a longer list keeps only the first `CAPACITY` destinations;
/// use [`split`](Self::split) to cover the rest.
///
/// Decoding enforces the same bound: a message carrying more than `CAPACITY`
/// destinations, or more than its own `num_dest`, is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    try_from = "ChunkMessage<V>",
    bound(deserialize = "V: Copy + Deserialize<'de>")
)]
pub struct EdgeListChunk<V> {
    num_dest: usize,
    overwrite: bool,
    destinations: Vec<V>,
}

/// Unchecked wire form of [`EdgeListChunk`].
#[derive(Deserialize)]
struct ChunkMessage<V> {
    num_dest: usize,
    overwrite: bool,
    destinations: Vec<V>,
}

impl<V: Copy> TryFrom<ChunkMessage<V>> for EdgeListChunk<V> {
    type Error = String;

    fn try_from(msg: ChunkMessage<V>) -> Result<Self, Self::Error> {
        let carried = msg.destinations.len();
        if carried > Self::CAPACITY {
            return Err(format!(
                "chunk carries {carried} destinations, capacity is {}",
                Self::CAPACITY
            ));
        }
        if carried > msg.num_dest {
            return Err(format!(
                "chunk carries {carried} destinations but declares {}",
                msg.num_dest
            ));
        }
        Ok(Self {
            num_dest: msg.num_dest,
            overwrite: msg.overwrite,
            destinations: msg.destinations,
        })
    }
}

impl<V: Copy> EdgeListChunk<V> {
    /// Destinations one chunk can carry.
    pub const CAPACITY: usize = EDGE_CHUNK_BYTES / size_of::<V>();

    /// Copies up to `CAPACITY` destinations from `dests`.
    ///
    /// `num_dest` records the full supplied length even when it is truncated.
    pub fn new(dests: &[V], overwrite: bool) -> Self {
        let take = dests.len().min(Self::CAPACITY);
        Self {
            num_dest: dests.len(),
            overwrite,
            destinations: dests[..take].to_vec(),
        }
    }

    /// Covers all of `dests` with as many chunks as needed.
    ///
    /// Only the first chunk carries `overwrite`, so applying the sequence in
    /// order replaces (or extends) the neighbor set with exactly `dests`. An
    /// empty overwrite still yields one chunk, which clears the set.
    pub fn split(dests: &[V], overwrite: bool) -> Vec<Self> {
        if dests.is_empty() {
            return if overwrite {
                vec![Self::new(dests, true)]
            } else {
                Vec::new()
            };
        }
        dests
            .chunks(Self::CAPACITY)
            .enumerate()
            .map(|(i, part)| Self::new(part, overwrite && i == 0))
            .collect()
    }

    /// Number of destinations originally supplied.
    #[inline]
    pub fn num_dest(&self) -> usize {
        self.num_dest
    }

    /// Whether applying this chunk replaces the neighbor set.
    #[inline]
    pub fn overwrite(&self) -> bool {
        self.overwrite
    }

    /// The destinations that will actually be applied.
    #[inline]
    pub fn destinations(&self) -> &[V] {
        &self.destinations
    }

    /// Number of destinations that will be applied.
    #[inline]
    pub fn len(&self) -> usize {
        self.destinations().len()
    }

    /// Returns `true` if the chunk applies no destinations.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

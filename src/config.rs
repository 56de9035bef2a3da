//! Runtime and edge-index configuration.
//!
//! Both structs deserialize from JSON with every field optional; missing fields
//! take their `Default` value.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Target number of entries per hash bucket in shard-local storage.
pub const DEFAULT_ENTRIES_PER_BUCKET: usize = 128;

/// Byte budget of one bulk-insertion network message.
pub const EDGE_CHUNK_BYTES: usize = 3072;

/// Shape of the partitioned runtime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Number of partitions. Every distributed object has one shard per partition.
    pub partitions: usize,
    /// Worker threads in each partition's pool.
    pub threads_per_partition: usize,
    /// Prefix for worker thread names (`{prefix}-p{partition}-{worker}`).
    pub thread_name: String,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        let cores = std::thread::available_parallelism().map_or(1, |n| n.get());
        let partitions = cores.clamp(1, 4);
        Self {
            partitions,
            threads_per_partition: (cores / partitions).max(1),
            thread_name: "shardgraph".to_string(),
        }
    }
}

impl RuntimeConfig {
    /// A configuration with `partitions` partitions of `threads_per_partition` workers.
    pub fn new(partitions: usize, threads_per_partition: usize) -> Self {
        Self {
            partitions,
            threads_per_partition,
            ..Self::default()
        }
    }

    /// Parses a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and parses a JSON file.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    /// Rejects configurations that cannot host a runtime.
    pub fn validate(&self) -> Result<()> {
        if self.partitions == 0 {
            return Err(Error::InvalidConfig("partitions must be > 0".into()));
        }
        if self.threads_per_partition == 0 {
            return Err(Error::InvalidConfig(
                "threads_per_partition must be > 0".into(),
            ));
        }
        Ok(())
    }
}

/// Sizing of an [`AttributedEdgeIndex`](crate::graph::AttributedEdgeIndex).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EdgeIndexConfig {
    /// Target entries per bucket; bucket count is `max(num_vertices / entries_per_bucket, 1)`.
    pub entries_per_bucket: usize,
}

impl Default for EdgeIndexConfig {
    fn default() -> Self {
        Self {
            entries_per_bucket: DEFAULT_ENTRIES_PER_BUCKET,
        }
    }
}

impl EdgeIndexConfig {
    /// Parses a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and parses a JSON file.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_json_str(&std::fs::read_to_string(path)?)
    }

    /// Rejects a zero bucket target.
    pub fn validate(&self) -> Result<()> {
        if self.entries_per_bucket == 0 {
            return Err(Error::InvalidConfig(
                "entries_per_bucket must be > 0".into(),
            ));
        }
        Ok(())
    }

    /// Number of buckets for a shard expected to hold `num_vertices` entries.
    #[inline]
    pub fn bucket_count(&self, num_vertices: usize) -> usize {
        (num_vertices / self.entries_per_bucket.max(1)).max(1)
    }
}

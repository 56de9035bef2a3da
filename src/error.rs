//! Crate error type.
//!
//! Graph queries never fail: absent vertices are `None`/`false` and unreachable
//! targets are reported through [`NOT_REACHABLE`](crate::graph::algorithms::NOT_REACHABLE).
//! Only the setup surface (configuration, partition thread pools) is fallible.

use thiserror::Error;

/// Result alias for fallible setup operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while configuring or starting a [`Runtime`](crate::Runtime).
#[derive(Error, Debug)]
pub enum Error {
    /// A configuration value is out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// A partition thread pool could not be started.
    #[error("failed to build partition thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
    /// A configuration document could not be parsed.
    #[error("malformed configuration: {0}")]
    Json(#[from] serde_json::Error),
    /// A configuration file could not be read.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

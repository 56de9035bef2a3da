//! In-process partitioned task runtime.
//!
//! A [`Runtime`] hosts a fixed number of partitions. Each partition owns a rayon
//! thread pool and a [`Registry`] of partition-local object instances. Logical
//! containers are named by [`ObjectId`]s that every partition resolves to its own
//! instance, which is how the distributed containers and the edge index find
//! their local shard from inside a task.
//!
//! Work is dispatched through a [`CompletionHandle`]; see its docs for the join
//! semantics.

mod handle;
mod registry;

pub use handle::CompletionHandle;
pub use registry::{ObjectCtx, ObjectId, Owned, Registry};

use std::any::Any;
use std::cell::Cell;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::config::RuntimeConfig;
use crate::error::Result;

/// Index of a partition, `0..runtime.num_partitions()`.
pub type PartitionId = usize;

/// The partition that code outside every worker pool acts on behalf of.
pub const DRIVER_PARTITION: PartitionId = 0;

static NEXT_RUNTIME: AtomicU64 = AtomicU64::new(1);

thread_local! {
    // (runtime uid, partition) of the pool this worker belongs to.
    static WORKER: Cell<Option<(u64, PartitionId)>> = const { Cell::new(None) };
}

struct Partition {
    pool: rayon::ThreadPool,
    registry: Registry,
}

struct Inner {
    uid: u64,
    config: RuntimeConfig,
    partitions: Box<[Partition]>,
    next_object: AtomicU64,
}

/// A cheap-to-clone handle to a set of partitions.
#[derive(Clone)]
pub struct Runtime {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for Runtime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Runtime")
            .field("uid", &self.inner.uid)
            .field("partitions", &self.inner.partitions.len())
            .finish_non_exhaustive()
    }
}

impl Runtime {
    /// Starts one worker pool per configured partition.
    pub fn new(config: RuntimeConfig) -> Result<Self> {
        config.validate()?;
        let uid = NEXT_RUNTIME.fetch_add(1, Ordering::Relaxed);

        let mut partitions = Vec::with_capacity(config.partitions);
        for p in 0..config.partitions {
            let prefix = config.thread_name.clone();
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(config.threads_per_partition)
                .thread_name(move |i| format!("{prefix}-p{p}-{i}"))
                .start_handler(move |_| WORKER.with(|w| w.set(Some((uid, p)))))
                .build()?;
            partitions.push(Partition {
                pool,
                registry: Registry::new(),
            });
        }

        tracing::info!(
            runtime = uid,
            partitions = config.partitions,
            threads_per_partition = config.threads_per_partition,
            "runtime started"
        );

        Ok(Self {
            inner: Arc::new(Inner {
                uid,
                config,
                partitions: partitions.into_boxed_slice(),
                next_object: AtomicU64::new(1),
            }),
        })
    }

    /// Starts a runtime with `partitions` partitions of two workers each.
    pub fn with_partitions(partitions: usize) -> Result<Self> {
        Self::new(RuntimeConfig::new(partitions, 2))
    }

    /// The configuration this runtime was started with.
    pub fn config(&self) -> &RuntimeConfig {
        &self.inner.config
    }

    /// Number of partitions.
    #[inline]
    pub fn num_partitions(&self) -> usize {
        self.inner.partitions.len()
    }

    /// Partition of the calling thread, or [`DRIVER_PARTITION`] outside the pools.
    #[inline]
    pub fn current_partition(&self) -> PartitionId {
        self.worker_partition().unwrap_or(DRIVER_PARTITION)
    }

    /// Returns `true` when called from one of this runtime's worker threads.
    #[inline]
    pub fn is_worker_thread(&self) -> bool {
        self.worker_partition().is_some()
    }

    fn worker_partition(&self) -> Option<PartitionId> {
        match WORKER.with(Cell::get) {
            Some((uid, p)) if uid == self.inner.uid => Some(p),
            _ => None,
        }
    }

    /// Partition that owns `key`.
    ///
    /// Deterministic for a given key and partition count, so every container
    /// that hashes the same vertex places it on the same partition.
    #[inline]
    pub fn owner_of<K: Hash + ?Sized>(&self, key: &K) -> PartitionId {
        (hash_key(key) % self.num_partitions() as u64) as PartitionId
    }

    /// Creates a distributed object with one instance per partition.
    ///
    /// `build` runs once per partition, in partition order, on the calling
    /// thread. The returned guard destroys every instance when dropped.
    pub fn create<T, F>(&self, mut build: F) -> Owned<T>
    where
        T: Send + Sync + 'static,
        F: FnMut(ObjectCtx<T>) -> T,
    {
        let id = ObjectId::from_raw(self.inner.next_object.fetch_add(1, Ordering::Relaxed));
        for (p, partition) in self.inner.partitions.iter().enumerate() {
            let instance: Arc<dyn Any + Send + Sync> = Arc::new(build(ObjectCtx {
                runtime: self.clone(),
                id,
                partition: p,
            }));
            partition.registry.insert(id.raw(), instance);
        }
        tracing::trace!(runtime = self.inner.uid, object = id.raw(), "object created");

        let local = self
            .resolve(id)
            .unwrap_or_else(|| unreachable!("object {} registered on every partition", id.raw()));
        Owned::new(self.clone(), id, local)
    }

    /// Resolves `id` to the calling partition's instance.
    #[inline]
    pub fn resolve<T: Send + Sync + 'static>(&self, id: ObjectId<T>) -> Option<Arc<T>> {
        self.resolve_at(self.current_partition(), id)
    }

    /// Resolves `id` to `partition`'s instance.
    ///
    /// # Panics
    /// Panics if `partition >= num_partitions()`.
    #[inline]
    pub fn resolve_at<T: Send + Sync + 'static>(
        &self,
        partition: PartitionId,
        id: ObjectId<T>,
    ) -> Option<Arc<T>> {
        self.partition(partition).registry.get(id)
    }

    /// Like [`resolve`](Self::resolve), for objects the caller knows are alive.
    ///
    /// # Panics
    /// Panics if the object has been destroyed.
    #[inline]
    pub fn local<T: Send + Sync + 'static>(&self, id: ObjectId<T>) -> Arc<T> {
        self.local_at(self.current_partition(), id)
    }

    /// Like [`resolve_at`](Self::resolve_at), for objects the caller knows are alive.
    ///
    /// # Panics
    /// Panics if the object has been destroyed or `partition` is out of bounds.
    pub fn local_at<T: Send + Sync + 'static>(
        &self,
        partition: PartitionId,
        id: ObjectId<T>,
    ) -> Arc<T> {
        match self.resolve_at(partition, id) {
            Some(instance) => instance,
            None => panic!(
                "object {} ({}) used after release",
                id.raw(),
                std::any::type_name::<T>()
            ),
        }
    }

    /// Registry of `partition`.
    ///
    /// # Panics
    /// Panics if `partition >= num_partitions()`.
    pub fn registry(&self, partition: PartitionId) -> &Registry {
        &self.partition(partition).registry
    }

    pub(crate) fn destroy<T>(&self, id: ObjectId<T>) {
        for partition in self.inner.partitions.iter() {
            partition.registry.remove(id.raw());
        }
        tracing::trace!(runtime = self.inner.uid, object = id.raw(), "object destroyed");
    }

    pub(crate) fn spawn_at<F>(&self, partition: PartitionId, job: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.partition(partition).pool.spawn(job);
    }

    fn partition(&self, partition: PartitionId) -> &Partition {
        let n = self.num_partitions();
        assert!(partition < n, "partition {partition} out of bounds for {n} partitions");
        &self.inner.partitions[partition]
    }
}

/// Stable hash used for ownership decisions.
///
/// `DefaultHasher::new()` uses fixed keys, so placement does not change between
/// runs or between runtimes with the same partition count.
#[inline]
pub(crate) fn hash_key<K: Hash + ?Sized>(key: &K) -> u64 {
    let mut hasher = DefaultHasher::new();
    key.hash(&mut hasher);
    hasher.finish()
}

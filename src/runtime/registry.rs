//! Global object references and per-partition registries.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::ops::Deref;
use std::sync::Arc;

use parking_lot::RwLock;

use super::{PartitionId, Runtime};

/// Opaque, typed name of one logical distributed object.
///
/// An id owns nothing; it is a lookup key into each partition's [`Registry`].
/// Being `Copy`, it can be captured freely by tasks that run on other partitions.
pub struct ObjectId<T> {
    raw: u64,
    _marker: PhantomData<fn() -> T>,
}

impl<T> ObjectId<T> {
    #[inline]
    pub(crate) const fn from_raw(raw: u64) -> Self {
        Self {
            raw,
            _marker: PhantomData,
        }
    }

    /// The untyped key.
    #[inline]
    pub const fn raw(self) -> u64 {
        self.raw
    }
}

impl<T> Clone for ObjectId<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for ObjectId<T> {}

impl<T> PartialEq for ObjectId<T> {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}

impl<T> Eq for ObjectId<T> {}

impl<T> Hash for ObjectId<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.raw.hash(state);
    }
}

impl<T> fmt::Debug for ObjectId<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectId({})", self.raw)
    }
}

/// Partition-local map from object id to that partition's instance.
#[derive(Default)]
pub struct Registry {
    objects: RwLock<HashMap<u64, Arc<dyn Any + Send + Sync>>>,
}

impl Registry {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert(&self, raw: u64, instance: Arc<dyn Any + Send + Sync>) {
        let prev = self.objects.write().insert(raw, instance);
        debug_assert!(prev.is_none(), "object {raw} registered twice");
    }

    pub(crate) fn remove(&self, raw: u64) -> bool {
        self.objects.write().remove(&raw).is_some()
    }

    /// Looks up the instance registered under `id`.
    ///
    /// Returns `None` if the id is unknown, destroyed, or names another type.
    pub fn get<T: Send + Sync + 'static>(&self, id: ObjectId<T>) -> Option<Arc<T>> {
        let instance = self.objects.read().get(&id.raw)?.clone();
        instance.downcast::<T>().ok()
    }

    /// Number of live objects on this partition.
    pub fn len(&self) -> usize {
        self.objects.read().len()
    }

    /// Returns `true` if no objects are registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// What a per-partition constructor receives from [`Runtime::create`].
pub struct ObjectCtx<T> {
    /// Runtime the object lives in.
    pub runtime: Runtime,
    /// Id shared by every partition's instance.
    pub id: ObjectId<T>,
    /// Partition this instance belongs to.
    pub partition: PartitionId,
}

/// Scoped ownership of a distributed object.
///
/// Dereferences to the instance of the partition that created it. Dropping the
/// guard removes the object from every partition's registry; tasks that already
/// resolved an instance keep it alive until they finish.
pub struct Owned<T: Send + Sync + 'static> {
    runtime: Runtime,
    id: ObjectId<T>,
    local: Arc<T>,
}

impl<T: Send + Sync + 'static> Owned<T> {
    pub(crate) fn new(runtime: Runtime, id: ObjectId<T>, local: Arc<T>) -> Self {
        Self { runtime, id, local }
    }

    /// Global reference to the owned object.
    #[inline]
    pub fn id(&self) -> ObjectId<T> {
        self.id
    }

    /// Runtime the object lives in.
    #[inline]
    pub fn runtime(&self) -> &Runtime {
        &self.runtime
    }
}

impl<T: Send + Sync + 'static> Deref for Owned<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.local
    }
}

impl<T: Send + Sync + 'static> Drop for Owned<T> {
    fn drop(&mut self) {
        self.runtime.destroy(self.id);
    }
}

impl<T: Send + Sync + fmt::Debug + 'static> fmt::Debug for Owned<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Owned")
            .field("id", &self.id)
            .field("local", &self.local)
            .finish()
    }
}

//! Shard-local hash set with per-bucket locking.

use std::collections::HashSet;
use std::hash::Hash;

use parking_lot::{Mutex, RwLock};

use crate::config::DEFAULT_ENTRIES_PER_BUCKET;
use crate::runtime::hash_key;

/// Bucket index for a key hash.
///
/// Partition ownership consumes `hash % partitions`; buckets use the high half so
/// the two choices stay independent.
#[inline]
pub(crate) fn bucket_of(hash: u64, buckets: usize) -> usize {
    ((hash >> 32) as usize) % buckets
}

/// A set split into independently locked buckets.
///
/// Inserts that land in different buckets never contend. The bucket array is
/// sized from a capacity hint and rebuilt by [`reset`](Self::reset).
pub struct LocalSet<T> {
    buckets: RwLock<Box<[Mutex<HashSet<T>>]>>,
}

impl<T: Eq + Hash> LocalSet<T> {
    /// Creates an empty set sized for roughly `hint` elements.
    pub fn with_hint(hint: usize) -> Self {
        Self {
            buckets: RwLock::new(make_buckets(hint)),
        }
    }

    /// Number of buckets.
    pub fn bucket_count(&self) -> usize {
        self.buckets.read().len()
    }

    /// Inserts `value`; returns `false` if it was already present.
    pub fn insert(&self, value: T) -> bool {
        let buckets = self.buckets.read();
        let b = bucket_of(hash_key(&value), buckets.len());
        let inserted = buckets[b].lock().insert(value);
        inserted
    }

    /// Removes `value`; returns `false` if it was absent.
    pub fn remove(&self, value: &T) -> bool {
        let buckets = self.buckets.read();
        let b = bucket_of(hash_key(value), buckets.len());
        let removed = buckets[b].lock().remove(value);
        removed
    }

    /// Membership test.
    pub fn contains(&self, value: &T) -> bool {
        let buckets = self.buckets.read();
        let b = bucket_of(hash_key(value), buckets.len());
        let found = buckets[b].lock().contains(value);
        found
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.buckets.read().iter().map(|b| b.lock().len()).sum()
    }

    /// Returns `true` if the set holds no elements.
    pub fn is_empty(&self) -> bool {
        self.buckets.read().iter().all(|b| b.lock().is_empty())
    }

    /// Drops every element and resizes the bucket array for `hint` elements.
    pub fn reset(&self, hint: usize) {
        *self.buckets.write() = make_buckets(hint);
    }

    /// Visits every element. Holds one bucket lock at a time.
    pub fn for_each<F: FnMut(&T)>(&self, mut f: F) {
        for bucket in self.buckets.read().iter() {
            bucket.lock().iter().for_each(&mut f);
        }
    }
}

impl<T: Eq + Hash + Clone> LocalSet<T> {
    /// Copies out the contents of bucket `b`, or nothing if `b` is out of range.
    pub fn snapshot_bucket(&self, b: usize) -> Vec<T> {
        self.buckets
            .read()
            .get(b)
            .map(|bucket| bucket.lock().iter().cloned().collect())
            .unwrap_or_default()
    }
}

impl<T> std::fmt::Debug for LocalSet<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalSet")
            .field("buckets", &self.buckets.read().len())
            .finish_non_exhaustive()
    }
}

fn make_buckets<T>(hint: usize) -> Box<[Mutex<HashSet<T>>]> {
    let buckets = (hint / DEFAULT_ENTRIES_PER_BUCKET).max(1);
    let per_bucket = hint.div_ceil(buckets);
    (0..buckets)
        .map(|_| Mutex::new(HashSet::with_capacity(per_bucket)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_set_basic() {
        let set = LocalSet::with_hint(4);
        assert!(set.insert(3u32));
        assert!(!set.insert(3));
        assert!(set.insert(9));
        assert!(set.contains(&3));
        assert_eq!(set.len(), 2);
        assert!(set.remove(&3));
        assert!(!set.remove(&3));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_local_set_reset_rehints() {
        let set = LocalSet::with_hint(0);
        assert_eq!(set.bucket_count(), 1);
        for v in 0..1000u32 {
            set.insert(v);
        }
        set.reset(DEFAULT_ENTRIES_PER_BUCKET * 4);
        assert!(set.is_empty());
        assert_eq!(set.bucket_count(), 4);
    }

    #[test]
    fn test_local_set_snapshots_cover_all_elements() {
        let set = LocalSet::with_hint(DEFAULT_ENTRIES_PER_BUCKET * 8);
        for v in 0..500u64 {
            set.insert(v);
        }
        let mut all: Vec<u64> = (0..set.bucket_count())
            .flat_map(|b| set.snapshot_bucket(b))
            .collect();
        all.sort_unstable();
        assert_eq!(all, (0..500).collect::<Vec<_>>());
        assert!(set.snapshot_bucket(set.bucket_count()).is_empty());
    }
}

//! Per-source adjacency entry.

use std::collections::HashSet;
use std::hash::Hash;

use super::chunk::{EdgeListChunk, FlatEdgeList};

/// One source vertex's attribute value and its set of destinations.
///
/// The neighbor set has set semantics: inserting a present destination and
/// erasing an absent one are both no-ops. No iteration order is guaranteed.
#[derive(Debug, Clone)]
pub struct AttrEdges<V, A> {
    attributes: A,
    neighbors: HashSet<V>,
}

impl<V: Eq + Hash + Copy, A> AttrEdges<V, A> {
    /// An entry with `attributes` and no neighbors.
    pub fn new(attributes: A) -> Self {
        Self {
            attributes,
            neighbors: HashSet::new(),
        }
    }

    /// Stored attribute value.
    #[inline]
    pub fn attributes(&self) -> &A {
        &self.attributes
    }

    /// Stored attribute value, mutably.
    #[inline]
    pub fn attributes_mut(&mut self) -> &mut A {
        &mut self.attributes
    }

    /// Number of destinations.
    #[inline]
    pub fn size(&self) -> usize {
        self.neighbors.len()
    }

    /// Membership test for `dest`.
    #[inline]
    pub fn contains(&self, dest: &V) -> bool {
        self.neighbors.contains(dest)
    }

    /// Adds `dest`; returns `false` if it was present.
    #[inline]
    pub fn insert(&mut self, dest: V) -> bool {
        self.neighbors.insert(dest)
    }

    /// Removes `dest`; returns `false` if it was absent.
    #[inline]
    pub fn erase(&mut self, dest: &V) -> bool {
        self.neighbors.remove(dest)
    }

    /// Applies `f` to every destination.
    pub fn for_each_neighbor<F: FnMut(&V)>(&self, f: F) {
        self.neighbors.iter().for_each(f);
    }

    /// Copies the destinations out.
    pub fn snapshot(&self) -> Vec<V> {
        self.neighbors.iter().copied().collect()
    }

    /// Empties the neighbor set and re-sizes it for `hint` destinations.
    pub fn reset(&mut self, hint: usize) {
        self.neighbors.clear();
        self.neighbors.shrink_to(hint);
        self.neighbors.reserve(hint);
    }

    /// Applies a borrowed bulk list.
    pub fn apply_flat(&mut self, list: FlatEdgeList<'_, V>) {
        if list.overwrite {
            self.reset(list.values.len());
        }
        self.neighbors.extend(list.values.iter().copied());
    }

    /// Applies a chunk; only the chunk's in-capacity destinations are used.
    pub fn apply_chunk(&mut self, chunk: &EdgeListChunk<V>) {
        if chunk.overwrite() {
            self.reset(chunk.num_dest());
        }
        self.neighbors.extend(chunk.destinations().iter().copied());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sorted(entry: &AttrEdges<u32, ()>) -> Vec<u32> {
        let mut v = entry.snapshot();
        v.sort_unstable();
        v
    }

    #[test]
    fn test_insert_erase_are_set_operations() {
        let mut entry = AttrEdges::new(());
        assert!(entry.insert(4));
        assert!(!entry.insert(4));
        assert!(entry.insert(2));
        assert!(!entry.erase(&7));
        assert!(entry.erase(&4));
        assert_eq!(sorted(&entry), vec![2]);
    }

    #[test]
    fn test_flat_list_overwrite_and_union() {
        let mut entry = AttrEdges::new(());
        entry.apply_flat(FlatEdgeList::new(&[1, 2, 3], false));
        entry.apply_flat(FlatEdgeList::new(&[3, 4], false));
        assert_eq!(sorted(&entry), vec![1, 2, 3, 4]);
        entry.apply_flat(FlatEdgeList::new(&[9, 9, 8], true));
        assert_eq!(sorted(&entry), vec![8, 9]);
    }

    #[test]
    fn test_chunk_overwrite_and_union() {
        let mut entry = AttrEdges::new(());
        entry.apply_chunk(&EdgeListChunk::new(&[5, 6], false));
        entry.apply_chunk(&EdgeListChunk::new(&[7], false));
        assert_eq!(sorted(&entry), vec![5, 6, 7]);
        entry.apply_chunk(&EdgeListChunk::new(&[1], true));
        assert_eq!(sorted(&entry), vec![1]);
    }

    #[test]
    fn test_attributes_are_mutable_in_place() {
        let mut entry: AttrEdges<u32, String> = AttrEdges::new("a".to_string());
        entry.attributes_mut().push('b');
        assert_eq!(entry.attributes(), "ab");
    }
}

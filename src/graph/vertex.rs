use core::fmt::Debug;
use core::hash::Hash;

use num_traits::{PrimInt, ToPrimitive, Unsigned};

/// Vertex identifiers: unsigned primitive integers.
///
/// Traversal only needs equality and hashing, but the visited bitset is dense,
/// so every id also maps to a slot via [`index`](Self::index).
pub trait VertexId: PrimInt + Unsigned + Hash + Debug + Send + Sync + 'static {
    /// Dense slot of this vertex.
    ///
    /// Ids that do not fit in `usize` map to `usize::MAX`, which no graph can
    /// hold, so range checks reject them instead of aliasing a smaller id.
    #[inline(always)]
    fn index(self) -> usize {
        self.to_usize().unwrap_or(usize::MAX)
    }
}

impl<T> VertexId for T where T: PrimInt + Unsigned + Hash + Debug + Send + Sync + 'static {}

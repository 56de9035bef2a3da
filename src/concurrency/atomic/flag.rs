use core::sync::atomic::{AtomicBool, Ordering};

/// A boolean that only ever moves from `false` to `true`.
///
/// Redundant `set` calls are no-ops, which makes the flag safe to raise from any
/// number of concurrent tasks.
#[derive(Debug, Default)]
#[repr(transparent)]
pub struct AtomicFlag {
    inner: AtomicBool,
}

impl AtomicFlag {
    /// Creates a cleared flag.
    #[inline(always)]
    pub const fn new() -> Self {
        Self {
            inner: AtomicBool::new(false),
        }
    }

    /// Returns whether the flag has been raised.
    #[inline(always)]
    pub fn is_set(&self, order: Ordering) -> bool {
        self.inner.load(order)
    }

    /// Raises the flag.
    ///
    /// Returns `true` iff this call performed the `false -> true` transition.
    #[inline]
    pub fn set(&self, order: Ordering) -> bool {
        // Cheap read first: once raised, the flag is hammered by every late visitor.
        if self.inner.load(Ordering::Relaxed) {
            return false;
        }
        self.inner
            .compare_exchange(false, true, order, Ordering::Relaxed)
            .is_ok()
    }
}

//! Structured-concurrency completion handle.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use crossbeam_utils::sync::WaitGroup;
use parking_lot::Mutex;

use super::{PartitionId, Runtime};

type PanicSlot = Arc<Mutex<Option<Box<dyn Any + Send + 'static>>>>;

/// Tracks a dynamically growing set of asynchronous tasks.
///
/// Every task started through the handle holds a share of it for its whole
/// execution, and receives `&CompletionHandle` so it can start more tracked
/// tasks. [`wait`](Self::wait) therefore returns only once the transitive
/// closure of everything registered has finished, no matter how deep the
/// spawning chain goes.
///
/// A panic inside a tracked task is caught, the remaining tasks still run, and
/// the first payload is re-raised from `wait`.
pub struct CompletionHandle {
    runtime: Runtime,
    group: WaitGroup,
    panic: PanicSlot,
}

impl CompletionHandle {
    /// Creates an empty handle on `runtime`.
    pub fn new(runtime: &Runtime) -> Self {
        Self {
            runtime: runtime.clone(),
            group: WaitGroup::new(),
            panic: Arc::new(Mutex::new(None)),
        }
    }

    /// Runtime the handle dispatches to.
    #[inline]
    pub fn runtime(&self) -> &Runtime {
        &self.runtime
    }

    /// Runs `task` on `partition`, registered against this handle.
    ///
    /// May return before `task` starts.
    ///
    /// # Panics
    /// Panics if `partition >= runtime.num_partitions()`.
    pub fn async_execute_at<F>(&self, partition: PartitionId, task: F)
    where
        F: FnOnce(&CompletionHandle) + Send + 'static,
    {
        let share = self.share();
        self.runtime.spawn_at(partition, move || {
            if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(|| task(&share))) {
                tracing::error!(partition, "task registered on completion handle panicked");
                let mut slot = share.panic.lock();
                if slot.is_none() {
                    *slot = Some(payload);
                }
            }
            // `share` drops here, releasing this task's hold on the group.
        });
    }

    /// Runs `task` on the calling partition, registered against this handle.
    pub fn async_execute<F>(&self, task: F)
    where
        F: FnOnce(&CompletionHandle) + Send + 'static,
    {
        self.async_execute_at(self.runtime.current_partition(), task);
    }

    /// Blocks until every task registered on this handle, including tasks those
    /// tasks registered, has finished.
    ///
    /// Must be called from outside the runtime's worker pools: a blocked worker
    /// cannot run the tasks it waits for.
    pub fn wait(self) {
        debug_assert!(
            !self.runtime.is_worker_thread(),
            "CompletionHandle::wait called from a partition worker"
        );
        let Self { group, panic, .. } = self;
        group.wait();
        let payload = panic.lock().take();
        if let Some(payload) = payload {
            panic::resume_unwind(payload);
        }
    }

    fn share(&self) -> Self {
        Self {
            runtime: self.runtime.clone(),
            group: self.group.clone(),
            panic: Arc::clone(&self.panic),
        }
    }
}

impl std::fmt::Debug for CompletionHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompletionHandle")
            .field("runtime", &self.runtime)
            .finish_non_exhaustive()
    }
}

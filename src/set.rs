use std::num::NonZeroUsize;
use std::thread;

use crate::error::WorkerError;
use crate::worker::ScopedWorker;

/// A group of [`ScopedWorker`]s resolved together.
///
/// Fan-out workloads spawn a batch of workers and want all of them waited for
/// no matter how the spawning scope exits. A `WorkerSet` owns any number of
/// workers and guarantees exactly that: [`wait_all`](Self::wait_all) resolves
/// every member in insertion order, and a set that is dropped waits for every
/// member it still owns, even when the drop happens during unwinding.
///
/// # Dropping
///
/// Dropping the set waits for all remaining members, one after another. A
/// member panic is forwarded after the rest of the members were joined,
/// unless the dropping thread is already unwinding.
///
/// # Examples
///
/// ```
/// use scoped_workers::WorkerSet;
///
/// let mut set = WorkerSet::new();
/// for i in 0..4u64 {
///     set.spawn(move || i * i).unwrap();
/// }
/// assert_eq!(set.wait_all(), vec![0, 1, 4, 9]);
/// ```
#[must_use = "dropping the set immediately waits for every member"]
#[derive(Debug)]
pub struct WorkerSet<T = ()> {
    workers: Vec<ScopedWorker<T>>,
}

impl WorkerSet {
    /// Picks a worker count for a fan-out workload, capped at `cap`.
    ///
    /// The count is the runtime's [`available_parallelism`] where that is
    /// known, and `2` where it is not, but never more than `cap`. Spawning
    /// more workers than the hardware runs concurrently only adds switching
    /// overhead.
    ///
    /// [`available_parallelism`]: std::thread::available_parallelism
    ///
    /// # Examples
    ///
    /// ```
    /// use std::num::NonZeroUsize;
    ///
    /// use scoped_workers::WorkerSet;
    ///
    /// let cap = NonZeroUsize::new(8).unwrap();
    /// assert!(WorkerSet::recommended_workers(cap) <= cap);
    /// ```
    pub fn recommended_workers(cap: NonZeroUsize) -> NonZeroUsize {
        const FALLBACK: NonZeroUsize = NonZeroUsize::new(2).unwrap();
        thread::available_parallelism()
            .unwrap_or(FALLBACK)
            .min(cap)
    }
}

impl<T> WorkerSet<T> {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self { workers: Vec::new() }
    }

    /// Launches a new worker running `work` and adds it to the set.
    ///
    /// # Errors
    ///
    /// Returns [`WorkerError::Spawn`] if the operating system fails to start
    /// a thread; the set is left unchanged.
    pub fn spawn<F>(&mut self, work: F) -> Result<(), WorkerError>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        let worker = ScopedWorker::spawn(work)?;
        self.workers.push(worker);
        Ok(())
    }

    /// Moves an already-owned worker into the set.
    ///
    /// # Errors
    ///
    /// Returns [`WorkerError::InvalidHandle`] if `worker` owns nothing; an
    /// empty handle has no place in a set whose members are all waited for.
    ///
    /// # Examples
    ///
    /// ```
    /// use scoped_workers::{ScopedWorker, WorkerError, WorkerSet};
    ///
    /// let mut set = WorkerSet::new();
    /// set.adopt(ScopedWorker::spawn(|| ()).unwrap()).unwrap();
    ///
    /// // a handle whose worker was already resolved is rejected
    /// let mut resolved = ScopedWorker::spawn(|| ()).unwrap();
    /// resolved.wait().unwrap();
    /// assert!(matches!(set.adopt(resolved), Err(WorkerError::InvalidHandle)));
    /// ```
    pub fn adopt(&mut self, worker: ScopedWorker<T>) -> Result<(), WorkerError> {
        if !worker.is_joinable() {
            return Err(WorkerError::InvalidHandle);
        }
        self.workers.push(worker);
        Ok(())
    }

    /// Returns the number of workers currently owned by the set.
    pub fn len(&self) -> usize {
        self.workers.len()
    }

    /// Returns `true` if the set owns no workers.
    pub fn is_empty(&self) -> bool {
        self.workers.is_empty()
    }

    /// Blocks until every member finished and returns their outputs in
    /// insertion order, leaving the set empty.
    ///
    /// # Panics
    ///
    /// If a member panicked, its panic is forwarded to the calling thread.
    /// The members behind it are still waited for first, so no worker
    /// outlives the set by accident.
    pub fn wait_all(&mut self) -> Vec<T> {
        log::trace!("waiting for {} workers", self.workers.len());
        let mut outputs = Vec::with_capacity(self.workers.len());
        for mut worker in self.workers.drain(..) {
            // members always own a worker, so `wait` cannot fail here
            if let Ok(output) = worker.wait() {
                outputs.push(output);
            }
        }
        outputs
    }
}

impl<T> Default for WorkerSet<T> {
    fn default() -> Self {
        Self::new()
    }
}

use std::panic::resume_unwind;
use std::thread::{self, JoinHandle, Thread};

use crate::defer::defer;
use crate::error::WorkerError;

/// An owning handle for one unit of concurrent execution.
///
/// `ScopedWorker` ties a spawned thread to the lifetime of a value: a handle
/// that goes out of scope waits for a still-owned worker before its storage
/// is reclaimed, whether the scope ends normally or by unwinding. Forgetting
/// to resolve a worker is thereby impossible; what remains for the caller to
/// choose is only *how* to resolve it: block until it finishes
/// ([`wait`](Self::wait)) or let it run free ([`release`](Self::release)).
///
/// A handle owns at most one worker at a time. Ownership is movable but never
/// clonable, so no two handles refer to the same worker and resolution
/// happens exactly once. A handle emptied by resolution or by a move stays
/// around only to answer [`is_joinable`](Self::is_joinable); resolving
/// operations on it fail with [`WorkerError::NotJoinable`] instead of
/// corrupting anything.
///
/// # Dropping
///
/// Dropping a handle that still owns a worker waits for it, even when the
/// drop happens during unwinding. If the worker panicked, the panic is
/// forwarded to the dropping thread, unless that thread is already unwinding.
///
/// ```
/// use std::sync::Arc;
/// use std::sync::atomic::{AtomicUsize, Ordering};
///
/// use scoped_workers::ScopedWorker;
///
/// let counter = Arc::new(AtomicUsize::new(0));
/// {
///     let counter = counter.clone();
///     let _worker = ScopedWorker::spawn(move || {
///         counter.fetch_add(1, Ordering::SeqCst);
///     })
///     .unwrap();
///     // `_worker` leaves scope here and waits for the increment
/// }
/// assert_eq!(counter.load(Ordering::SeqCst), 1);
/// ```
///
/// # Reassignment
///
/// Moving a handle moves the worker with it; the source is consumed. To
/// transfer a worker out of a slot that stays behind, use [`std::mem::take`]
/// or [`std::mem::replace`] (an absent handle comes from
/// [`ScopedWorker::default`]). Overwriting a handle that still owns a worker
/// waits for the old worker as part of the assignment; ownership is never
/// silently discarded.
///
/// ```
/// use std::mem;
///
/// use scoped_workers::ScopedWorker;
///
/// let mut slot = ScopedWorker::spawn(|| 1).unwrap();
///
/// // hand the running worker to a new owner, leave an empty handle behind
/// let mut moved = mem::take(&mut slot);
/// assert!(!slot.is_joinable());
/// assert_eq!(moved.wait().unwrap(), 1);
///
/// // overwriting an owning handle waits for the old worker first
/// slot = ScopedWorker::spawn(|| 2).unwrap();
/// slot = ScopedWorker::spawn(|| 3).unwrap();
/// assert_eq!(slot.wait().unwrap(), 3);
/// ```
///
/// # Examples
///
/// ```
/// use scoped_workers::ScopedWorker;
///
/// let mut worker = ScopedWorker::spawn(|| 6 * 7).unwrap();
/// assert_eq!(worker.wait().unwrap(), 42);
///
/// // the handle is empty once the worker is resolved
/// assert!(!worker.is_joinable());
/// ```
#[must_use = "dropping the handle immediately waits for the worker"]
#[derive(Debug)]
pub struct ScopedWorker<T = ()> {
    handle: Option<JoinHandle<T>>,
}

impl ScopedWorker<()> {
    /// Returns a builder to configure the worker thread before launching it.
    ///
    /// # Examples
    ///
    /// ```
    /// use scoped_workers::ScopedWorker;
    ///
    /// let mut worker = ScopedWorker::builder()
    ///     .name("tally")
    ///     .spawn(|| 2 + 2)
    ///     .unwrap();
    /// assert_eq!(worker.wait().unwrap(), 4);
    /// ```
    pub fn builder() -> WorkerBuilder {
        WorkerBuilder::new()
    }
}

impl<T> ScopedWorker<T> {
    /// Launches a new worker running `work` and takes ownership of it.
    ///
    /// The worker starts immediately and runs concurrently with the calling
    /// thread. `work` captures its inputs by value (`move`); a closure that
    /// tries to borrow the caller's locals is rejected at compile time. To
    /// hand a worker a mutable reference into caller-owned data anyway, opt
    /// in explicitly with [`Shared`](crate::Shared).
    ///
    /// # Errors
    ///
    /// Returns [`WorkerError::Spawn`] if the operating system fails to start
    /// a thread.
    ///
    /// # Examples
    ///
    /// ```
    /// use scoped_workers::ScopedWorker;
    ///
    /// let mut worker = ScopedWorker::spawn(|| (0..=100u32).sum::<u32>()).unwrap();
    /// assert_eq!(worker.wait().unwrap(), 5050);
    /// ```
    pub fn spawn<F>(work: F) -> Result<Self, WorkerError>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        WorkerBuilder::new().spawn(work)
    }

    /// Takes ownership of an already-launched worker.
    ///
    /// `None` stands for a handle whose worker was already taken; adopting it
    /// is rejected at construction time, so an invalid handle can never end
    /// up behind a `ScopedWorker`. A bare [`JoinHandle`] is always joinable,
    /// which is why [`From<JoinHandle<T>>`](Self::from) exists as the
    /// infallible path.
    ///
    /// # Errors
    ///
    /// Returns [`WorkerError::InvalidHandle`] if `handle` is `None`; no
    /// `ScopedWorker` is produced.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::thread;
    ///
    /// use scoped_workers::{ScopedWorker, WorkerError};
    ///
    /// let handle = thread::spawn(|| "done");
    /// let mut worker = ScopedWorker::adopt(Some(handle)).unwrap();
    /// assert_eq!(worker.wait().unwrap(), "done");
    ///
    /// let err = ScopedWorker::<()>::adopt(None).unwrap_err();
    /// assert!(matches!(err, WorkerError::InvalidHandle));
    /// ```
    pub fn adopt(handle: Option<JoinHandle<T>>) -> Result<Self, WorkerError> {
        match handle {
            Some(handle) => Ok(Self { handle: Some(handle) }),
            None => Err(WorkerError::InvalidHandle),
        }
    }

    /// Blocks the calling thread until the owned worker finishes and returns
    /// the worker's output, leaving the handle empty.
    ///
    /// Everything the worker did is visible to the calling thread once `wait`
    /// returns. There is no way to interrupt the worker; `wait` returns when
    /// the worker's callable does.
    ///
    /// # Errors
    ///
    /// Returns [`WorkerError::NotJoinable`] if the handle owns no worker or
    /// its worker was already resolved; the handle is left unchanged.
    ///
    /// # Panics
    ///
    /// If the worker panicked, the panic is forwarded to the calling thread
    /// rather than caught or swallowed.
    ///
    /// # Examples
    ///
    /// ```
    /// use scoped_workers::{ScopedWorker, WorkerError};
    ///
    /// let mut worker = ScopedWorker::spawn(|| vec![1, 2, 3]).unwrap();
    /// assert_eq!(worker.wait().unwrap(), vec![1, 2, 3]);
    ///
    /// // a second wait has no worker left to wait for
    /// assert!(matches!(worker.wait(), Err(WorkerError::NotJoinable)));
    /// ```
    pub fn wait(&mut self) -> Result<T, WorkerError> {
        let handle = self.handle.take().ok_or(WorkerError::NotJoinable)?;
        log::trace!("waiting for worker {:?}", handle.thread().id());
        match handle.join() {
            Ok(output) => Ok(output),
            Err(payload) => resume_unwind(payload),
        }
    }

    /// Detaches the owned worker, leaving the handle empty.
    ///
    /// The worker keeps running on its own; the runtime reclaims its
    /// resources when it finishes. Once released, the worker can no longer be
    /// observed or controlled through any handle. In particular, data it
    /// borrowed via [`Shared`](crate::Shared) must outlive it by the caller's
    /// own arrangement. `release` never blocks.
    ///
    /// # Errors
    ///
    /// Returns [`WorkerError::NotJoinable`] if the handle owns no worker or
    /// its worker was already resolved; the handle is left unchanged.
    ///
    /// # Examples
    ///
    /// ```
    /// use scoped_workers::ScopedWorker;
    ///
    /// let mut worker = ScopedWorker::spawn(|| {
    ///     // runs to completion on its own
    /// })
    /// .unwrap();
    ///
    /// worker.release().unwrap();
    /// assert!(!worker.is_joinable());
    /// ```
    pub fn release(&mut self) -> Result<(), WorkerError> {
        let handle = self.handle.take().ok_or(WorkerError::NotJoinable)?;
        log::trace!("releasing worker {:?}", handle.thread().id());
        drop(handle);
        Ok(())
    }

    /// Returns `true` if the handle currently owns a worker, running or
    /// finished.
    ///
    /// # Examples
    ///
    /// ```
    /// use scoped_workers::ScopedWorker;
    ///
    /// let mut worker = ScopedWorker::spawn(|| ()).unwrap();
    /// assert!(worker.is_joinable());
    ///
    /// worker.wait().unwrap();
    /// assert!(!worker.is_joinable());
    /// ```
    pub fn is_joinable(&self) -> bool {
        self.handle.is_some()
    }

    /// Returns `true` if the owned worker has finished running, without
    /// blocking.
    ///
    /// A finished worker is still owned, and must still be resolved with
    /// [`wait`](Self::wait) or [`release`](Self::release). Empty handles
    /// return `false`.
    ///
    /// # Examples
    ///
    /// ```
    /// use scoped_workers::ScopedWorker;
    ///
    /// let mut worker = ScopedWorker::spawn(|| ()).unwrap();
    /// worker.wait().unwrap();
    ///
    /// // a resolved handle no longer observes the worker at all
    /// assert!(!worker.is_finished());
    /// ```
    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().is_some_and(JoinHandle::is_finished)
    }

    /// Returns the thread backing the owned worker, or `None` for an empty
    /// handle.
    ///
    /// # Examples
    ///
    /// ```
    /// use scoped_workers::ScopedWorker;
    ///
    /// let worker = ScopedWorker::builder()
    ///     .name("indexer")
    ///     .spawn(|| ())
    ///     .unwrap();
    /// assert_eq!(worker.thread().and_then(|t| t.name()), Some("indexer"));
    /// ```
    pub fn thread(&self) -> Option<&Thread> {
        self.handle.as_ref().map(JoinHandle::thread)
    }

    /// Dismantles the handle without resolving the worker, returning the raw
    /// [`JoinHandle`] if one is owned.
    ///
    /// Resolution becomes the caller's responsibility again; dropping the
    /// returned handle detaches the worker like the primitive always did.
    ///
    /// # Examples
    ///
    /// ```
    /// use scoped_workers::ScopedWorker;
    ///
    /// let worker = ScopedWorker::spawn(|| 9).unwrap();
    /// let handle = worker.into_handle().expect("worker was never resolved");
    /// assert_eq!(handle.join().unwrap(), 9);
    /// ```
    pub fn into_handle(mut self) -> Option<JoinHandle<T>> {
        self.handle.take()
    }
}

impl<T> Default for ScopedWorker<T> {
    /// Creates a handle that owns no worker.
    fn default() -> Self {
        Self { handle: None }
    }
}

/// The infallible adoption path: a raw [`JoinHandle`] is always joinable.
impl<T> From<JoinHandle<T>> for ScopedWorker<T> {
    fn from(handle: JoinHandle<T>) -> Self {
        Self { handle: Some(handle) }
    }
}

impl<T> Drop for ScopedWorker<T> {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            log::trace!("joining unresolved worker {:?} on drop", handle.thread().id());
            if let Err(payload) = handle.join() {
                // Forwarding while this thread is already unwinding would
                // abort the process.
                if !thread::panicking() {
                    resume_unwind(payload);
                }
            }
        }
    }
}

/// A builder to configure a [`ScopedWorker`] thread before launching it.
///
/// # Examples
///
/// ```
/// use scoped_workers::ScopedWorker;
///
/// let mut worker = ScopedWorker::builder()
///     .name("tally")
///     .stack_size(64 * 1024)
///     .spawn(|| 2 + 2)
///     .unwrap();
/// assert_eq!(worker.wait().unwrap(), 4);
/// ```
#[derive(Clone, Debug, Default)]
pub struct WorkerBuilder {
    name: Option<String>,
    stack_size: Option<usize>,
}

impl WorkerBuilder {
    /// Creates a builder with no name and the platform's default stack size.
    pub fn new() -> Self {
        Self::default()
    }

    /// Names the worker thread.
    ///
    /// The name shows up in panic messages and is visible to the worker via
    /// [`std::thread::current`].
    pub fn name<N: Into<String>>(self, name: N) -> Self {
        Self {
            name: Some(name.into()),
            ..self
        }
    }

    /// Sets the stack size, in bytes, for the worker thread.
    pub fn stack_size(self, stack_size: usize) -> Self {
        Self {
            stack_size: Some(stack_size),
            ..self
        }
    }

    /// Launches a worker running `work` and returns the owning handle.
    ///
    /// # Errors
    ///
    /// Returns [`WorkerError::Spawn`] if the operating system fails to start
    /// a thread.
    pub fn spawn<T, F>(self, work: F) -> Result<ScopedWorker<T>, WorkerError>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        let mut builder = thread::Builder::new();
        if let Some(name) = self.name {
            builder = builder.name(name);
        }
        if let Some(stack_size) = self.stack_size {
            builder = builder.stack_size(stack_size);
        }

        let handle = builder.spawn(move || {
            log::trace!("worker {:?} started", thread::current().id());
            let _exit = defer(|| log::trace!("worker {:?} exiting", thread::current().id()));
            work()
        })?;
        log::trace!("spawned worker {:?}", handle.thread().id());

        Ok(ScopedWorker { handle: Some(handle) })
    }
}

use std::fmt;
use std::ops::{Deref, DerefMut};
use std::ptr::NonNull;

/// An explicit marker for handing a worker a mutable reference into data the
/// caller keeps owning.
///
/// Worker callables capture by value, which rules out the accidental borrow
/// of a local that dies before the worker does. Some workloads genuinely want
/// the worker to write through to caller-owned storage though, and `Shared`
/// is the opt-in for exactly that: it wraps a `&mut T` behind a pointer with
/// no lifetime, so the capturing closure can be `'static`, and dereferences
/// to the target on either side.
///
/// The marker documents the hazard; it does not remove it. In particular it
/// is on the caller to keep the target alive for as long as the worker may
/// touch it. Waiting for the worker before the target goes away is the usual
/// arrangement, and handing a `Shared` to a worker that is then
/// [released](crate::ScopedWorker::release) almost never is.
///
/// `Shared` is not `Clone`. One marker, one writer; concurrent access to one
/// target needs a synchronization primitive, not this type.
///
/// # Examples
///
/// ```
/// use scoped_workers::{ScopedWorker, Shared};
///
/// let mut tally = 0u64;
/// // SAFETY: `tally` outlives the worker; `wait` below makes sure of it.
/// let mut slot = unsafe { Shared::new(&mut tally) };
///
/// let mut worker = ScopedWorker::spawn(move || *slot += 42).unwrap();
/// worker.wait().unwrap();
///
/// assert_eq!(tally, 42);
/// ```
pub struct Shared<T: ?Sized> {
    target: NonNull<T>,
}

impl<T: ?Sized> Shared<T> {
    /// Wraps a mutable reference so a worker can capture it by value.
    ///
    /// # Safety
    ///
    /// It is of utmost importance that the target outlives every access made
    /// through the returned marker. Nothing checks this: the marker erases
    /// the reference's lifetime, and a worker that touches the target after
    /// it was freed reads or writes dangling memory. Resolve the worker with
    /// [`wait`](crate::ScopedWorker::wait), or let its handle drop, before
    /// the target goes out of scope, and do not release a worker that still
    /// holds a marker unless the target lives for the rest of the program.
    /// The caller must also make sure no other access to the target races
    /// with the worker's.
    pub unsafe fn new(target: &mut T) -> Self {
        Self { target: NonNull::from(target) }
    }
}

impl<T: ?Sized> Deref for Shared<T> {
    type Target = T;

    fn deref(&self) -> &T {
        // SAFETY: the constructor's contract keeps the target alive and
        // unaliased for every access through this marker.
        unsafe { self.target.as_ref() }
    }
}

impl<T: ?Sized> DerefMut for Shared<T> {
    fn deref_mut(&mut self) -> &mut T {
        // SAFETY: the constructor's contract keeps the target alive and
        // unaliased for every access through this marker.
        unsafe { self.target.as_mut() }
    }
}

impl<T: ?Sized> fmt::Debug for Shared<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Shared").field(&self.target).finish()
    }
}

// SAFETY: `Shared` grants the same access a `&mut T` would; it may move to
// another thread exactly when `&mut T` may.
unsafe impl<T: ?Sized + Send> Send for Shared<T> {}

// SAFETY: shared access through the marker is shared access to `T`.
unsafe impl<T: ?Sized + Sync> Sync for Shared<T> {}

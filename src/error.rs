use std::io;

/// Errors surfaced by [`ScopedWorker`](crate::ScopedWorker) and
/// [`WorkerBuilder`](crate::WorkerBuilder) operations.
///
/// Handle misuse, such as waiting a second time on a handle whose worker was
/// already resolved, is reported through this type instead of going
/// unchecked.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum WorkerError {
    /// The handle owns no worker, or its worker was already waited on or
    /// released.
    #[error("handle owns no worker or it was already resolved")]
    NotJoinable,

    /// Adoption was attempted from a handle with no joinable worker behind
    /// it.
    #[error("cannot adopt: no joinable worker")]
    InvalidHandle,

    /// The operating system refused to start a new thread.
    #[error("failed to spawn worker thread: {0}")]
    Spawn(#[from] io::Error),
}

use std::num::NonZeroUsize;
use std::panic::{AssertUnwindSafe, catch_unwind, resume_unwind};
use std::sync::Arc;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering::SeqCst;
use std::thread;
use std::time::Duration;

use scoped_workers::{ScopedWorker, WorkerError, WorkerSet};

/// Panics without the default hook printing a backtrace to the test output.
fn silent_panic(payload: &'static str) {
    resume_unwind(Box::new(payload));
}

#[test]
fn test_wait_all_returns_outputs_in_spawn_order() {
    let mut set = WorkerSet::new();
    for i in 0..20u32 {
        set.spawn(move || i).unwrap();
    }

    assert_eq!(set.len(), 20);
    assert_eq!(set.wait_all(), (0..20).collect::<Vec<_>>());
    assert!(set.is_empty());
}

#[test]
fn test_drop_joins_all_members() {
    let counter = Arc::new(AtomicUsize::new(0));
    {
        let mut set = WorkerSet::new();
        for _ in 0..20 {
            let counter = counter.clone();
            set.spawn(move || {
                thread::sleep(Duration::from_millis(10));
                counter.fetch_add(1, SeqCst);
            })
            .unwrap();
        }
    }
    assert_eq!(counter.load(SeqCst), 20);
}

#[test]
fn test_adopt_moves_worker_into_set() {
    let mut set = WorkerSet::new();
    set.adopt(ScopedWorker::spawn(|| ()).unwrap()).unwrap();

    assert_eq!(set.len(), 1);
    assert_eq!(set.wait_all().len(), 1);
}

#[test]
fn test_adopt_rejects_resolved_handle() {
    let mut set = WorkerSet::new();
    let mut resolved = ScopedWorker::spawn(|| ()).unwrap();
    resolved.wait().unwrap();

    let err = set.adopt(resolved).unwrap_err();
    assert!(matches!(err, WorkerError::InvalidHandle));
    assert!(set.is_empty());
}

#[test]
fn test_recommended_workers_never_exceeds_cap() {
    let cap = NonZeroUsize::new(3).unwrap();
    assert!(WorkerSet::recommended_workers(cap) <= cap);

    let one = NonZeroUsize::new(1).unwrap();
    assert_eq!(WorkerSet::recommended_workers(one), one);
}

#[test]
fn test_wait_all_joins_remaining_members_when_one_panicked() {
    let counter = Arc::new(AtomicUsize::new(0));

    let mut set = WorkerSet::new();
    set.spawn(|| silent_panic("member exploded")).unwrap();
    for _ in 0..5 {
        let counter = counter.clone();
        set.spawn(move || {
            thread::sleep(Duration::from_millis(20));
            counter.fetch_add(1, SeqCst);
        })
        .unwrap();
    }

    let result = catch_unwind(AssertUnwindSafe(|| set.wait_all()));
    assert!(result.is_err());

    // the panic came out only after the other members were joined
    assert_eq!(counter.load(SeqCst), 5);
}

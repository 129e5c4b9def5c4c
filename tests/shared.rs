use scoped_workers::{ScopedWorker, Shared, WorkerSet};

#[test]
fn test_workers_write_through_marker() {
    let mut tallies = vec![0u64; 4];

    let mut set = WorkerSet::new();
    for (index, tally) in tallies.iter_mut().enumerate() {
        // SAFETY: `tallies` outlives the set; `wait_all` below resolves
        // every worker before anything else touches the elements.
        let mut slot = unsafe { Shared::new(tally) };
        set.spawn(move || *slot = index as u64 + 1).unwrap();
    }
    set.wait_all();

    assert_eq!(tallies, [1, 2, 3, 4]);
}

#[test]
fn test_worker_reads_through_marker() {
    let mut text = String::from("shared input");
    // SAFETY: `wait` below resolves the worker while `text` is still alive.
    let slot = unsafe { Shared::new(&mut text) };

    let mut worker = ScopedWorker::spawn(move || slot.len()).unwrap();
    assert_eq!(worker.wait().unwrap(), 12);

    text.push('!');
}

#[test]
fn test_marker_mirrors_target_send_and_sync() {
    fn assert_send<T: Send>() {}
    fn assert_sync<T: Sync>() {}
    assert_send::<Shared<u64>>();
    assert_send::<Shared<Vec<u64>>>();
    assert_sync::<Shared<u64>>();
}

/*!
 * Tests for the job store and cancellation registry
 */

use std::sync::Arc;

use uuid::Uuid;

use slidecast::jobs::{CancellationRegistry, JobStatus, JobStore};

/// Writers on different jobs never interfere with each other
#[test]
fn test_store_withConcurrentWriters_shouldIsolateJobs() {
    let store = Arc::new(JobStore::new());
    let id_a = Uuid::new_v4();
    let id_b = Uuid::new_v4();
    store.create(id_a);
    store.create(id_b);
    store.mark_processing(&id_a, "a");
    store.mark_processing(&id_b, "b");

    let handles: Vec<_> = (0..4)
        .map(|worker| {
            let store = store.clone();
            let id = if worker % 2 == 0 { id_a } else { id_b };
            std::thread::spawn(move || {
                for step in 0..50u8 {
                    store.set_progress(&id, step.min(99), &format!("step {}", step));
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(store.snapshot(&id_a).unwrap().progress, 49);
    assert_eq!(store.snapshot(&id_b).unwrap().progress, 49);
}

/// Progress observed through snapshots never decreases while a job is live
#[test]
fn test_store_withOutOfOrderSamples_shouldStayMonotonic() {
    let store = JobStore::new();
    let id = Uuid::new_v4();
    store.create(id);
    store.mark_processing(&id, "start");

    let mut observed = Vec::new();
    for progress in [5u8, 10, 8, 30, 25, 65, 64, 80] {
        store.set_progress(&id, progress, "sample");
        observed.push(store.snapshot(&id).unwrap().progress);
    }

    for pair in observed.windows(2) {
        assert!(pair[1] >= pair[0], "progress regressed: {:?}", observed);
    }
}

/// A completed job ignores every later mutation, including cancellation
#[test]
fn test_store_terminalState_shouldBeFinal() {
    let store = JobStore::new();
    let id = Uuid::new_v4();
    store.create(id);
    store.mark_processing(&id, "work");
    store.complete(&id, "/tmp/final.mp4".into());

    store.mark_cancelled(&id);
    store.set_progress(&id, 1, "ghost update");

    let job = store.snapshot(&id).unwrap();
    assert_eq!(job.status, JobStatus::Completed);
    assert_eq!(job.progress, 100);
}

/// Registry tokens are independent per job
#[test]
fn test_registry_withTwoJobs_shouldCancelIndependently() {
    let registry = CancellationRegistry::new();
    let id_a = Uuid::new_v4();
    let id_b = Uuid::new_v4();
    let token_a = registry.register(id_a);
    let token_b = registry.register(id_b);

    registry.cancel(&id_a);

    assert!(token_a.is_cancelled());
    assert!(!token_b.is_cancelled());
}

/// Cancellation is set-once: repeated cancels stay cancelled
#[test]
fn test_registry_withRepeatedCancel_shouldStaySet() {
    let registry = CancellationRegistry::new();
    let id = Uuid::new_v4();
    let token = registry.register(id);

    registry.cancel(&id);
    registry.cancel(&id);

    assert!(token.is_cancelled());
}

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::time::{Duration, Instant};
use crate::async_exec::{AsyncExecutor, AsyncResult, AsyncTask};
use crate::error::{Error, Result};

fn wait_done<T>(result: &mut AsyncResult<T>) {
    let deadline = Instant::now() + Duration::from_secs(5);
    while !result.is_done() {
        assert!(Instant::now() < deadline, "task did not finish in time");
        std::thread::sleep(Duration::from_millis(1));
    }
}

// ============================================================================
// CONSTRUCTION
// ============================================================================

#[test]
fn test_new_starts_workers() {
    let executor = AsyncExecutor::new(3, "Loader").unwrap();
    assert_eq!(executor.worker_count(), 3);
    assert_eq!(executor.name(), "Loader");
    assert!(!executor.is_disposed());
}

#[test]
fn test_zero_workers_rejected() {
    assert!(matches!(
        AsyncExecutor::new(0, "Empty"),
        Err(Error::InitializationFailed(_))
    ));
}

#[test]
fn test_worker_threads_are_named() {
    let executor = AsyncExecutor::new(1, "Named").unwrap();
    let result = executor
        .submit(|| Ok(std::thread::current().name().map(str::to_string)))
        .unwrap();
    assert_eq!(result.get().unwrap().flatten(), Some("Named-0".to_string()));
}

// ============================================================================
// SUBMIT / RESULTS
// ============================================================================

#[test]
fn test_submit_closure_returns_value() {
    let executor = AsyncExecutor::new(1, "Test").unwrap();
    let result = executor.submit(|| Ok(21 * 2)).unwrap();
    assert_eq!(result.get().unwrap(), Some(42));
}

struct Doubler(u32);

impl AsyncTask<u32> for Doubler {
    fn call(self) -> Result<u32> {
        Ok(self.0 * 2)
    }
}

#[test]
fn test_submit_struct_task() {
    let executor = AsyncExecutor::new(1, "Test").unwrap();
    let mut result = executor.submit(Doubler(8)).unwrap();
    wait_done(&mut result);
    assert_eq!(result.get().unwrap(), Some(16));
}

#[test]
fn test_task_error_surfaces_on_get() {
    let executor = AsyncExecutor::new(1, "Test").unwrap();
    let result = executor
        .submit(|| -> Result<()> { Err(Error::Io("disk on fire".to_string())) })
        .unwrap();
    match result.get() {
        Err(Error::Io(msg)) => assert_eq!(msg, "disk on fire"),
        other => panic!("unexpected result: {:?}", other),
    }
}

#[test]
fn test_panic_becomes_backend_error() {
    let executor = AsyncExecutor::new(1, "Test").unwrap();
    let result = executor
        .submit(|| -> Result<()> { panic!("decoder exploded") })
        .unwrap();
    match result.get() {
        Err(Error::BackendError(msg)) => assert!(msg.contains("decoder exploded")),
        other => panic!("unexpected result: {:?}", other),
    }

    // Worker survives the panic
    let result = executor.submit(|| Ok(1)).unwrap();
    assert_eq!(result.get().unwrap(), Some(1));
}

#[test]
fn test_is_done_does_not_block() {
    let executor = AsyncExecutor::new(1, "Test").unwrap();
    let gate = Arc::new(Barrier::new(2));
    let worker_gate = gate.clone();

    let mut result = executor
        .submit(move || {
            worker_gate.wait();
            Ok("done")
        })
        .unwrap();

    assert!(!result.is_done());
    gate.wait();
    wait_done(&mut result);
    assert!(result.is_done());
    assert_eq!(result.get().unwrap(), Some("done"));
}

#[test]
fn test_dropped_sender_resolves_to_none() {
    let (sender, receiver) = crossbeam_channel::bounded::<Result<u32>>(1);
    let mut result = AsyncResult::new(receiver);
    drop(sender);

    assert!(result.is_done());
    assert_eq!(result.get().unwrap(), None);
}

// ============================================================================
// DISPOSE
// ============================================================================

#[test]
fn test_dispose_drains_queue_and_rejects_new_work() {
    let counter = Arc::new(AtomicUsize::new(0));
    let mut executor = AsyncExecutor::new(2, "Test").unwrap();

    for _ in 0..10 {
        let counter = counter.clone();
        executor
            .submit(move || {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(())
            })
            .unwrap();
    }

    executor.dispose();
    assert_eq!(counter.load(Ordering::SeqCst), 10);
    assert!(executor.is_disposed());
    assert_eq!(executor.worker_count(), 0);
    assert!(matches!(executor.submit(|| Ok(())), Err(Error::BackendError(_))));

    // Second dispose is a no-op
    executor.dispose();
}

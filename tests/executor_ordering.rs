//! End-to-end delivery and ordering scenarios against the real clock.

mod common;

use chrono::{DateTime, TimeDelta, Utc};
use common::{RecordingHandler, wait_until};
use delayq::{
    CountingHandler, DelayedTaskExecutor, InstrumentedExecutor, StrictOrderHandler,
};
use pretty_assertions::assert_eq;
use std::sync::{Arc, Mutex};
use std::time::Duration;

const WAIT: Duration = Duration::from_secs(10);

#[test]
fn single_producer_increasing_times_keeps_strict_order() {
    let handler = Arc::new(StrictOrderHandler::new(CountingHandler::new()));
    let executor = DelayedTaskExecutor::with_handler(Arc::clone(&handler));

    // Strictly increasing target times, 0.1 ms apart.
    let total: u64 = 500;
    let base = Utc::now();
    for i in 0..total {
        let time = base + TimeDelta::microseconds(i64::try_from(i).unwrap() * 100);
        executor.submit(time, || Ok(()));
    }

    assert!(wait_until(WAIT, || {
        handler.inner().stats().completed() == total
    }));
    // A strict-order violation would have panicked the worker.
    assert!(!executor.is_stopped());
    assert_eq!(handler.inner().stats().success_count, total);
    executor.shutdown();
}

#[test]
fn constant_target_time_delivers_in_seq_order() {
    let handler = Arc::new(RecordingHandler::new());
    let executor = DelayedTaskExecutor::with_handler(Arc::clone(&handler));

    let total: usize = 200;
    let time = Utc::now();
    for _ in 0..total {
        executor.submit(time, || Ok(()));
    }

    assert!(wait_until(WAIT, || handler.recorded_len() == total));
    let expected: Vec<u64> = (1..=total as u64).collect();
    assert_eq!(handler.recorded(), expected);
    executor.shutdown();
}

#[test]
fn tasks_never_run_before_target_time() {
    let executor = DelayedTaskExecutor::new();
    let executed_at: Arc<Mutex<Vec<(DateTime<Utc>, DateTime<Utc>)>>> =
        Arc::new(Mutex::new(Vec::new()));

    for offset_ms in [50, 100, 150] {
        let target = Utc::now() + TimeDelta::milliseconds(offset_ms);
        let executed_at = Arc::clone(&executed_at);
        executor.submit(target, move || {
            executed_at.lock().unwrap().push((target, Utc::now()));
            Ok(())
        });
    }

    assert!(wait_until(WAIT, || executed_at.lock().unwrap().len() == 3));
    for (target, ran_at) in executed_at.lock().unwrap().iter() {
        // One millisecond of slack for scheduling resolution.
        assert!(
            *ran_at - *target >= TimeDelta::milliseconds(-1),
            "task ran at {ran_at} before its target {target}"
        );
    }
    executor.shutdown();
}

#[test]
fn concurrent_producers_all_delivered() {
    let handler = Arc::new(CountingHandler::new());
    let executor = Arc::new(DelayedTaskExecutor::with_handler(Arc::clone(&handler)));

    let per_producer: u64 = 200;
    let producers: Vec<_> = (0..3)
        .map(|_| {
            let executor = Arc::clone(&executor);
            std::thread::spawn(move || {
                for _ in 0..per_producer {
                    executor.submit(Utc::now(), || Ok(()));
                }
            })
        })
        .collect();
    for producer in producers {
        producer.join().unwrap();
    }

    assert!(wait_until(WAIT, || {
        handler.stats().completed() == 3 * per_producer
    }));
    assert_eq!(handler.stats().success_count, 3 * per_producer);
    assert_eq!(handler.stats().error_count, 0);
    executor.shutdown();
}

#[test]
fn far_future_task_waits_out_shutdown() {
    let handler = Arc::new(CountingHandler::new());
    let executor = InstrumentedExecutor::new(DelayedTaskExecutor::with_handler(Arc::clone(
        &handler,
    )));

    executor.submit(Utc::now() + TimeDelta::seconds(60), || Ok(()));
    std::thread::sleep(Duration::from_millis(200));

    assert!(executor.scheduled_count() > 0);
    assert_eq!(handler.stats().success_count, 0);
    assert_eq!(handler.stats().error_count, 0);

    executor.shutdown();
    assert_eq!(executor.pending(), 0);
    assert!(wait_until(WAIT, || executor.is_stopped()));
}

#[test]
fn shutdown_is_idempotent() {
    let executor = DelayedTaskExecutor::new();
    executor.shutdown();
    executor.shutdown();
    assert!(wait_until(WAIT, || executor.is_stopped()));
}

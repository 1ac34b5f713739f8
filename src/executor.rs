//! The executor: one worker thread draining the delay queue.
//!
//! Producers call [`submit`](DelayedTaskExecutor::submit) from any thread;
//! the worker repeatedly takes the next due task, runs its payload, and
//! reports the outcome to the completion handler. Payload failures (error
//! returns and panics) are logged and routed to the handler's error path;
//! they never stop the worker. A panic escaping the loop itself — e.g. a
//! strict-order assertion — is logged and stops the worker without restart.

use crate::clock::{Clock, WallClock};
use crate::completion::{CompletionHandler, NoopHandler};
use crate::error::Error;
use crate::queue::DelayQueue;
use crate::task::PayloadError;
use chrono::{DateTime, Utc};
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::thread;

/// Delayed-task executor with a single dedicated worker thread.
pub struct DelayedTaskExecutor<C: Clock = WallClock> {
    queue: Arc<DelayQueue<C>>,
    worker: thread::JoinHandle<()>,
}

impl DelayedTaskExecutor<WallClock> {
    /// Create an executor with the wall clock and no completion observer.
    #[must_use]
    pub fn new() -> Self {
        Self::with_handler(NoopHandler)
    }

    /// Create an executor reporting outcomes to `handler`.
    #[must_use]
    pub fn with_handler<H: CompletionHandler + 'static>(handler: H) -> Self {
        Self::with_clock(WallClock, handler)
    }
}

impl Default for DelayedTaskExecutor<WallClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock + 'static> DelayedTaskExecutor<C> {
    /// Create an executor with a custom clock.
    #[must_use]
    pub fn with_clock<H: CompletionHandler + 'static>(clock: C, handler: H) -> Self {
        let queue = Arc::new(DelayQueue::with_clock(clock));
        let worker_queue = Arc::clone(&queue);
        let worker = thread::Builder::new()
            .name("delayed-task-executor".into())
            .spawn(move || {
                let run = catch_unwind(AssertUnwindSafe(|| {
                    worker_loop(&worker_queue, &handler);
                }));
                if let Err(panic) = run {
                    tracing::error!(
                        event = "executor.worker.died",
                        panic = panic_message(&panic),
                        "worker terminated by uncaught panic"
                    );
                }
            })
            .expect("spawn delayed-task-executor thread");

        Self { queue, worker }
    }

    /// Schedule `payload` to run no earlier than `target_time`.
    ///
    /// Safe to call from any number of producer threads; never waits for
    /// execution.
    pub fn submit<F>(&self, target_time: DateTime<Utc>, payload: F)
    where
        F: FnOnce() -> Result<(), PayloadError> + Send + 'static,
    {
        self.queue.insert(target_time, Box::new(payload));
    }

    /// Stop the worker at its next blocking point and discard pending
    /// tasks. Idempotent and non-blocking; a payload already running
    /// completes first.
    pub fn shutdown(&self) {
        self.queue.close();
        self.queue.clear();
    }

    /// Whether the worker thread has exited.
    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.worker.is_finished()
    }

    /// Number of tasks waiting in the queue.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.queue.len()
    }
}

impl<C: Clock> Drop for DelayedTaskExecutor<C> {
    fn drop(&mut self) {
        self.queue.close();
        self.queue.clear();
    }
}

fn worker_loop<C: Clock>(queue: &DelayQueue<C>, handler: &dyn CompletionHandler) {
    loop {
        let task = match queue.take_next_due() {
            Ok(task) => task,
            // The queue only produces Interrupted; any error ends the loop.
            Err(Error::Interrupted | Error::OutOfOrder { .. }) => break,
        };

        let (payload, completed) = task.into_parts();
        match catch_unwind(AssertUnwindSafe(payload)) {
            Ok(Ok(())) => handler.on_success(&completed),
            Ok(Err(err)) => {
                tracing::error!(
                    event = "executor.task.failed",
                    seq = %completed.seq(),
                    target_time = %completed.target_time(),
                    error = %err,
                    "failed to execute task"
                );
                handler.on_error(&completed);
            }
            Err(panic) => {
                tracing::error!(
                    event = "executor.task.panicked",
                    seq = %completed.seq(),
                    target_time = %completed.target_time(),
                    panic = panic_message(&panic),
                    "task payload panicked"
                );
                handler.on_error(&completed);
            }
        }
    }
    tracing::debug!(event = "executor.worker.stopped", "worker loop exited");
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> &str {
    panic
        .downcast_ref::<&'static str>()
        .copied()
        .or_else(|| panic.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("non-string panic payload")
}

//! Submission-counting executor decorator.
//!
//! Wraps a [`DelayedTaskExecutor`] and counts how many tasks were submitted
//! through it. Purely observational: ordering and delivery semantics are
//! untouched. Pair it with a
//! [`CountingHandler`](crate::completion::CountingHandler) to get the full
//! scheduled/success/error picture.

use crate::clock::{Clock, WallClock};
use crate::executor::DelayedTaskExecutor;
use crate::task::PayloadError;
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicU64, Ordering};

/// An executor that additionally counts submissions.
pub struct InstrumentedExecutor<C: Clock = WallClock> {
    inner: DelayedTaskExecutor<C>,
    scheduled_count: AtomicU64,
}

impl<C: Clock + 'static> InstrumentedExecutor<C> {
    /// Wrap an executor with a submission counter starting at zero.
    #[must_use]
    pub fn new(inner: DelayedTaskExecutor<C>) -> Self {
        Self {
            inner,
            scheduled_count: AtomicU64::new(0),
        }
    }

    /// Count the submission, then delegate to the wrapped executor.
    pub fn submit<F>(&self, target_time: DateTime<Utc>, payload: F)
    where
        F: FnOnce() -> Result<(), PayloadError> + Send + 'static,
    {
        self.scheduled_count.fetch_add(1, Ordering::Relaxed);
        self.inner.submit(target_time, payload);
    }

    /// Total tasks submitted through this decorator.
    #[must_use]
    pub fn scheduled_count(&self) -> u64 {
        self.scheduled_count.load(Ordering::Relaxed)
    }

    /// Shut down the wrapped executor. Idempotent.
    pub fn shutdown(&self) {
        self.inner.shutdown();
    }

    /// Whether the wrapped executor's worker has exited.
    #[must_use]
    pub fn is_stopped(&self) -> bool {
        self.inner.is_stopped()
    }

    /// Number of tasks waiting in the wrapped executor's queue.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.inner.pending()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::completion::CountingHandler;
    use std::sync::Arc;
    use std::time::Duration;

    #[test]
    fn counts_submissions() {
        let executor = InstrumentedExecutor::new(DelayedTaskExecutor::new());
        assert_eq!(executor.scheduled_count(), 0);

        for _ in 0..5 {
            executor.submit(Utc::now(), || Ok(()));
        }
        assert_eq!(executor.scheduled_count(), 5);
        executor.shutdown();
    }

    #[test]
    fn delegates_delivery_to_inner_executor() {
        let handler = Arc::new(CountingHandler::new());
        let executor = InstrumentedExecutor::new(DelayedTaskExecutor::with_handler(Arc::clone(
            &handler,
        )));

        executor.submit(Utc::now(), || Ok(()));

        let start = std::time::Instant::now();
        while handler.stats().success_count == 0 && start.elapsed() < Duration::from_secs(2) {
            std::thread::sleep(Duration::from_millis(5));
        }
        assert_eq!(handler.stats().success_count, 1);
        assert_eq!(executor.scheduled_count(), 1);
        executor.shutdown();
    }
}

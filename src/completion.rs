//! Completion reporting: the handler capability and its variants.
//!
//! The worker reports every executed task through a [`CompletionHandler`].
//! Three variants ship with the crate:
//!
//! - [`NoopHandler`] — discards notifications; the executor default.
//! - [`CountingHandler`] — success/error counters plus min/max/rolling
//!   average delay, snapshot-readable by a concurrent reporter.
//! - [`StrictOrderHandler`] — asserts that completions never go backwards
//!   in `(target_time, seq)` order; single-producer scenarios only.

use crate::clock::{Clock, WallClock};
use crate::error::Error;
use crate::task::{CompletedTask, Seq};
use chrono::{DateTime, Utc};
use std::sync::Mutex;
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};

/// Sink for per-task outcome notifications.
///
/// Called by the single worker thread only; implementations need interior
/// mutability but never see concurrent writers.
pub trait CompletionHandler: Send + Sync {
    /// The task's payload ran and returned success.
    fn on_success(&self, task: &CompletedTask);

    /// The task's payload failed (error return or panic).
    fn on_error(&self, task: &CompletedTask);
}

/// Handler that ignores all notifications.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopHandler;

impl CompletionHandler for NoopHandler {
    fn on_success(&self, _task: &CompletedTask) {}

    fn on_error(&self, _task: &CompletedTask) {}
}

/// Incrementally updated mean that needs only the previous value and the
/// sample count, not the sample history.
#[derive(Debug, Default)]
struct RollingAverage {
    value: f64,
    samples: u64,
}

impl RollingAverage {
    #[expect(clippy::cast_precision_loss, reason = "sample counts stay small")]
    fn update(&mut self, sample: f64) {
        let n = self.samples as f64;
        self.value = self.value * (n / (n + 1.0)) + sample / (n + 1.0);
        self.samples += 1;
    }
}

/// Plain-number snapshot of a [`CountingHandler`], safe to take from any
/// thread while the worker keeps running.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompletionStats {
    /// Payloads that returned success.
    pub success_count: u64,
    /// Payloads that failed.
    pub error_count: u64,
    /// Smallest observed delay (completion time minus target time).
    pub min_delay_ns: i64,
    /// Largest observed delay.
    pub max_delay_ns: i64,
    /// Rolling average delay over all completions.
    pub avg_delay_ns: f64,
}

impl CompletionStats {
    /// Completions observed so far, success and error together.
    #[must_use]
    pub const fn completed(&self) -> u64 {
        self.success_count + self.error_count
    }
}

/// Handler that counts outcomes and tracks delay statistics.
///
/// Delay is `now - target_time` at notification, folded into running
/// min/max extrema and a rolling average. All state is written by the
/// worker thread; readers take [`stats`](Self::stats) snapshots.
pub struct CountingHandler<C: Clock = WallClock> {
    success_count: AtomicU64,
    error_count: AtomicU64,
    min_delay_ns: AtomicI64,
    max_delay_ns: AtomicI64,
    avg_delay: Mutex<RollingAverage>,
    clock: C,
}

impl CountingHandler<WallClock> {
    /// Create a counting handler driven by the wall clock.
    #[must_use]
    pub fn new() -> Self {
        Self::with_clock(WallClock)
    }
}

impl Default for CountingHandler<WallClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> CountingHandler<C> {
    /// Create a counting handler driven by a custom clock.
    #[must_use]
    pub fn with_clock(clock: C) -> Self {
        Self {
            success_count: AtomicU64::new(0),
            error_count: AtomicU64::new(0),
            min_delay_ns: AtomicI64::new(i64::MAX),
            max_delay_ns: AtomicI64::new(i64::MIN),
            avg_delay: Mutex::new(RollingAverage::default()),
            clock,
        }
    }

    fn record_delay(&self, task: &CompletedTask) {
        let delay = self.clock.now().signed_duration_since(task.target_time());
        let delay_ns = delay.num_nanoseconds().unwrap_or(i64::MAX);

        self.min_delay_ns.fetch_min(delay_ns, Ordering::Relaxed);
        self.max_delay_ns.fetch_max(delay_ns, Ordering::Relaxed);
        #[expect(clippy::cast_precision_loss, reason = "nanosecond delays fit f64 comfortably")]
        self.avg_delay.lock().unwrap().update(delay_ns as f64);
    }

    /// Take a consistent-enough snapshot of the counters.
    ///
    /// Extrema report 0 until the first completion has been recorded.
    #[must_use]
    pub fn stats(&self) -> CompletionStats {
        let avg = self.avg_delay.lock().unwrap();
        let no_samples = avg.samples == 0;
        CompletionStats {
            success_count: self.success_count.load(Ordering::Relaxed),
            error_count: self.error_count.load(Ordering::Relaxed),
            min_delay_ns: if no_samples {
                0
            } else {
                self.min_delay_ns.load(Ordering::Relaxed)
            },
            max_delay_ns: if no_samples {
                0
            } else {
                self.max_delay_ns.load(Ordering::Relaxed)
            },
            avg_delay_ns: avg.value,
        }
    }
}

impl<C: Clock> CompletionHandler for CountingHandler<C> {
    fn on_success(&self, task: &CompletedTask) {
        self.success_count.fetch_add(1, Ordering::Relaxed);
        self.record_delay(task);
    }

    fn on_error(&self, task: &CompletedTask) {
        self.error_count.fetch_add(1, Ordering::Relaxed);
        self.record_delay(task);
    }
}

/// Handler that asserts completions arrive in `(target_time, seq)` order,
/// then delegates to an inner handler.
///
/// Only valid while exactly one producer is active: with several producers
/// the queue's documented sequence-assignment race can legitimately deliver
/// equal-time tasks out of wall-clock submission order.
///
/// # Panics
///
/// Both notification methods panic with [`Error::OutOfOrder`] when a
/// completion goes backwards. That is deliberate: it flags a logic bug in
/// the single-producer assumption, and it escapes the worker loop (which
/// logs it and stops) rather than being swallowed as a task failure.
pub struct StrictOrderHandler<H> {
    inner: H,
    previous: Mutex<Option<(DateTime<Utc>, Seq)>>,
}

impl<H: CompletionHandler> StrictOrderHandler<H> {
    /// Wrap `inner` with the order assertion.
    #[must_use]
    pub fn new(inner: H) -> Self {
        Self {
            inner,
            previous: Mutex::new(None),
        }
    }

    /// Access the wrapped handler.
    pub const fn inner(&self) -> &H {
        &self.inner
    }

    fn assert_in_order(&self, task: &CompletedTask) {
        let mut previous = self.previous.lock().unwrap();
        if let Some((prev_time, prev_seq)) = *previous {
            let backwards_time = prev_time > task.target_time();
            let backwards_seq = prev_time == task.target_time() && prev_seq > task.seq();
            if backwards_time || backwards_seq {
                panic!(
                    "{}",
                    Error::OutOfOrder {
                        previous_time: prev_time,
                        previous_seq: prev_seq,
                        time: task.target_time(),
                        seq: task.seq(),
                    }
                );
            }
        }
        *previous = Some((task.target_time(), task.seq()));
    }
}

impl<H: CompletionHandler> CompletionHandler for StrictOrderHandler<H> {
    fn on_success(&self, task: &CompletedTask) {
        self.assert_in_order(task);
        self.inner.on_success(task);
    }

    fn on_error(&self, task: &CompletedTask) {
        self.assert_in_order(task);
        self.inner.on_error(task);
    }
}

impl<H: CompletionHandler + ?Sized> CompletionHandler for std::sync::Arc<H> {
    fn on_success(&self, task: &CompletedTask) {
        self.as_ref().on_success(task);
    }

    fn on_error(&self, task: &CompletedTask) {
        self.as_ref().on_error(task);
    }
}

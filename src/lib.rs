//! delayq — minimal in-process delayed-task scheduler.
//!
//! Producers submit closures tagged with a target execution time; a single
//! background worker runs each task no earlier than its scheduled time, in
//! time order, and reports every outcome to a pluggable completion handler.
//!
//! # Invariants
//!
//! - **Never early:** no task is delivered before its target time (within
//!   one scheduling-resolution tick).
//! - **Total order:** delivery follows `(target_time, seq)` ascending;
//!   sequence numbers are assigned under the queue mutex, so equal-time
//!   tasks run in the order they entered the queue.
//! - **Sequential execution:** payloads run one at a time on the worker;
//!   no re-entrancy, no payload concurrency.
//! - **Isolated failures:** a failing payload is logged and reported to the
//!   handler's error path; it never stops the worker or reaches producers.
//!
//! # Example
//!
//! ```
//! use delayq::{CountingHandler, DelayedTaskExecutor};
//! use chrono::{TimeDelta, Utc};
//! use std::sync::Arc;
//!
//! let handler = Arc::new(CountingHandler::new());
//! let executor = DelayedTaskExecutor::with_handler(Arc::clone(&handler));
//! executor.submit(Utc::now() + TimeDelta::milliseconds(10), || Ok(()));
//! # let start = std::time::Instant::now();
//! # while handler.stats().success_count == 0 && start.elapsed().as_secs() < 5 {
//! #     std::thread::sleep(std::time::Duration::from_millis(5));
//! # }
//! # assert_eq!(handler.stats().success_count, 1);
//! executor.shutdown();
//! ```

pub mod clock;
pub mod completion;
pub mod error;
pub mod executor;
pub mod instrument;
pub mod queue;
pub mod task;

pub use clock::{Clock, ManualClock, WallClock};
pub use completion::{
    CompletionHandler, CompletionStats, CountingHandler, NoopHandler, StrictOrderHandler,
};
pub use error::{Error, Result};
pub use executor::DelayedTaskExecutor;
pub use instrument::InstrumentedExecutor;
pub use queue::DelayQueue;
pub use task::{CompletedTask, PayloadError, ScheduledTask, Seq, TaskFn};

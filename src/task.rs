//! The unit of scheduled work and its ordering.
//!
//! A [`ScheduledTask`] is immutable once created: a payload closure, the
//! target execution time, and the sequence number assigned by the queue.
//! Ordering is `(target_time, seq)` ascending, so equal-time tasks fall back
//! to insertion order.

use chrono::{DateTime, Utc};
use std::cmp::Ordering;
use std::fmt;

/// Error produced by a failing task payload.
pub type PayloadError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// The work carried by a scheduled task.
pub type TaskFn = Box<dyn FnOnce() -> Result<(), PayloadError> + Send + 'static>;

/// Sequence number assigned at insertion time, used as the equal-time
/// tie-breaker. Always greater than zero once assigned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Seq(u64);

impl Seq {
    /// Wrap a raw counter value.
    #[must_use]
    pub(crate) const fn new(value: u64) -> Self {
        debug_assert!(value > 0, "sequence numbers start at 1");
        Self(value)
    }

    /// Get the raw value.
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for Seq {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "seq:{}", self.0)
    }
}

/// A task waiting in the queue: payload, target time, sequence number.
pub struct ScheduledTask {
    payload: TaskFn,
    target_time: DateTime<Utc>,
    seq: Seq,
}

impl ScheduledTask {
    pub(crate) fn new(payload: TaskFn, target_time: DateTime<Utc>, seq: Seq) -> Self {
        Self {
            payload,
            target_time,
            seq,
        }
    }

    /// The instant the task becomes due.
    #[must_use]
    pub const fn target_time(&self) -> DateTime<Utc> {
        self.target_time
    }

    /// The insertion-order tie-breaker, always greater than zero.
    #[must_use]
    pub const fn seq(&self) -> Seq {
        self.seq
    }

    /// Split into the runnable payload and the metadata handed to the
    /// completion handler after execution.
    #[must_use]
    pub fn into_parts(self) -> (TaskFn, CompletedTask) {
        let completed = CompletedTask {
            target_time: self.target_time,
            seq: self.seq,
        };
        (self.payload, completed)
    }
}

impl fmt::Debug for ScheduledTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScheduledTask")
            .field("target_time", &self.target_time)
            .field("seq", &self.seq)
            .finish_non_exhaustive()
    }
}

// Order by (target_time, seq) ascending; the payload takes no part.
impl PartialEq for ScheduledTask {
    fn eq(&self, other: &Self) -> bool {
        self.target_time == other.target_time && self.seq == other.seq
    }
}

impl Eq for ScheduledTask {}

impl PartialOrd for ScheduledTask {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ScheduledTask {
    fn cmp(&self, other: &Self) -> Ordering {
        match self.target_time.cmp(&other.target_time) {
            Ordering::Equal => self.seq.cmp(&other.seq),
            ord => ord,
        }
    }
}

/// The `(target_time, seq)` pair of a task that has been executed, as seen
/// by a [`CompletionHandler`](crate::completion::CompletionHandler).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompletedTask {
    target_time: DateTime<Utc>,
    seq: Seq,
}

impl CompletedTask {
    /// The instant the task was scheduled for.
    #[must_use]
    pub const fn target_time(&self) -> DateTime<Utc> {
        self.target_time
    }

    /// The task's sequence number.
    #[must_use]
    pub const fn seq(&self) -> Seq {
        self.seq
    }
}

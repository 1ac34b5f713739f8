//! Blocking time-ordered task queue.
//!
//! Tasks are ordered by `(target_time, seq)` ascending in a min-heap. Any
//! number of producers may [`insert`](DelayQueue::insert); exactly one
//! consumer calls [`take_next_due`](DelayQueue::take_next_due), which blocks
//! until the earliest task is actually due. Every wake-up recomputes the
//! time until the next deadline, so insertions that change what is next-due
//! are picked up immediately.
//!
//! # Sequence-counter policy
//!
//! Sequence numbers are assigned under the queue mutex, so they are unique,
//! strictly increasing, and equal-time tasks are delivered in the order they
//! entered the queue. The alternative — an atomic counter incremented
//! outside the lock — has higher insert throughput but lets two producers'
//! equal-time tasks pick up sequence numbers out of wall-clock submission
//! order, weakening the tie-break to "some total order". This queue
//! implements the serialized counter.

use crate::clock::{Clock, WallClock};
use crate::error::{Error, Result};
use crate::task::{ScheduledTask, Seq, TaskFn};
use chrono::{DateTime, TimeDelta, Utc};
use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::sync::{Condvar, Mutex, MutexGuard};
use std::time::Duration;

#[derive(Default)]
struct QueueState {
    heap: BinaryHeap<Reverse<ScheduledTask>>,
    sequence: u64,
    closed: bool,
}

/// A blocking priority queue of scheduled tasks, ordered by
/// `(target_time, seq)`.
pub struct DelayQueue<C: Clock = WallClock> {
    state: Mutex<QueueState>,
    due: Condvar,
    clock: C,
}

impl DelayQueue<WallClock> {
    /// Create a queue driven by the wall clock.
    #[must_use]
    pub fn new() -> Self {
        Self::with_clock(WallClock)
    }
}

impl Default for DelayQueue<WallClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> DelayQueue<C> {
    /// Create a queue driven by a custom clock.
    #[must_use]
    pub fn with_clock(clock: C) -> Self {
        Self {
            state: Mutex::new(QueueState::default()),
            due: Condvar::new(),
            clock,
        }
    }

    fn lock(&self) -> MutexGuard<'_, QueueState> {
        self.state.lock().unwrap()
    }

    /// Insert a task to run at `target_time`.
    ///
    /// Assigns the next sequence number under the queue mutex and wakes the
    /// consumer. Producers never block beyond this brief exclusion window.
    pub fn insert(&self, target_time: DateTime<Utc>, payload: TaskFn) {
        let mut state = self.lock();
        state.sequence += 1;
        let seq = Seq::new(state.sequence);
        state
            .heap
            .push(Reverse(ScheduledTask::new(payload, target_time, seq)));
        drop(state);

        tracing::trace!(
            event = "queue.insert",
            %seq,
            target_time = %target_time,
            "task inserted"
        );
        self.due.notify_all();
    }

    /// Block until the earliest task is due, then remove and return it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Interrupted`] if the queue is closed while waiting
    /// (or was already closed on entry).
    pub fn take_next_due(&self) -> Result<ScheduledTask> {
        let mut state = self.lock();
        loop {
            if state.closed {
                return Err(Error::Interrupted);
            }

            let remaining = match state.heap.peek() {
                None => None,
                Some(Reverse(next)) => {
                    let remaining = self.clock.until(next.target_time());
                    if remaining <= TimeDelta::zero() {
                        let Reverse(task) = state.heap.pop().expect("peeked");
                        tracing::trace!(
                            event = "queue.take",
                            seq = %task.seq(),
                            target_time = %task.target_time(),
                            late_by_us = -remaining.num_microseconds().unwrap_or(0),
                            "task due"
                        );
                        return Ok(task);
                    }
                    Some(remaining)
                }
            };

            state = match remaining {
                // Empty queue: sleep until an insert or close wakes us.
                None => self.due.wait(state).unwrap(),
                // Head not yet due: sleep at most until its deadline.
                Some(delta) => {
                    let timeout = delta.to_std().unwrap_or(Duration::ZERO);
                    self.due.wait_timeout(state, timeout).unwrap().0
                }
            };
        }
    }

    /// Remove and return the earliest task if it is already due.
    ///
    /// Non-blocking companion to [`take_next_due`](Self::take_next_due);
    /// with a [`ManualClock`](crate::clock::ManualClock) this drives the
    /// queue deterministically.
    pub fn try_take_due(&self) -> Option<ScheduledTask> {
        let mut state = self.lock();
        match state.heap.peek() {
            Some(Reverse(next)) if self.clock.until(next.target_time()) <= TimeDelta::zero() => {
                let Reverse(task) = state.heap.pop().expect("peeked");
                Some(task)
            }
            _ => None,
        }
    }

    /// Discard all pending tasks. Used during shutdown to release payload
    /// references promptly.
    pub fn clear(&self) {
        let dropped = {
            let mut state = self.lock();
            let len = state.heap.len();
            state.heap.clear();
            len
        };
        if dropped > 0 {
            tracing::debug!(event = "queue.clear", dropped, "pending tasks discarded");
        }
    }

    /// Close the queue: the consumer's next (or current) wait returns
    /// [`Error::Interrupted`]. Idempotent.
    pub fn close(&self) {
        self.lock().closed = true;
        self.due.notify_all();
    }

    /// Number of pending tasks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().heap.len()
    }

    /// Whether the queue has no pending tasks.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().heap.is_empty()
    }
}

//! Crate-level error type.

use crate::task::Seq;
use chrono::{DateTime, Utc};

/// Errors surfaced by the scheduler's own API.
///
/// Payload failures are not represented here: they stay local to the worker
/// (logged and routed to the completion handler's error path) and never
/// reach producers.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The blocking wait for the next due task was cancelled by shutdown.
    #[error("wait for next due task was interrupted by shutdown")]
    Interrupted,

    /// A strict-order handler observed a completion that went backwards.
    /// Signals a broken single-producer assumption, not a runtime condition.
    #[error(
        "out of order execution: previous task ({previous_time}, {previous_seq}) \
         completed before task ({time}, {seq})"
    )]
    OutOfOrder {
        previous_time: DateTime<Utc>,
        previous_seq: Seq,
        time: DateTime<Utc>,
        seq: Seq,
    },
}

pub type Result<T> = std::result::Result<T, Error>;

//! Shared helpers for the end-to-end scheduler tests.

#![allow(dead_code)]

use delayq::{CompletedTask, CompletionHandler};
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// Handler that records the sequence numbers of successful completions, in
/// delivery order. Errors are unexpected in these scenarios and panic.
#[derive(Debug, Default)]
pub struct RecordingHandler {
    seqs: Mutex<Vec<u64>>,
}

impl RecordingHandler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn recorded(&self) -> Vec<u64> {
        self.seqs.lock().unwrap().clone()
    }

    pub fn recorded_len(&self) -> usize {
        self.seqs.lock().unwrap().len()
    }
}

impl CompletionHandler for RecordingHandler {
    fn on_success(&self, task: &CompletedTask) {
        self.seqs.lock().unwrap().push(task.seq().value());
    }

    fn on_error(&self, task: &CompletedTask) {
        panic!("unexpected task failure: {}", task.seq());
    }
}

/// Poll `done` every few milliseconds until it holds or `deadline` elapses.
pub fn wait_until(deadline: Duration, mut done: impl FnMut() -> bool) -> bool {
    let start = Instant::now();
    while start.elapsed() < deadline {
        if done() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(5));
    }
    done()
}

//! Bounded single-producer/single-consumer byte-frame pipe, replacing the
//! original's unnamed `pipe()` pair used to fan batched Accelerometer and
//! Gyroscope frames from the ingest thread into the poll thread (and, on the
//! aggregator side, from the driver-event path into the aggregator loop).

use std::time::Duration;

use crossbeam::channel::{bounded, Receiver, RecvTimeoutError, Sender};

/// Deep enough to absorb one full batched read (40 frames) without blocking
/// the ingest thread on a poll thread that's mid-sleep.
const PIPE_CAPACITY: usize = 64;

#[derive(Clone)]
pub struct PipeWriter<T> {
    tx: Sender<T>,
}

pub struct PipeReader<T> {
    rx: Receiver<T>,
}

pub fn pipe<T>() -> (PipeWriter<T>, PipeReader<T>) {
    let (tx, rx) = bounded(PIPE_CAPACITY);
    (PipeWriter { tx }, PipeReader { rx })
}

impl<T> PipeWriter<T> {
    /// Write errors are swallowed: a full or disconnected pipe must never
    /// block or panic the calling thread (driver-event path runs hot).
    pub fn write(&self, item: T) {
        let _ = self.tx.try_send(item);
    }
}

impl<T> PipeReader<T> {
    /// Drains exactly one item with the given timeout, matching `poll(pipe, timeout_ms)`.
    pub fn read_one(&self, timeout: Duration) -> Option<T> {
        match self.rx.recv_timeout(timeout) {
            Ok(item) => Some(item),
            Err(RecvTimeoutError::Timeout) => None,
            Err(RecvTimeoutError::Disconnected) => None,
        }
    }
}

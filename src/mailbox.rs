//! Shared per-sensor state, replacing the original's global sensor-indexed
//! C arrays (`connected[]`, `sensor_data[]`).
//!
//! The original's "last-value-wins, tolerated race" semantics are kept
//! intentionally: `connected` uses relaxed atomics, and the cached reading
//! sits behind a per-slot mutex rather than one big lock, so the ingest
//! thread and the poll thread never block each other for longer than a
//! single slot update. This is not a correctness mechanism — it is the
//! same "speed matters" tradeoff the source made, just UB-free.

use std::array;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;

use crate::domain::{SensorEvent, NUM_SENSORS};

pub struct SensorMailbox {
    connected: [AtomicBool; NUM_SENSORS],
    slots: [Mutex<Option<SensorEvent>>; NUM_SENSORS],
}

impl SensorMailbox {
    pub fn new() -> Self {
        Self {
            connected: array::from_fn(|_| AtomicBool::new(false)),
            slots: array::from_fn(|_| Mutex::new(None)),
        }
    }

    /// Called by the per-sensor ingest thread after a successful accept.
    pub fn set_connected(&self, index: usize, value: bool) {
        self.connected[index].store(value, Ordering::Relaxed);
    }

    pub fn is_connected(&self, index: usize) -> bool {
        self.connected[index].load(Ordering::Relaxed)
    }

    /// Publishes a freshly parsed reading and marks the sensor connected.
    pub fn publish(&self, index: usize, event: SensorEvent) {
        *self.slots[index].lock() = Some(event);
        self.set_connected(index, true);
    }

    /// One-shot consumption: returns the cached event and clears `connected`
    /// so the next `poll()` sees nothing until another frame arrives (P7).
    /// The cached value itself is left in place (the original never erases
    /// `sensor_data[]`, only the `connected` flag).
    pub fn take_one_shot(&self, index: usize) -> Option<SensorEvent> {
        if !self.is_connected(index) {
            return None;
        }
        self.set_connected(index, false);
        *self.slots[index].lock()
    }
}

impl Default for SensorMailbox {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Reading, SensorId};

    fn sample_event() -> SensorEvent {
        SensorEvent {
            sensor: SensorId::Light,
            reading: Reading::Scalar(137.0),
            timestamp_ns: 1,
        }
    }

    #[test]
    fn one_shot_publication_clears_connected() {
        let mailbox = SensorMailbox::new();
        let idx = SensorId::Light.index();
        assert!(!mailbox.is_connected(idx));

        mailbox.publish(idx, sample_event());
        assert!(mailbox.is_connected(idx));

        let taken = mailbox.take_one_shot(idx);
        assert_eq!(taken, Some(sample_event()));
        assert!(!mailbox.is_connected(idx));

        assert_eq!(mailbox.take_one_shot(idx), None);
    }
}

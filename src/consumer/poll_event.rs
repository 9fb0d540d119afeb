//! The polled-event interface: one call drains the mailbox's one-shot
//! sensors and the two batched pipes, in the same order as the original
//! `dummy_poll()` — Accelerometer first, the one-shot sensors next, then
//! Gyroscope.

use std::thread;
use std::time::Duration;

use crate::domain::{monotonic_ns, SensorEvent, SensorId, ALL_SENSORS};
use crate::framing::parse;
use crate::mailbox::SensorMailbox;
use crate::pipe::PipeReader;
use std::sync::Arc;

const PIPE_DRAIN_TIMEOUT: Duration = Duration::from_millis(1);

pub struct PollState {
    pub mailbox: Arc<SensorMailbox>,
    pub accel_rx: PipeReader<Vec<u8>>,
    pub gyro_rx: PipeReader<Vec<u8>>,
}

/// Sleeps `delay`, then harvests at most one event per sensor: batched
/// sensors get one frame off their pipe (1ms drain timeout), everything
/// else gets its cached mailbox reading consumed one-shot (P7).
pub fn poll(state: &PollState, delay: Duration) -> Vec<SensorEvent> {
    thread::sleep(delay);
    let ts = monotonic_ns();
    let mut events = Vec::new();

    if let Some(event) = drain_batched(SensorId::Accelerometer, &state.accel_rx, ts) {
        events.push(event);
    }

    for sensor in ALL_SENSORS {
        if sensor.is_batched() {
            continue;
        }
        if let Some(event) = state.mailbox.take_one_shot(sensor.index()) {
            events.push(SensorEvent { timestamp_ns: ts, ..event });
        }
    }

    if let Some(event) = drain_batched(SensorId::Gyroscope, &state.gyro_rx, ts) {
        events.push(event);
    }

    events
}

fn drain_batched(sensor: SensorId, rx: &PipeReader<Vec<u8>>, ts: i64) -> Option<SensorEvent> {
    // Each batch of 40 received frames is pushed as 40 separate pipe items
    // (one per frame); a single poll only ever drains the oldest of them.
    let frame = rx.read_one(PIPE_DRAIN_TIMEOUT)?;
    match parse(sensor, &frame) {
        Ok(reading) => Some(SensorEvent { sensor, reading, timestamp_ns: ts }),
        Err(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Reading, SensorId};
    use crate::pipe::pipe;

    #[test]
    fn one_shot_sensor_emits_once_per_publish() {
        let mailbox = Arc::new(SensorMailbox::new());
        let (_accel_tx, accel_rx) = pipe::<Vec<u8>>();
        let (_gyro_tx, gyro_rx) = pipe::<Vec<u8>>();
        let state = PollState { mailbox: mailbox.clone(), accel_rx, gyro_rx };

        mailbox.publish(
            SensorId::Light.index(),
            SensorEvent { sensor: SensorId::Light, reading: Reading::Scalar(137.0), timestamp_ns: 0 },
        );

        let events = poll(&state, Duration::from_micros(1));
        assert_eq!(events.iter().filter(|e| e.sensor == SensorId::Light).count(), 1);

        let events = poll(&state, Duration::from_micros(1));
        assert_eq!(events.iter().filter(|e| e.sensor == SensorId::Light).count(), 0);
    }
}

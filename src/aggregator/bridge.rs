//! A single sensor's aggregator: owns the pipe fed by the driver-event
//! path, a cached coalesced reading, and a one-client-at-a-time TCP
//! listener that publishes the frame whenever it changes.

use std::io::Write;
use std::net::TcpListener;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use log::{error, info, warn};
use parking_lot::Mutex;

use crate::domain::{Arity, Reading, SensorId};
use crate::framing::encode;
use crate::net::bind_reuseaddr;
use crate::pipe::{pipe, PipeReader, PipeWriter};

const INTER_WRITE_SLEEP: Duration = Duration::from_nanos(1);

/// One axis sample from the native driver's event-dispatch path:
/// which field of the sensor's reading changed, and its new value.
/// `axis` indexes into the triplet/quad; status updates use `axis == 3`
/// on `Orientation` with the value truncated to `u8`.
#[derive(Debug, Clone, Copy)]
pub struct AxisSample {
    pub axis: usize,
    pub value: f64,
}

/// Handle given to the driver-event path for one sensor; cheap to clone,
/// write errors are swallowed because this runs on a hot callback thread.
#[derive(Clone)]
pub struct AggregatorHandle {
    pub sensor: SensorId,
    tx: PipeWriter<AxisSample>,
    connected: Arc<AtomicBool>,
}

impl AggregatorHandle {
    /// Submits one axis sample if a consumer is currently connected to this
    /// sensor's ingress port; otherwise the sample is dropped (no one's
    /// listening, so coalescing it would just waste the pipe's capacity).
    pub fn submit_axis_sample(&self, sample: AxisSample) {
        if self.connected.load(Ordering::Relaxed) {
            self.tx.write(sample);
        }
    }
}

pub struct Aggregator {
    sensor: SensorId,
    rx: PipeReader<AxisSample>,
    connected: Arc<AtomicBool>,
}

impl Aggregator {
    pub fn new(sensor: SensorId) -> (AggregatorHandle, Self) {
        let (tx, rx) = pipe();
        let connected = Arc::new(AtomicBool::new(false));
        let handle = AggregatorHandle { sensor, tx, connected: connected.clone() };
        let worker = Self { sensor, rx, connected };
        (handle, worker)
    }

    pub fn run(self, shutdown: Arc<AtomicBool>) {
        let port = self.sensor.consumer_port();
        let listener = match bind_reuseaddr(port) {
            Ok(l) => l,
            Err(e) => {
                error!("aggregator[{}]: failed to bind port {port}: {e}", self.sensor.name());
                return;
            }
        };
        listener
            .set_nonblocking(true)
            .expect("failed to set listener non-blocking");
        info!("aggregator[{}]: listening on 0.0.0.0:{port}", self.sensor.name());

        while !shutdown.load(Ordering::Relaxed) {
            let stream = match accept_one(&listener, &shutdown) {
                Some(stream) => stream,
                None => return,
            };
            self.connected.store(true, Ordering::Relaxed);
            info!("aggregator[{}]: consumer connected", self.sensor.name());

            self.coalesce_loop(stream, &shutdown);
            self.connected.store(false, Ordering::Relaxed);
        }
    }

    fn coalesce_loop(&self, mut stream: impl Write, shutdown: &AtomicBool) {
        let mut reading = zeroed_reading(self.sensor.arity());
        let mut last_frame: Option<Vec<u8>> = None;

        while !shutdown.load(Ordering::Relaxed) {
            if let Some(sample) = self.rx.read_one(Duration::from_millis(1)) {
                apply_axis_sample(&mut reading, sample);

                let frame = encode(self.sensor, &reading);
                if last_frame.as_deref() != Some(frame.as_slice()) {
                    if let Err(e) = stream.write_all(&frame) {
                        warn!("aggregator[{}]: write failed, dropping client: {e}", self.sensor.name());
                        return;
                    }
                    last_frame = Some(frame);
                }
            }
            thread::sleep(INTER_WRITE_SLEEP);
        }
    }
}

fn accept_one(listener: &TcpListener, shutdown: &AtomicBool) -> Option<std::net::TcpStream> {
    loop {
        if shutdown.load(Ordering::Relaxed) {
            return None;
        }
        match listener.accept() {
            Ok((stream, _)) => return Some(stream),
            Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                thread::sleep(Duration::from_millis(50));
            }
            Err(_) => thread::sleep(Duration::from_millis(50)),
        }
    }
}

fn zeroed_reading(arity: Arity) -> Reading {
    match arity {
        Arity::Scalar => Reading::Scalar(0.0),
        Arity::Triplet => Reading::Triplet([0.0; 3]),
        Arity::TripletStatus => Reading::TripletStatus([0.0; 3], 0),
        Arity::Quad => Reading::Quad([0.0; 4]),
    }
}

fn apply_axis_sample(reading: &mut Reading, sample: AxisSample) {
    match reading {
        Reading::Scalar(v) => *v = sample.value,
        Reading::Triplet(v) => {
            if let Some(slot) = v.get_mut(sample.axis) {
                *slot = sample.value;
            }
        }
        Reading::TripletStatus(v, status) => {
            if sample.axis == 3 {
                *status = sample.value as u8;
            } else if let Some(slot) = v.get_mut(sample.axis) {
                *slot = sample.value;
            }
        }
        Reading::Quad(v) => {
            if let Some(slot) = v.get_mut(sample.axis) {
                *slot = sample.value;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn axis_samples_coalesce_into_triplet() {
        let mut reading = zeroed_reading(Arity::Triplet);
        apply_axis_sample(&mut reading, AxisSample { axis: 0, value: 1.0 });
        apply_axis_sample(&mut reading, AxisSample { axis: 2, value: 3.0 });
        assert_eq!(reading, Reading::Triplet([1.0, 0.0, 3.0]));
    }

    #[test]
    fn orientation_status_axis_is_truncated() {
        let mut reading = zeroed_reading(Arity::TripletStatus);
        apply_axis_sample(&mut reading, AxisSample { axis: 3, value: 3.0 });
        assert_eq!(reading, Reading::TripletStatus([0.0; 3], 3));
    }
}

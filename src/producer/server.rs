//! Per-sensor generator TCP server: accept, then loop emitting
//! change-suppressed frames every 10ns until the write fails.

use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use log::{error, info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::domain::SensorId;
use crate::framing::encode;
use crate::net::bind_reuseaddr;
use crate::producer::generator::generate;

const INTER_FRAME_SLEEP: Duration = Duration::from_nanos(10);

/// Spawns one thread per sensor and blocks until every thread has exited
/// (which under normal operation only happens on shutdown).
pub fn run_producer(shutdown: Arc<AtomicBool>) {
    let handles: Vec<_> = crate::domain::ALL_SENSORS
        .iter()
        .copied()
        .map(|sensor| {
            let shutdown = shutdown.clone();
            thread::Builder::new()
                .name(format!("producer-{}", sensor.name()))
                .spawn(move || run_sensor_server(sensor, shutdown))
                .expect("failed to spawn producer thread")
        })
        .collect();

    for handle in handles {
        let _ = handle.join();
    }
}

fn run_sensor_server(sensor: SensorId, shutdown: Arc<AtomicBool>) {
    let port = sensor.producer_port();
    let listener = match bind_reuseaddr(port) {
        Ok(l) => l,
        Err(e) => {
            error!("producer[{}]: failed to bind port {port}: {e}", sensor.name());
            return;
        }
    };
    listener
        .set_nonblocking(true)
        .expect("failed to set listener non-blocking");
    info!("producer[{}]: listening on 0.0.0.0:{port}", sensor.name());

    while !shutdown.load(Ordering::Relaxed) {
        let (stream, _) = match listener.accept() {
            Ok(pair) => pair,
            Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                thread::sleep(Duration::from_millis(50));
                continue;
            }
            Err(e) => {
                warn!("producer[{}]: accept failed: {e}", sensor.name());
                continue;
            }
        };
        info!("producer[{}]: accepted connection", sensor.name());
        serve_connection(sensor, stream, &shutdown);
    }
}

fn serve_connection(sensor: SensorId, mut stream: impl Write, shutdown: &AtomicBool) {
    let mut rng = StdRng::from_rng(&mut rand::rng());
    let mut last_frame: Option<Vec<u8>> = None;

    while !shutdown.load(Ordering::Relaxed) {
        let reading = generate(&mut rng, sensor);
        let frame = encode(sensor, &reading);

        if last_frame.as_deref() != Some(frame.as_slice()) {
            if let Err(e) = stream.write_all(&frame) {
                warn!("producer[{}]: write failed, re-accepting: {e}", sensor.name());
                return;
            }
            last_frame = Some(frame);
        }

        thread::sleep(INTER_FRAME_SLEEP);
    }
}

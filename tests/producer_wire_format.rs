//! Connects to a running producer like a real relay pull-client would and
//! checks the frames on the wire actually decode to in-range readings.

use std::io::Read;
use std::net::TcpStream;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use telemetry_relay_fabric::domain::{Reading, SensorId};
use telemetry_relay_fabric::framing::parse;
use telemetry_relay_fabric::producer::run_producer;

#[test]
fn producer_emits_parseable_frames_within_range() {
    let shutdown = Arc::new(AtomicBool::new(false));
    let worker_shutdown = shutdown.clone();
    thread::spawn(move || run_producer(worker_shutdown));

    let sensor = SensorId::Light;
    let mut stream = connect_with_retry(sensor.producer_port());

    let frame_size = sensor.frame_size();
    for _ in 0..5 {
        let mut buf = vec![0u8; frame_size];
        stream.read_exact(&mut buf).expect("producer closed connection unexpectedly");
        let reading = parse(sensor, &buf).expect("producer emitted a malformed frame");
        match reading {
            Reading::Scalar(v) => {
                assert!((0.0..200.0).contains(&v), "light reading {v} out of range");
            }
            other => panic!("unexpected reading shape for a scalar sensor: {other:?}"),
        }
    }

    shutdown.store(true, Ordering::Relaxed);
}

fn connect_with_retry(port: u16) -> TcpStream {
    for _ in 0..50 {
        if let Ok(stream) = TcpStream::connect(("127.0.0.1", port)) {
            return stream;
        }
        thread::sleep(Duration::from_millis(50));
    }
    panic!("could not connect to producer port {port}");
}

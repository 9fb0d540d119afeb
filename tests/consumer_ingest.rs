//! Drives a running consumer's ingest server like a device would: connects,
//! sends frames, and checks the same-frame tolerance (I3) actually resets
//! the connection, with the optional diagnostics trail recording both ends.

use std::io::{Read, Write};
use std::net::TcpStream;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use telemetry_relay_fabric::consumer::run_consumer;
use telemetry_relay_fabric::diagnostics::Diagnostics;
use telemetry_relay_fabric::domain::{Reading, SensorId};
use telemetry_relay_fabric::framing::encode;

#[test]
fn ingest_resets_after_repeated_frames_and_logs_diagnostics() {
    let dir = tempfile::tempdir().unwrap();
    let csv_path = dir.path().join("consumer.diagnostics.csv");

    let shutdown = Arc::new(AtomicBool::new(false));
    let diagnostics = Diagnostics::new();
    diagnostics.start_exporter(csv_path.clone(), shutdown.clone());

    let worker_shutdown = shutdown.clone();
    let worker_diagnostics = diagnostics.clone();
    thread::spawn(move || run_consumer(Duration::from_millis(2), Some(worker_diagnostics), worker_shutdown));

    let sensor = SensorId::Proximity;
    let mut stream = connect_with_retry(sensor.consumer_port());

    let frame = encode(sensor, &Reading::Scalar(3.0));
    // First send establishes `last_readings`; the next four identical sends
    // push `same_r_num` to MAX_SAME_READING_TOLERANCE and trip the reset.
    for _ in 0..5 {
        stream.write_all(&frame).expect("write to ingest server failed");
        thread::sleep(Duration::from_millis(20));
    }

    let mut probe = [0u8; 1];
    let closed = stream.read(&mut probe).map(|n| n == 0).unwrap_or(true);
    assert!(closed, "ingest server should have reset the connection after repeated frames");

    shutdown.store(true, Ordering::Relaxed);
    thread::sleep(Duration::from_millis(200));

    let contents = std::fs::read_to_string(&csv_path).expect("diagnostics csv missing");
    assert!(contents.contains("accepted"), "expected an accepted event, got: {contents}");
    assert!(
        contents.contains("reconnected") || contents.contains("frame_rejected"),
        "expected a reconnect/reject event, got: {contents}"
    );
}

fn connect_with_retry(port: u16) -> TcpStream {
    for _ in 0..50 {
        if let Ok(stream) = TcpStream::connect(("127.0.0.1", port)) {
            return stream;
        }
        thread::sleep(Duration::from_millis(50));
    }
    panic!("could not connect to ingest port {port}");
}

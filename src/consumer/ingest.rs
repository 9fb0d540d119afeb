//! Per-sensor ingest server: accept, then read fixed-size frames forever
//! per the algorithm in SPEC_FULL.md §4.C — locked-marker skip, same-frame
//! tolerance, batched-pipe hand-off for Accelerometer/Gyroscope, mailbox
//! publication for everything else.

use std::io::Read;
use std::net::TcpStream;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use log::{error, info, warn};

use crate::diagnostics::{DiagEventKind, Diagnostics};
use crate::domain::{monotonic_ns, SensorId, MAX_SAME_READING_TOLERANCE};
use crate::errors::{RelayError, Result};
use crate::framing::{is_locked_marker, parse};
use crate::mailbox::SensorMailbox;
use crate::net::bind_reuseaddr;
use crate::pipe::PipeWriter;

pub fn run(
    sensor: SensorId,
    mailbox: Arc<SensorMailbox>,
    accel_tx: PipeWriter<Vec<u8>>,
    gyro_tx: PipeWriter<Vec<u8>>,
    diagnostics: Option<Diagnostics>,
    shutdown: Arc<AtomicBool>,
) {
    let port = sensor.consumer_port();
    let listener = match bind_reuseaddr(port) {
        Ok(l) => l,
        Err(e) => {
            error!("ingest[{}]: failed to bind port {port}: {e}", sensor.name());
            return;
        }
    };
    listener
        .set_nonblocking(true)
        .expect("failed to set listener non-blocking");
    info!("ingest[{}]: listening on 0.0.0.0:{port}", sensor.name());

    while !shutdown.load(Ordering::Relaxed) {
        mailbox.set_connected(sensor.index(), false);

        let (stream, _) = match listener.accept() {
            Ok(pair) => pair,
            Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                thread::sleep(Duration::from_millis(50));
                continue;
            }
            Err(e) => {
                warn!("ingest[{}]: accept error: {e}", sensor.name());
                continue;
            }
        };

        mailbox.set_connected(sensor.index(), true);
        info!("ingest[{}]: accepted connection", sensor.name());
        if let Some(d) = &diagnostics {
            d.record(sensor.name(), DiagEventKind::Accepted);
        }

        if let Err(e) = serve_connection(sensor, stream, &mailbox, &accel_tx, &gyro_tx, &shutdown) {
            warn!("ingest[{}]: connection reset: {e}", sensor.name());
            if let Some(d) = &diagnostics {
                let kind = match e {
                    RelayError::SameFrameExceeded { .. } => DiagEventKind::FrameRejected,
                    _ => DiagEventKind::Reconnected,
                };
                d.record(sensor.name(), kind);
            }
        }
    }
}

fn serve_connection(
    sensor: SensorId,
    mut stream: TcpStream,
    mailbox: &SensorMailbox,
    accel_tx: &PipeWriter<Vec<u8>>,
    gyro_tx: &PipeWriter<Vec<u8>>,
    shutdown: &AtomicBool,
) -> Result<()> {
    let read_size = sensor.frame_size() * sensor.batch_factor();
    let mut last_readings: Option<Vec<u8>> = None;
    let mut same_r_num: u32 = 0;

    while !shutdown.load(Ordering::Relaxed) {
        let mut buf = vec![0u8; read_size];
        match stream.read_exact(&mut buf) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                return Err(RelayError::ConnectionClosed);
            }
            Err(e) => return Err(RelayError::Io(e)),
        }

        if is_locked_marker(&buf) {
            // I4: locked marker is dropped silently; same-frame counter untouched.
            continue;
        }

        if last_readings.as_deref() == Some(buf.as_slice()) {
            same_r_num += 1;
            if same_r_num == MAX_SAME_READING_TOLERANCE {
                return Err(RelayError::SameFrameExceeded { count: same_r_num });
            }
        } else {
            same_r_num = 0;
        }
        last_readings = Some(buf.clone());

        if sensor.is_batched() {
            let tx = if sensor == SensorId::Accelerometer { accel_tx } else { gyro_tx };
            for chunk in buf.chunks(sensor.frame_size()) {
                tx.write(chunk.to_vec());
            }
        } else {
            let reading = parse(sensor, &buf)?;
            let event = crate::domain::SensorEvent {
                sensor,
                reading,
                timestamp_ns: monotonic_ns(),
            };
            mailbox.publish(sensor.index(), event);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::net::TcpListener;

    use super::*;
    use crate::domain::{Reading, BATCH_FACTOR};
    use crate::framing::encode;
    use crate::pipe::pipe;

    #[test]
    fn batched_read_hands_every_frame_to_the_pipe_individually() {
        let sensor = SensorId::Accelerometer;
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();

        let client = thread::spawn(move || {
            let mut stream = TcpStream::connect(addr).unwrap();
            let mut batch = Vec::with_capacity(sensor.frame_size() * BATCH_FACTOR);
            for i in 0..BATCH_FACTOR {
                let frame = encode(sensor, &Reading::Triplet([i as f64, 0.0, 0.0]));
                batch.extend_from_slice(&frame);
            }
            std::io::Write::write_all(&mut stream, &batch).unwrap();
            // Dropping the stream closes the connection, so the single
            // `serve_connection` call below sees EOF after this one batch.
        });

        let (stream, _) = listener.accept().unwrap();
        let mailbox = SensorMailbox::new();
        let (accel_tx, accel_rx) = pipe::<Vec<u8>>();
        let (gyro_tx, _gyro_rx) = pipe::<Vec<u8>>();
        let shutdown = AtomicBool::new(false);

        let _ = serve_connection(sensor, stream, &mailbox, &accel_tx, &gyro_tx, &shutdown);

        for i in 0..BATCH_FACTOR {
            let item = accel_rx
                .read_one(Duration::from_millis(100))
                .unwrap_or_else(|| panic!("missing frame {i} of the batch"));
            let reading = parse(sensor, &item).unwrap();
            assert_eq!(reading, Reading::Triplet([i as f64, 0.0, 0.0]));
        }

        client.join().unwrap();
    }
}

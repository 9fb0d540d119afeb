//! Pull-client: connects to the source at `(source_ip, source_port)`, then
//! to the local forwarded port, and pumps frames between them until either
//! side fails, reconnecting after a 1s sleep.

use std::io::{Read, Write};
use std::net::TcpStream;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use log::{info, warn};

use crate::config::read_source_ip;
use crate::domain::SensorId;

const RECONNECT_DELAY: Duration = Duration::from_secs(1);
const PUMP_DELAY: Duration = Duration::from_millis(1);

pub fn run(sensor: SensorId, conf_path: PathBuf, source_port: u16, shutdown: Arc<AtomicBool>) {
    let local_port = sensor.consumer_port();

    while !shutdown.load(Ordering::Relaxed) {
        let source_ip = read_source_ip(&conf_path);

        let source = match TcpStream::connect((source_ip.as_str(), source_port)) {
            Ok(s) => s,
            Err(e) => {
                warn!(
                    "relay[{}]: failed to connect to source {source_ip}:{source_port}: {e}, retrying in 1s",
                    sensor.name()
                );
                thread::sleep(RECONNECT_DELAY);
                continue;
            }
        };

        let forwarded = match TcpStream::connect(("127.0.0.1", local_port)) {
            Ok(s) => s,
            Err(e) => {
                warn!(
                    "relay[{}]: failed to connect to forwarded port {local_port}: {e}, retrying in 1s",
                    sensor.name()
                );
                thread::sleep(RECONNECT_DELAY);
                continue;
            }
        };

        info!("relay[{}]: pumping {source_ip}:{source_port} -> 127.0.0.1:{local_port}", sensor.name());
        pump(sensor, source, forwarded, &shutdown);

        thread::sleep(RECONNECT_DELAY);
    }
}

fn pump(sensor: SensorId, mut source: TcpStream, mut forwarded: TcpStream, shutdown: &AtomicBool) {
    let frame_size = sensor.frame_size() * sensor.batch_factor();
    let mut buf = vec![0u8; frame_size];

    while !shutdown.load(Ordering::Relaxed) {
        match source.read_exact(&mut buf) {
            Ok(()) => {}
            Err(e) => {
                warn!("relay[{}]: read from source failed: {e}", sensor.name());
                return;
            }
        }

        if buf.first().copied().unwrap_or(0) != 0 {
            if let Err(e) = forwarded.write_all(&buf) {
                warn!("relay[{}]: write to forwarded socket failed: {e}", sensor.name());
                return;
            }
        }

        thread::sleep(PUMP_DELAY);
    }
}

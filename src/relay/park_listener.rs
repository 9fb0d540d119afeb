//! Park-listener: accepts one client on the forwarded port then blocks
//! forever, keeping the port-forwarding mapping alive. `EADDRINUSE` on bind
//! is expected (the mapping may have pre-claimed the port) and is silently
//! tolerated rather than treated as an error.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use log::{error, info, warn};

use crate::domain::SensorId;
use crate::net::bind_tolerating_in_use;

pub fn run(sensor: SensorId, shutdown: Arc<AtomicBool>) {
    let port = sensor.consumer_port();

    let listener = match bind_tolerating_in_use(port) {
        Ok(Some(listener)) => listener,
        Ok(None) => {
            info!("park[{}]: port {port} already claimed by forwarding mapping, parking without a local listener", sensor.name());
            park_forever(&shutdown);
            return;
        }
        Err(e) => {
            error!("park[{}]: fatal bind error on port {port}: {e}", sensor.name());
            return;
        }
    };

    listener
        .set_nonblocking(true)
        .expect("failed to set listener non-blocking");

    while !shutdown.load(Ordering::Relaxed) {
        match listener.accept() {
            Ok((_stream, _addr)) => {
                info!("park[{}]: accepted, now parking", sensor.name());
                park_forever(&shutdown);
                return;
            }
            Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                thread::sleep(Duration::from_millis(100));
            }
            Err(e) => {
                warn!("park[{}]: accept error: {e}", sensor.name());
                thread::sleep(Duration::from_secs(1));
            }
        }
    }
}

fn park_forever(shutdown: &AtomicBool) {
    while !shutdown.load(Ordering::Relaxed) {
        thread::sleep(Duration::from_secs(1));
    }
}

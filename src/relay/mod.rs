//! Component B: the relay pair (pull-client + park-listener) per sensor.

mod park_listener;
mod pull_client;

use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::thread;

use clap::ValueEnum;

use crate::config::{DEVICE_CONF_FILE, REMOTE_SERVER_CONF_FILE};
use crate::domain::{ALL_SENSORS, CONSUMER_BASE_PORT, PRODUCER_BASE_PORT};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RelayMode {
    Device,
    RemoteServer,
}

impl RelayMode {
    fn conf_file(self) -> &'static str {
        match self {
            RelayMode::Device => DEVICE_CONF_FILE,
            RelayMode::RemoteServer => REMOTE_SERVER_CONF_FILE,
        }
    }

    /// The source-side port the pull-client connects to for sensor index `i`.
    /// Resolved open question (SPEC_FULL.md §9): device mode talks to the
    /// paired device at `5000+i`; remote-server mode talks to the synthetic
    /// producer at `5010+i`.
    fn source_port(self, index: usize) -> u16 {
        match self {
            RelayMode::Device => CONSUMER_BASE_PORT + index as u16,
            RelayMode::RemoteServer => PRODUCER_BASE_PORT + index as u16,
        }
    }
}

/// Runs both the ten park-listeners and the ten pull-clients, blocking until
/// every pull-client thread exits (normally only on shutdown).
pub fn run_relay(mode: RelayMode, config_dir: PathBuf, shutdown: Arc<AtomicBool>) {
    let park_handles: Vec<_> = ALL_SENSORS
        .iter()
        .copied()
        .map(|sensor| {
            let shutdown = shutdown.clone();
            thread::Builder::new()
                .name(format!("park-{}", sensor.name()))
                .spawn(move || park_listener::run(sensor, shutdown))
                .expect("failed to spawn park-listener thread")
        })
        .collect();

    let conf_path = config_dir.join(mode.conf_file());

    let pull_handles: Vec<_> = ALL_SENSORS
        .iter()
        .copied()
        .map(|sensor| {
            let shutdown = shutdown.clone();
            let conf_path = conf_path.clone();
            let source_port = mode.source_port(sensor.index());
            thread::Builder::new()
                .name(format!("pull-{}", sensor.name()))
                .spawn(move || pull_client::run(sensor, conf_path, source_port, shutdown))
                .expect("failed to spawn pull-client thread")
        })
        .collect();

    for handle in pull_handles {
        let _ = handle.join();
    }
    for handle in park_handles {
        let _ = handle.join();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::SensorId;

    #[test]
    fn device_mode_targets_the_paired_device_port() {
        let sensor = SensorId::Orientation;
        assert_eq!(RelayMode::Device.source_port(sensor.index()), sensor.consumer_port());
    }

    #[test]
    fn remote_server_mode_targets_the_synthetic_producer_port() {
        let sensor = SensorId::Orientation;
        assert_eq!(RelayMode::RemoteServer.source_port(sensor.index()), sensor.producer_port());
    }
}

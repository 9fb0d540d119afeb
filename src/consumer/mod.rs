//! Component C: the in-guest consumer — ten ingest servers plus the
//! polled-event interface the host OS sensor subsystem drives.

mod ingest;
mod poll_event;

use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::thread;

use log::info;

use crate::diagnostics::Diagnostics;
use crate::domain::ALL_SENSORS;
use crate::mailbox::SensorMailbox;
use crate::pipe::pipe;

pub use poll_event::poll;

/// Spawns the ten ingest threads and a background poll loop that drives the
/// polled-event interface continuously (standing in for the host OS driver
/// calling it), logging each harvested batch. Blocks until every ingest
/// thread exits (normally only on shutdown).
pub fn run_consumer(
    poll_delay: std::time::Duration,
    diagnostics: Option<Diagnostics>,
    shutdown: Arc<AtomicBool>,
) {
    let mailbox = Arc::new(SensorMailbox::new());
    let (accel_tx, accel_rx) = pipe::<Vec<u8>>();
    let (gyro_tx, gyro_rx) = pipe::<Vec<u8>>();

    let poll_state = poll_event::PollState {
        mailbox: mailbox.clone(),
        accel_rx,
        gyro_rx,
    };

    let poll_shutdown = shutdown.clone();
    let poll_handle = thread::Builder::new()
        .name("consumer-poll".into())
        .spawn(move || {
            while !poll_shutdown.load(std::sync::atomic::Ordering::Relaxed) {
                let events = poll(&poll_state, poll_delay);
                if !events.is_empty() {
                    info!("consumer: poll harvested {} event(s)", events.len());
                }
            }
        })
        .expect("failed to spawn consumer poll thread");

    let ingest_handles: Vec<_> = ALL_SENSORS
        .iter()
        .copied()
        .map(|sensor| {
            let mailbox = mailbox.clone();
            let shutdown = shutdown.clone();
            let accel_tx = accel_tx.clone();
            let gyro_tx = gyro_tx.clone();
            let diagnostics = diagnostics.clone();
            thread::Builder::new()
                .name(format!("ingest-{}", sensor.name()))
                .spawn(move || ingest::run(sensor, mailbox, accel_tx, gyro_tx, diagnostics, shutdown))
                .expect("failed to spawn ingest thread")
        })
        .collect();

    for handle in ingest_handles {
        let _ = handle.join();
    }
    let _ = poll_handle.join();
}

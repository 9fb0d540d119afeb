//! Component D: in-guest per-sensor aggregators — the driver bridge that
//! sits between the native sensor driver and the consumer's ingest servers
//! on the device side, coalescing per-axis driver samples into full frames.

mod bridge;

pub use bridge::{AggregatorHandle, AxisSample};

use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::thread;

/// Sensors whose underlying driver reports one axis per event and therefore
/// need axis coalescing, per SPEC_FULL.md §4.D. Light and Proximity are
/// scalar and report complete readings directly, so they're excluded here.
const AGGREGATED_SENSORS: [crate::domain::SensorId; 8] = [
    crate::domain::SensorId::Accelerometer,
    crate::domain::SensorId::Magnetic,
    crate::domain::SensorId::Gyroscope,
    crate::domain::SensorId::Orientation,
    crate::domain::SensorId::CorrectedGyroscope,
    crate::domain::SensorId::Gravity,
    crate::domain::SensorId::LinearAcceleration,
    crate::domain::SensorId::RotationVector,
];

/// Spawns one aggregator thread per axis-coalescing sensor and returns a
/// handle per sensor so the driver-event path can submit axis samples.
/// Blocks until every aggregator thread exits (normally only on shutdown).
pub fn run_aggregators(shutdown: Arc<AtomicBool>) -> Vec<AggregatorHandle> {
    let mut handles = Vec::new();

    for sensor in AGGREGATED_SENSORS {
        let (handle, worker) = bridge::Aggregator::new(sensor);
        handles.push(handle);

        let shutdown = shutdown.clone();
        thread::Builder::new()
            .name(format!("aggregator-{}", sensor.name()))
            .spawn(move || worker.run(shutdown))
            .expect("failed to spawn aggregator thread");
    }

    handles
}

//! Per-sensor candidate-reading generator: `(rand() % bound) * gravity * sign`,
//! matching the formula table in SPEC_FULL.md §4.A for every sensor shape.

use rand::rngs::StdRng;
use rand::Rng;

use crate::domain::{Reading, SensorId, EARTH_GRAVITY};

/// One signed, optionally gravity-scaled sample in `[-(bound-1), bound-1]`,
/// matching the original's `rand() % bound`.
fn sample_axis(rng: &mut StdRng, sensor: SensorId) -> f64 {
    let bound = sensor.range_bound();
    let magnitude = rng.random_range(0..bound) as f64;
    let sign = if rng.random_bool(0.5) { 1.0 } else { -1.0 };
    let value = magnitude * sign;
    if sensor.scaled_by_gravity() {
        value * EARTH_GRAVITY
    } else {
        value
    }
}

/// Scalar sensors (Light, Proximity) carry no sign in the formula table.
fn sample_scalar(rng: &mut StdRng, sensor: SensorId) -> f64 {
    rng.random_range(0..sensor.range_bound()) as f64
}

pub fn generate(rng: &mut StdRng, sensor: SensorId) -> Reading {
    match sensor {
        SensorId::Light | SensorId::Proximity => Reading::Scalar(sample_scalar(rng, sensor)),
        SensorId::Orientation => Reading::TripletStatus(
            [
                sample_axis(rng, sensor),
                sample_axis(rng, sensor),
                sample_axis(rng, sensor),
            ],
            3,
        ),
        SensorId::RotationVector => Reading::Quad([
            sample_axis(rng, sensor),
            sample_axis(rng, sensor),
            sample_axis(rng, sensor),
            sample_axis(rng, sensor),
        ]),
        _ => Reading::Triplet([
            sample_axis(rng, sensor),
            sample_axis(rng, sensor),
            sample_axis(rng, sensor),
        ]),
    }
}

//! Fixed sensor catalogue: identifiers, framing parameters, and reading shapes.
//!
//! Mirrors the original implementation's `enum sensors` index order exactly —
//! the index doubles as the port offset on both the producer (5010+i) and
//! consumer (5000+i) sides, so reordering these variants is a wire-breaking change.

pub const NUM_SENSORS: usize = 10;
pub const CONSUMER_BASE_PORT: u16 = 5000;
pub const PRODUCER_BASE_PORT: u16 = 5010;
pub const BATCH_FACTOR: usize = 40;
pub const MAX_SAME_READING_TOLERANCE: u32 = 4;
pub const EARTH_GRAVITY: f64 = 9.80665;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum SensorId {
    Accelerometer = 0,
    Magnetic = 1,
    Light = 2,
    Proximity = 3,
    Gyroscope = 4,
    Orientation = 5,
    CorrectedGyroscope = 6,
    Gravity = 7,
    LinearAcceleration = 8,
    RotationVector = 9,
}

pub const ALL_SENSORS: [SensorId; NUM_SENSORS] = [
    SensorId::Accelerometer,
    SensorId::Magnetic,
    SensorId::Light,
    SensorId::Proximity,
    SensorId::Gyroscope,
    SensorId::Orientation,
    SensorId::CorrectedGyroscope,
    SensorId::Gravity,
    SensorId::LinearAcceleration,
    SensorId::RotationVector,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Scalar,
    Triplet,
    TripletStatus,
    Quad,
}

impl SensorId {
    pub const fn index(self) -> usize {
        self as u8 as usize
    }

    pub fn from_index(i: usize) -> Option<Self> {
        ALL_SENSORS.get(i).copied()
    }

    pub const fn name(self) -> &'static str {
        match self {
            SensorId::Accelerometer => "accelerometer",
            SensorId::Magnetic => "magnetic",
            SensorId::Light => "light",
            SensorId::Proximity => "proximity",
            SensorId::Gyroscope => "gyroscope",
            SensorId::Orientation => "orientation",
            SensorId::CorrectedGyroscope => "corrected_gyroscope",
            SensorId::Gravity => "gravity",
            SensorId::LinearAcceleration => "linear_acceleration",
            SensorId::RotationVector => "rotation_vector",
        }
    }

    pub const fn arity(self) -> Arity {
        match self {
            SensorId::Light | SensorId::Proximity => Arity::Scalar,
            SensorId::Orientation => Arity::TripletStatus,
            SensorId::RotationVector => Arity::Quad,
            _ => Arity::Triplet,
        }
    }

    /// Frame size in bytes: 50 for the two batched high-rate sensors, 100 otherwise.
    pub const fn frame_size(self) -> usize {
        match self {
            SensorId::Accelerometer | SensorId::Gyroscope => 50,
            _ => 100,
        }
    }

    pub const fn is_batched(self) -> bool {
        matches!(self, SensorId::Accelerometer | SensorId::Gyroscope)
    }

    pub const fn batch_factor(self) -> usize {
        if self.is_batched() { BATCH_FACTOR } else { 1 }
    }

    pub const fn consumer_port(self) -> u16 {
        CONSUMER_BASE_PORT + self.index() as u16
    }

    pub const fn producer_port(self) -> u16 {
        PRODUCER_BASE_PORT + self.index() as u16
    }

    /// Per-axis bound used by the synthetic producer's PRNG, in units of `EARTH_GRAVITY`
    /// except for Light/Proximity, which are unitless counts.
    pub const fn range_bound(self) -> i32 {
        match self {
            SensorId::Accelerometer => 3,
            SensorId::Magnetic => 300,
            SensorId::Light => 200,
            SensorId::Proximity => 5,
            SensorId::Gyroscope => 10,
            SensorId::Orientation => 10,
            SensorId::CorrectedGyroscope => 20,
            SensorId::Gravity => 10,
            SensorId::LinearAcceleration => 10,
            SensorId::RotationVector => 20,
        }
    }

    /// Whether producer values for this sensor are scaled by `EARTH_GRAVITY`.
    pub const fn scaled_by_gravity(self) -> bool {
        !matches!(self, SensorId::Light | SensorId::Proximity)
    }

    /// High-precision (`%.9f`) vs default (`%f`, 6 decimals) producer formatting.
    pub const fn high_precision(self) -> bool {
        matches!(self, SensorId::Accelerometer | SensorId::Gyroscope)
    }
}

/// Nanoseconds elapsed since process start, using `Instant` so the value is
/// guaranteed monotonic-nondecreasing (I5) regardless of wall-clock adjustments.
pub fn monotonic_ns() -> i64 {
    use std::sync::OnceLock;
    use std::time::Instant;

    static START: OnceLock<Instant> = OnceLock::new();
    let start = *START.get_or_init(Instant::now);
    start.elapsed().as_nanos() as i64
}

/// A parsed, typed sensor reading plus the ingest-assigned timestamp.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensorEvent {
    pub sensor: SensorId,
    pub reading: Reading,
    pub timestamp_ns: i64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Reading {
    Scalar(f64),
    Triplet([f64; 3]),
    TripletStatus([f64; 3], u8),
    Quad([f64; 4]),
}

impl Reading {
    pub fn as_slice(&self) -> Vec<f64> {
        match self {
            Reading::Scalar(v) => vec![*v],
            Reading::Triplet(v) => v.to_vec(),
            Reading::TripletStatus(v, _) => v.to_vec(),
            Reading::Quad(v) => v.to_vec(),
        }
    }
}

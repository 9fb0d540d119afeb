//! Wire framing: fixed-size, NUL-padded, `'|'`-joined ASCII float records.
//!
//! A frame is never length-prefixed or delimited — its size is implied by
//! the sensor (`SensorId::frame_size`). Encoding mirrors the original's
//! `sprintf`/`%f`/`%.9f` formatting closely enough that a byte-for-byte
//! comparison against captured reference frames would match.

use crate::domain::{Reading, SensorId};
use crate::errors::{RelayError, Result};

/// Formats `reading` into a NUL-padded buffer of exactly `sensor.frame_size()` bytes.
///
/// Panics if the formatted text (before padding) would not fit — this can only
/// happen for pathological float values and indicates a producer bug, not a
/// runtime condition callers need to recover from.
pub fn encode(sensor: SensorId, reading: &Reading) -> Vec<u8> {
    let precision = if sensor.high_precision() { 9 } else { 6 };
    let text = match reading {
        Reading::Scalar(v) => format!("{:.*}", precision, v),
        Reading::Triplet(v) => format!(
            "{:.*}|{:.*}|{:.*}",
            precision, v[0], precision, v[1], precision, v[2]
        ),
        Reading::TripletStatus(v, status) => format!(
            "{:.*}|{:.*}|{:.*}|{}",
            precision, v[0], precision, v[1], precision, v[2], status
        ),
        Reading::Quad(v) => format!(
            "{:.*}|{:.*}|{:.*}|{:.*}",
            precision, v[0], precision, v[1], precision, v[2], precision, v[3]
        ),
    };

    let size = sensor.frame_size();
    let bytes = text.into_bytes();
    assert!(bytes.len() <= size, "formatted frame exceeds frame_size for {sensor:?}");

    let mut buf = vec![0u8; size];
    buf[..bytes.len()].copy_from_slice(&bytes);
    buf
}

/// First byte NUL marks "device locked / no data right now" (I4).
pub fn is_locked_marker(frame: &[u8]) -> bool {
    frame.first().copied().unwrap_or(0) == 0
}

/// Parses a single frame into a typed `Reading` according to the sensor's arity.
pub fn parse(sensor: SensorId, frame: &[u8]) -> Result<Reading> {
    let text = ascii_text(frame)?;
    let fields: Vec<&str> = text.split('|').collect();

    match sensor.arity() {
        crate::domain::Arity::Scalar => {
            let v = parse_field(fields.first())?;
            Ok(Reading::Scalar(v))
        }
        crate::domain::Arity::Triplet => {
            require_fields(&fields, 3)?;
            Ok(Reading::Triplet([
                parse_field(fields.first())?,
                parse_field(fields.get(1))?,
                parse_field(fields.get(2))?,
            ]))
        }
        crate::domain::Arity::TripletStatus => {
            require_fields(&fields, 4)?;
            let status: u8 = fields[3]
                .trim()
                .parse()
                .map_err(|_| RelayError::MalformedFrame(format!("bad status field: {}", fields[3])))?;
            Ok(Reading::TripletStatus(
                [
                    parse_field(fields.first())?,
                    parse_field(fields.get(1))?,
                    parse_field(fields.get(2))?,
                ],
                status,
            ))
        }
        crate::domain::Arity::Quad => {
            require_fields(&fields, 4)?;
            Ok(Reading::Quad([
                parse_field(fields.first())?,
                parse_field(fields.get(1))?,
                parse_field(fields.get(2))?,
                parse_field(fields.get(3))?,
            ]))
        }
    }
}

fn require_fields(fields: &[&str], n: usize) -> Result<()> {
    if fields.len() < n {
        return Err(RelayError::MalformedFrame(format!(
            "expected {n} fields, got {}",
            fields.len()
        )));
    }
    Ok(())
}

fn parse_field(field: Option<&&str>) -> Result<f64> {
    field
        .ok_or_else(|| RelayError::MalformedFrame("missing field".into()))?
        .trim()
        .parse::<f64>()
        .map_err(|e| RelayError::MalformedFrame(format!("bad float field: {e}")))
}

/// Strips trailing NUL padding and validates the remainder is ASCII.
fn ascii_text(frame: &[u8]) -> Result<&str> {
    let end = frame.iter().position(|&b| b == 0).unwrap_or(frame.len());
    std::str::from_utf8(&frame[..end])
        .map_err(|e| RelayError::MalformedFrame(format!("non-utf8 frame: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_light() {
        let frame = encode(SensorId::Light, &Reading::Scalar(137.0));
        assert_eq!(frame.len(), 100);
        assert!(!is_locked_marker(&frame));
        let reading = parse(SensorId::Light, &frame).unwrap();
        assert_eq!(reading, Reading::Scalar(137.0));
    }

    #[test]
    fn round_trip_orientation_with_status() {
        let frame_text = b"12.5|-7.25|180.0|3";
        let mut frame = vec![0u8; 100];
        frame[..frame_text.len()].copy_from_slice(frame_text);
        let reading = parse(SensorId::Orientation, &frame).unwrap();
        assert_eq!(reading, Reading::TripletStatus([12.5, -7.25, 180.0], 3));
    }

    #[test]
    fn locked_marker_detected() {
        let frame = vec![0u8; 100];
        assert!(is_locked_marker(&frame));
    }

    #[test]
    fn accelerometer_frame_is_50_bytes() {
        let frame = encode(SensorId::Accelerometer, &Reading::Triplet([1.0, 2.0, 3.0]));
        assert_eq!(frame.len(), 50);
    }

    #[test]
    fn malformed_field_errors_without_panicking() {
        let mut frame = vec![0u8; 100];
        frame[..3].copy_from_slice(b"abc");
        assert!(parse(SensorId::Light, &frame).is_err());
    }
}

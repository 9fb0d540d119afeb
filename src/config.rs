//! Config-file parsing: source IP conf files and the poll-delay conf file.
//!
//! Both formats are intentionally permissive — a missing or malformed file
//! falls back to a documented default rather than aborting the process
//! (SPEC_FULL.md §9, the resolved "malformed config" open question). Conf
//! files are operator-editable side files, not part of the wire contract.

use std::path::Path;
use std::time::Duration;

use log::warn;

pub const DEFAULT_SOURCE_IP: &str = "127.0.0.1";
pub const DEFAULT_POLL_DELAY_US: u64 = 1000;

pub const DEVICE_CONF_FILE: &str = "dev_ip_port.conf";
pub const REMOTE_SERVER_CONF_FILE: &str = "remote_server_ip_port.conf";
pub const POLL_DELAY_CONF_FILE: &str = "poll_delay.conf";

/// Reads the first whitespace-delimited token of `path` as a source IP.
/// Any I/O or parse failure silently yields [`DEFAULT_SOURCE_IP`]; only the
/// first token is ever consumed — a second (port) token, if present, is
/// ignored, matching the original relay client's single-`fscanf` behavior.
pub fn read_source_ip(path: &Path) -> String {
    match std::fs::read_to_string(path) {
        Ok(contents) => contents
            .split_whitespace()
            .next()
            .map(|s| s.to_string())
            .unwrap_or_else(|| {
                warn!("{} is empty, falling back to {}", path.display(), DEFAULT_SOURCE_IP);
                DEFAULT_SOURCE_IP.to_string()
            }),
        Err(e) => {
            warn!(
                "failed to read {}: {e}; falling back to {}",
                path.display(),
                DEFAULT_SOURCE_IP
            );
            DEFAULT_SOURCE_IP.to_string()
        }
    }
}

/// Reads a positive microsecond delay from `path`. Falls back to
/// [`DEFAULT_POLL_DELAY_US`] on any I/O error, parse failure, or non-positive value.
pub fn read_poll_delay(path: &Path) -> Duration {
    let micros = std::fs::read_to_string(path)
        .ok()
        .and_then(|s| s.trim().split_whitespace().next().map(str::to_string))
        .and_then(|tok| tok.parse::<i64>().ok())
        .filter(|v| *v > 0)
        .unwrap_or_else(|| {
            warn!(
                "{} missing or invalid, using default poll delay of {DEFAULT_POLL_DELAY_US}us",
                path.display()
            );
            DEFAULT_POLL_DELAY_US as i64
        });

    Duration::from_micros(micros as u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn reads_ip_ignoring_second_token() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dev_ip_port.conf");
        std::fs::File::create(&path).unwrap().write_all(b"10.0.2.2 5000\n").unwrap();
        assert_eq!(read_source_ip(&path), "10.0.2.2");
    }

    #[test]
    fn missing_ip_file_falls_back_to_default() {
        let path = Path::new("/nonexistent/dev_ip_port.conf");
        assert_eq!(read_source_ip(path), DEFAULT_SOURCE_IP);
    }

    #[test]
    fn reads_valid_poll_delay() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("poll_delay.conf");
        std::fs::File::create(&path).unwrap().write_all(b"2500").unwrap();
        assert_eq!(read_poll_delay(&path), Duration::from_micros(2500));
    }

    #[test]
    fn invalid_poll_delay_falls_back_to_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("poll_delay.conf");
        std::fs::File::create(&path).unwrap().write_all(b"-5").unwrap();
        assert_eq!(read_poll_delay(&path), Duration::from_micros(DEFAULT_POLL_DELAY_US));
    }
}

//! Optional per-sensor diagnostic recorder: an off-the-wire-contract CSV
//! trail of accept/reconnect/frame-reject events, in the same spirit as
//! this codebase's sensor/actuator event logging — a bounded lock-free
//! queue drained by one background consumer thread, batched and flushed
//! periodically. Disabled unless `--diagnostics` is passed; never on the
//! hot path of any sensor pipeline.

use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crossbeam_queue::ArrayQueue;
use csv::Writer;
use log::error;
use serde::Serialize;

const QUEUE_CAPACITY: usize = 4096;
const FLUSH_BATCHES: usize = 8;
const CONSUMER_POLL: Duration = Duration::from_millis(5);

#[derive(Debug, Clone, Copy)]
pub enum DiagEventKind {
    Accepted,
    Reconnected,
    FrameRejected,
    LockedMarkerSkipped,
}

impl DiagEventKind {
    fn as_str(self) -> &'static str {
        match self {
            DiagEventKind::Accepted => "accepted",
            DiagEventKind::Reconnected => "reconnected",
            DiagEventKind::FrameRejected => "frame_rejected",
            DiagEventKind::LockedMarkerSkipped => "locked_marker_skipped",
        }
    }
}

#[derive(Debug, Clone)]
struct RawDiagEvent {
    sensor: &'static str,
    kind: DiagEventKind,
    ts_epoch_us: u64,
}

#[derive(Serialize)]
struct CsvRow {
    sensor: &'static str,
    event: &'static str,
    ts_epoch_us: u64,
}

/// Lock-free per-process diagnostic sink. Cloning shares the same queue.
#[derive(Clone)]
pub struct Diagnostics {
    queue: Arc<ArrayQueue<RawDiagEvent>>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self { queue: Arc::new(ArrayQueue::new(QUEUE_CAPACITY)) }
    }

    pub fn record(&self, sensor: &'static str, kind: DiagEventKind) {
        let event = RawDiagEvent {
            sensor,
            kind,
            ts_epoch_us: now_epoch_us(),
        };
        // Non-blocking: drop the event on a full queue rather than stall the caller.
        let _ = self.queue.push(event);
    }

    /// Spawns the background CSV exporter; returns immediately.
    pub fn start_exporter(&self, output_csv: PathBuf, shutdown: Arc<AtomicBool>) {
        let queue = self.queue.clone();

        thread::Builder::new()
            .name("diagnostics-exporter".into())
            .spawn(move || {
                let file = match File::create(&output_csv) {
                    Ok(f) => f,
                    Err(e) => {
                        error!("diagnostics: failed to create {}: {e}", output_csv.display());
                        return;
                    }
                };
                let mut writer = Writer::from_writer(BufWriter::new(file));
                let mut batches_since_flush = 0usize;

                while !shutdown.load(Ordering::Relaxed) {
                    let mut drained_any = false;
                    for _ in 0..256 {
                        match queue.pop() {
                            Some(raw) => {
                                drained_any = true;
                                let _ = writer.serialize(CsvRow {
                                    sensor: raw.sensor,
                                    event: raw.kind.as_str(),
                                    ts_epoch_us: raw.ts_epoch_us,
                                });
                            }
                            None => break,
                        }
                    }

                    if drained_any {
                        batches_since_flush += 1;
                        if batches_since_flush >= FLUSH_BATCHES {
                            let _ = writer.flush();
                            batches_since_flush = 0;
                        }
                    } else {
                        thread::sleep(CONSUMER_POLL);
                    }
                }

                while let Some(raw) = queue.pop() {
                    let _ = writer.serialize(CsvRow {
                        sensor: raw.sensor,
                        event: raw.kind.as_str(),
                        ts_epoch_us: raw.ts_epoch_us,
                    });
                }
                let _ = writer.flush();
            })
            .expect("failed to spawn diagnostics exporter thread");
    }
}

impl Default for Diagnostics {
    fn default() -> Self {
        Self::new()
    }
}

fn now_epoch_us() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_micros() as u64)
        .unwrap_or(0)
}

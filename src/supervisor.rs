//! Supervisor / lifecycle: installs the shutdown signal handler and hands
//! back a shared flag every worker thread polls at its suspension points
//! (SPEC_FULL.md §4.E, §5 "Cancellation").

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use log::info;

/// Installs a Ctrl-C / SIGTERM handler that flips the returned flag once.
/// Worker loops check this flag at every suspension point and unwind to
/// their thread's top-level `join`, giving an orderly shutdown with exit
/// code 0 — there's no longjmp-style recovery path to replicate in Rust,
/// since a second Ctrl-C during shutdown just terminates the process.
pub fn install_shutdown_handler() -> Arc<AtomicBool> {
    let shutdown = Arc::new(AtomicBool::new(false));
    let flag = shutdown.clone();

    ctrlc::set_handler(move || {
        info!("shutdown signal received, stopping workers");
        flag.store(true, Ordering::Relaxed);
    })
    .expect("failed to install signal handler");

    shutdown
}

//! Error taxonomy for the relay fabric.
//!
//! Kept deliberately flat: every fallible operation in a per-sensor worker
//! loop maps to one of these variants, and the loop itself decides whether
//! the variant is "reset the connection and continue" or "fatal to this
//! component" per the policy in SPEC_FULL.md §7.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RelayError {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("frame size mismatch: expected {expected} bytes, got {actual}")]
    FrameSizeMismatch { expected: usize, actual: usize },

    #[error("same frame repeated {count} times, resetting connection")]
    SameFrameExceeded { count: u32 },

    #[error("malformed frame: {0}")]
    MalformedFrame(String),

    #[error("peer closed connection")]
    ConnectionClosed,

    #[error("config error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, RelayError>;

impl RelayError {
    /// Transient errors are handled by resetting the connection and looping
    /// back to accept/reconnect; everything else is fatal to the calling worker.
    pub fn is_transient(&self) -> bool {
        !matches!(self, RelayError::Config(_))
    }
}

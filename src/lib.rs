//! Library surface for the relay fabric, split out from the binary so
//! integration tests under `tests/` can drive individual roles directly
//! instead of shelling out to the compiled binary.

pub mod aggregator;
pub mod cli;
pub mod config;
pub mod consumer;
pub mod diagnostics;
pub mod domain;
pub mod errors;
pub mod framing;
pub mod mailbox;
pub mod net;
pub mod pipe;
pub mod producer;
pub mod relay;
pub mod supervisor;

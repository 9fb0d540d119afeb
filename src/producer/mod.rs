//! Component A: the synthetic producer (remote-server role).
//!
//! Ten cooperating TCP servers, one per sensor, each bound to
//! `0.0.0.0:(5010+i)`, generating randomized readings per SPEC_FULL.md §4.A.

mod generator;
mod server;

pub use server::run_producer;

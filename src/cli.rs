//! Runtime role/mode selector, replacing the original's compile-time flag
//! (SPEC_FULL.md §6, §9).

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::relay::RelayMode;

#[derive(Parser, Debug)]
#[command(name = "telemetry-relay", about = "Multi-sensor telemetry relay fabric")]
pub struct Cli {
    #[command(subcommand)]
    pub role: Role,

    /// Directory containing dev_ip_port.conf / remote_server_ip_port.conf / poll_delay.conf.
    #[arg(long, global = true, default_value = ".")]
    pub config_dir: PathBuf,

    /// Enable the optional per-sensor diagnostic CSV trail (off the wire contract).
    #[arg(long, global = true)]
    pub diagnostics: bool,
}

#[derive(Subcommand, Debug)]
pub enum Role {
    /// Run the ten synthetic per-sensor generator servers (ports 5010-5019).
    Producer,
    /// Run the ten relay pairs (pull-client + park-listener) for one source mode.
    Relay {
        #[arg(long, value_enum)]
        mode: RelayMode,
    },
    /// Run the ten ingest servers plus the polled-event interface (ports 5000-5009).
    Consumer,
    /// Run the per-sensor driver-bridge aggregators feeding the consumer.
    Aggregator,
}

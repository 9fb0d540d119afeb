//! Entry point: parses the role/mode CLI, wires up logging, shutdown
//! handling, and the optional diagnostics sink, then dispatches to the
//! selected component's run loop.

use clap::Parser;
use log::info;

use telemetry_relay_fabric::diagnostics::Diagnostics;
use telemetry_relay_fabric::cli::{Cli, Role};
use telemetry_relay_fabric::{aggregator, config, consumer, producer, relay, supervisor};

fn main() {
    env_logger::init();

    let cli = Cli::parse();
    let shutdown = supervisor::install_shutdown_handler();

    let diagnostics = if cli.diagnostics {
        let sink = Diagnostics::new();
        let output = cli.config_dir.join(format!("{}.diagnostics.csv", role_name(&cli.role)));
        sink.start_exporter(output.clone(), shutdown.clone());
        info!("diagnostics enabled, writing to {}", output.display());
        Some(sink)
    } else {
        None
    };

    match cli.role {
        Role::Producer => {
            info!("starting producer role");
            producer::run_producer(shutdown);
        }
        Role::Relay { mode } => {
            info!("starting relay role in {mode:?} mode");
            relay::run_relay(mode, cli.config_dir, shutdown);
        }
        Role::Consumer => {
            let poll_delay_path = cli.config_dir.join(config::POLL_DELAY_CONF_FILE);
            let poll_delay = config::read_poll_delay(&poll_delay_path);
            info!("starting consumer role with poll delay {poll_delay:?}");
            consumer::run_consumer(poll_delay, diagnostics, shutdown);
        }
        Role::Aggregator => {
            info!("starting aggregator role");
            let handles = aggregator::run_aggregators(shutdown.clone());
            // Keeps the submission endpoints alive for the lifetime of the
            // process; the aggregator threads themselves own the run loop.
            std::mem::drop(handles);
            while !shutdown.load(std::sync::atomic::Ordering::Relaxed) {
                std::thread::sleep(std::time::Duration::from_millis(100));
            }
        }
    }
}

fn role_name(role: &Role) -> &'static str {
    match role {
        Role::Producer => "producer",
        Role::Relay { .. } => "relay",
        Role::Consumer => "consumer",
        Role::Aggregator => "aggregator",
    }
}

//! ## grindvakt-cli
//! **Daemon entrypoint**
//!
//! Merges the flag surface over the layered configuration, installs the
//! logger, and hands control to the engine. Fatal startup errors exit
//! non-zero after logging; a signal-triggered shutdown exits zero from
//! the engine's own teardown path.

use clap::Parser;
use tracing::{error, info};
use validator::Validate;

use grindvakt_config::GrindvaktConfig;
use grindvakt_engine::Daemon;
use grindvakt_telemetry::EventLogger;

mod args;

use args::Args;

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let mut config = match GrindvaktConfig::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("grindvakt: {e}");
            std::process::exit(1);
        }
    };
    args.apply(&mut config);
    if let Err(e) = config.validate() {
        eprintln!("grindvakt: invalid configuration: {e}");
        std::process::exit(1);
    }

    if let Err(e) = EventLogger::init(config.daemon.debug, config.daemon.log_file.as_deref()) {
        eprintln!("grindvakt: cannot open log file: {e}");
        std::process::exit(1);
    }

    info!(version = env!("CARGO_PKG_VERSION"), "starting grindvakt");

    let daemon = match Daemon::new(config) {
        Ok(daemon) => daemon,
        Err(e) => {
            error!(error = %e, "startup failed");
            std::process::exit(1);
        }
    };

    if let Err(e) = daemon.run().await {
        error!(error = %e, "daemon failed");
        std::process::exit(1);
    }
}

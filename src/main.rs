//! port-beacon
//!
//! Binds one or more TCP ports and answers every connection with a single
//! line naming the local address and port it reached, then closes it.
//!
//! ```text
//!                 ┌──────────────────────────────────────────────┐
//!  -p 9001 9002   │  Supervisor                                  │
//!  ──────────────▶│    ├─ Listener :9001 ─┬─ handler (greet, close)
//!                 │    │                  └─ handler ...         │
//!                 │    └─ Listener :9002 ─── handler ...         │
//!                 │                                              │
//!                 │  ConnectionLog ◀── one line per accept       │
//!                 │    (stdout + optional append-only file)      │
//!                 │                                              │
//!                 │  Shutdown latch ◀── SIGINT/SIGTERM, quit key │
//!                 └──────────────────────────────────────────────┘
//! ```

use std::process::ExitCode;
use std::sync::Arc;

use clap::error::ErrorKind;
use clap::Parser;

use port_beacon::config::{Args, BeaconConfig};
use port_beacon::lifecycle::startup::{open_connection_log, StartupError};
use port_beacon::lifecycle::{keyboard, signals, Shutdown, ShutdownReport, Supervisor};
use port_beacon::observability::logging;

#[tokio::main]
async fn main() -> ExitCode {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            let _ = e.print();
            return match e.kind() {
                ErrorKind::DisplayVersion => ExitCode::SUCCESS,
                _ => ExitCode::FAILURE,
            };
        }
    };

    let config = match args.into_config() {
        Ok(config) => config,
        Err(e) => return fail(StartupError::from(e)),
    };

    logging::init(&config.log.level);
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        ports = ?config.listener.ports,
        bind_address = %config.listener.bind_address,
        "port-beacon starting"
    );

    match run(config).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => fail(e),
    }
}

async fn run(config: BeaconConfig) -> Result<ShutdownReport, StartupError> {
    let log = Arc::new(open_connection_log(&config.log)?);

    let shutdown = Shutdown::new();
    let _signals = signals::install(shutdown.clone()).map_err(StartupError::Signals)?;

    let supervisor = Supervisor::start(&config, log, shutdown)?;

    let mut quit = keyboard::detector(config.shutdown.quit_key);
    Ok(supervisor.run(quit.as_mut()).await)
}

fn fail(e: StartupError) -> ExitCode {
    eprintln!("error: {e}");
    ExitCode::FAILURE
}

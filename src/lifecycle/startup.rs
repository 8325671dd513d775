//! Startup orchestration.
//!
//! # Responsibilities
//! - Open the connection log (file optional, append mode)
//! - Bind one listener per configured port
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - All ports are bound before any accept loop starts, so a failure on one
//!   port means no port ever accepts

use std::io;

use thiserror::Error;

use crate::config::{ConfigError, ListenerConfig, LogConfig};
use crate::net::listener::{Listener, ListenerError};
use crate::observability::connection_log::{open_log_file, ConnectionLog, LogError};

/// Conditions that abort the process before it serves anything.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Log(#[from] LogError),

    #[error(transparent)]
    Listener(#[from] ListenerError),

    #[error("cannot install signal handlers: {0}")]
    Signals(#[source] io::Error),
}

/// Build the stdout connection log, adding the file destination when configured.
pub fn open_connection_log(config: &LogConfig) -> Result<ConnectionLog, StartupError> {
    let file = match &config.file {
        Some(path) => {
            let file = open_log_file(path)?;
            tracing::info!(path = %path.display(), "Logging connections to file");
            Some(file)
        }
        None => None,
    };
    Ok(ConnectionLog::stdout(file))
}

/// Bind every configured port, in order. Stops at the first failure; sockets
/// bound so far are closed when the partial list is dropped.
pub fn bind_listeners(config: &ListenerConfig) -> Result<Vec<Listener>, StartupError> {
    config
        .ports
        .iter()
        .map(|&port| Listener::bind(config.bind_address, port, config.backlog))
        .collect::<Result<Vec<_>, _>>()
        .map_err(StartupError::from)
}

//! Per-connection handler.
//!
//! Sends one greeting line naming the local address the peer reached, then
//! closes. Nothing is read from the peer and no error leaves this module.

use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use chrono::{DateTime, Local};
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;

use crate::net::connection::ConnectionGuard;
use crate::observability::connection_log::TIMESTAMP_FORMAT;

/// Upper bound for writing the greeting and shutting the socket down.
pub const HANDLER_TIMEOUT: Duration = Duration::from_secs(5);

/// The line sent to every peer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Greeting {
    pub local_ip: IpAddr,
    pub port: u16,
    pub timestamp: DateTime<Local>,
}

impl Greeting {
    pub fn now(local_ip: IpAddr, port: u16) -> Self {
        Self {
            local_ip,
            port,
            timestamp: Local::now(),
        }
    }
}

impl fmt::Display for Greeting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Connection established with {} on port {} at {}",
            self.local_ip,
            self.port,
            self.timestamp.format(TIMESTAMP_FORMAT)
        )
    }
}

/// Serve one accepted connection. Always ends with the socket closed.
pub async fn handle_connection(stream: TcpStream, peer: SocketAddr, port: u16) {
    if tokio::time::timeout(HANDLER_TIMEOUT, greet_and_close(stream, peer, port))
        .await
        .is_err()
    {
        tracing::trace!(peer = %peer, port, "Greeting timed out, dropping connection");
    }
}

/// Spawn [`handle_connection`] as a detached task holding `guard` until it ends.
pub fn spawn_handler(stream: TcpStream, peer: SocketAddr, port: u16, guard: ConnectionGuard) {
    // The join handle is dropped on purpose; nobody waits for handlers.
    drop(tokio::spawn(async move {
        handle_connection(stream, peer, port).await;
        drop(guard);
    }));
}

async fn greet_and_close(mut stream: TcpStream, peer: SocketAddr, port: u16) {
    match stream.local_addr() {
        Ok(local) => {
            let greeting = Greeting::now(local.ip(), port).to_string();
            if let Err(e) = stream.write_all(greeting.as_bytes()).await {
                tracing::trace!(peer = %peer, port, error = %e, "Greeting not delivered");
            }
        }
        Err(e) => {
            tracing::trace!(peer = %peer, port, error = %e, "Local address unavailable");
        }
    }

    let _ = stream.shutdown().await;
}

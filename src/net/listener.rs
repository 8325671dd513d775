//! TCP listener and accept loop.
//!
//! # Responsibilities
//! - Create, bind and listen with an explicit backlog
//! - Accept connections, log each one, hand it to a detached handler
//! - Stop accepting once the shutdown latch trips
//!
//! # States
//! ```text
//! Created (bound, listening) → Listening (accept loop) → Draining (latch seen) → Closed (socket dropped)
//! ```

use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::net::{TcpListener, TcpSocket};

use crate::lifecycle::shutdown::Shutdown;
use crate::net::connection::ConnectionTracker;
use crate::net::handler::spawn_handler;
use crate::observability::connection_log::ConnectionLog;

/// Pause after a failed accept so a persistent error (e.g. fd exhaustion)
/// does not spin the loop.
const ACCEPT_ERROR_BACKOFF: Duration = Duration::from_millis(100);

/// Error type for listener setup. Every variant is fatal at startup.
#[derive(Debug, Error)]
pub enum ListenerError {
    #[error("Error creating socket for port {port}: {source}")]
    Socket {
        port: u16,
        #[source]
        source: std::io::Error,
    },

    #[error("Binding failed for port {port}: {source}")]
    Bind {
        port: u16,
        #[source]
        source: std::io::Error,
    },

    #[error("Listen failed for port {port}: {source}")]
    Listen {
        port: u16,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot read local address for port {port}: {source}")]
    LocalAddr {
        port: u16,
        #[source]
        source: std::io::Error,
    },
}

/// Shared state every accept loop needs.
#[derive(Clone)]
pub struct ListenerContext {
    pub log: Arc<ConnectionLog>,
    pub shutdown: Shutdown,
    pub tracker: ConnectionTracker,
}

/// One bound, listening socket for one port.
#[derive(Debug)]
pub struct Listener {
    inner: TcpListener,
    local_addr: SocketAddr,
}

impl Listener {
    /// Bind `address:port` and start listening with `backlog`.
    ///
    /// Port 0 asks the OS for an ephemeral port; [`Listener::port`] reports
    /// the one assigned.
    pub fn bind(address: IpAddr, port: u16, backlog: u32) -> Result<Self, ListenerError> {
        let addr = SocketAddr::new(address, port);
        let socket = match address {
            IpAddr::V4(_) => TcpSocket::new_v4(),
            IpAddr::V6(_) => TcpSocket::new_v6(),
        }
        .map_err(|source| ListenerError::Socket { port, source })?;

        socket
            .bind(addr)
            .map_err(|source| ListenerError::Bind { port, source })?;

        let inner = socket
            .listen(backlog)
            .map_err(|source| ListenerError::Listen { port, source })?;

        let local_addr = inner
            .local_addr()
            .map_err(|source| ListenerError::LocalAddr { port, source })?;

        tracing::info!(address = %local_addr, backlog, "Listener bound");

        Ok(Self { inner, local_addr })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn port(&self) -> u16 {
        self.local_addr.port()
    }

    /// Run the accept loop until the shutdown latch trips, then close the
    /// socket. Returns the number of connections accepted.
    ///
    /// Handlers are spawned and never awaited; the loop goes straight back
    /// to accepting.
    pub async fn run(self, ctx: ListenerContext) -> u64 {
        let port = self.port();
        let mut accepted = 0u64;

        let wake = ctx.shutdown.wait();
        tokio::pin!(wake);

        loop {
            if ctx.shutdown.is_triggered() {
                break;
            }

            tokio::select! {
                biased;

                _ = &mut wake => break,

                res = self.inner.accept() => match res {
                    Ok((stream, peer)) => {
                        accepted += 1;
                        let guard = ctx.tracker.track();
                        tracing::debug!(
                            connection_id = %guard.id(),
                            peer = %peer,
                            port,
                            "Connection accepted"
                        );

                        ctx.log.record(peer.ip(), port);
                        spawn_handler(stream, peer, port, guard);
                    }
                    Err(e) => {
                        if ctx.shutdown.is_triggered() {
                            break;
                        }
                        tracing::warn!(port, error = %e, "Accept failed for port {port}");
                        tokio::time::sleep(ACCEPT_ERROR_BACKOFF).await;
                    }
                },
            }
        }

        drop(self.inner);
        tracing::info!(port, accepted, "Listener closed");
        accepted
    }
}

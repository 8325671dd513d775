//! Supervisor: starts one accept loop per port, waits for a termination
//! trigger, then closes listeners and the log file.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::config::BeaconConfig;
use crate::lifecycle::keyboard::QuitDetector;
use crate::lifecycle::shutdown::{Shutdown, ShutdownCause};
use crate::lifecycle::startup::{bind_listeners, StartupError};
use crate::net::connection::ConnectionTracker;
use crate::net::listener::ListenerContext;
use crate::observability::connection_log::ConnectionLog;

/// Outcome of a completed shutdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShutdownReport {
    pub cause: ShutdownCause,
    /// Connections accepted across all ports.
    pub accepted: u64,
    /// Handlers still running when the log file was closed.
    pub in_flight: u64,
}

pub struct Supervisor {
    listeners: Vec<(u16, JoinHandle<u64>)>,
    local_addrs: Vec<SocketAddr>,
    ctx: ListenerContext,
    poll_interval: Duration,
    drain_timeout: Option<Duration>,
}

impl Supervisor {
    /// Bind every port, then start their accept loops.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn start(
        config: &BeaconConfig,
        log: Arc<ConnectionLog>,
        shutdown: Shutdown,
    ) -> Result<Self, StartupError> {
        let bound = bind_listeners(&config.listener)?;

        let ctx = ListenerContext {
            log,
            shutdown,
            tracker: ConnectionTracker::new(),
        };

        let mut listeners = Vec::with_capacity(bound.len());
        let mut local_addrs = Vec::with_capacity(bound.len());
        for listener in bound {
            let port = listener.port();
            local_addrs.push(listener.local_addr());
            ctx.log.announce(&format!("Server is listening on port {port}"));
            listeners.push((port, tokio::spawn(listener.run(ctx.clone()))));
        }

        Ok(Self {
            listeners,
            local_addrs,
            ctx,
            poll_interval: config.shutdown.poll_interval(),
            drain_timeout: config.shutdown.drain_timeout(),
        })
    }

    /// Addresses actually bound, in configuration order.
    pub fn local_addrs(&self) -> &[SocketAddr] {
        &self.local_addrs
    }

    pub fn shutdown_handle(&self) -> Shutdown {
        self.ctx.shutdown.clone()
    }

    /// Block until the latch trips, polling `quit` once per interval.
    pub async fn wait(&self, quit: &mut dyn QuitDetector) -> ShutdownCause {
        let shutdown = &self.ctx.shutdown;
        let mut ticker = tokio::time::interval(self.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut keys_enabled = true;

        while !shutdown.is_triggered() {
            tokio::select! {
                _ = shutdown.wait() => {}
                _ = ticker.tick(), if keys_enabled => match quit.quit_requested() {
                    Ok(true) => {
                        shutdown.trigger(ShutdownCause::QuitKey);
                    }
                    Ok(false) => {}
                    Err(e) => {
                        tracing::warn!(error = %e, "Quit key polling failed, disabling it");
                        keys_enabled = false;
                    }
                },
            }
        }

        shutdown.cause().unwrap_or(ShutdownCause::Requested)
    }

    /// Trip the latch if needed, close every listening socket, optionally
    /// drain in-flight handlers, then close the log file.
    pub async fn stop(self) -> ShutdownReport {
        let shutdown = self.ctx.shutdown.clone();
        shutdown.trigger(ShutdownCause::Requested);

        let mut accepted = 0;
        for (port, handle) in self.listeners {
            match handle.await {
                Ok(count) => accepted += count,
                Err(e) => tracing::error!(port, error = %e, "Listener task failed"),
            }
        }

        if let Some(timeout) = self.drain_timeout {
            if self.ctx.tracker.drain(timeout).await {
                tracing::info!("All in-flight connections drained");
            } else {
                tracing::warn!(
                    in_flight = self.ctx.tracker.active_count(),
                    timeout_secs = timeout.as_secs(),
                    "Drain timed out"
                );
            }
        }

        let in_flight = self.ctx.tracker.active_count();
        self.ctx.log.close_file();

        let report = ShutdownReport {
            cause: shutdown.cause().unwrap_or(ShutdownCause::Requested),
            accepted,
            in_flight,
        };
        tracing::info!(
            cause = %report.cause,
            accepted = report.accepted,
            in_flight = report.in_flight,
            "Shutdown complete"
        );
        report
    }

    /// Wait for a termination trigger, then stop.
    pub async fn run(self, quit: &mut dyn QuitDetector) -> ShutdownReport {
        self.wait(quit).await;
        self.stop().await
    }
}

//! OS signal handling.
//!
//! # Responsibilities
//! - Register signal handlers (SIGINT everywhere, SIGTERM on unix)
//! - Translate signals into a [`ShutdownCause`] and trip the latch
//!
//! # Design Decisions
//! - Uses Tokio's signal handling (async-safe)
//! - Handlers are registered eagerly so a signal arriving before the first
//!   poll is not lost

use tokio::task::JoinHandle;

use crate::lifecycle::shutdown::{Shutdown, ShutdownCause};

/// Register the handlers and spawn a task that trips `shutdown` on the first signal.
#[cfg(unix)]
pub fn install(shutdown: Shutdown) -> std::io::Result<JoinHandle<()>> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut interrupt = signal(SignalKind::interrupt())?;
    let mut terminate = signal(SignalKind::terminate())?;

    Ok(tokio::spawn(async move {
        let cause = tokio::select! {
            _ = interrupt.recv() => ShutdownCause::Interrupt,
            _ = terminate.recv() => ShutdownCause::Terminate,
            _ = shutdown.wait() => return,
        };
        tracing::info!(cause = %cause, "Signal received");
        shutdown.trigger(cause);
    }))
}

#[cfg(not(unix))]
pub fn install(shutdown: Shutdown) -> std::io::Result<JoinHandle<()>> {
    Ok(tokio::spawn(async move {
        tokio::select! {
            res = tokio::signal::ctrl_c() => match res {
                Ok(()) => {
                    tracing::info!("Signal received");
                    shutdown.trigger(ShutdownCause::Interrupt);
                }
                Err(e) => tracing::error!(error = %e, "Failed to listen for Ctrl-C"),
            },
            _ = shutdown.wait() => {}
        }
    }))
}

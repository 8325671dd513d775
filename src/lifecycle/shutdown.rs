//! Shutdown coordination.
//!
//! `Shutdown` is a one-way latch: it starts open, is tripped exactly once by
//! whichever trigger fires first, and never resets. Long-running tasks hold a
//! clone and either check [`Shutdown::is_triggered`] or await
//! [`Shutdown::wait`].

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

use tokio::sync::broadcast;

/// What tripped the latch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownCause {
    /// SIGINT / Ctrl-C.
    Interrupt,
    /// SIGTERM.
    Terminate,
    /// A key was pressed on the controlling terminal.
    QuitKey,
    /// Requested programmatically (e.g. the supervisor stopping itself).
    Requested,
}

impl fmt::Display for ShutdownCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ShutdownCause::Interrupt => "interrupt signal",
            ShutdownCause::Terminate => "terminate signal",
            ShutdownCause::QuitKey => "quit key",
            ShutdownCause::Requested => "shutdown request",
        };
        f.write_str(name)
    }
}

struct Inner {
    triggered: AtomicBool,
    cause: OnceLock<ShutdownCause>,
    /// Wakes tasks blocked in `wait`.
    tx: broadcast::Sender<()>,
}

/// Process-wide shutdown latch, shared by cloning.
#[derive(Clone)]
pub struct Shutdown {
    inner: Arc<Inner>,
}

impl Shutdown {
    /// Create a new, untriggered latch.
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self {
            inner: Arc::new(Inner {
                triggered: AtomicBool::new(false),
                cause: OnceLock::new(),
                tx,
            }),
        }
    }

    /// Trip the latch. Returns `true` only for the call that tripped it.
    pub fn trigger(&self, cause: ShutdownCause) -> bool {
        if self
            .inner
            .triggered
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return false;
        }

        let _ = self.inner.cause.set(cause);
        tracing::info!(cause = %cause, "Shutdown triggered");
        let _ = self.inner.tx.send(());
        true
    }

    pub fn is_triggered(&self) -> bool {
        self.inner.triggered.load(Ordering::SeqCst)
    }

    /// The cause recorded by the winning trigger, if any.
    pub fn cause(&self) -> Option<ShutdownCause> {
        self.inner.cause.get().copied()
    }

    /// Resolve once the latch is tripped. Returns immediately if it already is.
    pub async fn wait(&self) {
        // Subscribe before checking the flag so a concurrent trigger cannot slip between.
        let mut rx = self.inner.tx.subscribe();
        if self.is_triggered() {
            return;
        }
        let _ = rx.recv().await;
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Shutdown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Shutdown")
            .field("triggered", &self.is_triggered())
            .field("cause", &self.cause())
            .finish()
    }
}

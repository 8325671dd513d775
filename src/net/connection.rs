//! Connection identity and in-flight tracking.
//!
//! # Responsibilities
//! - Generate unique connection IDs for tracing
//! - Count handlers still running so shutdown can optionally drain them

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

static NEXT_CONNECTION_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique id attached to a handler's trace events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(u64);

impl ConnectionId {
    fn next() -> Self {
        Self(NEXT_CONNECTION_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// Counts handlers in flight.
///
/// Handlers are still fire-and-forget: nobody awaits their join handles.
/// The count only lets shutdown wait for them when a drain timeout is set.
#[derive(Debug, Clone, Default)]
pub struct ConnectionTracker {
    active_count: Arc<AtomicU64>,
}

impl ConnectionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one more handler until the returned guard is dropped.
    pub fn track(&self) -> ConnectionGuard {
        self.active_count.fetch_add(1, Ordering::SeqCst);
        ConnectionGuard {
            id: ConnectionId::next(),
            tracker: self.clone(),
        }
    }

    /// Get current in-flight handler count.
    pub fn active_count(&self) -> u64 {
        self.active_count.load(Ordering::SeqCst)
    }

    /// Wait until every handler has finished or `timeout` elapses.
    /// Returns `true` if the count reached zero.
    pub async fn drain(&self, timeout: Duration) -> bool {
        let idle = async {
            while self.active_count() > 0 {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        };
        tokio::time::timeout(timeout, idle).await.is_ok()
    }
}

/// Held by a handler for as long as it runs.
#[derive(Debug)]
pub struct ConnectionGuard {
    id: ConnectionId,
    tracker: ConnectionTracker,
}

impl ConnectionGuard {
    pub fn id(&self) -> ConnectionId {
        self.id
    }
}

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        let remaining = self.tracker.active_count.fetch_sub(1, Ordering::SeqCst) - 1;
        tracing::trace!(connection_id = %self.id, remaining, "Handler finished");
    }
}

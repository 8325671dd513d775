//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Listeners (one per port)
//!     → connection_log.rs (event line: stdout + optional append-only file)
//!
//! All subsystems
//!     → logging.rs (tracing diagnostics on stderr)
//! ```
//!
//! # Design Decisions
//! - stdout is reserved for connection events and listening announcements
//! - Diagnostics never go through the connection log lock

pub mod connection_log;
pub mod logging;

pub use connection_log::{ConnectionLog, LogEntry, LogError};

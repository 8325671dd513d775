//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming TCP connection on any bound port
//!     → listener.rs (accept loop, one per port)
//!     → connection log line (stdout + optional file)
//!     → handler.rs (detached task: greet, close)
//!
//! Listener States:
//!     Created → Listening → Draining → Closed
//! ```
//!
//! # Design Decisions
//! - Unbounded fire-and-forget handlers; connections are instantaneous
//! - Each handler tracked only so shutdown can optionally drain

pub mod connection;
pub mod handler;
pub mod listener;

pub use listener::{Listener, ListenerContext, ListenerError};

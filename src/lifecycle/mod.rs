//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Validated config → Open log → Bind every port → Start accept loops
//!
//! Wait (supervisor.rs):
//!     Poll quit key once per interval ─┐
//!     SIGINT/SIGTERM (signals.rs) ─────┴→ trip Shutdown latch (shutdown.rs)
//!
//! Shutdown (supervisor.rs):
//!     Latch tripped → Listeners stop and close → Optional drain → Close log file
//! ```
//!
//! # Design Decisions
//! - Fail fast: any startup error aborts before a single accept
//! - The latch is one-way; first trigger wins
//! - The log file closes last; later log calls reach the console only

pub mod keyboard;
pub mod shutdown;
pub mod signals;
pub mod startup;
pub mod supervisor;

pub use shutdown::{Shutdown, ShutdownCause};
pub use supervisor::{ShutdownReport, Supervisor};

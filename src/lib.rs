//! Multi-port TCP beacon library.

pub mod config;
pub mod lifecycle;
pub mod net;
pub mod observability;

pub use config::BeaconConfig;
pub use lifecycle::{Shutdown, Supervisor};
pub use observability::ConnectionLog;

//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! command line (clap)          optional TOML file
//!     → args.rs ─────────────→ loader.rs (parse & deserialize)
//!     → overrides applied over file values / defaults
//!     → duplicate ports collapsed
//!     → validation.rs (semantic checks)
//!     → BeaconConfig (validated, immutable)
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde, clap) from semantic checks

pub mod args;
pub mod loader;
pub mod schema;
pub mod validation;

pub use args::Args;
pub use loader::ConfigError;
pub use schema::{BeaconConfig, ListenerConfig, LogConfig, ShutdownConfig};

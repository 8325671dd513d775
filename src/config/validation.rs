//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde and clap handle syntax)
//! - Validate value ranges (ports, backlog, poll interval)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: BeaconConfig → Result<(), Vec<ValidationError>>
//! - Runs before any socket is created

use thiserror::Error;

use crate::config::schema::BeaconConfig;

/// A single semantic problem with a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("at least one port is required")]
    NoPorts,

    #[error("port 0 is not a valid listening port")]
    ZeroPort,

    #[error("backlog must be greater than zero")]
    ZeroBacklog,

    #[error("poll interval must be greater than zero")]
    ZeroPollInterval,
}

pub fn validate_config(config: &BeaconConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.ports.is_empty() {
        errors.push(ValidationError::NoPorts);
    }
    if config.listener.ports.contains(&0) {
        errors.push(ValidationError::ZeroPort);
    }
    if config.listener.backlog == 0 {
        errors.push(ValidationError::ZeroBacklog);
    }
    if config.shutdown.poll_interval_ms == 0 {
        errors.push(ValidationError::ZeroPollInterval);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

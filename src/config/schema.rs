//! Configuration schema definitions.
//!
//! All types derive Serde traits so the same structure can be read from a
//! TOML file and then overridden from the command line.

use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Root configuration for the beacon.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct BeaconConfig {
    /// Ports, bind address and backlog.
    pub listener: ListenerConfig,

    /// Connection log destinations and diagnostic level.
    pub log: LogConfig,

    /// Shutdown triggers and drain policy.
    pub shutdown: ShutdownConfig,
}

impl BeaconConfig {
    /// Collapse duplicate ports, keeping the first occurrence of each.
    pub fn dedup_ports(&mut self) {
        let mut seen = Vec::with_capacity(self.listener.ports.len());
        self.listener.ports.retain(|port| {
            if seen.contains(port) {
                false
            } else {
                seen.push(*port);
                true
            }
        });
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ListenerConfig {
    /// Ports to listen on, one listener per port.
    pub ports: Vec<u16>,

    /// Address every listener binds to.
    pub bind_address: IpAddr,

    /// Pending connection queue depth per listening socket.
    pub backlog: u32,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            ports: Vec::new(),
            bind_address: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            backlog: 10,
        }
    }
}

/// Connection log configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct LogConfig {
    /// Append connection events to this file as well as stdout.
    pub file: Option<PathBuf>,

    /// Diagnostic level used when `RUST_LOG` is unset.
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            file: None,
            level: "info".to_string(),
        }
    }
}

/// Shutdown configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ShutdownConfig {
    /// How often the supervisor polls for the quit key, in milliseconds.
    pub poll_interval_ms: u64,

    /// Wait this long for in-flight handlers before closing the log.
    /// `None` abandons them.
    pub drain_timeout_secs: Option<u64>,

    /// Watch the terminal for a key press.
    pub quit_key: bool,
}

impl ShutdownConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn drain_timeout(&self) -> Option<Duration> {
        self.drain_timeout_secs.map(Duration::from_secs)
    }
}

impl Default for ShutdownConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 1000,
            drain_timeout_secs: None,
            quit_key: true,
        }
    }
}

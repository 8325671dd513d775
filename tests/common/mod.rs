//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::io::{self, Write};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::Path;
use std::sync::{Arc, Mutex};

use port_beacon::config::BeaconConfig;
use port_beacon::lifecycle::keyboard::QuitDetector;
use port_beacon::observability::connection_log::open_log_file;
use port_beacon::{ConnectionLog, Shutdown, Supervisor};
use tokio::io::AsyncReadExt;
use tokio::net::TcpStream;

/// In-memory console that can be read back after the fact.
#[derive(Clone, Default)]
pub struct Capture(Arc<Mutex<Vec<u8>>>);

impl Write for Capture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Capture {
    pub fn text(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }

    /// Console lines that are connection events.
    pub fn connection_lines(&self) -> Vec<String> {
        self.text()
            .lines()
            .filter(|line| line.starts_with('['))
            .map(str::to_string)
            .collect()
    }
}

/// Requests a quit after a fixed number of polls.
pub struct ScriptedQuit {
    pub polls_left: usize,
    pub polls_seen: usize,
}

impl ScriptedQuit {
    pub fn after(polls: usize) -> Self {
        Self {
            polls_left: polls,
            polls_seen: 0,
        }
    }
}

impl QuitDetector for ScriptedQuit {
    fn quit_requested(&mut self) -> io::Result<bool> {
        self.polls_seen += 1;
        if self.polls_left == 0 {
            return Ok(true);
        }
        self.polls_left -= 1;
        Ok(false)
    }
}

/// Fails every poll, like a terminal that went away.
#[derive(Default)]
pub struct BrokenTerminal {
    pub polls_seen: usize,
}

impl QuitDetector for BrokenTerminal {
    fn quit_requested(&mut self) -> io::Result<bool> {
        self.polls_seen += 1;
        Err(io::Error::new(io::ErrorKind::Other, "terminal unavailable"))
    }
}

/// Config for `count` ephemeral ports on localhost with a fast poll interval.
pub fn localhost_config(count: usize) -> BeaconConfig {
    let mut config = BeaconConfig::default();
    config.listener.ports = vec![0; count];
    config.listener.bind_address = IpAddr::V4(Ipv4Addr::LOCALHOST);
    config.shutdown.poll_interval_ms = 20;
    config
}

/// Start a supervisor logging to a capture and, optionally, a file.
pub fn start(
    config: &BeaconConfig,
    log_file: Option<&Path>,
) -> (Supervisor, Capture, Arc<ConnectionLog>) {
    let console = Capture::default();
    let file = log_file.map(|path| open_log_file(path).unwrap());
    let log = Arc::new(ConnectionLog::new(console.clone(), file));
    let supervisor = Supervisor::start(config, Arc::clone(&log), Shutdown::new()).unwrap();
    (supervisor, console, log)
}

/// Connect and read everything the server sends until it closes.
pub async fn read_greeting(addr: SocketAddr) -> String {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    let mut received = String::new();
    stream.read_to_string(&mut received).await.unwrap();
    received
}

//! Exit codes and end-to-end behaviour of the binary.

use std::io::{BufRead, BufReader, Read};
use std::net::TcpStream;
use std::process::{Command, Output, Stdio};

fn beacon() -> Command {
    Command::new(env!("CARGO_BIN_EXE_port-beacon"))
}

fn run(args: &[&str]) -> Output {
    beacon()
        .args(args)
        .stdin(Stdio::null())
        .output()
        .expect("binary should start")
}

/// A port that was free a moment ago.
fn free_port() -> u16 {
    std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port()
}

#[test]
fn no_arguments_prints_usage_and_fails() {
    let output = run(&[]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Usage"));
}

#[test]
fn ports_flag_without_ports_fails() {
    let output = run(&["-p"]);
    assert_eq!(output.status.code(), Some(1));

    let output = run(&["-p", "-f", "out.log"]);
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn help_exits_with_failure_status() {
    let output = run(&["-h"]);
    assert_eq!(output.status.code(), Some(1));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Usage"));
    assert!(stdout.contains("--ports"));
    assert!(stdout.contains("--log-file"));
}

#[test]
fn unopenable_log_file_fails() {
    let port = free_port().to_string();
    let output = run(&["-p", &port, "-f", "/nonexistent/dir/out.log"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("cannot open log file"));
}

#[test]
fn busy_port_fails_before_serving() {
    let busy = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = busy.local_addr().unwrap().port().to_string();

    let output = run(&["--bind", "127.0.0.1", "-p", &port]);
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains(&format!("Binding failed for port {port}")), "{stderr}");
}

#[cfg(unix)]
#[test]
fn interrupt_shuts_down_cleanly() {
    let dir = tempfile::tempdir().unwrap();
    let log_path = dir.path().join("out.log");
    let port = free_port();

    let mut child = beacon()
        .args(["--bind", "127.0.0.1", "-p", &port.to_string(), "-f"])
        .arg(&log_path)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .unwrap();

    let mut stdout = BufReader::new(child.stdout.take().unwrap());
    let mut line = String::new();
    stdout.read_line(&mut line).unwrap();
    assert_eq!(line, format!("Server is listening on port {port}\n"));

    let mut greeting = String::new();
    TcpStream::connect(("127.0.0.1", port))
        .unwrap()
        .read_to_string(&mut greeting)
        .unwrap();
    assert!(greeting.starts_with(&format!("Connection established with 127.0.0.1 on port {port} at ")));

    line.clear();
    stdout.read_line(&mut line).unwrap();
    assert!(line.ends_with(&format!("Connection established with: 127.0.0.1 on port {port}\n")));

    let status = Command::new("kill")
        .args(["-INT", &child.id().to_string()])
        .status()
        .unwrap();
    assert!(status.success());

    assert_eq!(child.wait().unwrap().code(), Some(0));
    assert_eq!(std::fs::read_to_string(&log_path).unwrap().lines().count(), 1);
}

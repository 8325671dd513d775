//! Command line surface.

use std::net::IpAddr;
use std::path::PathBuf;

use clap::Parser;

use crate::config::loader::{finalize_config, load_config, ConfigError};
use crate::config::schema::BeaconConfig;

#[derive(Debug, Parser)]
#[command(name = "port-beacon", version)]
#[command(
    about = "Binds to the given port(s) and answers every TCP connection with a one-line greeting",
    long_about = None
)]
pub struct Args {
    /// Port(s) to listen on
    #[arg(
        short = 'p',
        long = "ports",
        value_name = "PORT",
        num_args = 1..,
        value_parser = clap::value_parser!(u16).range(1..),
        required_unless_present = "config"
    )]
    pub ports: Vec<u16>,

    /// Append connection events to this file
    #[arg(short = 'f', long = "log-file", value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    /// Read defaults from a TOML config file
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Address to bind every listener to
    #[arg(long = "bind", value_name = "IP")]
    pub bind_address: Option<IpAddr>,

    /// Pending connection queue depth per port
    #[arg(long, value_name = "N")]
    pub backlog: Option<u32>,

    /// Wait up to this many seconds for in-flight connections on shutdown
    #[arg(long = "drain-timeout", value_name = "SECS")]
    pub drain_timeout_secs: Option<u64>,

    /// Do not watch the terminal for a quit key
    #[arg(long = "no-quit-key")]
    pub no_quit_key: bool,
}

impl Args {
    /// Merge the arguments over the config file (or defaults) and validate.
    pub fn into_config(self) -> Result<BeaconConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => load_config(path)?,
            None => BeaconConfig::default(),
        };

        if !self.ports.is_empty() {
            config.listener.ports = self.ports;
        }
        if let Some(bind_address) = self.bind_address {
            config.listener.bind_address = bind_address;
        }
        if let Some(backlog) = self.backlog {
            config.listener.backlog = backlog;
        }
        if self.log_file.is_some() {
            config.log.file = self.log_file;
        }
        if self.drain_timeout_secs.is_some() {
            config.shutdown.drain_timeout_secs = self.drain_timeout_secs;
        }
        if self.no_quit_key {
            config.shutdown.quit_key = false;
        }

        finalize_config(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;

    fn parse(args: &[&str]) -> Result<Args, clap::Error> {
        Args::try_parse_from(std::iter::once("port-beacon").chain(args.iter().copied()))
    }

    #[test]
    fn ports_then_log_file() {
        let args = parse(&["-p", "9001", "9002", "-f", "out.log"]).unwrap();
        assert_eq!(args.ports, vec![9001, 9002]);
        assert_eq!(args.log_file, Some(PathBuf::from("out.log")));

        let config = args.into_config().unwrap();
        assert_eq!(config.listener.ports, vec![9001, 9002]);
        assert_eq!(config.log.file, Some(PathBuf::from("out.log")));
    }

    #[test]
    fn missing_ports_is_rejected() {
        let err = parse(&[]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);

        let err = parse(&["-f", "out.log"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn flag_without_ports_is_rejected() {
        assert!(parse(&["-p"]).is_err());
        assert!(parse(&["-p", "-f", "out.log"]).is_err());
    }

    #[test]
    fn out_of_range_ports_are_rejected() {
        assert!(parse(&["-p", "0"]).is_err());
        assert!(parse(&["-p", "65536"]).is_err());
        assert!(parse(&["-p", "http"]).is_err());
        assert!(parse(&["-p", "65535"]).is_ok());
    }

    #[test]
    fn help_is_reported_as_help() {
        let err = parse(&["-h"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DisplayHelp);
    }

    fn config_file() -> tempfile::NamedTempFile {
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[listener]\nports = [9100, 9101]\nbacklog = 5\n\n[log]\nfile = \"a.log\""
        )
        .unwrap();
        file
    }

    #[test]
    fn config_file_alone_supplies_ports() {
        let file = config_file();
        let path = file.path().to_str().unwrap();

        let config = parse(&["-c", path]).unwrap().into_config().unwrap();
        assert_eq!(config.listener.ports, vec![9100, 9101]);
        assert_eq!(config.listener.backlog, 5);
        assert_eq!(config.log.file, Some(PathBuf::from("a.log")));
    }

    #[test]
    fn command_line_wins_over_config_file() {
        let file = config_file();
        let path = file.path().to_str().unwrap();

        let config = parse(&["-c", path, "-p", "9200", "-f", "b.log"])
            .unwrap()
            .into_config()
            .unwrap();
        assert_eq!(config.listener.ports, vec![9200]);
        assert_eq!(config.listener.backlog, 5);
        assert_eq!(config.log.file, Some(PathBuf::from("b.log")));
    }

    #[test]
    fn overrides_and_duplicates() {
        let args = parse(&[
            "-p", "9001", "9001", "9002", "--bind", "127.0.0.1", "--backlog", "32",
            "--drain-timeout", "2", "--no-quit-key",
        ])
        .unwrap();
        let config = args.into_config().unwrap();
        assert_eq!(config.listener.ports, vec![9001, 9002]);
        assert_eq!(config.listener.bind_address.to_string(), "127.0.0.1");
        assert_eq!(config.listener.backlog, 32);
        assert_eq!(config.shutdown.drain_timeout_secs, Some(2));
        assert!(!config.shutdown.quit_key);
    }
}

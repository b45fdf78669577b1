//! Command-line interface definitions.

use clap::{ColorChoice, Parser};
use std::net::IpAddr;
use std::path::PathBuf;

use crate::config::WatchBackend;

/// Stream a growing log file to WebSocket clients
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, disable_version_flag = true)]
pub struct Cli {
    /// File to tail (overrides `watch.path`)
    #[arg(value_hint = clap::ValueHint::FilePath)]
    pub file: Option<PathBuf>,

    /// Control colored output (auto, always, never)
    #[arg(long, default_value = "auto")]
    pub color: ColorChoice,

    /// Config file path (default: search upward for tailcast.toml)
    #[arg(short = 'C', long, value_hint = clap::ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// Network interface to bind (e.g., 127.0.0.1, 0.0.0.0)
    #[arg(short, long)]
    pub interface: Option<IpAddr>,

    /// Port number to listen on
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Request path accepted for the WebSocket upgrade
    #[arg(long = "ws-path", value_name = "PATH")]
    pub ws_path: Option<String>,

    /// Check interval in milliseconds
    #[arg(long, value_name = "MS")]
    pub interval: Option<u64>,

    /// Growth detection backend
    #[arg(short, long, value_enum)]
    pub backend: Option<WatchBackend>,

    /// Send chunks as binary frames instead of text
    #[arg(long)]
    pub binary: bool,

    /// Enable verbose output for debugging
    #[arg(short = 'V', long)]
    pub verbose: bool,

    /// Print version (`-V` is taken by `--verbose`)
    #[arg(long, action = clap::ArgAction::Version)]
    version: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::parse_from(["tailcast"]);
        assert!(cli.file.is_none());
        assert!(cli.config.is_none());
        assert!(!cli.binary);
        assert!(!cli.verbose);
        assert_eq!(cli.color, ColorChoice::Auto);
    }

    #[test]
    fn test_cli_flags() {
        let cli = Cli::parse_from([
            "tailcast",
            "app.log",
            "-i",
            "0.0.0.0",
            "-p",
            "9000",
            "--ws-path",
            "/logs",
            "-b",
            "poll",
            "-V",
        ]);
        assert_eq!(cli.file, Some(PathBuf::from("app.log")));
        assert_eq!(cli.interface, Some("0.0.0.0".parse().unwrap()));
        assert_eq!(cli.port, Some(9000));
        assert_eq!(cli.ws_path.as_deref(), Some("/logs"));
        assert_eq!(cli.backend, Some(WatchBackend::Poll));
        assert!(cli.verbose);
    }

    #[test]
    fn test_version_is_long_only() {
        let err = Cli::try_parse_from(["tailcast", "--version"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayVersion);
    }

    #[test]
    fn test_cli_rejects_unknown_backend() {
        assert!(Cli::try_parse_from(["tailcast", "--backend", "inotify"]).is_err());
    }
}

//! Configuration management for `tailcast.toml`.
//!
//! # Module Structure
//!
//! ```text
//! config/
//! ├── section/       # Configuration section definitions
//! │   ├── broadcast  # [broadcast]
//! │   ├── serve      # [serve]
//! │   └── watch      # [watch]
//! ├── types/         # Utility types
//! │   ├── error      # ConfigError, ConfigDiagnostics
//! │   └── field      # FieldPath
//! └── mod.rs         # Config (this file)
//! ```
//!
//! Values are layered: defaults, then the config file (if any), then CLI flags.

pub mod section;
pub mod types;
mod util;

use util::{find_config_file, resolve_relative};

pub use section::{
    BroadcastConfig, FrameKind, Overflow, RetryPolicy, ServeConfig, WatchBackend,
    WatchConfig,
};
pub use types::{ConfigDiagnostics, ConfigError, FieldPath};

use crate::{cli::Cli, log};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

/// Config file name searched for when `-C` is not given.
pub const CONFIG_FILE: &str = "tailcast.toml";

// ============================================================================
// root configuration
// ============================================================================

/// Root configuration structure representing tailcast.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Absolute path to the config file, if one was loaded (internal use only)
    #[serde(skip)]
    pub config_path: Option<PathBuf>,

    /// Tailed file and growth detection
    pub watch: WatchConfig,

    /// WebSocket listener
    pub serve: ServeConfig,

    /// Fan-out framing and queues
    pub broadcast: BroadcastConfig,
}

impl Config {
    /// Load configuration from CLI arguments.
    ///
    /// Without `-C`, searches upward from cwd for `tailcast.toml` and falls
    /// back to defaults when none exists. An explicit `-C` path must exist.
    pub fn load(cli: &Cli) -> Result<Self> {
        let mut config = match Self::resolve_config_path(cli)? {
            Some(path) => {
                let mut config = Self::from_path(&path)?;
                config.normalize_paths(&path);
                config.config_path = Some(path);
                config
            }
            None => Self::default(),
        };

        config.apply_cli(cli);
        config.validate()?;
        Ok(config)
    }

    fn resolve_config_path(cli: &Cli) -> Result<Option<PathBuf>> {
        match &cli.config {
            Some(path) if path.is_file() => Ok(Some(path.clone())),
            Some(path) => Err(ConfigError::NotFound(path.clone()).into()),
            None => Ok(find_config_file(Path::new(CONFIG_FILE))),
        }
    }

    /// Load configuration from file path with unknown field detection.
    fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;

        let (config, ignored) = Self::parse_with_ignored(&content)?;
        if !ignored.is_empty() {
            Self::print_unknown_fields_warning(&ignored, path);
        }

        Ok(config)
    }

    /// Parse TOML content, collecting any unknown fields.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>)> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })
        .map_err(ConfigError::Toml)?;
        Ok((config, ignored))
    }

    fn print_unknown_fields_warning(fields: &[String], path: &Path) {
        log!("warning"; "unknown fields in {} (ignored): {}", path.display(), fields.join(", "));
    }

    /// Relative file paths in the config file are relative to that file.
    fn normalize_paths(&mut self, config_path: &Path) {
        if let Some(root) = config_path.parent() {
            self.watch.path = resolve_relative(root, &self.watch.path);
        }
    }

    // ========================================================================
    // cli configuration updates
    // ========================================================================

    /// CLI flags override values from the config file.
    fn apply_cli(&mut self, cli: &Cli) {
        crate::logger::set_verbose(cli.verbose);

        if let Some(ref file) = cli.file {
            self.watch.path = file.clone();
        }
        Self::update_option(&mut self.watch.backend, cli.backend.as_ref());
        Self::update_option(&mut self.watch.interval_ms, cli.interval.as_ref());
        Self::update_option(&mut self.serve.interface, cli.interface.as_ref());
        Self::update_option(&mut self.serve.port, cli.port.as_ref());
        Self::update_option(&mut self.serve.path, cli.ws_path.as_ref());
        if cli.binary {
            self.broadcast.frame = FrameKind::Binary;
        }
    }

    #[inline]
    fn update_option<T: Clone>(target: &mut T, value: Option<&T>) {
        if let Some(v) = value {
            *target = v.clone();
        }
    }

    /// Validate all sections, collecting every error before failing.
    pub fn validate(&self) -> Result<()> {
        let mut diag = ConfigDiagnostics::new();

        self.watch.validate(&mut diag);
        self.serve.validate(&mut diag);
        self.broadcast.validate(&mut diag);

        diag.into_result()
            .map_err(|e| ConfigError::Diagnostics(e).into())
    }
}

// ============================================================================
// Test Helpers (available to all modules via `use crate::config::test_*`)
// ============================================================================

/// Parse config from TOML.
/// Panics if there are unknown fields (to catch config typos in tests).
#[cfg(test)]
pub fn test_parse_config(content: &str) -> Config {
    let (parsed, ignored) = Config::parse_with_ignored(content).unwrap();
    assert!(
        ignored.is_empty(),
        "test config has unknown fields: {:?}",
        ignored
    );
    parsed
}

// ============================================================================
// tests
// ============================================================================

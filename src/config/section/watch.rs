//! `[watch]` section configuration.
//!
//! Controls which file is tailed, how growth is detected, and what happens
//! when the file becomes unreadable after startup.
//!
//! # Example
//!
//! ```toml
//! [watch]
//! path = "/var/log/app.log"
//! backend = "notify"          # poll | notify
//! interval_ms = 1000          # poll interval (also the notify fallback tick)
//! on_error = "retry"          # retry | exit
//! retry_attempts = 5
//! retry_backoff_ms = 500
//! ```

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::{ConfigDiagnostics, FieldPath};

/// Upper bound for a single retry sleep.
const MAX_BACKOFF: Duration = Duration::from_secs(30);

/// How file growth is detected.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum WatchBackend {
    /// Stat the file on a fixed interval.
    #[default]
    Poll,
    /// Native filesystem events, with an interval fallback.
    Notify,
}

/// What the watcher does when the file cannot be read after startup.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OnError {
    /// Reopen the path with exponential backoff.
    #[default]
    Retry,
    /// Stop the process on the first failure.
    Exit,
}

/// File watcher settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchConfig {
    /// File to tail.
    pub path: PathBuf,

    /// Growth detection backend.
    pub backend: WatchBackend,

    /// Check interval in milliseconds.
    pub interval_ms: u64,

    /// Failure policy after startup.
    pub on_error: OnError,

    /// Consecutive reopen attempts before giving up.
    pub retry_attempts: u32,

    /// First retry delay in milliseconds, doubled per attempt.
    pub retry_backoff_ms: u64,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("/test.log"),
            backend: WatchBackend::Poll,
            interval_ms: 1000,
            on_error: OnError::Retry,
            retry_attempts: 5,
            retry_backoff_ms: 500,
        }
    }
}

impl WatchConfig {
    const PATH: FieldPath = FieldPath::new("watch.path");
    const INTERVAL: FieldPath = FieldPath::new("watch.interval_ms");

    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    /// Retry budget derived from `on_error`. `Exit` means no retries.
    pub fn retry_policy(&self) -> RetryPolicy {
        let attempts = match self.on_error {
            OnError::Retry => self.retry_attempts,
            OnError::Exit => 0,
        };
        RetryPolicy {
            attempts,
            backoff: Duration::from_millis(self.retry_backoff_ms),
        }
    }

    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if self.path.as_os_str().is_empty() {
            diag.error_with_hint(
                Self::PATH,
                "no file to watch",
                "pass a file argument or set `watch.path`",
            );
        }
        if self.interval_ms == 0 {
            diag.error(Self::INTERVAL, "interval must be greater than 0");
        }
    }
}

/// Reopen budget for the watcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub backoff: Duration,
}

impl RetryPolicy {
    /// Sleep before the given (1-based) attempt, or `None` once exhausted.
    pub fn delay(&self, attempt: u32) -> Option<Duration> {
        if attempt == 0 || attempt > self.attempts {
            return None;
        }
        let factor = 1u32.checked_shl(attempt - 1).unwrap_or(u32::MAX);
        Some(self.backoff.saturating_mul(factor).min(MAX_BACKOFF))
    }
}

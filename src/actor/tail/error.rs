use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failures of the tailed file after (or while) opening it.
#[derive(Debug, Error)]
pub enum TailError {
    #[error("failed to open `{}`", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to stat `{}`", path.display())]
    Stat {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to read `{}`", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("filesystem watcher failed")]
    Watcher(#[from] notify::Error),
}

impl TailError {
    pub(super) fn open(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Open {
            path: path.into(),
            source,
        }
    }

    pub(super) fn stat(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Stat {
            path: path.into(),
            source,
        }
    }

    pub(super) fn read(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Read {
            path: path.into(),
            source,
        }
    }
}

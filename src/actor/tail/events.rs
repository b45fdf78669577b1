//! Native filesystem event backend.
//!
//! Watches the file's parent directory (so rotation, which replaces the
//! file, keeps producing events) and wakes on any event naming the file.
//! A fallback tick still runs every interval in case events are coalesced
//! or lost.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::{EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use super::error::TailError;
use super::reader::TailReader;
use super::source::GrowthSource;

/// Wakes on filesystem events for the tailed file.
pub struct NotifySource {
    reader: TailReader,
    fallback: Duration,
    /// Coalesced wake-ups (capacity 1: one pending wake is enough)
    wake_rx: mpsc::Receiver<()>,
    /// Watcher handle (must be kept alive)
    _watcher: RecommendedWatcher,
}

impl NotifySource {
    pub fn new(reader: TailReader, fallback: Duration) -> Result<Self, TailError> {
        let (wake_tx, wake_rx) = mpsc::channel(1);
        let target = file_name(reader.path());

        let mut watcher = notify::recommended_watcher(move |res: notify::Result<notify::Event>| {
            match res {
                Ok(event) if is_relevant(&event, target.as_deref()) => {
                    // Full means a wake is already pending
                    let _ = wake_tx.try_send(());
                }
                Ok(_) => {}
                Err(e) => crate::debug!("tail"; "notify error: {}", e),
            }
        })?;
        watcher.watch(&watch_dir(reader.path()), RecursiveMode::NonRecursive)?;

        Ok(Self {
            reader,
            fallback,
            wake_rx,
            _watcher: watcher,
        })
    }
}

impl GrowthSource for NotifySource {
    async fn next_check(&mut self) -> Result<Option<Vec<u8>>, TailError> {
        tokio::select! {
            Some(()) = self.wake_rx.recv() => {}
            _ = tokio::time::sleep(self.fallback) => {}
        }
        self.reader.read_growth()
    }

    fn recover(&mut self) -> Result<(), TailError> {
        self.reader.reopen()
    }

    fn path(&self) -> &Path {
        self.reader.path()
    }
}

/// Directory to watch: the parent of the file, or `.` for a bare name.
fn watch_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

fn file_name(path: &Path) -> Option<OsString> {
    path.file_name().map(ToOwned::to_owned)
}

/// Content and lifecycle events naming the tailed file. Access events are
/// ignored since the reader's own opens would otherwise wake it.
fn is_relevant(event: &notify::Event, target: Option<&std::ffi::OsStr>) -> bool {
    if matches!(event.kind, EventKind::Access(_)) {
        return false;
    }
    let Some(target) = target else {
        return true;
    };
    event
        .paths
        .iter()
        .any(|p| p.file_name() == Some(target))
}

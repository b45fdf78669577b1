//! Offset tracking and reading of appended bytes.
//!
//! The reader stats the *path* on every check rather than the open handle,
//! so a file replaced by log rotation is noticed and followed.

use std::fs::{self, File, Metadata};
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use super::error::TailError;

/// Identity of the file behind a path (device + inode on Unix).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct FileId {
    #[cfg(unix)]
    dev: u64,
    #[cfg(unix)]
    ino: u64,
}

impl FileId {
    #[cfg(unix)]
    fn of(meta: &Metadata) -> Self {
        use std::os::unix::fs::MetadataExt;
        Self {
            dev: meta.dev(),
            ino: meta.ino(),
        }
    }

    // No stable identity elsewhere: rotation shows up as truncation only.
    #[cfg(not(unix))]
    fn of(_meta: &Metadata) -> Self {
        Self {}
    }
}

/// Tails one file, remembering how many bytes were already delivered.
#[derive(Debug)]
pub struct TailReader {
    path: PathBuf,
    file: File,
    id: FileId,
    /// Bytes already read from `file` (the watch offset).
    offset: u64,
    /// Read but not yet returned: the tail of a replaced file survives a
    /// failed check and goes out first on the next successful one.
    pending: Vec<u8>,
}

impl TailReader {
    /// Open `path` positioned at its current end: existing content is skipped.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, TailError> {
        let path = path.into();
        let (file, meta) = open_with_meta(&path)?;

        Ok(Self {
            id: FileId::of(&meta),
            offset: meta.len(),
            file,
            path,
            pending: Vec::new(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Read everything appended since the last call.
    ///
    /// Returns `None` when nothing new is available. Handles two edge cases:
    /// - size below offset (truncated in place): restart from byte 0
    /// - path now names another file (rotated): drain the old handle, then
    ///   continue from byte 0 of the new file
    pub fn read_growth(&mut self) -> Result<Option<Vec<u8>>, TailError> {
        let meta = fs::metadata(&self.path).map_err(|e| TailError::stat(&self.path, e))?;

        if FileId::of(&meta) != self.id {
            self.drain_replaced();
            crate::log!("tail"; "{} was replaced, following new file", self.path.display());
            self.switch_to_current()?;
        } else if meta.len() < self.offset {
            crate::log!(
                "tail";
                "{} truncated ({} -> {} bytes), reading from start",
                self.path.display(),
                self.offset,
                meta.len()
            );
            self.offset = 0;
        }

        let len = meta.len();
        if len > self.offset {
            self.read_span(Some(len - self.offset))?;
        }

        Ok((!self.pending.is_empty()).then(|| std::mem::take(&mut self.pending)))
    }

    /// Reopen the path after a failure.
    ///
    /// Keeps the offset when the same file is still there and did not shrink.
    /// A different file is read from the start, after whatever the old
    /// handle still had (rename-then-create rotation lands here when the
    /// rename was seen before the new file existed).
    pub fn reopen(&mut self) -> Result<(), TailError> {
        let (file, meta) = open_with_meta(&self.path)?;
        let id = FileId::of(&meta);

        if id != self.id {
            crate::debug!("tail"; "reopened {} as a new file", self.path.display());
            self.drain_replaced();
            self.offset = 0;
        } else if meta.len() < self.offset {
            crate::debug!("tail"; "reopened {} shorter than before", self.path.display());
            self.offset = 0;
        }
        self.file = file;
        self.id = id;
        Ok(())
    }

    /// Move the unread tail of the current handle into `pending`. The file
    /// is gone from the path, so a failed read only loses that tail.
    fn drain_replaced(&mut self) {
        if let Err(e) = self.read_span(None) {
            crate::debug!("tail"; "could not drain replaced file: {}", e);
        }
    }

    fn switch_to_current(&mut self) -> Result<(), TailError> {
        let (file, meta) = open_with_meta(&self.path)?;
        self.file = file;
        self.id = FileId::of(&meta);
        self.offset = 0;
        Ok(())
    }

    /// Append up to `count` bytes (or everything up to EOF) from `offset`
    /// to `pending`, advancing the offset by what was read. On error nothing
    /// is kept, so the span is read again on the next attempt.
    fn read_span(&mut self, count: Option<u64>) -> Result<(), TailError> {
        let start = self.pending.len();
        let result = self
            .file
            .seek(SeekFrom::Start(self.offset))
            .and_then(|_| match count {
                Some(count) => (&mut self.file).take(count).read_to_end(&mut self.pending),
                None => self.file.read_to_end(&mut self.pending),
            });

        match result {
            Ok(read) => {
                self.offset += read as u64;
                Ok(())
            }
            Err(e) => {
                self.pending.truncate(start);
                Err(TailError::read(&self.path, e))
            }
        }
    }
}

fn open_with_meta(path: &Path) -> Result<(File, Metadata), TailError> {
    let file = File::open(path).map_err(|e| TailError::open(path, e))?;
    let meta = file.metadata().map_err(|e| TailError::stat(path, e))?;
    Ok((file, meta))
}

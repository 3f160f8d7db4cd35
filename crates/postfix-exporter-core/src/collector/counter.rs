//! Recursive message-file counting for queue directories.
//!
//! Every non-directory entry below the queue directory is one queued
//! message. Subdirectories are descended into without following symlinks.
//!
//! Failing to list the starting directory is an error. Failing to list a
//! nested directory is recorded as a [`CountWarning`] and the walk continues
//! with the remaining entries, so a single unreadable hash directory only
//! lowers the count instead of hiding the whole queue.
//!
//! There is no depth limit and no cycle detection. Symlinks are never
//! followed, so only a bind mount looping back into the spool could make
//! the walk recurse without end.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use crate::collector::traits::{DirEntry, FileSystem};

/// Error returned when the starting directory itself cannot be listed.
#[derive(Debug)]
pub struct CountError {
    pub path: PathBuf,
    pub source: io::Error,
}

impl fmt::Display for CountError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cannot read {}: {}", self.path.display(), self.source)
    }
}

impl std::error::Error for CountError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.source)
    }
}

/// A nested directory that was skipped during the walk.
#[derive(Debug)]
pub struct CountWarning {
    pub path: PathBuf,
    pub error: io::Error,
}

impl fmt::Display for CountWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "skipped {}: {}", self.path.display(), self.error)
    }
}

/// Result of a successful walk.
#[derive(Debug, Default)]
pub struct CountReport {
    /// Number of non-directory entries found.
    pub files: u64,
    /// Nested directories that could not be listed.
    pub warnings: Vec<CountWarning>,
}

impl CountReport {
    /// Returns `true` if some subtree was skipped and `files` is a lower bound.
    pub fn is_partial(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// Counts the non-directory entries in the tree rooted at `root`.
pub fn count_files<F: FileSystem + ?Sized>(fs: &F, root: &Path) -> Result<CountReport, CountError> {
    let entries = fs.read_dir(root).map_err(|source| CountError {
        path: root.to_path_buf(),
        source,
    })?;

    let mut report = CountReport::default();
    count_entries(fs, entries, &mut report);
    Ok(report)
}

fn count_entries<F: FileSystem + ?Sized>(fs: &F, entries: Vec<DirEntry>, report: &mut CountReport) {
    for entry in entries {
        if !entry.is_dir() {
            report.files += 1;
            continue;
        }
        match fs.read_dir(&entry.path) {
            Ok(children) => count_entries(fs, children, report),
            Err(error) => report.warnings.push(CountWarning {
                path: entry.path,
                error,
            }),
        }
    }
}

//! Abstractions for filesystem access to enable testing and mocking.
//!
//! The `FileSystem` trait allows the queue counter to walk the real Postfix
//! spool or an in-memory tree when running tests.

use std::io;
use std::path::{Path, PathBuf};

use tracing::warn;

/// Kind of a directory entry, as reported by the listing itself.
///
/// Symbolic links are never followed: a link pointing at a directory is
/// reported as [`EntryKind::Other`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    /// A real directory that can be descended into.
    Dir,
    /// Anything else (regular file, symlink, socket, fifo).
    Other,
}

/// Single entry returned by [`FileSystem::read_dir`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    pub path: PathBuf,
    pub kind: EntryKind,
}

impl DirEntry {
    pub fn dir(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            kind: EntryKind::Dir,
        }
    }

    pub fn other(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            kind: EntryKind::Other,
        }
    }

    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Dir
    }
}

/// Abstraction for filesystem operations.
///
/// This trait allows the collector to read from the real filesystem or from
/// a mock implementation for testing purposes.
pub trait FileSystem: Send + Sync {
    /// Checks if a path exists.
    fn exists(&self, path: &Path) -> bool;

    /// Lists entries in a directory.
    ///
    /// # Arguments
    /// * `path` - Path to the directory
    ///
    /// # Returns
    /// The direct children of `path` with their kind, in no particular
    /// order, or an I/O error if the directory cannot be opened. Entries that
    /// fail once listing has started are skipped.
    fn read_dir(&self, path: &Path) -> io::Result<Vec<DirEntry>>;
}

/// Real filesystem implementation that delegates to `std::fs`.
///
/// Use this in production to read the actual Postfix spool.
#[derive(Debug, Default, Clone, Copy)]
pub struct RealFs;

impl RealFs {
    /// Creates a new `RealFs` instance.
    pub fn new() -> Self {
        Self
    }
}

impl FileSystem for RealFs {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn read_dir(&self, path: &Path) -> io::Result<Vec<DirEntry>> {
        let entries = std::fs::read_dir(path)?.map(|entry| {
            entry.map(|e| {
                let is_dir = e.file_type().map(|t| t.is_dir());
                (e.path(), is_dir)
            })
        });
        Ok(collect_entries(path, entries))
    }
}

/// Builds the listing of `dir`, skipping entries that fail mid-listing.
///
/// Once a directory is open its listing is best-effort: a failing entry
/// costs that entry only, never the ones already listed.
fn collect_entries<I>(dir: &Path, entries: I) -> Vec<DirEntry>
where
    I: IntoIterator<Item = io::Result<(PathBuf, io::Result<bool>)>>,
{
    let mut result = Vec::new();
    for entry in entries {
        match entry {
            Ok((path, Ok(is_dir))) => result.push(DirEntry {
                path,
                kind: if is_dir { EntryKind::Dir } else { EntryKind::Other },
            }),
            // Postfix removes delivered messages at any time.
            Ok((_, Err(e))) if e.kind() == io::ErrorKind::NotFound => {}
            Ok((path, Err(e))) => {
                warn!(path = %path.display(), error = %e, "skipping entry with unreadable type");
            }
            Err(e) => {
                warn!(dir = %dir.display(), error = %e, "skipping unreadable directory entry");
            }
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_real_fs_exists() {
        let dir = tempfile::tempdir().unwrap();
        let fs = RealFs::new();
        assert!(fs.exists(dir.path()));
        assert!(!fs.exists(&dir.path().join("missing")));
    }

    #[test]
    fn test_real_fs_read_dir_kinds() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("A")).unwrap();
        fs::write(dir.path().join("4F1C22A0B3"), b"").unwrap();

        let mut entries = RealFs::new().read_dir(dir.path()).unwrap();
        entries.sort_by(|a, b| a.path.cmp(&b.path));

        assert_eq!(
            entries,
            vec![
                DirEntry::other(dir.path().join("4F1C22A0B3")),
                DirEntry::dir(dir.path().join("A")),
            ]
        );
    }

    #[test]
    fn test_real_fs_read_dir_missing() {
        let dir = tempfile::tempdir().unwrap();
        let err = RealFs::new()
            .read_dir(&dir.path().join("deferred"))
            .unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn test_collect_entries_keeps_listed_entries_on_failure() {
        let dir = Path::new("/var/spool/postfix/deferred");
        let entries = vec![
            Ok((dir.join("A"), Ok(true))),
            Ok((dir.join("B1C2D3"), Ok(false))),
            Err(io::Error::other("readdir failed")),
            Ok((dir.join("gone"), Err(io::Error::from(io::ErrorKind::NotFound)))),
            Ok((dir.join("odd"), Err(io::Error::from(io::ErrorKind::PermissionDenied)))),
            Ok((dir.join("C9"), Ok(false))),
        ];

        assert_eq!(
            collect_entries(dir, entries),
            vec![
                DirEntry::dir(dir.join("A")),
                DirEntry::other(dir.join("B1C2D3")),
                DirEntry::other(dir.join("C9")),
            ]
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_real_fs_does_not_follow_symlinks() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("target")).unwrap();
        std::os::unix::fs::symlink(dir.path().join("target"), dir.path().join("link")).unwrap();

        let entries = RealFs::new().read_dir(dir.path()).unwrap();
        let link = entries
            .iter()
            .find(|e| e.path.ends_with("link"))
            .unwrap();
        assert_eq!(link.kind, EntryKind::Other);
    }
}

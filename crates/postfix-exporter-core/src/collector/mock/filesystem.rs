//! In-memory mock filesystem for testing collectors without a real spool.
//!
//! This module provides `MockFs` which simulates a directory tree in memory,
//! including directories that fail to list, so tests can exercise the
//! partial-failure paths of the counter.

use crate::collector::traits::{DirEntry, FileSystem};
use std::collections::HashSet;
use std::io;
use std::path::{Path, PathBuf};

/// In-memory filesystem for testing.
///
/// Only the shape of the tree is stored: queue files are counted, never read.
#[derive(Debug, Clone, Default)]
pub struct MockFs {
    /// Non-directory entries.
    files: HashSet<PathBuf>,
    /// Set of directories (for read_dir support).
    directories: HashSet<PathBuf>,
    /// Directories whose listing fails with `PermissionDenied`.
    denied: HashSet<PathBuf>,
}

impl MockFs {
    /// Creates a new empty mock filesystem.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a file.
    ///
    /// Parent directories are automatically created.
    pub fn add_file(&mut self, path: impl AsRef<Path>) {
        let path = path.as_ref().to_path_buf();
        self.add_parents(&path);
        self.files.insert(path);
    }

    /// Adds `count` files named `<prefix><n>` inside `dir`.
    pub fn add_files(&mut self, dir: impl AsRef<Path>, prefix: &str, count: usize) {
        let dir = dir.as_ref();
        self.add_dir(dir);
        for n in 0..count {
            self.add_file(dir.join(format!("{prefix}{n:04X}")));
        }
    }

    /// Adds an empty directory.
    pub fn add_dir(&mut self, path: impl AsRef<Path>) {
        let path = path.as_ref().to_path_buf();
        self.add_parents(&path);
        self.directories.insert(path);
    }

    /// Makes listing `path` fail as if the process lacked permission.
    ///
    /// The directory itself stays visible in its parent's listing.
    pub fn deny(&mut self, path: impl AsRef<Path>) {
        let path = path.as_ref().to_path_buf();
        self.add_dir(&path);
        self.denied.insert(path);
    }

    /// Removes a file or a whole directory subtree.
    pub fn remove(&mut self, path: impl AsRef<Path>) {
        let path = path.as_ref();
        self.files.retain(|p| !p.starts_with(path));
        self.directories.retain(|p| !p.starts_with(path));
        self.denied.retain(|p| !p.starts_with(path));
    }

    fn add_parents(&mut self, path: &Path) {
        let mut parent = path.parent();
        while let Some(p) = parent {
            if !p.as_os_str().is_empty() {
                self.directories.insert(p.to_path_buf());
            }
            parent = p.parent();
        }
    }
}

impl FileSystem for MockFs {
    fn exists(&self, path: &Path) -> bool {
        self.files.contains(path) || self.directories.contains(path)
    }

    fn read_dir(&self, path: &Path) -> io::Result<Vec<DirEntry>> {
        if self.denied.contains(path) {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                format!("permission denied: {:?}", path),
            ));
        }
        if !self.directories.contains(path) {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("directory not found: {:?}", path),
            ));
        }

        let files = self
            .files
            .iter()
            .filter(|p| p.parent() == Some(path))
            .map(|p| DirEntry::other(p.clone()));
        let dirs = self
            .directories
            .iter()
            .filter(|p| p.parent() == Some(path) && p.as_path() != path)
            .map(|p| DirEntry::dir(p.clone()));

        Ok(files.chain(dirs).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_fs_add_file() {
        let mut fs = MockFs::new();
        fs.add_file("/var/spool/postfix/incoming/4F1C22A0B3");

        assert!(fs.exists(Path::new("/var/spool/postfix/incoming/4F1C22A0B3")));
        assert!(fs.exists(Path::new("/var/spool/postfix/incoming")));
        assert!(fs.exists(Path::new("/var/spool/postfix")));
    }

    #[test]
    fn test_mock_fs_read_dir() {
        let mut fs = MockFs::new();
        fs.add_file("/spool/deferred/A/A1");
        fs.add_file("/spool/deferred/A/A2");
        fs.add_file("/spool/deferred/B1");

        let entries = fs.read_dir(Path::new("/spool/deferred")).unwrap();
        assert_eq!(entries.len(), 2);
        assert!(entries.contains(&DirEntry::dir("/spool/deferred/A")));
        assert!(entries.contains(&DirEntry::other("/spool/deferred/B1")));

        let a_entries = fs.read_dir(Path::new("/spool/deferred/A")).unwrap();
        assert_eq!(a_entries.len(), 2);
        assert!(a_entries.iter().all(|e| !e.is_dir()));
    }

    #[test]
    fn test_mock_fs_add_files() {
        let mut fs = MockFs::new();
        fs.add_files("/spool/active", "msg", 5);
        assert_eq!(fs.read_dir(Path::new("/spool/active")).unwrap().len(), 5);

        fs.add_files("/spool/hold", "msg", 0);
        assert!(fs.read_dir(Path::new("/spool/hold")).unwrap().is_empty());
    }

    #[test]
    fn test_mock_fs_denied_dir() {
        let mut fs = MockFs::new();
        fs.add_file("/spool/bounce/X/1");
        fs.deny("/spool/bounce/X");

        let entries = fs.read_dir(Path::new("/spool/bounce")).unwrap();
        assert_eq!(entries, vec![DirEntry::dir("/spool/bounce/X")]);

        let err = fs.read_dir(Path::new("/spool/bounce/X")).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::PermissionDenied);
    }

    #[test]
    fn test_mock_fs_missing_dir() {
        let fs = MockFs::new();
        let err = fs.read_dir(Path::new("/spool/incoming")).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn test_mock_fs_remove_subtree() {
        let mut fs = MockFs::new();
        fs.add_file("/spool/deferred/A/A1");
        fs.add_file("/spool/deferred/B/B1");
        fs.remove("/spool/deferred/A");

        assert!(!fs.exists(Path::new("/spool/deferred/A/A1")));
        assert!(!fs.exists(Path::new("/spool/deferred/A")));
        assert_eq!(fs.read_dir(Path::new("/spool/deferred")).unwrap().len(), 1);
    }
}

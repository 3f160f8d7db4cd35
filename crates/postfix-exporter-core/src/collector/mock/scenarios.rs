//! Pre-built mock filesystem scenarios for testing.
//!
//! These scenarios provide realistic Postfix spool layouts, including the
//! hashed subdirectories Postfix uses for the deferred and bounce queues and
//! the non-queue directories that must never be counted.

use std::path::Path;

use super::filesystem::MockFs;
use crate::collector::queue::QueueCategory;

impl MockFs {
    /// Creates a spool with all six queue directories present and empty.
    pub fn empty_spool(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref();
        let mut fs = Self::new();
        for category in QueueCategory::ALL {
            fs.add_dir(category.path_under(root));
        }
        fs
    }

    /// Creates a spool with a handful of queued messages.
    ///
    /// Queue lengths: incoming=3, active=1, maildrop=0, deferred=4, hold=0,
    /// bounce=1 (total 9).
    pub fn typical_spool(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref();
        let mut fs = Self::empty_spool(root);

        fs.add_files(root.join("incoming"), "3F2A", 3);
        fs.add_file(root.join("active/4B7C91E2D0"));

        // hash_queue_depth = 1 for deferred, plus one legacy two-level entry.
        fs.add_file(root.join("deferred/A/A1B2C3D4E5"));
        fs.add_file(root.join("deferred/A/A9F8E7D6C5"));
        fs.add_file(root.join("deferred/C/C0FFEE1234"));
        fs.add_file(root.join("deferred/F/E/FE12345678"));
        fs.add_dir(root.join("deferred/0"));

        fs.add_file(root.join("bounce/A/A1B2C3D4E5"));

        // Non-queue spool directories.
        fs.add_file(root.join("pid/master.pid"));
        fs.add_file(root.join("private/smtp"));
        fs.add_file(root.join("public/pickup"));
        fs.add_file(root.join("defer/A/A1B2C3D4E5"));

        fs
    }

    /// Creates a typical spool whose `deferred/C` hash directory and whole
    /// `hold` queue cannot be listed.
    ///
    /// Readable queue lengths: incoming=3, active=1, maildrop=0, deferred=3,
    /// hold=unreadable, bounce=1 (total 8).
    pub fn restricted_spool(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref();
        let mut fs = Self::typical_spool(root);
        fs.add_files(root.join("hold"), "H", 2);
        fs.deny(root.join("hold"));
        fs.deny(root.join("deferred/C"));
        fs
    }
}

//! Postfix queue categories and their metric identities.

use std::fmt;
use std::path::{Path, PathBuf};

/// Metric name of the gauge holding the sum of all queues.
pub const TOTAL_METRIC_NAME: &str = "total_queue_length";

/// Help text of the total gauge.
pub const TOTAL_HELP: &str = "length of mail queue";

/// One of the Postfix queue directories under the spool root.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueueCategory {
    Incoming,
    Active,
    Maildrop,
    Deferred,
    Hold,
    Bounce,
}

impl QueueCategory {
    /// All categories in export order.
    pub const ALL: [QueueCategory; 6] = [
        QueueCategory::Incoming,
        QueueCategory::Active,
        QueueCategory::Maildrop,
        QueueCategory::Deferred,
        QueueCategory::Hold,
        QueueCategory::Bounce,
    ];

    /// Subdirectory name under the queue root.
    pub const fn dir_name(self) -> &'static str {
        match self {
            QueueCategory::Incoming => "incoming",
            QueueCategory::Active => "active",
            QueueCategory::Maildrop => "maildrop",
            QueueCategory::Deferred => "deferred",
            QueueCategory::Hold => "hold",
            QueueCategory::Bounce => "bounce",
        }
    }

    /// Metric name without the namespace prefix.
    pub const fn metric_name(self) -> &'static str {
        match self {
            QueueCategory::Incoming => "incoming_queue_length",
            QueueCategory::Active => "active_queue_length",
            QueueCategory::Maildrop => "maildrop_queue_length",
            QueueCategory::Deferred => "deferred_queue_length",
            QueueCategory::Hold => "hold_queue_length",
            QueueCategory::Bounce => "bounce_queue_length",
        }
    }

    pub const fn help(self) -> &'static str {
        match self {
            QueueCategory::Incoming => "length of incoming mail queue",
            QueueCategory::Active => "length of active mail queue",
            QueueCategory::Maildrop => "length of maildrop queue",
            QueueCategory::Deferred => "length of deferred mail queue",
            QueueCategory::Hold => "length of hold mail queue",
            QueueCategory::Bounce => "length of bounce mail queue",
        }
    }

    /// Position in [`QueueCategory::ALL`].
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Path of this queue's directory under `root`.
    pub fn path_under(self, root: &Path) -> PathBuf {
        root.join(self.dir_name())
    }
}

impl fmt::Display for QueueCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_matches_all_order() {
        for (i, category) in QueueCategory::ALL.iter().enumerate() {
            assert_eq!(category.index(), i);
        }
    }

    #[test]
    fn test_metric_name_derived_from_dir_name() {
        for category in QueueCategory::ALL {
            assert_eq!(
                category.metric_name(),
                format!("{}_queue_length", category.dir_name())
            );
            assert!(category.help().contains(category.dir_name()));
        }
    }

    #[test]
    fn test_path_under_root() {
        let path = QueueCategory::Deferred.path_under(Path::new("/var/spool/postfix"));
        assert_eq!(path, PathBuf::from("/var/spool/postfix/deferred"));
        assert_eq!(QueueCategory::Hold.to_string(), "hold");
    }
}

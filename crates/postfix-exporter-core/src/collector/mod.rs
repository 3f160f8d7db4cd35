//! Postfix queue collector.
//!
//! This module measures the Postfix spool by counting message files under
//! each queue directory and exposes the counts as Prometheus gauges.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      QueueCollector                         │
//! │  - 7 gauges (6 queues + total)                              │
//! │  - scrape lock                                              │
//! │                            │                                │
//! │                     ┌──────▼──────┐                         │
//! │                     │ count_files │ (once per queue)        │
//! │                     └──────┬──────┘                         │
//! │                            │                                │
//! │                     ┌──────▼──────┐                         │
//! │                     │  FileSystem │ (trait)                 │
//! │                     └──────┬──────┘                         │
//! └────────────────────────────┼────────────────────────────────┘
//!                              │
//!              ┌───────────────┼───────────────┐
//!              │               │               │
//!       ┌──────▼──────┐ ┌──────▼──────┐ ┌──────▼──────┐
//!       │   RealFs    │ │   MockFs    │ │  Scenarios  │
//!       │ (std::fs)   │ │ (Testing)   │ │ (Fixtures)  │
//!       └─────────────┘ └─────────────┘ └─────────────┘
//! ```
//!
//! # Usage
//!
//! ## Production
//!
//! ```ignore
//! use postfix_exporter_core::collector::{QueueCollector, RealFs};
//!
//! let collector = QueueCollector::new(RealFs::new(), "/var/spool/postfix")?;
//! let registry = prometheus::Registry::new();
//! registry.register(Box::new(collector))?;
//! ```
//!
//! ## Testing (with MockFs)
//!
//! ```
//! use postfix_exporter_core::collector::{MockFs, QueueCategory, QueueCollector};
//!
//! let fs = MockFs::typical_spool("/var/spool/postfix");
//! let collector = QueueCollector::new(fs, "/var/spool/postfix").unwrap();
//! let snapshot = collector.scrape();
//! assert_eq!(snapshot.get(QueueCategory::Incoming), 3.0);
//! assert_eq!(snapshot.total(), 9.0);
//! ```

pub mod counter;
pub mod exporter;
pub mod mock;
pub mod queue;
pub mod traits;

pub use counter::{CountError, CountReport, CountWarning, count_files};
pub use exporter::{QueueCollector, QueueSnapshot};
pub use mock::MockFs;
pub use queue::QueueCategory;
pub use traits::{DirEntry, EntryKind, FileSystem, RealFs};

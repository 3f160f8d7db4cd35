//! Prometheus collector for Postfix queue lengths.
//!
//! The `QueueCollector` owns one gauge per queue plus a total gauge and
//! refreshes all of them on every scrape. A single lock covers measuring,
//! updating and reading the gauges, so concurrent scrapes never interleave
//! and a reader never sees a total that belongs to a different cycle than
//! the queue values next to it.

use std::fmt;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};
use std::time::Instant;

use prometheus::core::{Collector, Desc};
use prometheus::proto::MetricFamily;
use prometheus::{Gauge, Opts};
use tracing::{debug, warn};

use crate::NAMESPACE;
use crate::collector::counter::count_files;
use crate::collector::queue::{QueueCategory, TOTAL_HELP, TOTAL_METRIC_NAME};
use crate::collector::traits::FileSystem;

/// Queue lengths from a single collection cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct QueueSnapshot {
    counts: [f64; QueueCategory::ALL.len()],
    total: f64,
}

impl QueueSnapshot {
    /// Length of one queue.
    pub fn get(&self, category: QueueCategory) -> f64 {
        self.counts[category.index()]
    }

    /// Value of the total gauge.
    pub fn total(&self) -> f64 {
        self.total
    }

    /// Sum of the six queue values.
    pub fn sum_of_queues(&self) -> f64 {
        self.counts.iter().sum()
    }

    /// Iterates over `(category, length)` in export order.
    pub fn iter(&self) -> impl Iterator<Item = (QueueCategory, f64)> + '_ {
        QueueCategory::ALL.into_iter().map(|c| (c, self.get(c)))
    }
}

impl fmt::Display for QueueSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (category, value) in self.iter() {
            write!(f, "{}={} ", category, value)?;
        }
        write!(f, "total={}", self.total)
    }
}

struct QueueGauges {
    total: Gauge,
    queues: [Gauge; QueueCategory::ALL.len()],
}

impl QueueGauges {
    fn new() -> Result<Self, prometheus::Error> {
        let total = new_gauge(TOTAL_METRIC_NAME, TOTAL_HELP)?;
        let [incoming, active, maildrop, deferred, hold, bounce] =
            QueueCategory::ALL.map(|c| new_gauge(c.metric_name(), c.help()));
        Ok(Self {
            total,
            queues: [incoming?, active?, maildrop?, deferred?, hold?, bounce?],
        })
    }

    /// Total first, then queues in category order.
    fn iter(&self) -> impl Iterator<Item = &Gauge> {
        std::iter::once(&self.total).chain(self.queues.iter())
    }

    fn read(&self) -> QueueSnapshot {
        QueueSnapshot {
            counts: std::array::from_fn(|i| self.queues[i].get()),
            total: self.total.get(),
        }
    }
}

fn new_gauge(name: &str, help: &str) -> Result<Gauge, prometheus::Error> {
    Gauge::with_opts(Opts::new(name, help).namespace(NAMESPACE))
}

/// Collector measuring the Postfix queues under a spool root.
///
/// Construct one per process and register it with a `prometheus::Registry`;
/// every `gather()` on the registry triggers exactly one measurement cycle.
pub struct QueueCollector<F: FileSystem> {
    fs: F,
    queue_root: PathBuf,
    gauges: QueueGauges,
    /// Serializes measure-update-read cycles.
    cycle: Mutex<()>,
}

impl<F: FileSystem> QueueCollector<F> {
    /// Creates a collector with all gauges at zero.
    ///
    /// # Arguments
    /// * `fs` - Filesystem implementation (real or mock)
    /// * `queue_root` - Postfix spool directory (usually "/var/spool/postfix")
    pub fn new(fs: F, queue_root: impl Into<PathBuf>) -> Result<Self, prometheus::Error> {
        Ok(Self {
            fs,
            queue_root: queue_root.into(),
            gauges: QueueGauges::new()?,
            cycle: Mutex::new(()),
        })
    }

    /// Returns the descriptors of all seven gauges.
    ///
    /// Does not touch the filesystem or the gauge values.
    pub fn describe(&self) -> Vec<&Desc> {
        self.gauges.iter().flat_map(|g| g.desc()).collect()
    }

    /// Measures every queue, updates the gauges and returns the new values.
    pub fn scrape(&self) -> QueueSnapshot {
        let cycle = self.lock_cycle();
        self.refresh(&cycle)
    }

    /// Returns the values set by the most recent completed cycle.
    pub fn values(&self) -> QueueSnapshot {
        let _cycle = self.lock_cycle();
        self.gauges.read()
    }

    /// Acquires the cycle lock, repairing the gauges if a previous cycle
    /// panicked midway.
    ///
    /// Each gauge still holds a complete value, but the queues may mix two
    /// cycles and the total may be stale; the total is recomputed so readers
    /// keep seeing total == sum of queues.
    fn lock_cycle(&self) -> MutexGuard<'_, ()> {
        match self.cycle.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                let guard = poisoned.into_inner();
                self.cycle.clear_poison();
                let repaired = self.gauges.read().sum_of_queues();
                self.gauges.total.set(repaired);
                warn!(total = repaired, "previous queue scrape panicked, total recomputed");
                guard
            }
        }
    }

    /// Runs one measurement cycle. The guard proves the cycle lock is held.
    fn refresh(&self, _cycle: &MutexGuard<'_, ()>) -> QueueSnapshot {
        let started = Instant::now();
        let mut total = 0.0;

        for category in QueueCategory::ALL {
            let value = self.measure(category);
            self.gauges.queues[category.index()].set(value);
            total += value;
        }
        self.gauges.total.set(total);

        let snapshot = self.gauges.read();
        debug!(
            duration_ms = started.elapsed().as_millis() as u64,
            queues = %snapshot,
            "queue scrape complete"
        );
        snapshot
    }

    /// Counts one queue, degrading to zero if its directory is unreadable.
    fn measure(&self, category: QueueCategory) -> f64 {
        let path = category.path_under(&self.queue_root);
        match count_files(&self.fs, &path) {
            Ok(report) => {
                for warning in &report.warnings {
                    warn!(
                        queue = %category,
                        path = %warning.path.display(),
                        error = %warning.error,
                        "skipping unreadable directory in queue"
                    );
                }
                if report.is_partial() {
                    debug!(
                        queue = %category,
                        files = report.files,
                        skipped = report.warnings.len(),
                        "queue count is a lower bound"
                    );
                }
                report.files as f64
            }
            Err(e) => {
                warn!(queue = %category, error = %e, "queue unreadable, reporting zero");
                0.0
            }
        }
    }
}

impl<F: FileSystem> Collector for QueueCollector<F> {
    fn desc(&self) -> Vec<&Desc> {
        self.describe()
    }

    fn collect(&self) -> Vec<MetricFamily> {
        let cycle = self.lock_cycle();
        self.refresh(&cycle);
        self.gauges.iter().flat_map(|g| g.collect()).collect()
    }
}

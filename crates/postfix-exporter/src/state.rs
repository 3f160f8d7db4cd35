//! Shared application state and the global allocator.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

use std::sync::Arc;

use prometheus::Registry;

use postfix_exporter_core::collector::{FileSystem, QueueCollector};

/// State handed to every request handler.
///
/// The registry owns the process' single `QueueCollector`; cloning the state
/// only clones handles.
#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) registry: Registry,
    pub(crate) metrics_path: Arc<str>,
}

impl AppState {
    /// Registers `collector` in a fresh registry.
    pub(crate) fn new<F: FileSystem + 'static>(
        collector: QueueCollector<F>,
        metrics_path: &str,
    ) -> Result<Self, prometheus::Error> {
        let registry = Registry::new();
        registry.register(Box::new(collector))?;
        Ok(Self {
            registry,
            metrics_path: Arc::from(metrics_path),
        })
    }
}

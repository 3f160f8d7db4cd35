//! postfix-exporter-core: Postfix queue measurement for Prometheus.
//!
//! Provides:
//! - `collector`: filesystem access, recursive file counting, queue
//!   categories and the Prometheus collector owning the queue gauges
//! - `config`: validated exporter configuration

pub mod collector;
pub mod config;

/// Crate version, reported at startup and on the landing page.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Namespace prefix shared by every exported metric.
pub const NAMESPACE: &str = "postfix";

//! Exporter configuration.
//!
//! Raw values come from the command line (or environment) and are validated
//! once at startup into an immutable [`ExporterConfig`].

use std::fmt;
use std::net::{SocketAddr, ToSocketAddrs};
use std::path::PathBuf;

pub const DEFAULT_LISTEN: &str = ":9115";
pub const DEFAULT_METRICS_PATH: &str = "/metrics";
pub const DEFAULT_QUEUE_ROOT: &str = "/var/spool/postfix";

/// Paths served by the exporter besides the metrics path.
pub const RESERVED_PATHS: [&str; 2] = ["/", "/health"];

/// Error type for invalid configuration values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Listen address could not be parsed or resolved.
    ListenAddress(String),
    /// Metrics path must be a literal absolute path that does not shadow
    /// another route.
    MetricsPath(String),
    /// Queue root is empty.
    QueueRoot,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ListenAddress(addr) => write!(f, "invalid listen address '{}'", addr),
            ConfigError::MetricsPath(path) => write!(
                f,
                "invalid metrics path '{}': must be a literal path starting with '/' other than {:?}",
                path, RESERVED_PATHS
            ),
            ConfigError::QueueRoot => write!(f, "queue root must not be empty"),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Validated exporter configuration, fixed for the process lifetime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExporterConfig {
    pub listen: SocketAddr,
    pub metrics_path: String,
    pub queue_root: PathBuf,
}

impl ExporterConfig {
    pub fn new(
        listen: &str,
        metrics_path: &str,
        queue_root: impl Into<PathBuf>,
    ) -> Result<Self, ConfigError> {
        let queue_root = queue_root.into();
        if queue_root.as_os_str().is_empty() {
            return Err(ConfigError::QueueRoot);
        }
        Ok(Self {
            listen: parse_listen_address(listen)?,
            metrics_path: validate_metrics_path(metrics_path)?,
            queue_root,
        })
    }
}

impl Default for ExporterConfig {
    fn default() -> Self {
        Self {
            listen: SocketAddr::from(([0, 0, 0, 0], 9115)),
            metrics_path: DEFAULT_METRICS_PATH.to_string(),
            queue_root: PathBuf::from(DEFAULT_QUEUE_ROOT),
        }
    }
}

/// Parses a listen address.
///
/// Accepts `host:port`, `ip:port`, `[v6]:port` and the host-less `:port`
/// form, which binds all IPv4 interfaces.
pub fn parse_listen_address(s: &str) -> Result<SocketAddr, ConfigError> {
    let s = s.trim();
    let invalid = || ConfigError::ListenAddress(s.to_string());

    if let Some(port) = s.strip_prefix(':') {
        let port = port.parse::<u16>().map_err(|_| invalid())?;
        return Ok(SocketAddr::from(([0, 0, 0, 0], port)));
    }
    if let Ok(addr) = s.parse::<SocketAddr>() {
        return Ok(addr);
    }
    s.to_socket_addrs()
        .ok()
        .and_then(|mut addrs| addrs.next())
        .ok_or_else(invalid)
}

fn validate_metrics_path(path: &str) -> Result<String, ConfigError> {
    let path = path.trim();
    let has_pattern = path.contains(['{', '}'])
        || path
            .split('/')
            .any(|seg| seg.starts_with(':') || seg.starts_with('*'));
    if !path.starts_with('/') || RESERVED_PATHS.contains(&path) || has_pattern {
        return Err(ConfigError::MetricsPath(path.to_string()));
    }
    Ok(path.to_string())
}

//! postfix-exporter - Prometheus exporter for Postfix queue lengths.
//!
//! Serves the queue gauges on the metrics path, measuring the spool
//! directories on every scrape.

mod access_log;
mod handlers;
mod state;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::process;

use axum::Router;
use axum::routing::get;
use clap::Parser;
use tower_http::compression::CompressionLayer;
use tracing::{Level, error, info, warn};
use tracing_subscriber::EnvFilter;

use postfix_exporter_core::collector::{FileSystem, QueueCollector, RealFs};
use postfix_exporter_core::config::{
    DEFAULT_LISTEN, DEFAULT_METRICS_PATH, DEFAULT_QUEUE_ROOT, ExporterConfig,
};

use access_log::AccessLogLayer;
use state::AppState;

// ============================================================
// CLI
// ============================================================

#[derive(Parser)]
#[command(
    name = "postfix-exporter",
    about = "Prometheus exporter for Postfix queue lengths",
    version = postfix_exporter_core::VERSION
)]
struct Args {
    /// Address on which to expose metrics (":9115" binds all interfaces).
    #[arg(
        long = "telemetry.address",
        visible_alias = "listen",
        default_value = DEFAULT_LISTEN,
        env = "POSTFIX_EXPORTER_LISTEN"
    )]
    listen: String,

    /// Path under which to expose metrics.
    #[arg(
        long = "telemetry.endpoint",
        visible_alias = "metrics-path",
        default_value = DEFAULT_METRICS_PATH,
        env = "POSTFIX_EXPORTER_METRICS_PATH"
    )]
    metrics_path: String,

    /// Path to Postfix queue directories.
    #[arg(
        long = "postfix.queue_root",
        visible_alias = "queue-root",
        default_value = DEFAULT_QUEUE_ROOT,
        env = "POSTFIX_EXPORTER_QUEUE_ROOT"
    )]
    queue_root: PathBuf,

    /// Increase logging verbosity (-v for debug, -vv for trace). Default is info level.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Quiet mode - only show errors.
    #[arg(short, long)]
    quiet: bool,
}

/// Initializes the tracing subscriber with the appropriate log level.
/// `RUST_LOG`, when set, takes precedence over -v/-q.
fn init_logging(verbose: u8, quiet: bool) {
    let level = if quiet {
        Level::ERROR
    } else {
        match verbose {
            0 => Level::INFO,
            1 => Level::DEBUG,
            _ => Level::TRACE,
        }
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "postfix_exporter={level},postfix_exporter_core={level}"
        ))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

// ============================================================
// Main
// ============================================================

fn main() {
    let args = Args::parse();

    init_logging(args.verbose, args.quiet);

    let config = match ExporterConfig::new(&args.listen, &args.metrics_path, args.queue_root) {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "invalid configuration");
            process::exit(1);
        }
    };

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            error!(error = %e, "failed to build tokio runtime");
            process::exit(1);
        }
    };

    runtime.block_on(async_main(config));
}

async fn async_main(config: ExporterConfig) {
    info!(
        version = postfix_exporter_core::VERSION,
        listen = %config.listen,
        metrics_path = %config.metrics_path,
        queue_root = %config.queue_root.display(),
        "starting postfix exporter"
    );

    let fs = RealFs::new();
    if !fs.exists(&config.queue_root) {
        warn!(
            queue_root = %config.queue_root.display(),
            "queue root does not exist, queues will report zero until it appears"
        );
    }

    let state = match QueueCollector::new(fs, &config.queue_root)
        .and_then(|collector| AppState::new(collector, &config.metrics_path))
    {
        Ok(state) => state,
        Err(e) => {
            error!(error = %e, "failed to register queue collector");
            process::exit(1);
        }
    };

    let app = build_router(state).into_make_service_with_connect_info::<SocketAddr>();

    let listener = match tokio::net::TcpListener::bind(config.listen).await {
        Ok(listener) => listener,
        Err(e) => {
            error!(addr = %config.listen, error = %e, "failed to bind");
            process::exit(1);
        }
    };
    info!(addr = %config.listen, "listening");

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!(error = %e, "server error");
        process::exit(1);
    }
    info!("shut down");
}

pub(crate) fn build_router(state: AppState) -> Router {
    let metrics_path = state.metrics_path.clone();
    Router::new()
        .route(&metrics_path, get(handlers::handle_metrics))
        .route("/", get(handlers::handle_landing))
        .route("/health", get(handlers::handle_health))
        .with_state(state)
        .layer(AccessLogLayer::new(&metrics_path))
        .layer(CompressionLayer::new())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("shutdown signal received");
}

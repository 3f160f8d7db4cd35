//! Request logging for the exporter's routes.
//!
//! Prometheus scrapes and health checks arrive every few seconds, so
//! successful requests to those paths are logged at debug; everything
//! else (and any failing scrape) is logged at info.

use std::future::Future;
use std::net::SocketAddr;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Instant;

use axum::extract::{ConnectInfo, Request};
use axum::response::Response;
use tracing::{debug, info};

/// Paths whose successful requests are routine polling.
#[derive(Clone)]
pub(crate) struct PollingPaths(Arc<[String]>);

impl PollingPaths {
    pub(crate) fn new(metrics_path: &str) -> Self {
        Self(Arc::from([metrics_path.to_owned(), "/health".to_owned()]))
    }

    fn is_routine(&self, path: &str, status: u16) -> bool {
        status < 400 && self.0.iter().any(|p| p == path)
    }
}

#[derive(Clone)]
pub(crate) struct AccessLogLayer {
    polling: PollingPaths,
}

impl AccessLogLayer {
    pub(crate) fn new(metrics_path: &str) -> Self {
        Self {
            polling: PollingPaths::new(metrics_path),
        }
    }
}

impl<S> tower::Layer<S> for AccessLogLayer {
    type Service = AccessLogService<S>;
    fn layer(&self, inner: S) -> Self::Service {
        AccessLogService {
            inner,
            polling: self.polling.clone(),
        }
    }
}

#[derive(Clone)]
pub(crate) struct AccessLogService<S> {
    inner: S,
    polling: PollingPaths,
}

impl<S> tower::Service<Request> for AccessLogService<S>
where
    S: tower::Service<Request, Response = Response> + Clone + Send + 'static,
    S::Future: Send,
{
    type Response = Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Response, S::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request) -> Self::Future {
        let method = req.method().clone();
        let path = req.uri().path().to_owned();
        let client = req
            .extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map_or_else(|| "-".to_owned(), |ci| ci.0.ip().to_string());
        let started = Instant::now();
        let polling = self.polling.clone();

        let mut inner = self.inner.clone();
        Box::pin(async move {
            let response = inner.call(req).await?;
            let latency_ms = started.elapsed().as_millis() as u64;
            let status = response.status().as_u16();
            if polling.is_routine(&path, status) {
                debug!(client, status, latency_ms, "{method} {path}");
            } else {
                info!(client, status, latency_ms, "{method} {path}");
            }
            Ok(response)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_routine_paths() {
        let polling = PollingPaths::new("/scrape/postfix");
        assert!(polling.is_routine("/scrape/postfix", 200));
        assert!(polling.is_routine("/health", 200));
        assert!(!polling.is_routine("/metrics", 404));
        assert!(!polling.is_routine("/", 200));
    }

    #[test]
    fn test_failed_scrape_is_not_routine() {
        let polling = PollingPaths::new("/metrics");
        assert!(!polling.is_routine("/metrics", 500));
    }
}

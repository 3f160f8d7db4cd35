//! HTTP request handlers: metrics exposition, landing page and health.

use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::{Html, IntoResponse, Response};
use prometheus::TextEncoder;
use tracing::error;

use crate::state::AppState;

// ============================================================
// Metrics
// ============================================================

/// Runs one collection cycle and returns the text exposition.
pub(crate) async fn handle_metrics(State(state): State<AppState>) -> Response {
    // Directory walks block; keep them off the async workers.
    let registry = state.registry.clone();
    let families = match tokio::task::spawn_blocking(move || registry.gather()).await {
        Ok(families) => families,
        Err(e) => {
            error!(error = %e, "scrape panicked in spawn_blocking");
            return (StatusCode::INTERNAL_SERVER_ERROR, "scrape failed").into_response();
        }
    };

    match TextEncoder::new().encode_to_string(&families) {
        Ok(body) => ([(header::CONTENT_TYPE, prometheus::TEXT_FORMAT)], body).into_response(),
        Err(e) => {
            error!(error = %e, "failed to encode metrics");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to encode metrics: {}", e),
            )
                .into_response()
        }
    }
}

// ============================================================
// Landing page
// ============================================================

pub(crate) async fn handle_landing(State(state): State<AppState>) -> Html<String> {
    Html(landing_page(&state.metrics_path))
}

fn landing_page(metrics_path: &str) -> String {
    format!(
        "<html>\n\
         <head><title>Postfix exporter</title></head>\n\
         <body>\n\
         <h1>Postfix exporter</h1>\n\
         <p><a href='{}'>Metrics</a></p>\n\
         </body>\n\
         </html>\n",
        escape_html(metrics_path)
    )
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

// ============================================================
// Health
// ============================================================

pub(crate) async fn handle_health() -> &'static str {
    "ok"
}

//! Metrics collection and exposition.
//!
//! # Metrics
//! - `proxy_requests_total` (counter): requests by method, status, class
//! - `proxy_request_duration_seconds` (histogram): time to response headers, by class
//! - `proxy_rewrites_total` (counter): redirect and HTML rewrites, by kind
//! - `proxy_upstream_errors_total` (counter): upstream connect, timeout and
//!   body failures, by kind
//!
//! Recording goes through the `metrics` facade and is a no-op until
//! `init_metrics` installs the Prometheus exporter.

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter with its own HTTP listener on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Record a completed request.
///
/// `class` is the response class, or `error` when the pipeline failed.
pub fn record_request(method: &str, status: u16, class: &'static str, start: Instant) {
    metrics::counter!(
        "proxy_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string(),
        "class" => class
    )
    .increment(1);
    metrics::histogram!("proxy_request_duration_seconds", "class" => class)
        .record(start.elapsed().as_secs_f64());
}

/// Record a rewritten response (`redirect` or `html`).
pub fn record_rewrite(kind: &'static str) {
    metrics::counter!("proxy_rewrites_total", "kind" => kind).increment(1);
}

/// Record a failure talking to the upstream.
pub fn record_upstream_error(kind: &'static str) {
    metrics::counter!("proxy_upstream_errors_total", "kind" => kind).increment(1);
}

//! Request/response transformation pipeline.
//!
//! # Data Flow
//! ```text
//! Inbound request
//!     → target.rs   (decode target URL from the path, append query)
//!     → sanitize.rs (strip edge headers, stream body, no auto-redirect)
//!     → [upstream fetch]
//!     → classify.rs (binary | redirect | html | other)
//!     → redirect.rs / html.rs / passthrough
//!     → headers.rs  (no-store + CORS; skipped for redirects)
//!     → Response
//! ```
//!
//! # Design Decisions
//! - One upstream request per inbound request, no retries
//! - `timeouts.request_secs` bounds the wait for upstream headers and, in the
//!   HTML branch, for the buffered body; expiry is a `ProxyError` like any other
//! - Bodies stream through except in the HTML branch, which buffers to rewrite
//! - Every failure propagates as `ProxyError` to a single boundary in the
//!   HTTP handler
//! - No state is shared between requests apart from the immutable client and
//!   settings

pub mod classify;
pub mod error;
pub mod headers;
pub mod html;
pub mod redirect;
pub mod sanitize;
pub mod target;

use std::time::Duration;

use axum::body::{Body, Bytes};
use axum::extract::Request;
use axum::http::header::HOST;
use axum::http::{HeaderMap, Uri};
use axum::response::Response;
use futures_util::{Stream, TryStreamExt};
use tokio::time::{timeout_at, Instant};

use crate::config::ProxyConfig;
use crate::observability::metrics;

pub use classify::{Classifier, ResponseClass};
pub use error::ProxyError;
pub use sanitize::OutboundRequest;
pub use target::TargetUrl;

/// Forwarded-proto header set by a TLS-terminating front.
const X_FORWARDED_PROTO: &str = "x-forwarded-proto";

/// How the client reached the proxy, used to build absolute proxy links.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundContext {
    /// `http` or `https`.
    pub scheme: String,
    /// Host and optional port.
    pub host: String,
}

impl InboundContext {
    pub fn from_parts(headers: &HeaderMap, uri: &Uri, default_scheme: &str, default_host: &str) -> Self {
        let scheme = headers
            .get(X_FORWARDED_PROTO)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(|v| v.trim().to_ascii_lowercase())
            .filter(|v| v == "http" || v == "https")
            .or_else(|| uri.scheme_str().map(str::to_string))
            .unwrap_or_else(|| default_scheme.to_string());

        let host = headers
            .get(HOST)
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty())
            .map(str::to_string)
            .or_else(|| uri.authority().map(|a| a.to_string()))
            .unwrap_or_else(|| default_host.to_string());

        Self { scheme, host }
    }
}

/// The forwarding pipeline: shared client plus the settings each stage needs.
#[derive(Debug, Clone)]
pub struct Pipeline {
    client: reqwest::Client,
    classifier: Classifier,
    strip_header_prefix: String,
    public_scheme: String,
    fallback_host: String,
    request_timeout: Duration,
}

impl Pipeline {
    pub fn new(config: &ProxyConfig) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: sanitize::upstream_client(&config.timeouts)?,
            classifier: Classifier::from_config(&config.pipeline),
            strip_header_prefix: config.pipeline.strip_header_prefix.clone(),
            public_scheme: config.listener.public_scheme.clone(),
            fallback_host: config.listener.bind_address.clone(),
            request_timeout: Duration::from_secs(config.timeouts.request_secs),
        })
    }

    /// Forward one inbound request and return the rewritten response along
    /// with the branch that produced it.
    pub async fn forward(&self, request: Request) -> Result<(ResponseClass, Response), ProxyError> {
        let deadline = Instant::now() + self.request_timeout;
        let (parts, body) = request.into_parts();
        let inbound = InboundContext::from_parts(
            &parts.headers,
            &parts.uri,
            &self.public_scheme,
            &self.fallback_host,
        );

        let target = target::resolve(parts.uri.path(), parts.uri.query(), &inbound.scheme)?;

        tracing::debug!(
            method = %parts.method,
            url = %target,
            "Forwarding request"
        );

        let outbound = OutboundRequest::build(
            target.clone(),
            parts.method,
            &parts.headers,
            body,
            &self.strip_header_prefix,
        );
        let upstream = timeout_at(deadline, outbound.send(&self.client))
            .await
            .map_err(|_| ProxyError::UpstreamTimeout(self.request_timeout))??;

        let class = self.classifier.classify(&target, upstream.status(), upstream.headers());
        tracing::debug!(
            status = %upstream.status(),
            class = class.as_str(),
            "Upstream responded"
        );

        let response = match class {
            ResponseClass::Redirect => redirect::rewrite_redirect(upstream)?,
            ResponseClass::Html => {
                timeout_at(deadline, html::rewrite_html(upstream, &inbound, &target))
                    .await
                    .map_err(|_| ProxyError::UpstreamTimeout(self.request_timeout))??
            }
            ResponseClass::Binary | ResponseClass::Other => passthrough(upstream)?,
        };
        if matches!(class, ResponseClass::Redirect | ResponseClass::Html) {
            metrics::record_rewrite(class.as_str());
        }

        Ok((class, response))
    }
}

/// Copy status, headers and body unchanged, then finalize headers.
fn passthrough(upstream: reqwest::Response) -> Result<Response, ProxyError> {
    let status = upstream.status();
    let mut headers = upstream.headers().clone();
    headers::strip_hop_by_hop(&mut headers);
    headers::finalize(&mut headers);

    let mut response = Response::builder()
        .status(status)
        .body(Body::from_stream(stream_body(upstream)))?;
    *response.headers_mut() = headers;
    Ok(response)
}

/// The upstream body as a chunk stream. Dropping it releases the upstream
/// connection, so a client disconnect stops the transfer.
pub(crate) fn stream_body(
    upstream: reqwest::Response,
) -> impl Stream<Item = Result<Bytes, reqwest::Error>> + Send + 'static {
    upstream.bytes_stream().inspect_err(|e| {
        tracing::warn!(error = %e, "Upstream body stream failed");
        metrics::record_upstream_error("body_stream");
    })
}

//! Redirect rewriting.
//!
//! Upstream redirects are turned into redirects back through the proxy:
//! `Location: https://real.example/x` becomes
//! `Location: /https%3A%2F%2Freal.example%2Fx`.

use axum::body::Body;
use axum::http::header::LOCATION;
use axum::http::{HeaderMap, HeaderValue};
use axum::response::Response;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use url::Url;

use crate::pipeline::{stream_body, ProxyError};

/// Characters left unescaped when a full URL is embedded as one path segment.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Compute the proxy-routed `Location` for an upstream redirect.
pub fn rewrite_location(headers: &HeaderMap) -> Result<HeaderValue, ProxyError> {
    let raw = headers
        .get(LOCATION)
        .ok_or_else(|| ProxyError::MalformedRedirectLocation("missing Location header".into()))?
        .to_str()
        .map_err(|e| ProxyError::MalformedRedirectLocation(e.to_string()))?;

    let location = Url::parse(raw)
        .map_err(|e| ProxyError::MalformedRedirectLocation(format!("'{}': {}", raw, e)))?;

    let routed = format!("/{}", utf8_percent_encode(location.as_str(), URI_COMPONENT));
    HeaderValue::from_str(&routed).map_err(|e| ProxyError::MalformedRedirectLocation(e.to_string()))
}

/// Rebuild a 3xx response with its `Location` routed through the proxy.
///
/// Status and body are kept. Upstream headers are not carried over and no
/// cache or CORS headers are added.
pub fn rewrite_redirect(upstream: reqwest::Response) -> Result<Response, ProxyError> {
    let location = rewrite_location(upstream.headers())?;
    let status = upstream.status();

    tracing::debug!(status = %status, location = ?location, "Rewrote redirect");

    let response = Response::builder()
        .status(status)
        .header(LOCATION, location)
        .body(Body::from_stream(stream_body(upstream)))?;
    Ok(response)
}

//! Outbound request construction.
//!
//! # Responsibilities
//! - Drop headers injected by the hosting edge (reserved prefix)
//! - Drop `Host` and hop-by-hop headers, which the client recomputes
//! - Drop `Accept-Encoding` so the client only negotiates codings it can decode
//! - Stream the inbound body through unbuffered
//! - Build the upstream client with redirect following disabled

use std::time::Duration;

use axum::body::{Body, HttpBody};
use axum::http::header::{ACCEPT_ENCODING, HOST};
use axum::http::{HeaderMap, Method};

use crate::config::TimeoutConfig;
use crate::pipeline::headers::is_hop_by_hop;
use crate::pipeline::target::TargetUrl;
use crate::pipeline::ProxyError;

/// Build the shared upstream client.
///
/// Redirects are never followed: 3xx responses come back to the pipeline so
/// the browser is sent back through the proxy instead of to the real host.
pub fn upstream_client(timeouts: &TimeoutConfig) -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .connect_timeout(Duration::from_secs(timeouts.connect_secs))
        .build()
}

/// Copy inbound headers except edge-injected ones (`prefix`, case-insensitive),
/// those bound to the inbound connection, and `Accept-Encoding`.
pub fn sanitize_headers(inbound: &HeaderMap, prefix: &str) -> HeaderMap {
    // HeaderName is always lowercase.
    let prefix = prefix.to_ascii_lowercase();
    let mut headers = HeaderMap::with_capacity(inbound.len());

    for (name, value) in inbound {
        if name.as_str().starts_with(&prefix)
            || *name == HOST
            || *name == ACCEPT_ENCODING
            || is_hop_by_hop(name)
        {
            continue;
        }
        headers.append(name.clone(), value.clone());
    }
    headers
}

/// A request ready to be sent upstream.
#[derive(Debug)]
pub struct OutboundRequest {
    method: Method,
    target: TargetUrl,
    headers: HeaderMap,
    body: Option<reqwest::Body>,
}

impl OutboundRequest {
    pub fn build(
        target: TargetUrl,
        method: Method,
        inbound_headers: &HeaderMap,
        body: Body,
        strip_prefix: &str,
    ) -> Self {
        // A known-empty body is sent as no body at all, so GETs don't go out chunked.
        let body = if body.size_hint().exact() == Some(0) {
            None
        } else {
            Some(reqwest::Body::wrap_stream(body.into_data_stream()))
        };

        Self {
            method,
            target,
            headers: sanitize_headers(inbound_headers, strip_prefix),
            body,
        }
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn target(&self) -> &TargetUrl {
        &self.target
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn has_body(&self) -> bool {
        self.body.is_some()
    }

    /// Issue the request and wait for the response headers.
    pub async fn send(self, client: &reqwest::Client) -> Result<reqwest::Response, ProxyError> {
        let mut request = client
            .request(self.method, self.target.into_url())
            .headers(self.headers);
        if let Some(body) = self.body {
            request = request.body(body);
        }
        request.send().await.map_err(ProxyError::Forward)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::target::resolve;
    use axum::http::{HeaderName, HeaderValue};

    fn inbound() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("cf-connecting-ip", HeaderValue::from_static("203.0.113.7"));
        headers.insert(HeaderName::from_bytes(b"CF-Ray").unwrap(), HeaderValue::from_static("8a1b2c3d"));
        headers.insert(HeaderName::from_bytes(b"Cf-IPCountry").unwrap(), HeaderValue::from_static("NL"));
        headers.insert("host", HeaderValue::from_static("proxy.example"));
        headers.insert("connection", HeaderValue::from_static("keep-alive"));
        headers.insert("accept", HeaderValue::from_static("text/html"));
        headers.append("cookie", HeaderValue::from_static("a=1"));
        headers.append("cookie", HeaderValue::from_static("b=2"));
        headers.insert("x-cf-note", HeaderValue::from_static("kept"));
        headers.insert("accept-encoding", HeaderValue::from_static("gzip, deflate, br, zstd"));
        headers
    }

    #[test]
    fn test_reserved_prefix_is_stripped_in_any_case() {
        let headers = sanitize_headers(&inbound(), "cf-");
        assert!(headers.keys().all(|name| !name.as_str().starts_with("cf-")));

        let headers = sanitize_headers(&inbound(), "CF-");
        assert!(!headers.contains_key("cf-ray"));
        assert!(!headers.contains_key("cf-ipcountry"));
    }

    #[test]
    fn test_other_headers_are_kept() {
        let headers = sanitize_headers(&inbound(), "cf-");
        assert_eq!(headers["accept"], "text/html");
        assert_eq!(headers.get_all("cookie").iter().count(), 2);
        // Only a prefix match counts.
        assert_eq!(headers["x-cf-note"], "kept");
    }

    #[test]
    fn test_host_and_hop_by_hop_are_dropped() {
        let headers = sanitize_headers(&inbound(), "cf-");
        assert!(!headers.contains_key("host"));
        assert!(!headers.contains_key("connection"));
    }

    #[test]
    fn test_browser_accept_encoding_is_dropped() {
        // The client advertises its own decodable codings instead.
        let headers = sanitize_headers(&inbound(), "cf-");
        assert!(!headers.contains_key("accept-encoding"));
    }

    #[test]
    fn test_empty_body_is_not_forwarded() {
        let target = resolve("/https://example.com/", None, "http").unwrap();
        let request = OutboundRequest::build(target, Method::GET, &inbound(), Body::empty(), "cf-");
        assert!(!request.has_body());
        assert_eq!(request.method(), &Method::GET);
        assert_eq!(request.target().as_str(), "https://example.com/");
    }

    #[test]
    fn test_body_is_forwarded() {
        let target = resolve("/https://example.com/upload", None, "http").unwrap();
        let request = OutboundRequest::build(
            target,
            Method::POST,
            &HeaderMap::new(),
            Body::from("payload"),
            "cf-",
        );
        assert!(request.has_body());
    }
}

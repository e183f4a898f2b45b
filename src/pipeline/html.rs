//! Relative-path rewriting for HTML documents.
//!
//! Root-relative links (`href="/style.css"`) would resolve against the
//! proxy's own origin, so they are made absolute and routed through the
//! proxy: `href="https://proxy.example/https://real.example/style.css"`.
//!
//! This is a textual substitution over the whole document, not an HTML
//! parse. Only double- or single-quoted `href`, `src` and `action`
//! attributes are touched; `srcset`, CSS `url()`, inline scripts and
//! unquoted attributes are left alone, as are protocol-relative `//host`
//! links.
//!
//! The pattern is ASCII, so matching runs over the raw body bytes and the
//! document keeps whatever charset its `Content-Type` declares.

use axum::body::Body;
use axum::http::header::CONTENT_LENGTH;
use axum::response::Response;
use once_cell::sync::Lazy;
use regex::bytes::Regex;

use crate::pipeline::headers::{finalize, strip_hop_by_hop};
use crate::pipeline::target::TargetUrl;
use crate::pipeline::{InboundContext, ProxyError};

static RELATIVE_ATTR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?:href|src|action)=["']/"#).expect("attribute pattern is valid"));

/// Rewrite every root-relative `href`/`src`/`action` in `body`.
///
/// `scheme` and `host` describe how the client reaches the proxy; `origin` is
/// the target's `scheme://host[:port]`.
pub fn rewrite_relative_paths(body: &[u8], scheme: &str, host: &str, origin: &str) -> Vec<u8> {
    let prefix = format!("{}://{}/{}/", scheme, host, origin);
    let mut out = Vec::with_capacity(body.len());
    let mut last = 0;

    for m in RELATIVE_ATTR.find_iter(body) {
        // Protocol-relative: `href="//cdn.example/x"`.
        if body[m.end()..].starts_with(b"/") {
            continue;
        }
        // Keep `attr="`, replace the single leading `/` with the prefix.
        out.extend_from_slice(&body[last..m.end() - 1]);
        out.extend_from_slice(prefix.as_bytes());
        last = m.end();
    }

    out.extend_from_slice(&body[last..]);
    out
}

/// Buffer an HTML response, rewrite its links and finalize its headers.
pub async fn rewrite_html(
    upstream: reqwest::Response,
    inbound: &InboundContext,
    target: &TargetUrl,
) -> Result<Response, ProxyError> {
    let status = upstream.status();
    let mut headers = upstream.headers().clone();
    let body = upstream.bytes().await.map_err(ProxyError::BodyRead)?;

    let rewritten = rewrite_relative_paths(&body, &inbound.scheme, &inbound.host, &target.origin());

    tracing::debug!(
        url = %target,
        original_len = body.len(),
        rewritten_len = rewritten.len(),
        "Rewrote HTML document"
    );

    strip_hop_by_hop(&mut headers);
    headers.remove(CONTENT_LENGTH);
    finalize(&mut headers);

    let mut response = Response::builder().status(status).body(Body::from(rewritten))?;
    *response.headers_mut() = headers;
    Ok(response)
}

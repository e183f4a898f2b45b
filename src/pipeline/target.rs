//! Target resolution.
//!
//! The destination is carried in the inbound path, either raw
//! (`/https://example.com/a`) or percent-encoded
//! (`/https%3A%2F%2Fexample.com%2Fa`). The path is decoded exactly once, a
//! scheme is supplied when missing, and the inbound query string is appended
//! as-is.

use std::fmt;

use percent_encoding::percent_decode_str;
use url::Url;

use crate::pipeline::ProxyError;

/// A validated absolute http(s) URL to forward to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetUrl {
    url: Url,
}

impl TargetUrl {
    pub fn as_url(&self) -> &Url {
        &self.url
    }

    pub fn as_str(&self) -> &str {
        self.url.as_str()
    }

    /// Path component, still percent-encoded.
    pub fn path(&self) -> &str {
        self.url.path()
    }

    /// `scheme://host[:port]`, the form used as the rewrite prefix for HTML.
    pub fn origin(&self) -> String {
        self.url.origin().ascii_serialization()
    }

    pub fn into_url(self) -> Url {
        self.url
    }
}

impl fmt::Display for TargetUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.url.as_str())
    }
}

/// Resolve the forwarding target from an inbound request path and query.
///
/// `path` is the inbound path including its leading `/`; `inbound_scheme` is
/// `http` or `https` without the `:`.
pub fn resolve(path: &str, query: Option<&str>, inbound_scheme: &str) -> Result<TargetUrl, ProxyError> {
    let raw = path.strip_prefix('/').unwrap_or(path);
    let decoded = decode_once(raw)?;

    let mut target = if decoded.starts_with("http://") || decoded.starts_with("https://") {
        decoded
    } else {
        format!("{}://{}", inbound_scheme, decoded)
    };

    if let Some(query) = query.filter(|q| !q.is_empty()) {
        target.push('?');
        target.push_str(query);
    }

    let url = Url::parse(&target).map_err(|e| ProxyError::resolution(&target, e))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(ProxyError::resolution(
            &target,
            format!("unsupported scheme '{}'", url.scheme()),
        ));
    }
    if url.host_str().map_or(true, str::is_empty) {
        return Err(ProxyError::resolution(&target, "missing host"));
    }

    Ok(TargetUrl { url })
}

/// Strict single-pass percent decoding: a `%` must introduce two hex digits
/// and the result must be UTF-8.
fn decode_once(raw: &str) -> Result<String, ProxyError> {
    let bytes = raw.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let valid = bytes.len() > i + 2
                && bytes[i + 1].is_ascii_hexdigit()
                && bytes[i + 2].is_ascii_hexdigit();
            if !valid {
                return Err(ProxyError::resolution(raw, "malformed percent-encoding"));
            }
            i += 3;
        } else {
            i += 1;
        }
    }

    percent_decode_str(raw)
        .decode_utf8()
        .map(|decoded| decoded.into_owned())
        .map_err(|e| ProxyError::resolution(raw, e))
}

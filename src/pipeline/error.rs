//! Pipeline error taxonomy.
//!
//! Every stage returns `Result<_, ProxyError>`; the HTTP handler is the only
//! place errors are caught, and it turns all of them into the same 500 JSON
//! response (see `http::response`).

use std::time::Duration;

use thiserror::Error;

/// Errors that can occur while forwarding a request.
#[derive(Debug, Error)]
pub enum ProxyError {
    /// The target encoded in the path could not be decoded or is not a usable URL.
    #[error("invalid target url '{target}': {reason}")]
    Resolution { target: String, reason: String },

    /// The upstream request failed (connect, DNS, TLS, protocol).
    #[error("upstream request failed: {0}")]
    Forward(#[source] reqwest::Error),

    /// The upstream did not produce a response within the request timeout.
    #[error("upstream did not respond within {0:?}")]
    UpstreamTimeout(Duration),

    /// A 3xx response without an absolute `Location` header.
    #[error("malformed redirect location: {0}")]
    MalformedRedirectLocation(String),

    /// The upstream body could not be read for rewriting.
    #[error("failed to read upstream body: {0}")]
    BodyRead(#[source] reqwest::Error),

    /// The rewritten response could not be assembled.
    #[error("failed to build response: {0}")]
    ResponseBuild(#[from] axum::http::Error),
}

impl ProxyError {
    pub(crate) fn resolution(target: impl Into<String>, reason: impl ToString) -> Self {
        ProxyError::Resolution {
            target: target.into(),
            reason: reason.to_string(),
        }
    }

    /// Short label for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            ProxyError::Resolution { .. } => "resolution",
            ProxyError::Forward(_) => "forward",
            ProxyError::UpstreamTimeout(_) => "timeout",
            ProxyError::MalformedRedirectLocation(_) => "redirect_location",
            ProxyError::BodyRead(_) => "body_read",
            ProxyError::ResponseBuild(_) => "response_build",
        }
    }

    /// Whether the failure happened talking to the upstream, as opposed to
    /// rejecting the inbound request or its response.
    pub fn is_upstream(&self) -> bool {
        matches!(
            self,
            ProxyError::Forward(_) | ProxyError::UpstreamTimeout(_) | ProxyError::BodyRead(_)
        )
    }
}

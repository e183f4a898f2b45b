//! Response classification.
//!
//! Rules are checked in order and the first match wins:
//! 1. Binary: target path ends with a binary extension (if enabled)
//! 2. Redirect: 301, 302, 303, 307 or 308
//! 3. Html: `Content-Type` contains `text/html`
//! 4. Other
//!
//! Binary is decided from the URL alone, before the status is looked at, so a
//! binary-extension URL that redirects is passed through unrewritten.

use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderMap, StatusCode};

use crate::config::PipelineConfig;
use crate::pipeline::target::TargetUrl;

/// Statuses whose `Location` is rewritten.
pub const REDIRECT_STATUSES: &[StatusCode] = &[
    StatusCode::MOVED_PERMANENTLY,
    StatusCode::FOUND,
    StatusCode::SEE_OTHER,
    StatusCode::TEMPORARY_REDIRECT,
    StatusCode::PERMANENT_REDIRECT,
];

/// Which handling branch a response takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseClass {
    Binary,
    Redirect,
    Html,
    Other,
}

impl ResponseClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResponseClass::Binary => "binary",
            ResponseClass::Redirect => "redirect",
            ResponseClass::Html => "html",
            ResponseClass::Other => "other",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Classifier {
    /// Lowercased suffixes including the leading dot.
    binary_suffixes: Vec<String>,
    binary_passthrough: bool,
}

impl Classifier {
    pub fn from_config(config: &PipelineConfig) -> Self {
        Self {
            binary_suffixes: config
                .binary_extensions
                .iter()
                .map(|ext| format!(".{}", ext.to_ascii_lowercase()))
                .collect(),
            binary_passthrough: config.binary_passthrough,
        }
    }

    pub fn is_binary(&self, target: &TargetUrl) -> bool {
        if !self.binary_passthrough {
            return false;
        }
        let path = target.path().to_ascii_lowercase();
        self.binary_suffixes.iter().any(|suffix| path.ends_with(suffix.as_str()))
    }

    pub fn classify(&self, target: &TargetUrl, status: StatusCode, headers: &HeaderMap) -> ResponseClass {
        if self.is_binary(target) {
            ResponseClass::Binary
        } else if REDIRECT_STATUSES.contains(&status) {
            ResponseClass::Redirect
        } else if is_html(headers) {
            ResponseClass::Html
        } else {
            ResponseClass::Other
        }
    }
}

fn is_html(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.contains("text/html"))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::target::resolve;
    use axum::http::HeaderValue;

    fn classifier() -> Classifier {
        Classifier::from_config(&PipelineConfig::default())
    }

    fn target(url: &str) -> TargetUrl {
        resolve(&format!("/{}", url), None, "https").unwrap()
    }

    fn html_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("text/html; charset=utf-8"));
        headers
    }

    #[test]
    fn test_binary_extensions() {
        let c = classifier();
        for url in [
            "https://example.com/a.png",
            "https://example.com/dist/pkg.TAR.GZ",
            "https://example.com/Setup.EXE",
            "https://example.com/file.zip?download=1",
        ] {
            assert_eq!(c.classify(&target(url), StatusCode::OK, &html_headers()), ResponseClass::Binary, "{}", url);
        }
    }

    #[test]
    fn test_extension_must_follow_a_dot() {
        let c = classifier();
        assert!(!c.is_binary(&target("https://example.com/unzip")));
        assert!(!c.is_binary(&target("https://example.com/png/")));
        // Extension in the query string does not count.
        assert!(!c.is_binary(&target("https://example.com/view?file=a.png")));
    }

    #[test]
    fn test_binary_short_circuits_redirect() {
        let c = classifier();
        let class = c.classify(&target("https://example.com/latest.zip"), StatusCode::FOUND, &HeaderMap::new());
        assert_eq!(class, ResponseClass::Binary);
    }

    #[test]
    fn test_redirect_statuses() {
        let c = classifier();
        let t = target("https://example.com/login");
        for code in [301, 302, 303, 307, 308] {
            let status = StatusCode::from_u16(code).unwrap();
            assert_eq!(c.classify(&t, status, &html_headers()), ResponseClass::Redirect);
        }
        assert_eq!(c.classify(&t, StatusCode::NOT_MODIFIED, &HeaderMap::new()), ResponseClass::Other);
        assert_eq!(c.classify(&t, StatusCode::MULTIPLE_CHOICES, &HeaderMap::new()), ResponseClass::Other);
    }

    #[test]
    fn test_html_and_other() {
        let c = classifier();
        let t = target("https://example.com/");
        assert_eq!(c.classify(&t, StatusCode::OK, &html_headers()), ResponseClass::Html);
        assert_eq!(c.classify(&t, StatusCode::NOT_FOUND, &html_headers()), ResponseClass::Html);

        let mut json = HeaderMap::new();
        json.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        assert_eq!(c.classify(&t, StatusCode::OK, &json), ResponseClass::Other);
        assert_eq!(c.classify(&t, StatusCode::OK, &HeaderMap::new()), ResponseClass::Other);
    }

    #[test]
    fn test_passthrough_can_be_disabled() {
        let config = PipelineConfig {
            binary_passthrough: false,
            ..PipelineConfig::default()
        };
        let c = Classifier::from_config(&config);
        let t = target("https://example.com/latest.zip");
        assert_eq!(c.classify(&t, StatusCode::FOUND, &HeaderMap::new()), ResponseClass::Redirect);
        assert_eq!(c.classify(&t, StatusCode::OK, &HeaderMap::new()), ResponseClass::Other);
    }
}

//! Error responses.
//!
//! Any failure in the pipeline becomes the same response: HTTP 500 with a
//! JSON body `{"error": "<message>"}`. Callers never see partial results.

use axum::http::header::CONTENT_TYPE;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::pipeline::ProxyError;

pub const JSON_CONTENT_TYPE: &str = "application/json; charset=utf-8";

/// Build a JSON error response.
pub fn json_error(status: StatusCode, message: &str) -> Response {
    let body = serde_json::json!({ "error": message }).to_string();
    (status, [(CONTENT_TYPE, JSON_CONTENT_TYPE)], body).into_response()
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        json_error(StatusCode::INTERNAL_SERVER_ERROR, &self.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_proxy_error_is_json_500() {
        let err = ProxyError::MalformedRedirectLocation("missing Location header".into());
        let response = err.into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(response.headers()[CONTENT_TYPE], JSON_CONTENT_TYPE);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(
            json["error"],
            "malformed redirect location: missing Location header"
        );
    }

    #[tokio::test]
    async fn test_message_is_escaped() {
        let response = json_error(StatusCode::INTERNAL_SERVER_ERROR, r#"bad "quote" \ here"#);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"], r#"bad "quote" \ here"#);
    }
}

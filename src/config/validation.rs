//! Configuration validation.
//!
//! Serde handles the syntactic checks; this module checks values that parse
//! but cannot work (unparseable addresses, zero timeouts, odd extensions).
//! All problems are reported at once rather than stopping at the first.

use std::fmt;
use std::net::SocketAddr;

use crate::config::schema::ProxyConfig;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path of the offending field, e.g. `listener.bind_address`.
    pub field: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validate a parsed configuration.
pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "listener.bind_address",
            format!("'{}' is not a socket address", config.listener.bind_address),
        ));
    }

    if !matches!(config.listener.public_scheme.as_str(), "http" | "https") {
        errors.push(ValidationError::new(
            "listener.public_scheme",
            format!("expected 'http' or 'https', got '{}'", config.listener.public_scheme),
        ));
    }

    if config.timeouts.connect_secs == 0 {
        errors.push(ValidationError::new("timeouts.connect_secs", "must be greater than 0"));
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::new("timeouts.request_secs", "must be greater than 0"));
    }

    if config.pipeline.strip_header_prefix.is_empty() {
        errors.push(ValidationError::new(
            "pipeline.strip_header_prefix",
            "must not be empty (it would strip every header)",
        ));
    }

    for (i, ext) in config.pipeline.binary_extensions.iter().enumerate() {
        let field = format!("pipeline.binary_extensions[{}]", i);
        if ext.is_empty() {
            errors.push(ValidationError::new(field, "must not be empty"));
        } else if ext.starts_with('.') {
            errors.push(ValidationError::new(field, format!("'{}' must not start with '.'", ext)));
        } else if !ext.is_ascii() {
            errors.push(ValidationError::new(field, format!("'{}' must be ASCII", ext)));
        }
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!("'{}' is not a socket address", config.observability.metrics_address),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

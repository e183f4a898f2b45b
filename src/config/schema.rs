//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the proxy.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the forwarding proxy.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ProxyConfig {
    /// Listener configuration (bind address, public scheme).
    pub listener: ListenerConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Request/response transformation settings.
    pub pipeline: PipelineConfig,

    /// Landing page cosmetics.
    pub landing: LandingConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Scheme clients use to reach the proxy when no `X-Forwarded-Proto`
    /// header says otherwise ("http" or "https").
    pub public_scheme: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            public_scheme: "http".to_string(),
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Upstream connection establishment timeout in seconds.
    pub connect_secs: u64,

    /// Time allowed to produce response headers, in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            connect_secs: 10,
            request_secs: 60,
        }
    }
}

/// Settings for the transformation pipeline.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Header-name prefix injected by the hosting edge; matching request
    /// headers are never forwarded. Compared case-insensitively.
    pub strip_header_prefix: String,

    /// Route binary-extension URLs straight through without inspection.
    pub binary_passthrough: bool,

    /// File suffixes (without leading dot) treated as binary resources.
    pub binary_extensions: Vec<String>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            strip_header_prefix: "cf-".to_string(),
            binary_passthrough: true,
            binary_extensions: DEFAULT_BINARY_EXTENSIONS
                .iter()
                .map(|ext| ext.to_string())
                .collect(),
        }
    }
}

/// Archives, images, audio/video, documents and installers.
pub const DEFAULT_BINARY_EXTENSIONS: &[&str] = &[
    "tar.gz", "zip", "rar", "7z", "gz", "bz2", "xz",
    "jpg", "jpeg", "png", "gif", "webp", "svg", "ico",
    "mp4", "mp3", "pdf", "exe", "dmg", "deb", "rpm",
];

/// Landing page served at `/`.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LandingConfig {
    /// Page title and card heading.
    pub title: String,

    /// Favicon URL.
    pub icon_url: String,

    /// Full-page background image URL. Empty disables the image.
    pub background_url: String,
}

impl Default for LandingConfig {
    fn default() -> Self {
        Self {
            title: "Proxy Everything".to_string(),
            icon_url: "https://img.icons8.com/color/1000/kawaii-bread-1.png".to_string(),
            background_url: "https://imgapi.cn/bing.php".to_string(),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Default tracing filter, used when `RUST_LOG` is unset.
    pub log_filter: String,

    /// Install the Prometheus exporter.
    pub metrics_enabled: bool,

    /// Address the Prometheus exporter listens on.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_filter: "proxy_everything=info,tower_http=info".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}

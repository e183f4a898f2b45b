//! Path-addressed forwarding proxy.
//!
//! A request for `/<target-url>` is forwarded to `<target-url>` and the
//! response is rewritten so that redirects and root-relative links keep
//! pointing back through the proxy.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod pipeline;

pub use config::schema::ProxyConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use pipeline::{Pipeline, ProxyError};

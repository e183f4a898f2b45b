//! Startup orchestration.
//!
//! Order: observability, then the server (which builds the upstream client),
//! then the listener. Any failure is fatal.

use tokio::net::TcpListener;
use thiserror::Error;

use crate::config::ProxyConfig;
use crate::http::HttpServer;
use crate::lifecycle::Shutdown;
use crate::observability::metrics;

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("failed to build upstream client: {0}")]
    Client(#[from] reqwest::Error),

    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("server error: {0}")]
    Serve(#[source] std::io::Error),
}

/// Start the proxy and serve until a shutdown signal.
pub async fn run(config: ProxyConfig) -> Result<(), StartupError> {
    if config.observability.metrics_enabled {
        // Validated at load time.
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(e) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                error = %e,
                "Failed to parse metrics address"
            ),
        }
    }

    let address = config.listener.bind_address.clone();
    let server = HttpServer::new(config)?;

    let listener = TcpListener::bind(&address)
        .await
        .map_err(|source| StartupError::Bind { address: address.clone(), source })?;

    tracing::info!(
        address = %address,
        binary_passthrough = server.config().pipeline.binary_passthrough,
        strip_header_prefix = %server.config().pipeline.strip_header_prefix,
        "Listening for connections"
    );

    let shutdown = Shutdown::new();
    server.run(listener, shutdown.subscribe()).await.map_err(StartupError::Serve)
}

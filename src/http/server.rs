//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (tracing, request ID)
//! - Serve the landing page at `/`
//! - Hand every other path to the forwarding pipeline
//! - Convert pipeline failures into the JSON error response
//! - Graceful shutdown

use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{Request, State},
    response::{Html, IntoResponse, Response},
    routing::any,
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::trace::TraceLayer;

use crate::config::ProxyConfig;
use crate::http::landing;
use crate::http::request::{propagate_request_id_layer, set_request_id_layer, RequestIdExt};
use crate::lifecycle::signals;
use crate::observability::metrics;
use crate::pipeline::Pipeline;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<Pipeline>,
    pub landing_page: Arc<str>,
}

/// HTTP server for the forwarding proxy.
pub struct HttpServer {
    router: Router,
    config: ProxyConfig,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    ///
    /// Fails only if the upstream client cannot be built (e.g. no TLS backend).
    pub fn new(config: ProxyConfig) -> Result<Self, reqwest::Error> {
        let state = AppState {
            pipeline: Arc::new(Pipeline::new(&config)?),
            landing_page: landing::render(&config.landing).into(),
        };

        let router = Self::build_router(state);
        Ok(Self { router, config })
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(state: AppState) -> Router {
        Router::new()
            .route("/", any(landing_handler))
            .route("/{*target}", any(proxy_handler))
            .with_state(state)
            .layer(propagate_request_id_layer())
            .layer(TraceLayer::new_for_http().make_span_with(|request: &Request| {
                tracing::info_span!(
                    "request",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = %request.request_id(),
                )
            }))
            .layer(set_request_id_layer())
    }

    /// The fully layered router, for driving the server without a socket.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server, accepting connections on the given listener until a
    /// shutdown broadcast or an OS signal arrives.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                tokio::select! {
                    _ = shutdown.recv() => tracing::info!("Shutdown requested"),
                    _ = signals::wait_for_signal() => {}
                }
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ProxyConfig {
        &self.config
    }
}

async fn landing_handler(State(state): State<AppState>) -> Html<String> {
    Html(state.landing_page.to_string())
}

/// Forward any non-root path through the pipeline. This is the single place
/// where pipeline errors are caught.
async fn proxy_handler(State(state): State<AppState>, request: Request) -> Response {
    let start_time = Instant::now();
    let request_id = request.request_id().to_string();
    let method = request.method().to_string();

    match state.pipeline.forward(request).await {
        Ok((class, response)) => {
            metrics::record_request(&method, response.status().as_u16(), class.as_str(), start_time);
            response
        }
        Err(e) => {
            tracing::error!(
                request_id = %request_id,
                kind = e.kind(),
                error = %e,
                "Proxy request failed"
            );
            if e.is_upstream() {
                metrics::record_upstream_error(e.kind());
            }
            metrics::record_request(&method, 500, "error", start_time);
            e.into_response()
        }
    }
}

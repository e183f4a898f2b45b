//! Proxy Everything
//!
//! A forwarding proxy built with Tokio and Axum that addresses its upstream
//! through the request path.
//!
//! # Architecture Overview
//!
//! ```text
//!                        ┌──────────────────────────────────────────────────┐
//!                        │                 PROXY EVERYTHING                 │
//!   GET /https://x/a     │  ┌────────┐   ┌──────────┐   ┌───────────────┐   │
//!   ─────────────────────┼─▶│  http  │──▶│  target  │──▶│   sanitize    │───┼──▶ x/a
//!                        │  │ server │   │ resolver │   │ (no redirect) │   │
//!                        │  └────────┘   └──────────┘   └───────────────┘   │
//!                        │                                                  │
//!   Rewritten response   │  ┌────────┐   ┌──────────┐   ┌───────────────┐   │
//!   ◀────────────────────┼──│headers │◀──│ redirect │◀──│   classify    │◀──┼─── response
//!                        │  │finalize│   │  / html  │   │               │   │
//!                        │  └────────┘   └──────────┘   └───────────────┘   │
//!                        └──────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;

use proxy_everything::config::{load_or_default, ConfigOverrides};
use proxy_everything::lifecycle::startup;
use proxy_everything::observability::logging;

#[derive(Parser)]
#[command(name = "proxy-everything")]
#[command(about = "Forward /<url> to <url> and keep the result browsable through the proxy", long_about = None)]
struct Cli {
    /// TOML configuration file; built-in defaults are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override `listener.bind_address`.
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let overrides = ConfigOverrides {
        bind_address: cli.bind,
    };
    let config = load_or_default(cli.config.as_deref(), &overrides)?;

    logging::init(&config.observability.log_filter);

    tracing::info!("proxy-everything v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        config = ?cli.config,
        bind_address = %config.listener.bind_address,
        public_scheme = %config.listener.public_scheme,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    startup::run(config).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}

//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Handler and pipeline produce:
//!     → logging.rs (structured log events)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → stdout
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Request ID (`x-request-id`) is attached to every request span
//! - Metrics are cheap facade calls; no exporter, no cost

pub mod logging;
pub mod metrics;

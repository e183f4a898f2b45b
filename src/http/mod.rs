//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware)
//!     → request.rs (assign x-request-id)
//!     → "/"  → landing.rs
//!     → else → pipeline::Pipeline::forward
//!     → response.rs (pipeline errors → 500 JSON)
//!     → Send to client
//! ```

pub mod landing;
pub mod request;
pub mod response;
pub mod server;

pub use request::{RequestIdExt, X_REQUEST_ID};
pub use server::HttpServer;

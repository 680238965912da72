//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TLS connection (axum-server, rustls)
//!     → server.rs (layers: request ID, trace, concurrency, timeout, body limit)
//!     → gateway_handler
//!         OPTIONS → security::headers preflight
//!         else    → auth pipeline → 401 | routing → handler | 404
//!     → response.rs (JSON error shape)
//!     → CORS + security headers → client
//! ```

pub mod response;
pub mod server;

pub use response::{error_response, ErrorBody};
pub use server::{AppState, HttpServer};

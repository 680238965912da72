//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! Startup:
//!     cert/key paths from config
//!     → tls.rs (read, check PEM contents, build rustls config)
//!     → handed to the HTTPS listener (axum-server)
//! ```
//!
//! # Design Decisions
//! - TLS is mandatory; missing or unusable material is fatal
//! - Accept loop and connection tracking belong to axum-server; the
//!   concurrency cap is a tower layer in the HTTP subsystem

pub mod tls;

pub use tls::{load_tls_config, TlsError};

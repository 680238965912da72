//! Localhost origin-gated authentication gateway.
//!
//! Every request must present a bearer token bound to an allow-listed
//! origin before any feature handler runs.

pub mod auth;
pub mod config;
pub mod handlers;
pub mod http;
pub mod lifecycle;
pub mod net;
pub mod observability;
pub mod routing;
pub mod security;
pub mod session;

pub use config::schema::GatewayConfig;
pub use http::HttpServer;
pub use lifecycle::{Gateway, Shutdown};

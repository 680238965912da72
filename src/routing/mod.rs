//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Authenticated request (method, path, body) + AuthContext
//!     → router.rs (route lookup, first match wins)
//!     → matcher.rs (evaluate method + path conditions)
//!     → POST/PUT: buffer and parse JSON body
//!     → Handler → Routed::Handled(response) | Routed::Unmatched
//!
//! Route table (at startup):
//!     register() calls in order
//!     → compile path patterns into literal segments
//!     → freeze as immutable RequestRouter
//! ```
//!
//! # Design Decisions
//! - Routes registered at startup, immutable at runtime
//! - No regex in hot path (segment matching only)
//! - Deterministic: same input always matches same route
//! - First match wins (registration order)
//! - The router only ever sees requests that passed authentication

pub mod matcher;
pub mod router;

pub use router::{Handler, HandlerError, HandlerFuture, HandlerRequest, RequestRouter, Routed};

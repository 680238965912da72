//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Candidate origin (header, referer, token lookup, file:// default)
//!     → origin.rs (normalize, match against compiled allow-list)
//!     → bool to the caller, diagnostics to the log
//!
//! Outgoing response:
//!     → headers.rs (CORS scoped to the authenticated origin)
//! ```
//!
//! # Design Decisions
//! - Fail closed: anything that does not match is rejected
//! - No trust in client input: every origin signal is normalized first
//! - The allow-list is compiled once and swapped only by explicit reload

pub mod headers;
pub mod origin;

pub use origin::{normalize_origin, OriginMatcher, PatternSet, FILE_ORIGIN};

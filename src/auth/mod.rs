//! Authentication subsystem: the trust boundary.
//!
//! # Data Flow
//! ```text
//! Request headers
//!     → pipeline.rs bearer_token (Authorization: Bearer <token>)
//!     → pipeline.rs resolve_origin (X-Origin → Origin → Referer → token → file://)
//!     → OriginMatcher::validate
//!     → SessionStore::validate(token, origin)
//!     → AuthContext | AuthError (401)
//! ```

pub mod error;
pub mod pipeline;

pub use error::AuthError;
pub use pipeline::{AuthContext, AuthenticationPipeline, OriginPolicy, OriginSource};

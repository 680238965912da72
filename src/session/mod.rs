//! Session subsystem.
//!
//! # Data Flow
//! ```text
//! Host shell token request (origin hint)
//!     → issuance.rs (validate origin, stdio JSON lines)
//!     → store.rs get_or_create (reuse live session or mint)
//!     → token.rs (256-bit CSPRNG token)
//!
//! Authenticated request:
//!     → store.rs validate(token, origin)
//!
//! Background:
//!     → sweeper.rs (every sweep_interval_secs, drop expired sessions)
//! ```
//!
//! # Design Decisions
//! - One session per origin; re-issue within the TTL returns the same token
//! - Expiry is checked lazily on every read and enforced by the sweep
//! - No persistence; sessions die with the process
//! - Time comes from an injected `Clock`

pub mod clock;
pub mod issuance;
pub mod store;
pub mod sweeper;
pub mod token;

pub use clock::{Clock, MockClock, SystemClock};
pub use issuance::{IssueError, SessionIssuer};
pub use store::{SessionInfo, SessionStore};
pub use sweeper::SessionSweeper;
pub use token::{SessionToken, TokenIssuer};

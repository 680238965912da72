//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → GatewayConfig (validated, immutable)
//!     → handed to subsystems at startup
//!
//! On SIGHUP:
//!     loader.rs reloads the same file
//!     → only security.allowed_origins is applied (OriginMatcher::reload)
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; the origin allow-list is the only
//!   value that can be swapped at runtime, and only by explicit reload
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::GatewayConfig;
pub use schema::ListenerConfig;
pub use schema::SecurityConfig;
pub use schema::SessionConfig;

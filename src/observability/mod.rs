//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events, stderr)
//!     → metrics.rs (counters, gauges, histograms)
//!
//! Consumers:
//!     → Operator terminal / log capture
//!     → Metrics endpoint (Prometheus scrape, loopback only)
//! ```
//!
//! # Design Decisions
//! - Stdout belongs to the token issuance channel, so logs never go there
//! - Request ID flows through the HTTP layer via `x-request-id`
//! - Metrics are cheap (atomic increments); recording without an
//!   installed exporter is a no-op

pub mod logging;
pub mod metrics;

pub use logging::init_logging;

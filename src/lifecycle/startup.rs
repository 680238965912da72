//! Startup orchestration.
//!
//! # Responsibilities
//! - Build the trust-boundary components from configuration
//! - Reload the origin allow-list on request
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Subsystems initialize in order, not concurrently
//! - One `SessionStore` and one `OriginMatcher` per process, shared by
//!   the HTTP pipeline and the issuance channel

use std::path::Path;
use std::sync::Arc;

use chrono::Duration;

use crate::auth::{AuthenticationPipeline, OriginPolicy};
use crate::config::{load_config, GatewayConfig};
use crate::security::OriginMatcher;
use crate::session::store::default_ttl;
use crate::session::{Clock, SessionIssuer, SessionStore};

/// The process-wide trust boundary.
#[derive(Clone)]
pub struct Gateway {
    pub matcher: Arc<OriginMatcher>,
    pub sessions: Arc<SessionStore>,
    pub pipeline: Arc<AuthenticationPipeline>,
    pub issuer: SessionIssuer,
}

impl Gateway {
    pub fn new(config: &GatewayConfig, clock: Arc<dyn Clock>) -> Self {
        let ttl = i64::try_from(config.session.ttl_secs)
            .ok()
            .and_then(Duration::try_seconds)
            .unwrap_or_else(default_ttl);

        let matcher = Arc::new(OriginMatcher::new(config.security.allowed_origins.clone()));
        let sessions = Arc::new(SessionStore::with_clock(ttl, clock));
        let pipeline = Arc::new(AuthenticationPipeline::new(
            Arc::clone(&matcher),
            Arc::clone(&sessions),
            OriginPolicy::from_config(&config.security),
        ));
        let issuer = SessionIssuer::new(Arc::clone(&matcher), Arc::clone(&sessions));

        // Compile now so a bad allow-list shows up in the startup log.
        matcher.load();
        tracing::info!(session_ttl_secs = ttl.num_seconds(), "Trust boundary initialized");

        Self {
            matcher,
            sessions,
            pipeline,
            issuer,
        }
    }
}

/// Re-read `path` and swap in its origin allow-list. Every other setting
/// keeps its startup value. On error the current allow-list stays active.
pub fn reload_origins(path: Option<&Path>, matcher: &OriginMatcher) {
    let Some(path) = path else {
        tracing::warn!("No configuration file to reload from");
        return;
    };

    match load_config(path) {
        Ok(config) => {
            matcher.reload(&config.security.allowed_origins);
        }
        Err(e) => {
            tracing::error!(path = %path.display(), error = %e, "Reload failed, keeping current allow-list");
        }
    }
}

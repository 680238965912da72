//! Request authentication.
//!
//! # Responsibilities
//! - Extract the bearer token
//! - Reconcile the origin signals a request carries (or lacks)
//! - Check the origin against the allow-list and the token against the
//!   session bound to that origin
//!
//! # Design Decisions
//! - Order is fixed: authorization header, origin resolution, origin
//!   check, token check. The first failure ends the request.
//! - Pure over request headers plus store/matcher reads; no I/O

use std::fmt;
use std::sync::Arc;

use axum::http::{header, HeaderMap, HeaderName};

use crate::auth::error::AuthError;
use crate::config::SecurityConfig;
use crate::security::origin::{normalize_origin, OriginMatcher, FILE_ORIGIN};
use crate::session::store::SessionStore;

const BEARER_PREFIX: &str = "Bearer ";

/// Where the resolved origin came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OriginSource {
    /// The configured non-standard origin header.
    CustomHeader,
    Origin,
    Referer,
    /// Looked up from the session the token belongs to.
    Token,
    /// No signal at all; assumed to be a packaged `file://` context.
    FileDefault,
}

impl fmt::Display for OriginSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OriginSource::CustomHeader => "custom-header",
            OriginSource::Origin => "origin",
            OriginSource::Referer => "referer",
            OriginSource::Token => "token",
            OriginSource::FileDefault => "file-default",
        };
        f.write_str(name)
    }
}

/// Attached to every request that passed authentication.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthContext {
    pub origin: String,
    pub source: OriginSource,
}

/// How far the origin fallback chain may go when no header names an origin.
#[derive(Debug, Clone)]
pub struct OriginPolicy {
    pub origin_header: HeaderName,
    pub token_fallback: bool,
    pub file_fallback: bool,
}

impl Default for OriginPolicy {
    fn default() -> Self {
        Self {
            origin_header: HeaderName::from_static("x-origin"),
            token_fallback: true,
            file_fallback: true,
        }
    }
}

impl OriginPolicy {
    /// Build from the security section. An unusable header name falls back
    /// to `x-origin`; config validation reports it before startup.
    pub fn from_config(config: &SecurityConfig) -> Self {
        let origin_header = HeaderName::try_from(config.origin_header.as_str())
            .unwrap_or_else(|_| HeaderName::from_static("x-origin"));
        Self {
            origin_header,
            token_fallback: config.token_origin_fallback,
            file_fallback: config.file_origin_fallback,
        }
    }
}

pub struct AuthenticationPipeline {
    matcher: Arc<OriginMatcher>,
    sessions: Arc<SessionStore>,
    policy: OriginPolicy,
}

impl AuthenticationPipeline {
    pub fn new(matcher: Arc<OriginMatcher>, sessions: Arc<SessionStore>, policy: OriginPolicy) -> Self {
        Self {
            matcher,
            sessions,
            policy,
        }
    }

    pub fn policy(&self) -> &OriginPolicy {
        &self.policy
    }

    /// Decide whether a request may cross the trust boundary.
    pub fn authenticate(&self, headers: &HeaderMap) -> Result<AuthContext, AuthError> {
        let Some(token) = bearer_token(headers) else {
            tracing::warn!("Rejected request: missing or malformed Authorization header");
            return Err(AuthError::MissingAuthorization);
        };

        let Some((candidate, source)) = self.resolve_origin(headers, token) else {
            tracing::warn!(
                headers = ?self.considered_headers(headers),
                "Rejected request: no origin signal and fallbacks disabled"
            );
            return Err(AuthError::InvalidOrigin {
                origin: String::new(),
            });
        };

        let origin = normalize_origin(&candidate).unwrap_or(candidate);

        if !self.matcher.validate(&origin) {
            tracing::warn!(
                origin = %origin,
                source = %source,
                headers = ?self.considered_headers(headers),
                "Rejected request: origin not allowed"
            );
            return Err(AuthError::InvalidOrigin { origin });
        }

        if !self.sessions.validate(token, &origin) {
            tracing::warn!(
                origin = %origin,
                source = %source,
                "Rejected request: invalid or expired token for origin"
            );
            return Err(AuthError::InvalidToken);
        }

        tracing::debug!(origin = %origin, source = %source, "Request authenticated");
        Ok(AuthContext { origin, source })
    }

    /// First signal wins: custom header, `Origin`, `Referer`, token lookup,
    /// `file://`.
    fn resolve_origin(&self, headers: &HeaderMap, token: &str) -> Option<(String, OriginSource)> {
        if let Some(origin) = header_origin(headers, &self.policy.origin_header) {
            return Some((origin, OriginSource::CustomHeader));
        }
        if let Some(origin) = header_origin(headers, &header::ORIGIN) {
            return Some((origin, OriginSource::Origin));
        }
        if let Some(origin) = header_origin(headers, &header::REFERER) {
            return Some((origin, OriginSource::Referer));
        }

        if self.policy.token_fallback {
            if let Some(origin) = self.sessions.resolve_origin_by_token(token) {
                return Some((origin, OriginSource::Token));
            }
        }

        if self.policy.file_fallback {
            return Some((FILE_ORIGIN.to_string(), OriginSource::FileDefault));
        }

        None
    }

    fn considered_headers<'a>(&self, headers: &'a HeaderMap) -> [(&'static str, Option<&'a str>); 3] {
        let get = |name: &HeaderName| headers.get(name).and_then(|v| v.to_str().ok());
        [
            ("custom", get(&self.policy.origin_header)),
            ("origin", get(&header::ORIGIN)),
            ("referer", get(&header::REFERER)),
        ]
    }
}

/// The token from `Authorization: Bearer <token>`. The prefix is
/// case-sensitive and the token must be non-empty.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix(BEARER_PREFIX)
        .filter(|token| !token.is_empty())
}

/// A usable origin signal from one header. Blank values and the opaque
/// `null` origin carry no identity and count as absent.
fn header_origin(headers: &HeaderMap, name: &HeaderName) -> Option<String> {
    let value = headers.get(name)?.to_str().ok()?.trim();
    if value.is_empty() || value == "null" {
        return None;
    }
    Some(value.to_string())
}

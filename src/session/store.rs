//! Origin-scoped session storage.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use serde::Serialize;
use uuid::Uuid;

use crate::observability::metrics;
use crate::session::clock::{Clock, SystemClock};
use crate::session::token::{SessionToken, TokenIssuer};

/// Default session lifetime in seconds: one hour.
pub const DEFAULT_TTL_SECS: i64 = 3600;

pub fn default_ttl() -> Duration {
    Duration::seconds(DEFAULT_TTL_SECS)
}

/// A live binding between an origin and its token.
#[derive(Debug, Clone)]
struct Session {
    id: Uuid,
    origin: String,
    token: SessionToken,
    created_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
}

impl Session {
    fn is_live_at(&self, now: DateTime<Utc>) -> bool {
        now <= self.expires_at
    }

    fn info(&self) -> SessionInfo {
        SessionInfo {
            id: self.id,
            origin: self.origin.clone(),
            created_at: self.created_at,
            expires_at: self.expires_at,
        }
    }
}

/// Session metadata without the token, for introspection and logging.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionInfo {
    pub id: Uuid,
    pub origin: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// In-memory, single-process session store keyed by origin.
///
/// At most one session exists per origin. Nothing is persisted.
pub struct SessionStore {
    sessions: DashMap<String, Session>,
    issuer: TokenIssuer,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl SessionStore {
    /// Create an empty store with the default TTL and the system clock.
    pub fn new() -> Self {
        Self::with_clock(default_ttl(), Arc::new(SystemClock))
    }

    pub fn with_clock(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            sessions: DashMap::new(),
            issuer: TokenIssuer::new(),
            ttl,
            clock,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Return the live token for `origin`, minting a new session if there is
    /// none or the previous one expired.
    pub fn get_or_create(&self, origin: &str) -> SessionToken {
        let now = self.clock.now();

        // The entry guard holds a shard lock; `len()` must wait until it drops.
        let token = match self.sessions.entry(origin.to_string()) {
            Entry::Occupied(mut occupied) => {
                if occupied.get().is_live_at(now) {
                    return occupied.get().token.clone();
                }
                let session = self.new_session(origin, now);
                let token = session.token.clone();
                let previous = occupied.insert(session);
                tracing::info!(
                    origin = %origin,
                    previous_session = %previous.id,
                    session_id = %occupied.get().id,
                    "Expired session replaced"
                );
                token
            }
            Entry::Vacant(vacant) => {
                let session = self.new_session(origin, now);
                let token = session.token.clone();
                let inserted = vacant.insert(session);
                tracing::info!(
                    origin = %origin,
                    session_id = %inserted.id,
                    expires_at = %inserted.expires_at,
                    "Session created"
                );
                token
            }
        };

        metrics::record_active_sessions(self.sessions.len());
        token
    }

    fn new_session(&self, origin: &str, now: DateTime<Utc>) -> Session {
        metrics::record_session_issued();
        Session {
            id: Uuid::new_v4(),
            origin: origin.to_string(),
            token: self.issuer.issue(),
            created_at: now,
            expires_at: now.checked_add_signed(self.ttl).unwrap_or(DateTime::<Utc>::MAX_UTC),
        }
    }

    /// True iff a live session for exactly `origin` holds exactly `token`.
    pub fn validate(&self, token: &str, origin: &str) -> bool {
        let now = self.clock.now();
        self.sessions
            .get(origin)
            .map(|session| {
                session.origin == origin && session.is_live_at(now) && session.token.matches(token)
            })
            .unwrap_or(false)
    }

    /// Find the origin a live token was issued for.
    pub fn resolve_origin_by_token(&self, token: &str) -> Option<String> {
        let now = self.clock.now();
        self.sessions
            .iter()
            .find(|entry| entry.is_live_at(now) && entry.token.matches(token))
            .map(|entry| entry.origin.clone())
    }

    /// Remove every session that expired before `now`. Returns the number removed.
    pub fn sweep(&self, now: DateTime<Utc>) -> usize {
        let before = self.sessions.len();
        self.sessions.retain(|_, session| session.expires_at >= now);
        let removed = before.saturating_sub(self.sessions.len());

        metrics::record_sessions_swept(removed);
        metrics::record_active_sessions(self.sessions.len());
        if removed > 0 {
            tracing::info!(removed, remaining = self.sessions.len(), "Cleaned up expired sessions");
        }
        removed
    }

    /// Sweep against the store's own clock.
    pub fn sweep_expired(&self) -> usize {
        self.sweep(self.clock.now())
    }

    pub fn get(&self, origin: &str) -> Option<SessionInfo> {
        self.sessions.get(origin).map(|s| s.info())
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Count of (live, expired-but-not-yet-swept) sessions.
    pub fn summary(&self) -> (usize, usize) {
        let now = self.clock.now();
        self.sessions.iter().fold((0, 0), |(live, expired), s| {
            if s.is_live_at(now) {
                (live + 1, expired)
            } else {
                (live, expired + 1)
            }
        })
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

use std::time::Duration;

use async_trait::async_trait;
use axum::http::HeaderMap;
use campus_gate_core_types::{Role, Session, SubjectId};
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tracing::debug;
use uuid::Uuid;

use crate::credentials::{session_token, CredentialNames};
use crate::{SessionError, SessionProvider};

/// Token-keyed session store held in process memory.
pub struct InMemorySessionStore {
    sessions: DashMap<String, Session>,
    names: CredentialNames,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::with_names(CredentialNames::default())
    }

    pub fn with_names(names: CredentialNames) -> Self {
        Self {
            sessions: DashMap::new(),
            names,
        }
    }

    /// Mint a fresh opaque token for `subject`.
    pub fn issue(&self, subject: SubjectId, role: Role, ttl: Option<Duration>) -> (String, Session) {
        let token = Uuid::new_v4().simple().to_string();
        let session = self.insert(token.clone(), subject, role, ttl);
        (token, session)
    }

    /// Bind a caller-chosen token, replacing whatever it pointed to before.
    pub fn insert(
        &self,
        token: impl Into<String>,
        subject: SubjectId,
        role: Role,
        ttl: Option<Duration>,
    ) -> Session {
        let session = Session::new(subject, role, ttl.map(deadline_after));
        self.sessions.insert(token.into(), session.clone());
        session
    }

    pub fn revoke(&self, token: &str) -> bool {
        self.sessions.remove(token).is_some()
    }

    pub fn get(&self, token: &str) -> Option<Session> {
        let now = Utc::now();
        let session = self.sessions.get(token)?.value().clone();
        if session.is_expired_at(now) {
            // A token rebound since the read above holds a fresh session; keep it.
            let evicted = self.sessions.remove_if(token, |_, s| s.is_expired_at(now));
            if let Some((_, evicted)) = evicted {
                debug!(subject = %evicted.subject, "evicted expired session on lookup");
            }
            return None;
        }
        Some(session)
    }

    pub fn prune_expired(&self) -> usize {
        let now = Utc::now();
        let before = self.sessions.len();
        self.sessions.retain(|_, session| !session.is_expired_at(now));
        before.saturating_sub(self.sessions.len())
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

impl Default for InMemorySessionStore {
    fn default() -> Self {
        Self::new()
    }
}

fn deadline_after(ttl: Duration) -> DateTime<Utc> {
    chrono::Duration::from_std(ttl)
        .ok()
        .and_then(|delta| Utc::now().checked_add_signed(delta))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

#[async_trait]
impl SessionProvider for InMemorySessionStore {
    async fn session_for(&self, headers: &HeaderMap) -> Result<Option<Session>, SessionError> {
        Ok(session_token(headers, &self.names).and_then(|token| self.get(&token)))
    }
}

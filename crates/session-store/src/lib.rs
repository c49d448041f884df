//! Session collaborator for the campus access gate.
//!
//! The gate and the action guards never own sessions: they ask a
//! [`SessionProvider`] for the session bound to a request's headers. This
//! crate defines that contract, how credentials are read from headers, and
//! an in-memory store used by the server binary and tests.

mod credentials;
mod store;

pub use credentials::{session_token, CredentialNames, DEFAULT_SESSION_COOKIE};
pub use store::InMemorySessionStore;

use async_trait::async_trait;
use axum::http::HeaderMap;
use campus_gate_core_types::Session;
use thiserror::Error;

/// Failures of the lookup itself, as opposed to "no session".
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum SessionError {
    #[error("session store unavailable: {0}")]
    Unavailable(String),
    #[error("malformed session record: {0}")]
    Malformed(String),
    #[error("internal error: {0}")]
    Internal(String),
}

/// Resolves the session bound to a request, if any.
///
/// Implementations may be network-backed. Callers in this workspace treat
/// every `Err` as "no session".
#[async_trait]
pub trait SessionProvider: Send + Sync {
    async fn session_for(&self, headers: &HeaderMap) -> Result<Option<Session>, SessionError>;
}

/// Outcome of the route gate's lookup, attached to the request so guards
/// running later in the same request can skip a second round-trip.
#[derive(Clone, Debug)]
pub struct ResolvedSession(pub Option<Session>);

//! Authorization primitives called at the top of every server action and
//! data fetch.
//!
//! A failed check never hands control back as an error to be inspected: it
//! yields a [`GuardRedirect`], which ends the request. Code running past a
//! successful guard holds the [`Session`] it was granted.

pub mod allow;
mod extract;

pub use extract::{
    AdminOnly, AnyRole, GuardPolicy, Guarded, MaybeSession, MentorOrAdmin, RecruiterOrAdmin,
    StudentArea,
};

use std::fmt;
use std::sync::Arc;

use axum::http::HeaderMap;
use axum::response::{IntoResponse, Redirect, Response};
use campus_gate_core_types::{CurrentUser, RedirectKind, Redirects, RoleSet, Session};
use campus_gate_session_store::SessionProvider;
use tracing::{debug, warn};

/// Where a failed guard sends the caller.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct GuardRedirect {
    pub kind: RedirectKind,
    pub location: String,
}

impl fmt::Display for GuardRedirect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "redirect to {} ({:?})", self.location, self.kind)
    }
}

impl IntoResponse for GuardRedirect {
    fn into_response(self) -> Response {
        Redirect::temporary(&self.location).into_response()
    }
}

/// Result of a guard: either the granted session or the redirect that ends
/// the request.
#[must_use = "a redirected guard must end the request"]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Authorization {
    Authorized(Session),
    Redirect(GuardRedirect),
}

impl Authorization {
    pub fn is_authorized(&self) -> bool {
        matches!(self, Authorization::Authorized(_))
    }

    pub fn session(&self) -> Option<&Session> {
        match self {
            Authorization::Authorized(session) => Some(session),
            Authorization::Redirect(_) => None,
        }
    }

    pub fn redirect_kind(&self) -> Option<RedirectKind> {
        match self {
            Authorization::Authorized(_) => None,
            Authorization::Redirect(redirect) => Some(redirect.kind),
        }
    }

    /// For handlers: `let session = guard.require_admin(&headers).await.into_result()?;`
    pub fn into_result(self) -> Result<Session, GuardRedirect> {
        match self {
            Authorization::Authorized(session) => Ok(session),
            Authorization::Redirect(redirect) => Err(redirect),
        }
    }
}

/// Role guard over an injected session provider.
#[derive(Clone)]
pub struct ActionGuard {
    sessions: Arc<dyn SessionProvider>,
    redirects: Redirects,
}

impl ActionGuard {
    pub fn new(sessions: Arc<dyn SessionProvider>, redirects: Redirects) -> Self {
        Self {
            sessions,
            redirects,
        }
    }

    pub fn redirects(&self) -> &Redirects {
        &self.redirects
    }

    /// Non-redirecting lookup. Store failures and expired sessions read as `None`.
    pub async fn current_session(&self, headers: &HeaderMap) -> Option<Session> {
        match self.sessions.session_for(headers).await {
            Ok(session) => session.filter(|session| !session.is_expired()),
            Err(err) => {
                warn!(error = %err, "session lookup failed; treating caller as anonymous");
                None
            }
        }
    }

    pub async fn current_user(&self, headers: &HeaderMap) -> Option<CurrentUser> {
        self.current_session(headers).await.map(|session| session.user())
    }

    pub async fn require_auth(&self, headers: &HeaderMap) -> Authorization {
        let session = self.current_session(headers).await;
        self.authorize(session, RoleSet::ALL)
    }

    pub async fn require_role(&self, headers: &HeaderMap, allowed: RoleSet) -> Authorization {
        let session = self.current_session(headers).await;
        self.authorize(session, allowed)
    }

    pub async fn require_admin(&self, headers: &HeaderMap) -> Authorization {
        self.require_role(headers, allow::ADMIN_ONLY).await
    }

    pub async fn require_mentor(&self, headers: &HeaderMap) -> Authorization {
        self.require_role(headers, allow::MENTOR_OR_ADMIN).await
    }

    pub async fn require_student(&self, headers: &HeaderMap) -> Authorization {
        self.require_role(headers, allow::STUDENT_AREA).await
    }

    pub async fn require_recruiter(&self, headers: &HeaderMap) -> Authorization {
        self.require_role(headers, allow::RECRUITER_OR_ADMIN).await
    }

    /// Decide for a session that was already looked up. The session is
    /// returned untouched on success.
    pub fn authorize(&self, session: Option<Session>, allowed: RoleSet) -> Authorization {
        let Some(session) = session.filter(|session| !session.is_expired()) else {
            return self.redirect(RedirectKind::SignIn);
        };
        if allowed.contains(session.role) {
            Authorization::Authorized(session)
        } else {
            debug!(role = %session.role, %allowed, "action guard rejected role");
            self.redirect(RedirectKind::Landing)
        }
    }

    fn redirect(&self, kind: RedirectKind) -> Authorization {
        Authorization::Redirect(GuardRedirect {
            kind,
            location: self.redirects.location(kind).to_string(),
        })
    }
}

use std::convert::Infallible;
use std::marker::PhantomData;

use async_trait::async_trait;
use axum::extract::{FromRef, FromRequestParts};
use axum::http::request::Parts;
use campus_gate_core_types::{RoleSet, Session};
use campus_gate_session_store::ResolvedSession;

use crate::{allow, ActionGuard, GuardRedirect};

/// Names a fixed allow-list at the type level.
pub trait GuardPolicy: Send + Sync + 'static {
    const ALLOWED: RoleSet;
}

pub struct AdminOnly;
pub struct MentorOrAdmin;
pub struct StudentArea;
pub struct RecruiterOrAdmin;
pub struct AnyRole;

impl GuardPolicy for AdminOnly {
    const ALLOWED: RoleSet = allow::ADMIN_ONLY;
}

impl GuardPolicy for MentorOrAdmin {
    const ALLOWED: RoleSet = allow::MENTOR_OR_ADMIN;
}

impl GuardPolicy for StudentArea {
    const ALLOWED: RoleSet = allow::STUDENT_AREA;
}

impl GuardPolicy for RecruiterOrAdmin {
    const ALLOWED: RoleSet = allow::RECRUITER_OR_ADMIN;
}

impl GuardPolicy for AnyRole {
    const ALLOWED: RoleSet = allow::ANY_AUTHENTICATED;
}

/// Extractor that only lets the handler run when the caller's role is in
/// `P::ALLOWED`; otherwise the request ends with the guard's redirect.
///
/// Reuses the route gate's lookup when the request carries one.
pub struct Guarded<P> {
    pub session: Session,
    _policy: PhantomData<fn() -> P>,
}

impl<P> Guarded<P> {
    pub fn into_session(self) -> Session {
        self.session
    }
}

#[async_trait]
impl<S, P> FromRequestParts<S> for Guarded<P>
where
    S: Send + Sync,
    ActionGuard: FromRef<S>,
    P: GuardPolicy,
{
    type Rejection = GuardRedirect;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let guard = ActionGuard::from_ref(state);
        let authorization = match parts.extensions.get::<ResolvedSession>() {
            Some(ResolvedSession(resolved)) => guard.authorize(resolved.clone(), P::ALLOWED),
            None => guard.require_role(&parts.headers, P::ALLOWED).await,
        };
        authorization.into_result().map(|session| Guarded {
            session,
            _policy: PhantomData,
        })
    }
}

/// Extractor for pages that render differently for anonymous visitors.
pub struct MaybeSession(pub Option<Session>);

#[async_trait]
impl<S> FromRequestParts<S> for MaybeSession
where
    S: Send + Sync,
    ActionGuard: FromRef<S>,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        if let Some(ResolvedSession(resolved)) = parts.extensions.get::<ResolvedSession>() {
            return Ok(MaybeSession(
                resolved.clone().filter(|session| !session.is_expired()),
            ));
        }
        let guard = ActionGuard::from_ref(state);
        Ok(MaybeSession(guard.current_session(&parts.headers).await))
    }
}

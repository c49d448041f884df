//! Shared primitives for the campus access gate.
//!
//! The role vocabulary, allow-list sets and the session record are used by
//! both the path-level route gate and the in-process action guards, so they
//! live here with no web-framework dependency.

mod redirect;
mod role;
mod session;

pub use redirect::{RedirectKind, Redirects};
pub use role::{Role, RoleSet, UnknownRole};
pub use session::{CurrentUser, Session, SessionId, SubjectId};

pub mod config;
mod middleware;
mod table;

pub use crate::config::{
    default_route_table_file, load_route_table_from_path, parse_route_table_str, ConfigError,
    RouteRuleSpec, RouteTableFile,
};
pub use crate::middleware::route_gate_middleware;
pub use crate::table::{
    literal_path, normalize_path, PathPattern, RouteClass, RouteClassKind, RouteRule, RouteTable,
};

use std::sync::Arc;
use std::time::SystemTime;

use axum::http::HeaderMap;
use campus_gate_core_types::{RedirectKind, Redirects, Role, Session, SubjectId};
use campus_gate_session_store::{ResolvedSession, SessionProvider};
use serde::Serialize;
use tokio::sync::broadcast;
use tracing::{debug, warn};

/// Outcome of the gate for one request.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum GateDecision {
    Pass,
    Redirect { kind: RedirectKind, location: String },
}

impl GateDecision {
    pub fn is_pass(&self) -> bool {
        matches!(self, GateDecision::Pass)
    }

    pub fn redirect_kind(&self) -> Option<RedirectKind> {
        match self {
            GateDecision::Pass => None,
            GateDecision::Redirect { kind, .. } => Some(*kind),
        }
    }
}

/// Decision plus what the gate learned on the way.
#[derive(Clone, Debug)]
pub struct GateOutcome {
    pub class: RouteClassKind,
    pub decision: GateDecision,
    /// `None` when no lookup was made (public and api paths).
    pub lookup: Option<ResolvedSession>,
}

/// Event emitted whenever the gate issues a decision.
#[derive(Clone, Debug, Serialize)]
pub struct GateEvent {
    pub path: String,
    pub class: RouteClassKind,
    pub decision: GateDecision,
    pub role: Option<Role>,
    pub subject: Option<SubjectId>,
    pub timestamp: SystemTime,
}

/// Request-level interceptor: classifies the path, looks up the session only
/// for protected paths, and applies the matching role rules.
pub struct RouteGate {
    table: Arc<RouteTable>,
    sessions: Arc<dyn SessionProvider>,
    redirects: Redirects,
    events: broadcast::Sender<GateEvent>,
}

impl RouteGate {
    pub fn new(table: RouteTable, sessions: Arc<dyn SessionProvider>, redirects: Redirects) -> Self {
        let (tx, _rx) = broadcast::channel(128);
        Self {
            table: Arc::new(table),
            sessions,
            redirects,
            events: tx,
        }
    }

    pub fn table(&self) -> &RouteTable {
        &self.table
    }

    pub fn redirects(&self) -> &Redirects {
        &self.redirects
    }

    pub fn subscribe(&self) -> broadcast::Receiver<GateEvent> {
        self.events.subscribe()
    }

    pub fn classify<'a>(&'a self, path: &str) -> RouteClass<'a> {
        self.table.classify(path)
    }

    /// Pure decision for an already classified path. Expired sessions count
    /// as absent.
    pub fn decide(&self, class: &RouteClass<'_>, session: Option<&Session>) -> GateDecision {
        let rules = match class {
            RouteClass::Public | RouteClass::Api => return GateDecision::Pass,
            RouteClass::Protected(rules) => rules,
        };

        let Some(session) = session.filter(|session| !session.is_expired()) else {
            return self.redirect(RedirectKind::SignIn);
        };

        match rules.iter().find(|rule| !rule.permits(session.role)) {
            Some(rule) => {
                debug!(
                    role = %session.role,
                    rule = %rule.pattern,
                    allowed = %rule.allow,
                    "route rule rejected role"
                );
                self.redirect(RedirectKind::Landing)
            }
            None => GateDecision::Pass,
        }
    }

    pub async fn evaluate(&self, path: &str, headers: &HeaderMap) -> GateOutcome {
        let class = self.classify(path);
        let kind = class.kind();

        if kind != RouteClassKind::Protected {
            let decision = self.decide(&class, None);
            self.publish_event(path, kind, &decision, None);
            return GateOutcome {
                class: kind,
                decision,
                lookup: None,
            };
        }

        let session = match self.sessions.session_for(headers).await {
            Ok(session) => session,
            Err(err) => {
                warn!(path, error = %err, "session lookup failed; treating request as anonymous");
                None
            }
        };

        let decision = self.decide(&class, session.as_ref());
        self.publish_event(path, kind, &decision, session.as_ref());
        GateOutcome {
            class: kind,
            decision,
            lookup: Some(ResolvedSession(session)),
        }
    }

    fn redirect(&self, kind: RedirectKind) -> GateDecision {
        GateDecision::Redirect {
            kind,
            location: self.redirects.location(kind).to_string(),
        }
    }

    fn publish_event(
        &self,
        path: &str,
        class: RouteClassKind,
        decision: &GateDecision,
        session: Option<&Session>,
    ) {
        debug!(path, ?class, ?decision, "route gate decision");
        if self.events.receiver_count() == 0 {
            return;
        }
        let event = GateEvent {
            path: path.to_string(),
            class,
            decision: decision.clone(),
            role: session.map(|s| s.role),
            subject: session.map(|s| s.subject.clone()),
            timestamp: SystemTime::now(),
        };
        if let Err(err) = self.events.send(event) {
            warn!("failed to publish gate event: {err}");
        }
    }
}

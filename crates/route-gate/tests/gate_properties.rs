use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, HeaderMap, Request, StatusCode};
use axum::routing::get;
use axum::{middleware, Router};
use campus_gate_core_types::{RedirectKind, Redirects, Role, Session, SubjectId};
use campus_gate_route_gate::{
    default_route_table_file, parse_route_table_str, route_gate_middleware, GateDecision,
    RouteClassKind, RouteGate, RouteTable,
};
use campus_gate_session_store::{ResolvedSession, SessionError, SessionProvider};
use tower::ServiceExt;

/// Hands out a fixed session and counts how often it was asked.
struct FixedSessions {
    session: Option<Session>,
    lookups: AtomicUsize,
}

impl FixedSessions {
    fn new(role: Option<Role>) -> Arc<Self> {
        Arc::new(Self {
            session: role.map(|role| Session::new(SubjectId("u-1".into()), role, None)),
            lookups: AtomicUsize::new(0),
        })
    }

    fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SessionProvider for FixedSessions {
    async fn session_for(&self, _headers: &HeaderMap) -> Result<Option<Session>, SessionError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        Ok(self.session.clone())
    }
}

struct BrokenSessions;

#[async_trait]
impl SessionProvider for BrokenSessions {
    async fn session_for(&self, _headers: &HeaderMap) -> Result<Option<Session>, SessionError> {
        Err(SessionError::Unavailable("connection refused".into()))
    }
}

fn gate_with(sessions: Arc<dyn SessionProvider>) -> RouteGate {
    let table = RouteTable::compile(&default_route_table_file()).unwrap();
    RouteGate::new(table, sessions, Redirects::default())
}

const PUBLIC_PATHS: &[&str] = &[
    "/",
    "/sign-in",
    "/sign-up",
    "/about",
    "/about/team",
    "/courses",
    "/courses/rust-101/syllabus",
];

#[tokio::test]
async fn public_paths_pass_for_everyone_without_lookup() {
    let mut identities: Vec<Option<Role>> = Role::ALL.into_iter().map(Some).collect();
    identities.push(None);
    for identity in identities {
        let sessions = FixedSessions::new(identity);
        let gate = gate_with(sessions.clone());
        for path in PUBLIC_PATHS {
            let outcome = gate.evaluate(path, &HeaderMap::new()).await;
            assert_eq!(outcome.decision, GateDecision::Pass, "{path} as {identity:?}");
            assert_eq!(outcome.class, RouteClassKind::Public);
            assert!(outcome.lookup.is_none());
        }
        assert_eq!(sessions.lookups(), 0);
    }
}

#[tokio::test]
async fn api_namespace_passes_without_lookup() {
    let sessions = FixedSessions::new(None);
    let gate = gate_with(sessions.clone());
    let outcome = gate.evaluate("/api/admin/users", &HeaderMap::new()).await;
    assert_eq!(outcome.decision, GateDecision::Pass);
    assert_eq!(outcome.class, RouteClassKind::Api);
    assert_eq!(sessions.lookups(), 0);
}

#[tokio::test]
async fn admin_area_rejects_every_other_role_to_landing() {
    for role in Role::ALL.into_iter().filter(|role| *role != Role::Admin) {
        let gate = gate_with(FixedSessions::new(Some(role)));
        for path in ["/dashboard/admin", "/dashboard/admin/users/9"] {
            let outcome = gate.evaluate(path, &HeaderMap::new()).await;
            assert_eq!(
                outcome.decision,
                GateDecision::Redirect {
                    kind: RedirectKind::Landing,
                    location: "/dashboard".into()
                },
                "{path} as {role}"
            );
        }
    }
}

#[tokio::test]
async fn anonymous_admin_request_goes_to_sign_in_not_landing() {
    let gate = gate_with(FixedSessions::new(None));
    let outcome = gate.evaluate("/dashboard/admin", &HeaderMap::new()).await;
    assert_eq!(
        outcome.decision,
        GateDecision::Redirect {
            kind: RedirectKind::SignIn,
            location: "/sign-in".into()
        }
    );
}

#[tokio::test]
async fn role_matrix_for_default_prefixes() {
    let expectations: [(&str, &[Role]); 4] = [
        ("/dashboard/admin", &[Role::Admin]),
        ("/dashboard/mentor", &[Role::Mentor, Role::Admin]),
        ("/dashboard/student", &Role::ALL),
        ("/dashboard", &Role::ALL),
    ];
    for (path, allowed) in expectations {
        for role in Role::ALL {
            let gate = gate_with(FixedSessions::new(Some(role)));
            let decision = gate.evaluate(path, &HeaderMap::new()).await.decision;
            if allowed.contains(&role) {
                assert!(decision.is_pass(), "{path} should admit {role}");
            } else {
                assert_eq!(decision.redirect_kind(), Some(RedirectKind::Landing), "{path} {role}");
            }
        }
    }
}

#[tokio::test]
async fn first_failing_rule_decides_when_rules_overlap() {
    let table = parse_route_table_str(
        r#"
version: 1
public: ["/"]
api: ["/api"]
rules:
  - prefix: /reports
    allow: [admin, recruiter]
  - prefix: /reports/placements
    allow: [recruiter, partner_agency]
"#,
    )
    .unwrap();
    let table = RouteTable::compile(&table).unwrap();
    let gate = RouteGate::new(table, FixedSessions::new(Some(Role::PartnerAgency)), Redirects::default());
    // Passes the specific rule, fails the broader one.
    let decision = gate.evaluate("/reports/placements", &HeaderMap::new()).await.decision;
    assert_eq!(decision.redirect_kind(), Some(RedirectKind::Landing));

    let gate = RouteGate::new(
        gate.table().clone(),
        FixedSessions::new(Some(Role::Recruiter)),
        Redirects::default(),
    );
    assert!(gate.evaluate("/reports/placements", &HeaderMap::new()).await.decision.is_pass());
}

#[tokio::test]
async fn unavailable_session_store_fails_closed() {
    let gate = gate_with(Arc::new(BrokenSessions));
    let outcome = gate.evaluate("/dashboard/student", &HeaderMap::new()).await;
    assert_eq!(outcome.decision.redirect_kind(), Some(RedirectKind::SignIn));
    assert!(matches!(outcome.lookup, Some(ResolvedSession(None))));
}

#[tokio::test]
async fn expired_session_counts_as_anonymous() {
    let mut session = Session::new(SubjectId("u-9".into()), Role::Admin, None);
    session.expires_at = Some(chrono::Utc::now() - chrono::Duration::seconds(1));
    let gate = gate_with(FixedSessions::new(None));
    let class = gate.classify("/dashboard/admin");
    assert_eq!(
        gate.decide(&class, Some(&session)).redirect_kind(),
        Some(RedirectKind::SignIn)
    );
}

#[tokio::test]
async fn custom_redirect_targets_are_used() {
    let table = RouteTable::compile(&default_route_table_file()).unwrap();
    let redirects = Redirects {
        sign_in: "/login".into(),
        landing: "/home".into(),
    };
    let gate = RouteGate::new(table, FixedSessions::new(Some(Role::Student)), redirects);
    assert_eq!(
        gate.evaluate("/dashboard/mentor", &HeaderMap::new()).await.decision,
        GateDecision::Redirect {
            kind: RedirectKind::Landing,
            location: "/home".into()
        }
    );
}

#[tokio::test]
async fn decisions_are_published() {
    let gate = gate_with(FixedSessions::new(Some(Role::Mentor)));
    let mut rx = gate.subscribe();
    gate.evaluate("/dashboard/admin", &HeaderMap::new()).await;
    let event = rx.recv().await.expect("receive gate event");
    assert_eq!(event.path, "/dashboard/admin");
    assert_eq!(event.class, RouteClassKind::Protected);
    assert_eq!(event.role, Some(Role::Mentor));
    assert_eq!(event.decision.redirect_kind(), Some(RedirectKind::Landing));
}

#[tokio::test]
async fn middleware_redirects_and_forwards_resolved_session() {
    let gate = Arc::new(gate_with(FixedSessions::new(Some(Role::Student))));
    let router = Router::new()
        .route("/dashboard/admin", get(|| async { "admin" }))
        .route(
            "/dashboard/student",
            get(|req: Request<Body>| async move {
                match req.extensions().get::<ResolvedSession>() {
                    Some(ResolvedSession(Some(session))) => session.role.to_string(),
                    _ => "missing".to_string(),
                }
            }),
        )
        .layer(middleware::from_fn_with_state(gate, route_gate_middleware));

    let response = router
        .clone()
        .oneshot(Request::builder().uri("/dashboard/admin").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(response.headers()[header::LOCATION], "/dashboard");

    let response = router
        .oneshot(Request::builder().uri("/dashboard/student").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"student");
}

#[test]
fn route_table_loads_from_json_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("routes.json");
    std::fs::write(
        &path,
        r#"{"version":1,"public":["/","/jobs"],"api":["/api"],
            "rules":[{"prefix":"/dashboard/recruiter","allow":["recruiter","admin"]}]}"#,
    )
    .unwrap();
    let file = campus_gate_route_gate::load_route_table_from_path(&path).unwrap();
    let table = RouteTable::compile(&file).unwrap();
    assert_eq!(table.public().len(), 2);
    assert_eq!(table.rules()[0].pattern.as_str(), "/dashboard/recruiter");
    assert!(table.rules()[0].permits(Role::Recruiter));
    assert!(!table.rules()[0].permits(Role::Student));
}

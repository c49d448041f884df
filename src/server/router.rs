use axum::http::StatusCode;
use axum::routing::get;
use axum::{middleware, Router};
use campus_gate_route_gate::route_gate_middleware;
use tower_http::trace::TraceLayer;

use super::pages;
use super::state::ServerState;
use crate::app_context::AppContext;

/// Pages and API routes, every one of them behind the route gate.
pub fn build_router(ctx: &AppContext) -> Router {
    let state = ServerState { guard: ctx.guard() };

    let pages: Router<ServerState> = Router::new()
        .route("/", get(pages::home))
        .route("/sign-in", get(pages::sign_in))
        .route("/sign-up", get(pages::sign_up))
        .route("/about", get(pages::about))
        .route("/courses", get(pages::courses))
        .route("/courses/:course_id", get(pages::course))
        .route("/dashboard", get(pages::dashboard))
        .route("/dashboard/admin", get(pages::admin_dashboard))
        .route("/dashboard/mentor", get(pages::mentor_dashboard))
        .route("/dashboard/student", get(pages::student_dashboard));

    let api: Router<ServerState> = Router::new()
        .route("/api/healthz", get(pages::healthz))
        .route("/api/session", get(pages::current_session))
        .route("/api/admin/users", get(pages::admin_users))
        .route(
            "/api/recruiter/applications",
            get(pages::recruiter_applications),
        );

    Router::new()
        .merge(pages)
        .merge(api)
        .fallback(|| async { (StatusCode::NOT_FOUND, "not found") })
        .with_state(state)
        .layer(middleware::from_fn_with_state(
            ctx.gate(),
            route_gate_middleware,
        ))
        .layer(TraceLayer::new_for_http())
}

//! Demo handlers. Rendering and persistence live elsewhere on the platform;
//! these only show which identity reached them.

use axum::extract::Path;
use axum::response::Html;
use axum::Json;
use campus_gate_action_guard::{
    AdminOnly, AnyRole, Guarded, MaybeSession, MentorOrAdmin, RecruiterOrAdmin, StudentArea,
};
use campus_gate_core_types::CurrentUser;
use serde_json::{json, Value};

pub(super) async fn home() -> Html<&'static str> {
    Html("<h1>Campus</h1><p>Courses, mentoring and placements.</p>")
}

pub(super) async fn sign_in() -> Html<&'static str> {
    Html("<h1>Sign in</h1>")
}

pub(super) async fn sign_up() -> Html<&'static str> {
    Html("<h1>Sign up</h1>")
}

pub(super) async fn about() -> Html<&'static str> {
    Html("<h1>About</h1>")
}

pub(super) async fn courses() -> Html<&'static str> {
    Html("<h1>Course catalog</h1>")
}

pub(super) async fn course(Path(course_id): Path<String>) -> Html<String> {
    Html(format!("<h1>Course {}</h1>", escape(&course_id)))
}

pub(super) async fn dashboard(guarded: Guarded<AnyRole>) -> Html<String> {
    let session = guarded.into_session();
    Html(format!(
        "<h1>Dashboard</h1><p>{} ({})</p>",
        escape(&session.subject.0),
        session.role
    ))
}

pub(super) async fn admin_dashboard(guarded: Guarded<AdminOnly>) -> Html<String> {
    Html(format!(
        "<h1>Admin</h1><p>{}</p>",
        escape(&guarded.session.subject.0)
    ))
}

pub(super) async fn mentor_dashboard(guarded: Guarded<MentorOrAdmin>) -> Html<String> {
    Html(format!(
        "<h1>Mentor</h1><p>{}</p>",
        escape(&guarded.session.subject.0)
    ))
}

pub(super) async fn student_dashboard(guarded: Guarded<StudentArea>) -> Html<String> {
    Html(format!(
        "<h1>Student</h1><p>{}</p>",
        escape(&guarded.session.subject.0)
    ))
}

pub(super) async fn healthz() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

pub(super) async fn current_session(
    MaybeSession(session): MaybeSession,
) -> Json<Option<CurrentUser>> {
    Json(session.map(|session| session.user()))
}

pub(super) async fn admin_users(guarded: Guarded<AdminOnly>) -> Json<Value> {
    Json(json!({
        "requested_by": guarded.session.subject,
        "users": [],
    }))
}

pub(super) async fn recruiter_applications(guarded: Guarded<RecruiterOrAdmin>) -> Json<Value> {
    Json(json!({
        "requested_by": guarded.session.subject,
        "role": guarded.session.role,
        "applications": [],
    }))
}

fn escape(raw: &str) -> String {
    raw.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

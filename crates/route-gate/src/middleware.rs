use std::sync::Arc;

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};

use crate::{GateDecision, RouteGate};

/// axum middleware running the route gate in front of every handler.
///
/// Install with `axum::middleware::from_fn_with_state(gate, route_gate_middleware)`.
pub async fn route_gate_middleware(
    State(gate): State<Arc<RouteGate>>,
    mut req: Request,
    next: Next,
) -> Response {
    let path = req.uri().path().to_string();
    let outcome = gate.evaluate(&path, req.headers()).await;
    match outcome.decision {
        GateDecision::Pass => {
            if let Some(resolved) = outcome.lookup {
                req.extensions_mut().insert(resolved);
            }
            next.run(req).await
        }
        GateDecision::Redirect { location, .. } => Redirect::temporary(&location).into_response(),
    }
}

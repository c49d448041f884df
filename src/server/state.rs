use axum::extract::FromRef;
use campus_gate_action_guard::ActionGuard;

#[derive(Clone)]
pub struct ServerState {
    pub guard: ActionGuard,
}

impl FromRef<ServerState> for ActionGuard {
    fn from_ref(state: &ServerState) -> Self {
        state.guard.clone()
    }
}

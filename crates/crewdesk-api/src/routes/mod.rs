//! HTTP route handlers

pub mod auth;
pub mod employees;
pub mod health;
pub mod leaves;
pub mod types;

use std::sync::Arc;

use axum::{Router, middleware};
use crewdesk_auth::{SessionGate, session_gate};

use crate::state::AppState;

/// Assemble the full application router.
///
/// Everything merged before the gate layer is session-protected (the gate
/// itself exempts the public auth endpoints); health probes are mounted
/// after it so monitoring never needs a session.
pub fn create_router(state: AppState, gate: Arc<SessionGate>) -> Router {
    Router::new()
        .merge(auth::router())
        .merge(employees::router())
        .merge(leaves::router())
        .layer(middleware::from_fn_with_state(gate, session_gate))
        .merge(health::router())
        .with_state(state)
}

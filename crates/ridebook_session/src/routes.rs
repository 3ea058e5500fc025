// --- File: crates/ridebook_session/src/routes.rs ---
use axum::{
    routing::{get, post},
    Router,
};

use crate::context::SessionContext;
use crate::handlers::{logout_handler, session_status_handler};

/// Creates a router containing all routes for session handling.
pub fn routes(session: SessionContext) -> Router {
    Router::new()
        .route("/session", get(session_status_handler))
        .route("/session/logout", post(logout_handler))
        .with_state(session)
}

// --- File: crates/ridebook_availability/src/routes.rs ---

use axum::{
    routing::{get, post},
    Router,
};
use ridebook_platform::SchedulingPlatform;
use ridebook_session::SessionContext;
use std::sync::Arc;

use crate::handlers::{list_handler, services_handler, slot_handler, AvailabilityState};
use crate::logic::AvailabilityEngine;

/// Creates a router containing all availability and catalog routes.
pub fn routes(platform: Arc<dyn SchedulingPlatform>, session: SessionContext) -> Router {
    let state = Arc::new(AvailabilityState {
        engine: AvailabilityEngine::new(platform, session.shared_manager()),
        session,
    });

    Router::new()
        .route("/availability/slot", post(slot_handler))
        .route("/availability/list", post(list_handler))
        .route("/services", get(services_handler))
        .with_state(state)
}

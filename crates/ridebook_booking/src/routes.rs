// --- File: crates/ridebook_booking/src/routes.rs ---

use axum::{
    routing::{get, post},
    Router,
};
use ridebook_config::CheckoutConfig;
use ridebook_platform::SchedulingPlatform;
use ridebook_session::SessionContext;
use std::sync::Arc;

use crate::handlers::{
    checkout_handler, create_booking_handler, get_booking_handler, submit_form_handler,
    BookingState,
};
use crate::logic::BookingOrchestrator;

/// Creates a router containing booking, checkout and form routes.
pub fn routes(
    platform: Arc<dyn SchedulingPlatform>,
    session: SessionContext,
    checkout: Option<CheckoutConfig>,
) -> Router {
    let state = Arc::new(BookingState {
        orchestrator: BookingOrchestrator::new(platform, session.shared_manager(), checkout),
        session,
    });

    Router::new()
        .route("/bookings", post(create_booking_handler))
        .route("/bookings/{booking_id}", get(get_booking_handler))
        .route("/checkout", post(checkout_handler))
        .route("/forms/{namespace}", post(submit_form_handler))
        .with_state(state)
}
